//! API endpoint implementations.

mod entities;
mod search;
mod typedefs;

pub use entities::EntitiesApi;
pub use search::{AttributeFilter, SearchApi, SearchOptions};
pub use typedefs::TypeDefsApi;
