//! Search API.
//!
//! The catalog pages search hits with `limit`/`offset`. Both search kinds walk
//! every page before returning and then flatten them with [`normalize`], so a
//! failing page fails the whole call.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::client::CatalogClient;
use crate::error::{Error, Result};
use crate::normalize::normalize;
use crate::types::{SearchBatch, SearchResult};

/// Query parameter names owned by the pager.
const PAGING_PARAMS: [&str; 2] = ["limit", "offset"];

/// Attribute predicates for `search/attribute`, sent as query parameters.
///
/// Typical keys are `attrName`, `attrValuePrefix` and `typeName`, but any
/// parameter the catalog understands can be given.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeFilter(BTreeMap<String, String>);

impl AttributeFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn attr_name(self, name: impl Into<String>) -> Self {
        self.with("attrName", name)
    }

    pub fn attr_value_prefix(self, prefix: impl Into<String>) -> Self {
        self.with("attrValuePrefix", prefix)
    }

    pub fn type_name(self, type_name: impl Into<String>) -> Self {
        self.with("typeName", type_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AttributeFilter {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Paging controls for a search call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct SearchOptions {
    /// Hits requested per page; a shorter page ends the walk.
    pub page_size: usize,
    /// Offset of the first page.
    pub offset: usize,
    /// Stop after this many pages even if the last one was full.
    pub max_pages: Option<usize>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            page_size: crate::client::DEFAULT_PAGE_SIZE,
            offset: 0,
            max_pages: None,
        }
    }
}

impl SearchOptions {
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = Some(max_pages);
        self
    }
}

/// Search API client.
pub struct SearchApi {
    client: CatalogClient,
}

impl SearchApi {
    pub(crate) fn new(client: CatalogClient) -> Self {
        Self { client }
    }

    fn default_options(&self) -> SearchOptions {
        SearchOptions::default().with_page_size(self.client.page_size())
    }

    /// Attribute-predicate search across every page.
    pub fn by_attributes(&self, filter: &AttributeFilter) -> Result<SearchResult> {
        self.by_attributes_with_options(filter, self.default_options())
    }

    /// Attribute-predicate search with explicit paging.
    pub fn by_attributes_with_options(
        &self,
        filter: &AttributeFilter,
        options: SearchOptions,
    ) -> Result<SearchResult> {
        if let Some(key) = filter.iter().map(|(k, _)| k).find(|k| PAGING_PARAMS.contains(k)) {
            return Err(Error::InvalidPayload(format!(
                "'{}' is controlled by SearchOptions, not the filter",
                key
            )));
        }
        let params: Vec<(String, String)> = filter
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let batches = self.collect_pages("search/attribute", &params, options)?;
        Ok(SearchResult {
            entities: normalize(batches),
        })
    }

    /// DSL search across every page.
    pub fn by_dsl(&self, query: &str) -> Result<SearchResult> {
        self.by_dsl_with_options(query, self.default_options())
    }

    /// DSL search with explicit paging.
    pub fn by_dsl_with_options(&self, query: &str, options: SearchOptions) -> Result<SearchResult> {
        if query.trim().is_empty() {
            return Err(Error::InvalidPayload("DSL query is empty".to_string()));
        }
        let params = vec![("query".to_string(), query.to_string())];
        let batches = self.collect_pages("search/dsl", &params, options)?;
        Ok(SearchResult {
            entities: normalize(batches),
        })
    }

    /// Fetch pages until a short page or the page cap.
    ///
    /// A full page identical to the one before it means the catalog is not
    /// honouring `offset` (e.g. a DSL query with its own `limit`), which fails
    /// the call instead of looping forever.
    fn collect_pages(
        &self,
        path: &str,
        params: &[(String, String)],
        options: SearchOptions,
    ) -> Result<Vec<SearchBatch>> {
        if options.page_size == 0 {
            return Err(Error::InvalidPayload("page_size must be positive".to_string()));
        }

        let mut batches: Vec<SearchBatch> = Vec::new();
        let mut offset = options.offset;
        loop {
            let mut query = params.to_vec();
            query.push(("limit".to_string(), options.page_size.to_string()));
            query.push(("offset".to_string(), offset.to_string()));

            let response = self.client.get_with_query(path, &query)?;
            let batch = SearchBatch::from_response(&response)?;
            let hits = batch.entities.len();
            tracing::debug!(path, offset, hits, "search page");

            if hits > 0 && batches.last().is_some_and(|prev| prev.entities == batch.entities) {
                tracing::warn!(path, offset, "search paging is not advancing");
                return Err(Error::MalformedResponse {
                    reason: format!(
                        "page at offset {} repeats the previous page; the catalog is ignoring offset",
                        offset
                    ),
                    body: response.body.to_string(),
                });
            }
            batches.push(batch);

            if hits < options.page_size {
                break;
            }
            if options.max_pages.is_some_and(|max| batches.len() >= max) {
                tracing::debug!(path, pages = batches.len(), "search page cap reached");
                break;
            }
            offset += options.page_size;
        }
        Ok(batches)
    }
}
