//! Search commands - attribute and DSL queries.

use anyhow::Result;
use atlas_client::{AttributeFilter, DEFAULT_PAGE_SIZE, SearchOptions};
use atlas_tasks::{CatalogTask, TaskOperation};
use clap::Args;

use super::Context;

/// Paging flags shared by both searches.
#[derive(Args, Debug)]
pub struct PagingArgs {
    /// Hits requested per page
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: usize,

    /// Offset of the first page
    #[arg(long, default_value_t = 0)]
    pub offset: usize,

    /// Stop after this many pages
    #[arg(long)]
    pub max_pages: Option<usize>,
}

impl PagingArgs {
    fn options(&self) -> SearchOptions {
        let options = SearchOptions::default()
            .with_page_size(self.page_size)
            .with_offset(self.offset);
        match self.max_pages {
            Some(max) => options.with_max_pages(max),
            None => options,
        }
    }
}

/// Arguments for `search-attributes`.
#[derive(Args, Debug)]
pub struct SearchAttributesArgs {
    /// Filter predicates (e.g. typeName=hdfs_path attrName=name)
    #[arg(required = true, value_parser = parse_key_val)]
    pub filters: Vec<(String, String)>,

    #[command(flatten)]
    pub paging: PagingArgs,
}

/// Arguments for `search-dsl`.
#[derive(Args, Debug)]
pub struct SearchDslArgs {
    /// DSL query (e.g. "hdfs_path where name = 'x'")
    pub query: String,

    #[command(flatten)]
    pub paging: PagingArgs,
}

/// Run `search-attributes`.
pub fn run_attributes(args: SearchAttributesArgs, ctx: &Context) -> Result<()> {
    let filter: AttributeFilter = args.filters.into_iter().collect();
    tracing::debug!(filter = ?filter, "attribute filter");
    let registry = ctx.registry()?;
    let task = CatalogTask::new(
        ctx.connection_id(&registry),
        TaskOperation::SearchByAttributes(filter),
    )
    .with_id("search_attributes")
    .with_search_options(args.paging.options());
    ctx.execute(registry, &task)
}

/// Run `search-dsl`.
pub fn run_dsl(args: SearchDslArgs, ctx: &Context) -> Result<()> {
    let registry = ctx.registry()?;
    let task = CatalogTask::new(ctx.connection_id(&registry), TaskOperation::SearchByDsl(args.query))
        .with_id("search_dsl")
        .with_search_options(args.paging.options());
    ctx.execute(registry, &task)
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", s))?;
    if key.is_empty() {
        return Err(format!("empty key in '{}'", s));
    }
    Ok((key.to_string(), value.to_string()))
}
