// Search response assembly

use crate::config::Config;
use crate::links::{Direction, LinkBuilder};
use crate::projector::{ProjectedPost, ResultProjector, TaxonomyResolver};
use crate::query::{ArgumentBuilder, ParamValue, QueryParameters};
use crate::store::{SearchBackend, Store};
use axum::http::StatusCode;
use log::{debug, error};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

/// Why a search produced no result set
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Empty search query")]
    EmptyQuery,

    #[error("Nothing found")]
    NothingFound,

    #[error("Search backend failure")]
    Backend(#[from] anyhow::Error),
}

impl SearchError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::EmptyQuery => StatusCode::BAD_REQUEST,
            Self::NothingFound => StatusCode::NOT_FOUND,
            Self::Backend(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope {
            error: true,
            message: self.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorEnvelope {
    pub error: bool,
    pub message: String,
}

/// Active taxonomy filter, echoed back to the client
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Filters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<ParamValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taxonomy: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Meta {
    pub filters: Filters,
    pub total: i64,
    pub pages: i64,
    pub current_page: i64,
    pub per_page: i64,
    pub s: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResponse {
    pub success: bool,
    pub results: Vec<ProjectedPost>,
    pub meta: Meta,
}

/// Runs one search request end to end: arguments, search, projection, links
pub struct ResponseAssembler {
    arguments: ArgumentBuilder,
    backend: Arc<dyn SearchBackend>,
    projector: ResultProjector,
    links: LinkBuilder,
}

impl ResponseAssembler {
    pub fn new(
        arguments: ArgumentBuilder,
        backend: Arc<dyn SearchBackend>,
        projector: ResultProjector,
        links: LinkBuilder,
    ) -> Self {
        Self {
            arguments,
            backend,
            projector,
            links,
        }
    }

    /// Wire the pipeline to a content store
    pub fn with_store(store: Arc<Store>, config: &Config) -> Self {
        Self::new(
            ArgumentBuilder::new(config.search.default_per_page),
            store.clone(),
            ResultProjector::new(TaxonomyResolver::new(store)),
            LinkBuilder::new(config.search_endpoint_url()),
        )
    }

    pub fn respond(&self, params: &QueryParameters) -> Result<SearchResponse, SearchError> {
        let args = self.arguments.build(params);

        let term = match args.search_term() {
            Some(term) => term.to_string(),
            None => return Err(SearchError::EmptyQuery),
        };

        let results = self.backend.execute(&args).map_err(|e| {
            error!("Search for {:?} failed: {:#}", term, e);
            SearchError::Backend(e)
        })?;

        debug!(
            "Search for {:?}: {} total, {} pages, {} on this page",
            term,
            results.total,
            results.pages,
            results.matches.len()
        );

        if results.matches.is_empty() {
            return Err(SearchError::NothingFound);
        }

        let posts = self
            .projector
            .project_all(&results.matches, params)
            .map_err(|e| {
                error!("Projecting results for {:?} failed: {:#}", term, e);
                SearchError::Backend(e)
            })?;

        let filters = args
            .tax_query
            .as_ref()
            .map(|filter| Filters {
                category: Some(filter.terms.clone()),
                taxonomy: Some(filter.taxonomy.clone()),
            })
            .unwrap_or_default();

        let mut meta = Meta {
            filters,
            total: results.total,
            pages: results.pages,
            current_page: args.paged,
            per_page: args.posts_per_page,
            s: term,
            next: None,
            previous: None,
        };

        if meta.current_page < meta.pages {
            meta.next = Some(self.links.build(&args, params, Direction::Next));
        }
        if meta.current_page > 1 {
            meta.previous = Some(self.links.build(&args, params, Direction::Previous));
        }

        Ok(SearchResponse {
            success: true,
            results: posts,
            meta,
        })
    }
}
