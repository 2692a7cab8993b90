use crate::cli::SearchArgs;
use crate::config::Config;
use crate::query::QueryParameters;
use crate::response::{ResponseAssembler, SearchError};
use crate::store::Store;
use anyhow::Result;
use axum::http::StatusCode;
use std::sync::Arc;

/// Handle search command - run the endpoint pipeline once.
/// Returns false when the response is an error envelope.
pub fn handle(cmd: &SearchArgs, store: Arc<Store>, config: &Config) -> Result<bool> {
    let params = QueryParameters::parse(cmd.query.trim_start_matches('?'));
    let assembler = ResponseAssembler::with_store(store, config);

    let (status, body) = match assembler.respond(&params) {
        Ok(response) => (StatusCode::OK, serde_json::to_value(&response)?),
        Err(SearchError::Backend(e)) => return Err(e.context("Search failed")),
        Err(err) => (err.status(), serde_json::to_value(err.envelope())?),
    };

    if cmd.status {
        eprintln!("HTTP {}", status);
    }
    println!("{}", serde_json::to_string_pretty(&body)?);

    Ok(status.is_success())
}
