// HTTP request handlers

use crate::query::QueryParameters;
use crate::response::SearchError;
use crate::server::ServerState;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Json, Response},
};

impl IntoResponse for SearchError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.envelope())).into_response()
    }
}

/// Full-text search with field selection and pagination links
pub async fn search(
    State(state): State<ServerState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Response {
    let params = QueryParameters::from_pairs(pairs);
    tracing::debug!("search with {} parameters", params.len());

    // The content store is synchronous
    let assembler = state.assembler.clone();
    let outcome = tokio::task::spawn_blocking(move || assembler.respond(&params)).await;

    match outcome {
        Ok(Ok(response)) => Json(response).into_response(),
        Ok(Err(err)) => err.into_response(),
        Err(join_error) => {
            tracing::error!("search task failed: {}", join_error);
            SearchError::Backend(anyhow::Error::new(join_error)).into_response()
        }
    }
}
