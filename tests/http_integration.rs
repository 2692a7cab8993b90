//! HTTP endpoint tests
//!
//! Drive the axum router directly against a seeded SQLite content store.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use common::{create_seeded_store, create_test_config};
use http_body_util::BodyExt;
use relevanssi_rest::response::ResponseAssembler;
use relevanssi_rest::server::{build_router, middleware::REQUEST_ID_HEADER, ServerState};
use serde_json::{json, Value};
use tempfile::tempdir;
use tower::ServiceExt;

// ─────────────────────────────────────────────────────────────────────────────
// Helper Functions
// ─────────────────────────────────────────────────────────────────────────────

fn create_test_router(dir: &std::path::Path) -> Router {
    let config = create_test_config(dir);
    let store = create_seeded_store(&config);
    build_router(ServerState::new(ResponseAssembler::with_store(store, &config)))
}

async fn get(router: Router, uri: &str) -> (StatusCode, Value) {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn search(dir: &std::path::Path, query: &str) -> (StatusCode, Value) {
    get(create_test_router(dir), &format!("/relevanssi/v1/search?{}", query)).await
}

// ─────────────────────────────────────────────────────────────────────────────
// 1. Error Envelopes
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_missing_search_term_is_bad_request() {
    let tmp = tempdir().unwrap();
    let (status, body) = get(create_test_router(tmp.path()), "/relevanssi/v1/search").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": true, "message": "Empty search query"}));
}

#[tokio::test]
async fn test_empty_search_term_is_bad_request() {
    let tmp = tempdir().unwrap();
    let (status, body) = search(tmp.path(), "s=&paged=2").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": true, "message": "Empty search query"}));
}

#[tokio::test]
async fn test_no_matches_is_not_found() {
    let tmp = tempdir().unwrap();
    let (status, body) = search(tmp.path(), "s=haskell").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": true, "message": "Nothing found"}));
}

#[tokio::test]
async fn test_drafts_are_not_found() {
    let tmp = tempdir().unwrap();
    let (status, _) = search(tmp.path(), "s=unfinished").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ─────────────────────────────────────────────────────────────────────────────
// 2. Pagination
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_first_page() {
    let tmp = tempdir().unwrap();
    let (status, body) = search(tmp.path(), "s=rust").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["results"].as_array().unwrap().len(), 10);
    assert_eq!(body["meta"]["total"], json!(13));
    assert_eq!(body["meta"]["pages"], json!(2));
    assert_eq!(body["meta"]["current_page"], json!(1));
    assert_eq!(body["meta"]["per_page"], json!(10));
    assert_eq!(body["meta"]["s"], json!("rust"));
    assert_eq!(body["meta"]["filters"], json!({}));

    let next = body["meta"]["next"].as_str().unwrap();
    assert!(next.starts_with("http://localhost:8080/relevanssi/v1/search?"), "{}", next);
    assert!(next.contains("paged=2"), "{}", next);
    assert!(body["meta"].get("previous").is_none());
}

#[tokio::test]
async fn test_last_page() {
    let tmp = tempdir().unwrap();
    let (status, body) = search(tmp.path(), "s=rust&paged=2").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"].as_array().unwrap().len(), 3);
    assert!(body["meta"].get("next").is_none());
    let previous = body["meta"]["previous"].as_str().unwrap();
    assert!(previous.contains("paged=1"), "{}", previous);
}

#[tokio::test]
async fn test_middle_page_links() {
    let tmp = tempdir().unwrap();
    let (status, body) = search(tmp.path(), "s=rust&posts_per_page=3&paged=2&fields=id").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["pages"], json!(5));
    let next = body["meta"]["next"].as_str().unwrap();
    let previous = body["meta"]["previous"].as_str().unwrap();
    assert!(next.contains("paged=3") && next.contains("posts_per_page=3"), "{}", next);
    assert!(next.contains("fields=id"), "{}", next);
    assert!(previous.contains("paged=1"), "{}", previous);
}

#[tokio::test]
async fn test_next_link_is_followable() {
    let tmp = tempdir().unwrap();
    let router = create_test_router(tmp.path());

    let (_, first) = get(router.clone(), "/relevanssi/v1/search?s=rust&posts_per_page=5&fields%5B%5D=id").await;
    let next = first["meta"]["next"].as_str().unwrap();
    let path = next.trim_start_matches("http://localhost:8080");

    let (status, second) = get(router, path).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["meta"]["current_page"], json!(2));
    let first_ids: Vec<&Value> = first["results"].as_array().unwrap().iter().map(|r| &r["id"]).collect();
    for result in second["results"].as_array().unwrap() {
        assert_eq!(result.as_object().unwrap().len(), 1);
        assert!(!first_ids.contains(&&result["id"]));
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// 3. Field Projection
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_requested_fields_only() {
    let tmp = tempdir().unwrap();
    let (_, body) = search(tmp.path(), "s=rust&fields=id,title").await;
    for result in body["results"].as_array().unwrap() {
        let keys: Vec<&String> = result.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["id", "title"]);
    }
}

#[tokio::test]
async fn test_unknown_fields_dropped() {
    let tmp = tempdir().unwrap();
    let (_, body) = search(tmp.path(), "s=python&fields=bogus,id").await;
    assert_eq!(body["results"], json!([{"id": 13}]));
}

#[tokio::test]
async fn test_default_fields() {
    let tmp = tempdir().unwrap();
    let (_, body) = search(tmp.path(), "s=python").await;
    let result = &body["results"][0];
    let keys: Vec<&str> = result.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["id", "title", "slug", "excerpt", "date", "modified", "taxonomies"]);
    assert_eq!(result["slug"], json!("python-basics"));
    assert_eq!(result["excerpt"], json!("Start here"));
    assert_eq!(result["date"], json!("2024-02-01 10:00:00"));
}

#[tokio::test]
async fn test_generated_excerpt() {
    let tmp = tempdir().unwrap();
    let (_, body) = search(tmp.path(), "s=rust&category=news&fields=id,excerpt&posts_per_page=1").await;
    let excerpt = body["results"][0]["excerpt"].as_str().unwrap();
    assert!(excerpt.starts_with("Notes about rust, part"), "{}", excerpt);
    assert!(!excerpt.contains("<p>"));
}

#[tokio::test]
async fn test_taxonomies_with_resolved_parent() {
    let tmp = tempdir().unwrap();
    // Post 5 is the only one tagged "beginner"
    let (status, body) = search(tmp.path(), "s=rust&category=beginner&taxonomy=post_tag&fields=id,taxonomies").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["filters"], json!({"category": "beginner", "taxonomy": "post_tag"}));

    let result = &body["results"][0];
    assert_eq!(result["id"], json!(5));
    let category = &result["taxonomies"]["category"][0];
    assert_eq!(category["slug"], json!("systems"));
    assert_eq!(category["parent"]["slug"], json!("languages"));
    assert_eq!(category["parent"]["parent"], json!(0));
    assert_eq!(result["taxonomies"]["post_tag"][0]["slug"], json!("beginner"));
    assert_eq!(result["taxonomies"]["post_tag"][0]["parent"], json!(0));
}

#[tokio::test]
async fn test_page_has_no_taxonomies() {
    let tmp = tempdir().unwrap();
    let (_, body) = search(tmp.path(), "s=rust&post_type=page&fields=type,taxonomies").await;
    assert_eq!(body["results"], json!([{"type": "page", "taxonomies": {}}]));
}

// ─────────────────────────────────────────────────────────────────────────────
// 4. Filters
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_category_filter() {
    let tmp = tempdir().unwrap();
    let (status, body) = search(tmp.path(), "s=rust&category=news").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], json!(4));
    assert_eq!(body["meta"]["filters"], json!({"category": "news", "taxonomy": "category"}));
}

#[tokio::test]
async fn test_post_type_filter() {
    let tmp = tempdir().unwrap();
    let (_, body) = search(tmp.path(), "s=rust&post_type=post,page&fields=id").await;
    assert_eq!(body["meta"]["total"], json!(13));

    let (_, body) = search(tmp.path(), "s=rust&post_type=page&fields=id").await;
    assert_eq!(body["results"], json!([{"id": 14}]));
}

#[tokio::test]
async fn test_query_string_decoding() {
    let tmp = tempdir().unwrap();
    let (status, body) = search(tmp.path(), "s=Python%2Bbasics&fields%5B%5D=id&fields%5B%5D=slug").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["s"], json!("Python+basics"));
    assert_eq!(body["results"], json!([{"id": 13, "slug": "python-basics"}]));

    let (_, body) = search(tmp.path(), "s=caf%C3%A9%FF").await;
    assert_eq!(body, json!({"error": true, "message": "Nothing found"}));
}

#[tokio::test]
async fn test_or_fallback() {
    let tmp = tempdir().unwrap();
    let (status, body) = search(tmp.path(), "s=python+haskell&fields=id").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"], json!([{"id": 13}]));
}

// ─────────────────────────────────────────────────────────────────────────────
// 5. Transport
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_request_id_header() {
    let tmp = tempdir().unwrap();
    let response = create_test_router(tmp.path())
        .oneshot(
            Request::builder()
                .uri("/relevanssi/v1/search?s=rust")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let id = response.headers().get(REQUEST_ID_HEADER).unwrap().to_str().unwrap();
    assert_eq!(id.len(), 36);
}

#[tokio::test]
async fn test_post_not_allowed() {
    let tmp = tempdir().unwrap();
    let response = create_test_router(tmp.path())
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/relevanssi/v1/search?s=rust")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
