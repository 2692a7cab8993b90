#![allow(dead_code)]

use relevanssi_rest::config::Config;
use relevanssi_rest::store::import::ImportData;
use relevanssi_rest::store::Store;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Term ids in the sample data
pub const LANGUAGES: i64 = 1;
pub const SYSTEMS: i64 = 2;
pub const TUTORIALS: i64 = 3;
pub const NEWS: i64 = 4;
pub const BEGINNER: i64 = 5;

/// Sample content:
/// - posts 1-4: rust posts in "news"
/// - posts 5-12: rust posts in "systems" (child of "languages"), 5 also tagged "beginner"
/// - post 13: python post in "tutorials"
/// - post 14: page mentioning rust
/// - post 15: rust draft
pub fn sample_data() -> ImportData {
    let mut posts = Vec::new();
    for id in 1..=12 {
        let mut terms = vec![if id <= 4 { NEWS } else { SYSTEMS }];
        if id == 5 {
            terms.push(BEGINNER);
        }
        posts.push(json!({
            "id": id,
            "title": format!("Rust article {}", id),
            "content": format!("<p>Notes about rust, part {}.</p>", id),
            "date": format!("2024-01-{:02} 10:00:00", id),
            "terms": terms,
        }));
    }
    posts.push(json!({
        "id": 13,
        "title": "Python basics",
        "content": "An introduction to python",
        "excerpt": "Start here",
        "date": "2024-02-01 10:00:00",
        "terms": [TUTORIALS],
    }));
    posts.push(json!({
        "id": 14,
        "type": "page",
        "title": "About us",
        "content": "We write about rust and other languages",
        "date": "2024-02-02 10:00:00",
    }));
    posts.push(json!({
        "id": 15,
        "status": "draft",
        "title": "Unfinished rust draft",
        "content": "rust rust rust",
    }));

    serde_json::from_value(json!({
        "taxonomies": [
            {"name": "category", "object_types": ["post"]},
            {"name": "post_tag", "object_types": ["post"]},
        ],
        "terms": [
            {"id": LANGUAGES, "name": "Languages", "taxonomy": "category"},
            {"id": SYSTEMS, "name": "Systems", "taxonomy": "category", "parent": LANGUAGES},
            {"id": TUTORIALS, "name": "Tutorials", "taxonomy": "category"},
            {"id": NEWS, "name": "News", "taxonomy": "category"},
            {"id": BEGINNER, "name": "Beginner", "taxonomy": "post_tag"},
        ],
        "posts": posts,
    }))
    .unwrap()
}

/// Config with its database inside `dir`
pub fn create_test_config(dir: &Path) -> Config {
    Config {
        database_path: dir.join("content.db"),
        ..Config::default()
    }
}

/// Open the configured store and load the sample content
pub fn create_seeded_store(config: &Config) -> Arc<Store> {
    let store = Store::new(config).unwrap();
    store.import(&sample_data()).unwrap();
    Arc::new(store)
}

/// Write the sample content as an import file
pub fn write_sample_import(dir: &Path) -> PathBuf {
    let path = dir.join("import.json");
    std::fs::write(&path, serde_json::to_string_pretty(&sample_data()).unwrap()).unwrap();
    path
}
