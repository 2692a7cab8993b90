// Bulk content import from JSON

use super::Store;
use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDateTime};
use log::info;
use serde::{Deserialize, Serialize};
use std::path::Path;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A taxonomy and the post types it applies to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxonomyImport {
    pub name: String,
    #[serde(default)]
    pub object_types: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermImport {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    pub taxonomy: String,
    #[serde(default)]
    pub parent: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostImport {
    pub id: i64,
    #[serde(rename = "type", default = "default_post_type")]
    pub post_type: String,
    #[serde(default = "default_status")]
    pub status: String,
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub modified: Option<String>,
    /// Ids of attached terms
    #[serde(default)]
    pub terms: Vec<i64>,
}

fn default_post_type() -> String {
    "post".to_string()
}

fn default_status() -> String {
    "publish".to_string()
}

/// Import document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportData {
    #[serde(default)]
    pub taxonomies: Vec<TaxonomyImport>,
    #[serde(default)]
    pub terms: Vec<TermImport>,
    #[serde(default)]
    pub posts: Vec<PostImport>,
}

impl ImportData {
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read import file: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid import file: {}", path.display()))
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub taxonomies: usize,
    pub terms: usize,
    pub posts: usize,
}

impl Store {
    /// Insert or update everything in `data` within one transaction
    pub fn import(&self, data: &ImportData) -> Result<ImportSummary> {
        let now = Local::now().naive_local().format(DATE_FORMAT).to_string();
        let mut summary = ImportSummary::default();

        let mut conn = self.connection()?;
        let tx = conn.transaction()?;

        for taxonomy in &data.taxonomies {
            for post_type in &taxonomy.object_types {
                tx.execute(
                    "INSERT OR IGNORE INTO taxonomies (name, post_type) VALUES (?1, ?2)",
                    rusqlite::params![taxonomy.name, post_type],
                )?;
            }
            summary.taxonomies += 1;
        }

        for term in &data.terms {
            let slug = term
                .slug
                .clone()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| sanitize_title(&term.name));
            tx.execute(
                "INSERT INTO terms (id, name, slug, taxonomy, parent) VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name, slug = excluded.slug,
                    taxonomy = excluded.taxonomy, parent = excluded.parent",
                rusqlite::params![term.id, term.name, slug, term.taxonomy, term.parent],
            )
            .with_context(|| format!("Failed to import term {}", term.id))?;
            summary.terms += 1;
        }

        for post in &data.posts {
            let slug = post
                .slug
                .clone()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| sanitize_title(&post.title));
            let date = normalize_date(post.date.as_deref(), &now)
                .with_context(|| format!("Post {} has an invalid date", post.id))?;
            let modified = normalize_date(post.modified.as_deref(), &date)
                .with_context(|| format!("Post {} has an invalid modified date", post.id))?;

            tx.execute(
                "INSERT INTO posts (id, post_type, status, title, slug, content, excerpt, date, modified)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                 ON CONFLICT(id) DO UPDATE SET
                    post_type = excluded.post_type, status = excluded.status,
                    title = excluded.title, slug = excluded.slug,
                    content = excluded.content, excerpt = excluded.excerpt,
                    date = excluded.date, modified = excluded.modified",
                rusqlite::params![
                    post.id,
                    post.post_type,
                    post.status,
                    post.title,
                    slug,
                    post.content,
                    post.excerpt,
                    date,
                    modified
                ],
            )
            .with_context(|| format!("Failed to import post {}", post.id))?;

            tx.execute("DELETE FROM term_relationships WHERE post_id = ?", [post.id])?;
            for term_id in &post.terms {
                tx.execute(
                    "INSERT OR IGNORE INTO term_relationships (post_id, term_id) VALUES (?1, ?2)",
                    [post.id, *term_id],
                )
                .with_context(|| format!("Post {} references unknown term {}", post.id, term_id))?;
            }
            summary.posts += 1;
        }

        tx.commit()?;

        info!(
            "Imported {} taxonomies, {} terms, {} posts",
            summary.taxonomies, summary.terms, summary.posts
        );
        Ok(summary)
    }
}

/// Lowercase, with every run of non-alphanumerics collapsed to `-`
pub fn sanitize_title(title: &str) -> String {
    title
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

fn normalize_date(raw: Option<&str>, fallback: &str) -> Result<String> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(fallback.to_string()),
        Some(value) => match NaiveDateTime::parse_from_str(value, DATE_FORMAT) {
            Ok(parsed) => Ok(parsed.format(DATE_FORMAT).to_string()),
            Err(_) => bail!("expected YYYY-MM-DD HH:MM:SS, got {:?}", value),
        },
    }
}
