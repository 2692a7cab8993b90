pub mod excerpt;
pub mod import;

use crate::config::{Config, SearchConfig};
use crate::query::{QueryArguments, TermField};
use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// One ranked search match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: String,
    pub date: String,
    pub modified: String,
    pub post_type: String,
    pub score: f64,
}

/// A page of matches plus totals across all pages
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResults {
    pub matches: Vec<MatchRecord>,
    pub total: i64,
    pub pages: i64,
}

/// A taxonomy term as stored, with the parent as a raw id (0 = none)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermRecord {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub taxonomy: String,
    pub parent: i64,
}

/// Executes a search for the given arguments
pub trait SearchBackend: Send + Sync {
    fn execute(&self, args: &QueryArguments) -> Result<SearchResults>;
}

/// Taxonomy and term lookups for content records
pub trait TaxonomySource: Send + Sync {
    /// Taxonomies registered for a post type
    fn object_taxonomies(&self, post_type: &str) -> Result<Vec<String>>;

    /// Terms attached to a post within one taxonomy
    fn object_terms(&self, post_id: i64, taxonomy: &str) -> Result<Vec<TermRecord>>;

    fn term(&self, term_id: i64) -> Result<Option<TermRecord>>;
}

/// Content statistics
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub post_count: usize,
    pub published_count: usize,
    pub term_count: usize,
    pub taxonomy_count: usize,
}

/// How search words are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    And,
    Or,
}

/// SQLite-backed content store with an FTS5 index
pub struct Store {
    conn: Mutex<Connection>,
    search: SearchConfig,
}

impl Store {
    /// Open the database named in the configuration
    pub fn new(config: &Config) -> Result<Self> {
        Self::open(&config.database_path, config.search.clone())
    }

    pub fn open(path: &Path, search: SearchConfig) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
            search,
        })
    }

    pub fn open_in_memory(search: SearchConfig) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
            search,
        })
    }

    fn connection(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("store connection lock poisoned"))
    }

    /// Initialize database schema
    fn init_schema(conn: &Connection) -> Result<()> {
        info!("Initializing database schema");

        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        conn.execute_batch(r#"
            -- Content records
            CREATE TABLE IF NOT EXISTS posts (
                id INTEGER PRIMARY KEY,
                post_type TEXT NOT NULL DEFAULT 'post',
                status TEXT NOT NULL DEFAULT 'publish',
                title TEXT NOT NULL,
                slug TEXT NOT NULL,
                content TEXT NOT NULL DEFAULT '',
                excerpt TEXT NOT NULL DEFAULT '',
                date TEXT NOT NULL,
                modified TEXT NOT NULL
            );
        "#)?;

        conn.execute_batch(r#"
            -- FTS5 virtual table for full-text search
            CREATE VIRTUAL TABLE IF NOT EXISTS posts_fts USING fts5(
                title, content, excerpt,
                tokenize='porter unicode61'
            );
        "#)?;

        conn.execute_batch(r#"
            -- Triggers to keep FTS index synchronized
            CREATE TRIGGER IF NOT EXISTS posts_ai AFTER INSERT ON posts BEGIN
                INSERT INTO posts_fts(rowid, title, content, excerpt)
                VALUES(new.id, new.title, new.content, new.excerpt);
            END;

            CREATE TRIGGER IF NOT EXISTS posts_ad AFTER DELETE ON posts BEGIN
                DELETE FROM posts_fts WHERE rowid = old.id;
            END;

            CREATE TRIGGER IF NOT EXISTS posts_au AFTER UPDATE ON posts BEGIN
                DELETE FROM posts_fts WHERE rowid = old.id;
                INSERT INTO posts_fts(rowid, title, content, excerpt)
                VALUES(new.id, new.title, new.content, new.excerpt);
            END;
        "#)?;

        conn.execute_batch(r#"
            -- Taxonomy terms; parent = 0 means top level
            CREATE TABLE IF NOT EXISTS terms (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                slug TEXT NOT NULL,
                taxonomy TEXT NOT NULL,
                parent INTEGER NOT NULL DEFAULT 0,
                UNIQUE(taxonomy, slug)
            );

            CREATE TABLE IF NOT EXISTS term_relationships (
                post_id INTEGER NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
                term_id INTEGER NOT NULL REFERENCES terms(id) ON DELETE CASCADE,
                PRIMARY KEY (post_id, term_id)
            );

            -- Which taxonomies apply to which post types
            CREATE TABLE IF NOT EXISTS taxonomies (
                name TEXT NOT NULL,
                post_type TEXT NOT NULL,
                PRIMARY KEY (name, post_type)
            );
        "#)?;

        conn.execute_batch(r#"
            CREATE INDEX IF NOT EXISTS idx_posts_type_status ON posts(post_type, status);
            CREATE INDEX IF NOT EXISTS idx_terms_taxonomy ON terms(taxonomy, slug);
            CREATE INDEX IF NOT EXISTS idx_term_relationships_term ON term_relationships(term_id);
        "#)?;

        Ok(())
    }

    /// Content statistics
    pub fn stats(&self) -> Result<StoreStats> {
        let conn = self.connection()?;
        let count = |sql: &str| -> Result<usize> {
            let n: i64 = conn.query_row(sql, [], |row| row.get(0))?;
            Ok(n as usize)
        };

        Ok(StoreStats {
            post_count: count("SELECT COUNT(*) FROM posts")?,
            published_count: count("SELECT COUNT(*) FROM posts WHERE status = 'publish'")?,
            term_count: count("SELECT COUNT(*) FROM terms")?,
            taxonomy_count: count("SELECT COUNT(DISTINCT name) FROM taxonomies")?,
        })
    }

    /// Resolve the page size (None = unlimited) and page number the way the
    /// host CMS does for out-of-range values
    fn normalize_paging(&self, args: &QueryArguments) -> (Option<i64>, i64) {
        let per_page = match args.posts_per_page {
            0 => Some(self.search.default_per_page.max(1)),
            -1 => None,
            n => Some(n.checked_abs().unwrap_or(i64::MAX)),
        };
        let page = match args.paged.checked_abs().unwrap_or(i64::MAX) {
            0 => 1,
            p => p,
        };
        (per_page, page)
    }

    fn search_with(
        &self,
        conn: &Connection,
        args: &QueryArguments,
        match_expr: &str,
    ) -> Result<SearchResults> {
        let mut clauses = vec!["p.status = 'publish'".to_string()];
        let mut filter_params: Vec<Value> = Vec::new();

        if !args.searches_any_type() {
            clauses.push(format!("p.post_type IN ({})", placeholders(args.post_type.len())));
            filter_params.extend(args.post_type.iter().cloned().map(Value::Text));
        }

        if let Some(filter) = &args.tax_query {
            let column = match filter.field {
                TermField::Slug => "t.slug",
            };
            let terms = filter.term_list();
            clauses.push(format!(
                "p.id IN (SELECT tr.post_id FROM term_relationships tr
                          JOIN terms t ON t.id = tr.term_id
                          WHERE t.taxonomy = ? AND {} IN ({}))",
                column,
                placeholders(terms.len())
            ));
            filter_params.push(Value::Text(filter.taxonomy.clone()));
            filter_params.extend(terms.into_iter().map(Value::Text));
        }

        let where_clause = clauses.join(" AND ");

        // Total across all pages
        let count_sql = format!(
            "SELECT COUNT(*)
             FROM (SELECT rowid AS post_id FROM posts_fts WHERE posts_fts MATCH ?) m
             JOIN posts p ON p.id = m.post_id
             WHERE {}",
            where_clause
        );
        let mut count_params = vec![Value::Text(match_expr.to_string())];
        count_params.extend(filter_params.iter().cloned());
        let total: i64 = conn.query_row(&count_sql, params_from_iter(count_params), |row| row.get(0))?;

        let (per_page, page) = self.normalize_paging(args);
        let pages = match per_page {
            _ if total == 0 => 0,
            None => 1,
            Some(n) => (total - 1) / n + 1,
        };
        let (limit, offset) = match per_page {
            Some(n) => (n, (page - 1).saturating_mul(n)),
            None => (-1, 0),
        };

        let select_sql = format!(
            "SELECT p.id, p.title, p.slug, p.content, p.excerpt, p.date, p.modified, p.post_type, m.score
             FROM (SELECT rowid AS post_id, -bm25(posts_fts, ?, ?, ?) AS score
                   FROM posts_fts WHERE posts_fts MATCH ?) m
             JOIN posts p ON p.id = m.post_id
             WHERE {}
             ORDER BY m.score DESC, p.date DESC
             LIMIT ? OFFSET ?",
            where_clause
        );
        let mut select_params = vec![
            Value::Real(self.search.title_weight),
            Value::Real(self.search.content_weight),
            Value::Real(self.search.excerpt_weight),
            Value::Text(match_expr.to_string()),
        ];
        select_params.extend(filter_params);
        select_params.push(Value::Integer(limit));
        select_params.push(Value::Integer(offset));

        let mut stmt = conn.prepare(&select_sql)?;
        let matches = stmt
            .query_map(params_from_iter(select_params), |row| {
                Ok(MatchRecord {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    slug: row.get(2)?,
                    content: row.get(3)?,
                    excerpt: row.get(4)?,
                    date: row.get(5)?,
                    modified: row.get(6)?,
                    post_type: row.get(7)?,
                    score: row.get(8)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?
            .into_iter()
            .map(|mut record| {
                if record.excerpt.trim().is_empty() {
                    record.excerpt = excerpt::generate(&record.content, self.search.excerpt_length);
                }
                record
            })
            .collect();

        Ok(SearchResults {
            matches,
            total,
            pages,
        })
    }
}

impl SearchBackend for Store {
    fn execute(&self, args: &QueryArguments) -> Result<SearchResults> {
        let term = args.search_term().unwrap_or_default();
        let words = search_words(term);
        if words.is_empty() {
            debug!("Search term {:?} has no indexable words", term);
            return Ok(SearchResults::default());
        }

        let conn = self.connection()?;

        let results = self.search_with(&conn, args, &match_expression(&words, Operator::And))?;
        if results.total > 0 || words.len() < 2 || self.search.disable_or_fallback {
            return Ok(results);
        }

        debug!("No AND matches for {:?}, retrying with OR", term);
        self.search_with(&conn, args, &match_expression(&words, Operator::Or))
    }
}

impl TaxonomySource for Store {
    fn object_taxonomies(&self, post_type: &str) -> Result<Vec<String>> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare("SELECT name FROM taxonomies WHERE post_type = ? ORDER BY name")?;
        let names = stmt
            .query_map([post_type], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(names)
    }

    fn object_terms(&self, post_id: i64, taxonomy: &str) -> Result<Vec<TermRecord>> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(
            "SELECT t.id, t.name, t.slug, t.taxonomy, t.parent
             FROM terms t
             JOIN term_relationships tr ON tr.term_id = t.id
             WHERE tr.post_id = ?1 AND t.taxonomy = ?2
             ORDER BY t.name",
        )?;
        let terms = stmt
            .query_map(rusqlite::params![post_id, taxonomy], term_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(terms)
    }

    fn term(&self, term_id: i64) -> Result<Option<TermRecord>> {
        let conn = self.connection()?;
        let term = conn
            .query_row(
                "SELECT id, name, slug, taxonomy, parent FROM terms WHERE id = ?",
                [term_id],
                term_from_row,
            )
            .optional()?;
        Ok(term)
    }
}

fn term_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<TermRecord> {
    Ok(TermRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        slug: row.get(2)?,
        taxonomy: row.get(3)?,
        parent: row.get(4)?,
    })
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

/// Split a search term into indexable words
fn search_words(term: &str) -> Vec<&str> {
    term.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .collect()
}

/// Build an FTS5 MATCH expression; every word is quoted so user input
/// can never be read as query syntax
fn match_expression(words: &[&str], operator: Operator) -> String {
    let joiner = match operator {
        Operator::And => " AND ",
        Operator::Or => " OR ",
    };
    words
        .iter()
        .map(|word| format!("\"{}\"", word))
        .collect::<Vec<_>>()
        .join(joiner)
}
