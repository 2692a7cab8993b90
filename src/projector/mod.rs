// Projection of search matches into client-facing objects

use crate::query::QueryParameters;
use crate::store::{MatchRecord, TaxonomySource, TermRecord};
use anyhow::Result;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Fields returned when the request does not name any
pub const DEFAULT_FIELDS: [&str; 7] = [
    "id",
    "title",
    "slug",
    "excerpt",
    "date",
    "modified",
    "taxonomies",
];

/// Derived field holding the record's terms grouped by taxonomy
pub const TAXONOMIES_FIELD: &str = "taxonomies";

/// A projected search result, keys in requested order
pub type ProjectedPost = Map<String, Value>;

type Accessor = fn(&MatchRecord) -> Value;

/// Output field name → record accessor
static FIELD_TABLE: &[(&str, Accessor)] = &[
    ("id", |r| Value::from(r.id)),
    ("title", |r| Value::from(r.title.as_str())),
    ("slug", |r| Value::from(r.slug.as_str())),
    ("content", |r| Value::from(r.content.as_str())),
    ("excerpt", |r| Value::from(r.excerpt.as_str())),
    ("date", |r| Value::from(r.date.as_str())),
    ("modified", |r| Value::from(r.modified.as_str())),
    ("type", |r| Value::from(r.post_type.as_str())),
    ("score", |r| Value::from(r.score)),
];

fn accessor(field: &str) -> Option<Accessor> {
    FIELD_TABLE
        .iter()
        .find(|(name, _)| *name == field)
        .map(|(_, get)| *get)
}

/// The field list named by the `fields` parameter, or the default set
pub fn requested_fields(params: &QueryParameters) -> Vec<String> {
    match params.truthy("fields") {
        Some(value) => value.to_list(),
        None => DEFAULT_FIELDS.iter().map(|f| f.to_string()).collect(),
    }
}

/// Parent of a taxonomy term: a raw id (0 = none) or the resolved term
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TermParent {
    Id(i64),
    Term(Box<TaxonomyTerm>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaxonomyTerm {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub taxonomy: String,
    pub parent: TermParent,
}

impl From<TermRecord> for TaxonomyTerm {
    fn from(record: TermRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            slug: record.slug,
            taxonomy: record.taxonomy,
            parent: TermParent::Id(record.parent),
        }
    }
}

/// Looks up a record's terms for every taxonomy of its post type
#[derive(Clone)]
pub struct TaxonomyResolver {
    source: Arc<dyn TaxonomySource>,
}

impl TaxonomyResolver {
    pub fn new(source: Arc<dyn TaxonomySource>) -> Self {
        Self { source }
    }

    /// Terms grouped by taxonomy name.
    ///
    /// Every registered taxonomy gets an entry, even with no terms. A term's
    /// parent is resolved one level deep: the parent's own parent stays an id.
    pub fn resolve(&self, record: &MatchRecord) -> Result<BTreeMap<String, Vec<TaxonomyTerm>>> {
        let mut grouped = BTreeMap::new();

        for taxonomy in self.source.object_taxonomies(&record.post_type)? {
            let mut terms = Vec::new();
            for term in self.source.object_terms(record.id, &taxonomy)? {
                terms.push(self.with_parent(term)?);
            }
            grouped.insert(taxonomy, terms);
        }

        Ok(grouped)
    }

    fn with_parent(&self, record: TermRecord) -> Result<TaxonomyTerm> {
        let parent_id = record.parent;
        let mut term = TaxonomyTerm::from(record);

        if parent_id != 0 {
            // A dangling parent id is left as-is
            if let Some(parent) = self.source.term(parent_id)? {
                term.parent = TermParent::Term(Box::new(TaxonomyTerm::from(parent)));
            }
        }

        Ok(term)
    }
}

/// Maps match records to the fields a request asked for
#[derive(Clone)]
pub struct ResultProjector {
    resolver: TaxonomyResolver,
}

impl ResultProjector {
    pub fn new(resolver: TaxonomyResolver) -> Self {
        Self { resolver }
    }

    pub fn project(&self, record: &MatchRecord, params: &QueryParameters) -> Result<ProjectedPost> {
        self.project_fields(record, &requested_fields(params))
    }

    pub fn project_all(
        &self,
        records: &[MatchRecord],
        params: &QueryParameters,
    ) -> Result<Vec<ProjectedPost>> {
        let fields = requested_fields(params);
        records
            .iter()
            .map(|record| self.project_fields(record, &fields))
            .collect()
    }

    /// Unknown field names are skipped
    fn project_fields(&self, record: &MatchRecord, fields: &[String]) -> Result<ProjectedPost> {
        let mut post = ProjectedPost::new();

        for field in fields {
            if field == TAXONOMIES_FIELD {
                let taxonomies = self.resolver.resolve(record)?;
                post.insert(field.clone(), serde_json::to_value(taxonomies)?);
            } else if let Some(get) = accessor(field) {
                post.insert(field.clone(), get(record));
            }
        }

        Ok(post)
    }
}
