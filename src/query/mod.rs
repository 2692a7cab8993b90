// Request parameters and search query arguments

use serde::Serialize;
use std::collections::HashMap;

pub const DEFAULT_POSTS_PER_PAGE: i64 = 10;
pub const DEFAULT_PAGED: i64 = 1;
pub const DEFAULT_POST_TYPE: &str = "any";
pub const DEFAULT_TAXONOMY: &str = "category";

/// A raw request parameter value: a plain string or a `key[]=` list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Single(String),
    List(Vec<String>),
}

impl ParamValue {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Single(value) => value.is_empty(),
            Self::List(items) => items.is_empty(),
        }
    }

    /// Parse into a list of strings.
    /// Strings are split on commas; list input is taken as-is.
    pub fn to_list(&self) -> Vec<String> {
        match self {
            Self::Single(value) => value
                .split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(String::from)
                .collect(),
            Self::List(items) => items.clone(),
        }
    }

    /// Parse into an integer using leading-integer semantics.
    /// Input with no leading digits yields 0.
    pub fn to_int(&self) -> i64 {
        match self {
            Self::Single(value) => leading_int(value),
            Self::List(items) => items.first().map(|v| leading_int(v)).unwrap_or(0),
        }
    }

    /// Flatten into a single string
    pub fn to_text(&self) -> String {
        match self {
            Self::Single(value) => value.clone(),
            Self::List(items) => items.join(" "),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Single(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Single(value)
    }
}

impl From<Vec<&str>> for ParamValue {
    fn from(items: Vec<&str>) -> Self {
        Self::List(items.into_iter().map(String::from).collect())
    }
}

fn leading_int(raw: &str) -> i64 {
    let trimmed = raw.trim_start();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return 0;
    }
    // Saturate instead of failing on absurdly long numbers
    digits[..end].parse::<i64>().unwrap_or(i64::MAX) * sign
}

/// Whether a parameter was supplied, and whether it carries a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamState<'a> {
    Absent,
    Empty,
    Present(&'a ParamValue),
}

/// Decoded request parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParameters {
    values: HashMap<String, ParamValue>,
}

impl QueryParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from decoded key/value pairs.
    ///
    /// A plain key keeps its last value. `key[]=v` and `key[n]=v` pairs
    /// accumulate into a list under `key`.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut values: HashMap<String, ParamValue> = HashMap::new();

        for (key, value) in pairs {
            let key = key.into();
            let value = value.into();

            match list_key(&key) {
                Some(name) => match values.get_mut(name) {
                    Some(ParamValue::List(items)) => items.push(value),
                    _ => {
                        values.insert(name.to_string(), ParamValue::List(vec![value]));
                    }
                },
                None => {
                    values.insert(key, ParamValue::Single(value));
                }
            }
        }

        Self { values }
    }

    /// Decode a raw `application/x-www-form-urlencoded` query string
    pub fn parse(query: &str) -> Self {
        Self::from_pairs(form_urlencoded::parse(query.as_bytes()))
    }

    /// Return a copy with `key` set to `value`
    pub fn with(mut self, key: &str, value: impl Into<ParamValue>) -> Self {
        self.values.insert(key.to_string(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.values.get(key)
    }

    pub fn state(&self, key: &str) -> ParamState<'_> {
        match self.values.get(key) {
            None => ParamState::Absent,
            Some(value) if value.is_empty() => ParamState::Empty,
            Some(value) => ParamState::Present(value),
        }
    }

    /// The value of `key` if it was supplied with a non-empty value
    pub fn truthy(&self, key: &str) -> Option<&ParamValue> {
        match self.state(key) {
            ParamState::Present(value) => Some(value),
            ParamState::Absent | ParamState::Empty => None,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn list_key(key: &str) -> Option<&str> {
    if !key.ends_with(']') {
        return None;
    }
    let open = key.find('[')?;
    if open == 0 {
        return None;
    }
    Some(&key[..open])
}

/// Term field the taxonomy filter matches on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TermField {
    Slug,
}

impl TermField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Slug => "slug",
        }
    }
}

/// Restrict matches to posts carrying the given terms
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxonomyFilter {
    pub taxonomy: String,
    pub field: TermField,
    /// The `category` parameter exactly as supplied
    pub terms: ParamValue,
}

impl TaxonomyFilter {
    pub fn term_list(&self) -> Vec<String> {
        match &self.terms {
            ParamValue::Single(term) => vec![term.clone()],
            ParamValue::List(terms) => terms.clone(),
        }
    }
}

/// Typed arguments handed to the search backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryArguments {
    pub posts_per_page: i64,
    pub paged: i64,
    pub post_type: Vec<String>,
    pub s: Option<String>,
    pub tax_query: Option<TaxonomyFilter>,
}

impl QueryArguments {
    /// The search term, if one was given
    pub fn search_term(&self) -> Option<&str> {
        self.s.as_deref().filter(|s| !s.is_empty())
    }

    pub fn searches_any_type(&self) -> bool {
        self.post_type.is_empty() || self.post_type.iter().any(|t| t == DEFAULT_POST_TYPE)
    }
}

impl Default for QueryArguments {
    fn default() -> Self {
        Self {
            posts_per_page: DEFAULT_POSTS_PER_PAGE,
            paged: DEFAULT_PAGED,
            post_type: vec![DEFAULT_POST_TYPE.to_string()],
            s: None,
            tax_query: None,
        }
    }
}

/// Turns request parameters into query arguments.
///
/// Absent or empty parameters fall back to defaults; building never fails.
#[derive(Debug, Clone)]
pub struct ArgumentBuilder {
    default_posts_per_page: i64,
}

impl ArgumentBuilder {
    pub fn new(default_posts_per_page: i64) -> Self {
        Self {
            default_posts_per_page,
        }
    }

    pub fn build(&self, params: &QueryParameters) -> QueryArguments {
        let mut args = QueryArguments {
            posts_per_page: self.default_posts_per_page,
            ..QueryArguments::default()
        };

        if let Some(value) = params.truthy("posts_per_page") {
            args.posts_per_page = value.to_int();
        }
        if let Some(value) = params.truthy("paged") {
            args.paged = value.to_int();
        }
        if let Some(value) = params.truthy("post_type") {
            args.post_type = value.to_list();
        }
        if let Some(value) = params.truthy("s") {
            args.s = Some(value.to_text());
        }

        if let Some(category) = params.truthy("category") {
            let taxonomy = params
                .truthy("taxonomy")
                .map(ParamValue::to_text)
                .unwrap_or_else(|| DEFAULT_TAXONOMY.to_string());

            args.tax_query = Some(TaxonomyFilter {
                taxonomy,
                field: TermField::Slug,
                terms: category.clone(),
            });
        }

        args
    }
}

impl Default for ArgumentBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_POSTS_PER_PAGE)
    }
}
