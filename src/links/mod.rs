// Pagination links for the search endpoint

use crate::query::{ParamValue, QueryArguments, QueryParameters};

/// Parameters carried over verbatim from the original request
const CARRIED_PARAMS: [&str; 3] = ["post_type", "category", "fields"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

/// Builds absolute URLs for adjacent result pages
#[derive(Debug, Clone)]
pub struct LinkBuilder {
    base_url: String,
}

impl LinkBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of the page next to the current one. The page number is not
    /// clamped; callers decide whether a link should exist.
    pub fn build(
        &self,
        args: &QueryArguments,
        params: &QueryParameters,
        direction: Direction,
    ) -> String {
        let page = match direction {
            Direction::Next => args.paged.saturating_add(1),
            Direction::Previous => args.paged.saturating_sub(1),
        };

        let mut pairs: Vec<(String, String)> = vec![
            ("posts_per_page".to_string(), args.posts_per_page.to_string()),
            ("s".to_string(), args.s.clone().unwrap_or_default()),
            ("paged".to_string(), page.to_string()),
        ];

        for key in CARRIED_PARAMS {
            match params.truthy(key) {
                Some(ParamValue::Single(value)) => pairs.push((key.to_string(), value.clone())),
                Some(ParamValue::List(items)) => {
                    let list_key = format!("{}[]", key);
                    pairs.extend(items.iter().map(|item| (list_key.clone(), item.clone())));
                }
                None => {}
            }
        }

        let query = pairs
            .iter()
            .map(|(key, value)| format!("{}={}", urlencoding::encode(key), urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&");

        let separator = if self.base_url.contains('?') { '&' } else { '?' };
        format!("{}{}{}", self.base_url, separator, query)
    }
}
