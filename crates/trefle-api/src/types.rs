//! Request and response value types

use crate::endpoint::{Method, Relation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Query-string parameters, ordered so the encoded form is deterministic
pub(crate) type Query = BTreeMap<String, String>;

/// Parameters for one request; built fresh per call, never stored
#[derive(Debug, Clone)]
pub(crate) struct RequestParams {
    pub url: String,
    pub query: Query,
    pub method: Method,
    pub body: Option<Value>,
}

/// One successfully fetched response page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// Fully parametrized request URL; the cache identity key
    pub url: String,
    /// Decoded JSON body
    pub body: Value,
    /// Pagination links found in the body, keyed by relation name
    pub links: BTreeMap<String, String>,
}

impl Page {
    /// Build a page from a fetched URL and decoded body, pulling the
    /// link table out of the body's `links` object when present
    pub(crate) fn new(url: String, body: Value) -> Self {
        let links = body
            .get("links")
            .and_then(Value::as_object)
            .map(|links| {
                links
                    .iter()
                    .filter_map(|(relation, target)| {
                        target.as_str().map(|url| (relation.clone(), url.to_string()))
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self { url, body, links }
    }

    /// Target URL for a navigation relation, if the page carries one
    pub fn link(&self, relation: Relation) -> Option<&str> {
        self.links.get(relation.as_str()).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_page_extracts_links() {
        let body = json!({
            "data": [],
            "links": {
                "self": "/api/v1/species?page=2",
                "next": "/api/v1/species?page=3",
                "prev": "/api/v1/species?page=1"
            }
        });
        let page = Page::new("https://trefle.io/api/v1/species?page=2".to_string(), body);
        assert_eq!(page.link(Relation::Next), Some("/api/v1/species?page=3"));
        assert_eq!(page.link(Relation::Prev), Some("/api/v1/species?page=1"));
        assert_eq!(page.link(Relation::Last), None);
    }

    #[test]
    fn test_page_without_links() {
        let page = Page::new(
            "https://trefle.io/api/v1/kingdoms/1".to_string(),
            json!({"data": {"id": 1}}),
        );
        assert!(page.links.is_empty());
        assert_eq!(page.link(Relation::Next), None);
    }

    #[test]
    fn test_page_ignores_non_string_links() {
        let body = json!({"links": {"next": 2, "last": "/api/v1/species?page=9"}});
        let page = Page::new("https://trefle.io/api/v1/species".to_string(), body);
        assert_eq!(page.link(Relation::Next), None);
        assert_eq!(page.link(Relation::Last), Some("/api/v1/species?page=9"));
    }
}
