//! Closed sets of endpoint, navigation and method names

use crate::error::{check_argument_value, Result};
use std::fmt;

/// Named top-level resource collections in the Trefle API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Kingdoms,
    Subkingdoms,
    Divisions,
    DivisionClasses,
    DivisionOrders,
    Families,
    Genus,
    Plants,
    Species,
    Distributions,
}

impl Endpoint {
    /// Every endpoint, in the order the API documents them
    pub const ALL: [Endpoint; 10] = [
        Endpoint::Kingdoms,
        Endpoint::Subkingdoms,
        Endpoint::Divisions,
        Endpoint::DivisionClasses,
        Endpoint::DivisionOrders,
        Endpoint::Families,
        Endpoint::Genus,
        Endpoint::Plants,
        Endpoint::Species,
        Endpoint::Distributions,
    ];

    /// The path segment used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Kingdoms => "kingdoms",
            Endpoint::Subkingdoms => "subkingdoms",
            Endpoint::Divisions => "divisions",
            Endpoint::DivisionClasses => "division_classes",
            Endpoint::DivisionOrders => "division_orders",
            Endpoint::Families => "families",
            Endpoint::Genus => "genus",
            Endpoint::Plants => "plants",
            Endpoint::Species => "species",
            Endpoint::Distributions => "distributions",
        }
    }

    /// Look up an endpoint by its wire name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|endpoint| endpoint.as_str() == name)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pagination relations a response can link to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Next,
    Prev,
    First,
    Last,
}

impl Relation {
    pub const ALL: [Relation; 4] = [
        Relation::Next,
        Relation::Prev,
        Relation::First,
        Relation::Last,
    ];

    /// The key used in a response's link table
    pub fn as_str(&self) -> &'static str {
        match self {
            Relation::Next => "next",
            Relation::Prev => "prev",
            Relation::First => "first",
            Relation::Last => "last",
        }
    }

    /// Look up a relation by its link-table key
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|relation| relation.as_str() == name)
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HTTP methods the API accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    #[default]
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }

    /// Resolve a method name, rejecting anything but GET and POST
    pub fn from_name(name: &str) -> Result<Self> {
        check_argument_value("method", name, &["GET", "POST"])?;
        if name == "POST" {
            Ok(Method::Post)
        } else {
            Ok(Method::Get)
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record identifier: numeric primary key or human-readable slug
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identifier {
    Id(u64),
    Slug(String),
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Id(id) => write!(f, "{}", id),
            Identifier::Slug(slug) => f.write_str(slug),
        }
    }
}

impl From<u64> for Identifier {
    fn from(id: u64) -> Self {
        Identifier::Id(id)
    }
}

impl From<&str> for Identifier {
    fn from(slug: &str) -> Self {
        Identifier::Slug(slug.to_string())
    }
}

impl From<String> for Identifier {
    fn from(slug: String) -> Self {
        Identifier::Slug(slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_from_name() {
        assert_eq!(Endpoint::from_name("species"), Some(Endpoint::Species));
        assert_eq!(
            Endpoint::from_name("division_classes"),
            Some(Endpoint::DivisionClasses)
        );
        assert_eq!(Endpoint::from_name("stuff"), None);
    }

    #[test]
    fn test_endpoint_round_trip() {
        for endpoint in Endpoint::ALL {
            assert_eq!(Endpoint::from_name(endpoint.as_str()), Some(endpoint));
        }
    }

    #[test]
    fn test_relation_from_name() {
        assert_eq!(Relation::from_name("next"), Some(Relation::Next));
        assert_eq!(Relation::from_name("previous"), None);
    }

    #[test]
    fn test_method_from_name() {
        assert_eq!(Method::from_name("GET").unwrap(), Method::Get);
        assert_eq!(Method::from_name("POST").unwrap(), Method::Post);
    }

    #[test]
    fn test_method_rejects_other_verbs() {
        let err = Method::from_name("PUT").unwrap_err();
        assert_eq!(
            format!("{}", err),
            "The parameter 'method' can only be 'GET' or 'POST'."
        );
    }

    #[test]
    fn test_identifier_display() {
        assert_eq!(Identifier::from(182512).to_string(), "182512");
        assert_eq!(
            Identifier::from("solanum-lycopersicum").to_string(),
            "solanum-lycopersicum"
        );
    }
}
