//! Query and filter types for search requests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::{Result, SearchError};

// ============================================================================
// Query
// ============================================================================

/// Free-text query content.
///
/// Either or both of the semantic and keyword parts may be set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Query {
    /// Query for semantically similar content.
    pub semantic_query: Option<String>,
    /// Specific keywords to match in the source document.
    pub keyword_query: Option<String>,
}

impl Query {
    /// A purely semantic query.
    pub fn semantic(text: impl Into<String>) -> Self {
        Self {
            semantic_query: Some(text.into()),
            keyword_query: None,
        }
    }

    /// A purely keyword query.
    pub fn keyword(text: impl Into<String>) -> Self {
        Self {
            semantic_query: None,
            keyword_query: Some(text.into()),
        }
    }
}

// ============================================================================
// Filters
// ============================================================================

/// Bounds on a chunk timestamp.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimeSpan {
    /// Lower bound, exclusive of nothing before it.
    pub after: Option<DateTime<Utc>>,
    /// Upper bound.
    pub before: Option<DateTime<Utc>>,
}

/// Structured search filters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Filters {
    /// Scope of the query: fetcher names or document subspaces of the
    /// form `<provider>://<tenancy>/<path>`, e.g.
    /// `confluence://acme.atlassian.net/Engineering/Onboarding Guide`.
    pub scope: Vec<String>,
    /// Bound on chunk creation time.
    pub created: Option<TimeSpan>,
    /// Bound on chunk last-modification time.
    pub modified: Option<TimeSpan>,
    /// Restrict to chunks associated with these user emails.
    pub user_emails: Vec<String>,
    /// Include content from documents in trash.
    pub include_content_in_trash: Option<bool>,
}

// ============================================================================
// SearchFilters
// ============================================================================

/// Filter input accepted at the search boundary.
///
/// Callers either hand over [`Filters`] directly or an untyped JSON
/// mapping; the mapping is normalized into the structured form exactly
/// once, before transmission. A mapping that does not fit the filter
/// schema is rejected as [`SearchError::Filters`].
#[derive(Debug, Clone)]
pub enum SearchFilters {
    /// Already-structured filters, passed through untouched.
    Structured(Filters),
    /// Untyped key-value mapping, normalized before transmission.
    Raw(serde_json::Value),
}

impl SearchFilters {
    /// Normalize into the structured form.
    pub fn normalize(self) -> Result<Filters> {
        match self {
            SearchFilters::Structured(filters) => Ok(filters),
            SearchFilters::Raw(value) => {
                serde_json::from_value(value).map_err(SearchError::Filters)
            }
        }
    }
}

impl From<Filters> for SearchFilters {
    fn from(filters: Filters) -> Self {
        SearchFilters::Structured(filters)
    }
}

impl From<serde_json::Value> for SearchFilters {
    fn from(value: serde_json::Value) -> Self {
        SearchFilters::Raw(value)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn structured_filters_pass_through() {
        let filters = Filters {
            scope: vec!["slack".to_string()],
            ..Filters::default()
        };
        let normalized = SearchFilters::from(filters.clone()).normalize().unwrap();
        assert_eq!(normalized, filters);
    }

    #[test]
    fn raw_mapping_normalizes() {
        let raw = json!({
            "scope": ["confluence", "slack"],
            "user_emails": ["person@example.com"],
            "created": { "after": "2024-03-01T00:00:00Z" },
            "include_content_in_trash": true,
        });
        let normalized = SearchFilters::from(raw).normalize().unwrap();
        assert_eq!(normalized.scope, vec!["confluence", "slack"]);
        assert_eq!(normalized.user_emails, vec!["person@example.com"]);
        assert!(normalized.created.unwrap().after.is_some());
        assert_eq!(normalized.include_content_in_trash, Some(true));
    }

    #[test]
    fn raw_mapping_with_unknown_key_is_rejected() {
        let raw = json!({ "scop": ["confluence"] });
        assert!(matches!(
            SearchFilters::from(raw).normalize(),
            Err(SearchError::Filters(_))
        ));
    }

    #[test]
    fn raw_mapping_with_wrong_type_is_rejected() {
        let raw = json!({ "scope": "confluence" });
        assert!(matches!(
            SearchFilters::from(raw).normalize(),
            Err(SearchError::Filters(_))
        ));
    }

    #[test]
    fn empty_raw_mapping_is_default_filters() {
        let normalized = SearchFilters::from(json!({})).normalize().unwrap();
        assert_eq!(normalized, Filters::default());
    }

    #[test]
    fn query_constructors() {
        let semantic = Query::semantic("onboarding guide");
        assert_eq!(semantic.semantic_query.as_deref(), Some("onboarding guide"));
        assert!(semantic.keyword_query.is_none());

        let keyword = Query::keyword("SSO runbook");
        assert!(keyword.semantic_query.is_none());
        assert_eq!(keyword.keyword_query.as_deref(), Some("SSO runbook"));
    }
}
