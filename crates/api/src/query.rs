//! Shared query parameter types for API handlers.
//!
//! Parameter names are camelCase on the wire, matching the JSON bodies.

use jobs2go_core::types::DbId;
use serde::Deserialize;

fn default_true() -> bool {
    true
}

/// `GET /templates?includeBuiltIn=&tags=a,b&q=`.
///
/// `q` takes precedence over `tags`; both ignore `includeBuiltIn`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateListParams {
    #[serde(default = "default_true")]
    pub include_built_in: bool,
    pub tags: Option<String>,
    pub q: Option<String>,
}

impl TemplateListParams {
    /// Comma-separated `tags`, trimmed, empties dropped.
    pub fn tag_list(&self) -> Vec<String> {
        self.tags
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// `GET /templates/{id}?includeVersions=`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDetailParams {
    #[serde(default)]
    pub include_versions: bool,
}

/// `GET /templates/export?id=`.
#[derive(Debug, Deserialize)]
pub struct ExportParams {
    pub id: Option<DbId>,
}

/// `GET /test/email?email=`.
#[derive(Debug, Deserialize)]
pub struct TestEmailParams {
    pub email: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_list_splits_and_trims() {
        let params = TemplateListParams {
            include_built_in: true,
            tags: Some("daily, ,weekly ".into()),
            q: None,
        };
        assert_eq!(params.tag_list(), vec!["daily", "weekly"]);
    }

    #[test]
    fn missing_tags_is_empty() {
        let params = TemplateListParams {
            include_built_in: true,
            tags: None,
            q: None,
        };
        assert!(params.tag_list().is_empty());
    }
}
