//! Portable template export/import documents.
//!
//! An export document is a versioned JSON envelope carrying one or more
//! templates stripped of identity, timestamps and the built-in flag. Import
//! accepts the same templates under looser, free-form metadata.

use serde::{Deserialize, Serialize};

use crate::cleanup_template::{validate_template_fields, Frequency, TemplateFieldCheck};
use crate::types::Timestamp;

/// Format version written into every export document.
pub const EXPORT_FORMAT_VERSION: &str = "1.0.0";

/// Error recorded when an import payload does not match the document shape.
pub const INVALID_FORMAT: &str = "Invalid template format";

/// Fallback for `metadata.source` / `metadata.environment` when unknown.
pub const UNKNOWN: &str = "unknown";

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// The envelope written by an export.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateExport {
    pub version: String,
    pub templates: Vec<ExportedTemplate>,
    pub metadata: ExportMetadata,
}

/// A single template inside an export document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedTemplate {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub frequency: Frequency,
    #[serde(default)]
    pub day_of_week: Option<i16>,
    #[serde(default)]
    pub day_of_month: Option<i16>,
    pub hour: i16,
    pub minute: i16,
    pub retention_days: i32,
    pub min_deployments_to_keep: i32,
    pub dry_run: bool,
    pub storage_provider: String,
    pub notify_on_success: bool,
    pub notify_on_failure: bool,
    #[serde(default)]
    pub notification_recipients: Vec<String>,
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Provenance written into an export.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMetadata {
    pub exported_at: Timestamp,
    pub source: String,
    pub environment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl TemplateExport {
    /// Wrap exported templates in a fresh envelope.
    ///
    /// `count` is only recorded for multi-template exports.
    pub fn new(
        templates: Vec<ExportedTemplate>,
        source: &str,
        environment: &str,
        exported_at: Timestamp,
        with_count: bool,
    ) -> Self {
        let count = with_count.then_some(templates.len());
        Self {
            version: EXPORT_FORMAT_VERSION.to_string(),
            templates,
            metadata: ExportMetadata {
                exported_at,
                source: source.to_string(),
                environment: environment.to_string(),
                count,
            },
        }
    }
}

/// A document accepted by import.
///
/// The templates are typed; `metadata` is free-form provenance from whatever
/// system produced the file, so only string `source`/`environment` are read.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ImportDocument {
    pub version: String,
    pub templates: Vec<ExportedTemplate>,
    #[serde(default)]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

impl ImportDocument {
    fn metadata_str(&self, key: &str) -> &str {
        self.metadata
            .as_ref()
            .and_then(|m| m.get(key))
            .and_then(serde_json::Value::as_str)
            .unwrap_or(UNKNOWN)
    }

    /// `metadata.source`, or `"unknown"`.
    pub fn source(&self) -> &str {
        self.metadata_str("source")
    }

    /// `metadata.environment`, or `"unknown"`.
    pub fn environment(&self) -> &str {
        self.metadata_str("environment")
    }
}

impl ExportedTemplate {
    pub fn field_check(&self) -> TemplateFieldCheck<'_> {
        TemplateFieldCheck {
            name: &self.name,
            day_of_week: self.day_of_week,
            day_of_month: self.day_of_month,
            hour: self.hour,
            minute: self.minute,
            retention_days: self.retention_days,
            min_deployments_to_keep: self.min_deployments_to_keep,
            storage_provider: &self.storage_provider,
        }
    }
}

// ---------------------------------------------------------------------------
// Import validation
// ---------------------------------------------------------------------------

/// Parse and validate a raw import payload.
///
/// Any shape or range error rejects the whole document; the detailed reasons
/// are returned for logging while callers surface [`INVALID_FORMAT`].
pub fn parse_import(value: serde_json::Value) -> Result<ImportDocument, Vec<String>> {
    let doc: ImportDocument = serde_json::from_value(value).map_err(|e| vec![e.to_string()])?;

    let errors: Vec<String> = doc
        .templates
        .iter()
        .enumerate()
        .flat_map(|(i, t)| {
            validate_template_fields(&t.field_check())
                .into_iter()
                .map(move |e| format!("templates[{i}].{e}"))
        })
        .collect();

    if errors.is_empty() {
        Ok(doc)
    } else {
        Err(errors)
    }
}

// ---------------------------------------------------------------------------
// Import result
// ---------------------------------------------------------------------------

/// Outcome of importing an export document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult<Id> {
    pub success: bool,
    pub imported: usize,
    pub failed: usize,
    pub new_template_ids: Vec<Id>,
    pub errors: Vec<String>,
}

impl<Id> ImportResult<Id> {
    pub fn invalid_format() -> Self {
        Self {
            success: false,
            imported: 0,
            failed: 0,
            new_template_ids: Vec::new(),
            errors: vec![INVALID_FORMAT.to_string()],
        }
    }

    pub fn record_success(&mut self, id: Id) {
        self.imported += 1;
        self.new_template_ids.push(id);
        self.success = true;
    }

    pub fn record_failure(&mut self, name: &str, reason: &str) {
        self.failed += 1;
        self.errors
            .push(format!("Failed to import template \"{name}\": {reason}"));
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample_json() -> serde_json::Value {
        json!({
            "version": "1.0.0",
            "templates": [{
                "name": "T1",
                "frequency": "DAILY",
                "hour": 1,
                "minute": 0,
                "retentionDays": 7,
                "minDeploymentsToKeep": 3,
                "dryRun": false,
                "storageProvider": "s3",
                "notifyOnSuccess": true,
                "notifyOnFailure": true,
                "tags": ["daily"]
            }],
            "metadata": { "source": "https://staging.jobs2go.app", "environment": "staging" }
        })
    }

    #[test]
    fn parses_valid_document() {
        let doc = parse_import(sample_json()).expect("valid document");
        assert_eq!(doc.templates.len(), 1);
        assert_eq!(doc.templates[0].frequency, Frequency::Daily);
        assert!(doc.templates[0].notification_recipients.is_empty());
        assert_eq!(doc.source(), "https://staging.jobs2go.app");
        assert_eq!(doc.environment(), "staging");
    }

    #[test]
    fn rejects_unknown_frequency() {
        let mut value = sample_json();
        value["templates"][0]["frequency"] = json!("HOURLY");
        assert!(parse_import(value).is_err());
    }

    #[test]
    fn rejects_out_of_range_hour_with_index() {
        let mut value = sample_json();
        value["templates"][0]["hour"] = json!(25);
        let errors = parse_import(value).unwrap_err();
        assert!(errors[0].starts_with("templates[0].hour"), "got: {errors:?}");
    }

    #[test]
    fn missing_templates_array_is_invalid() {
        assert!(parse_import(json!({ "version": "1.0.0" })).is_err());
    }

    #[test]
    fn metadata_defaults_to_unknown() {
        let mut value = sample_json();
        value.as_object_mut().unwrap().remove("metadata");
        let doc = parse_import(value).unwrap();
        assert_eq!(doc.source(), UNKNOWN);
        assert_eq!(doc.environment(), UNKNOWN);
    }

    #[test]
    fn free_form_metadata_is_accepted() {
        let mut value = sample_json();
        value["metadata"] = json!({
            "exportedAt": "2024-05-01",
            "source": "https://old.jobs2go.app",
            "count": "1",
            "environment": 42,
            "exportedBy": { "name": "ops" }
        });
        let doc = parse_import(value).expect("metadata shape does not matter");
        assert_eq!(doc.templates.len(), 1);
        assert_eq!(doc.source(), "https://old.jobs2go.app");
        assert_eq!(doc.environment(), UNKNOWN);
    }

    #[test]
    fn export_envelope_serialises_camel_case() {
        let doc = parse_import(sample_json()).unwrap();
        let export = TemplateExport::new(
            doc.templates,
            "https://jobs2go.app",
            "production",
            chrono::Utc::now(),
            true,
        );
        let value = serde_json::to_value(&export).unwrap();
        assert_eq!(value["version"], "1.0.0");
        assert_eq!(value["metadata"]["count"], 1);
        assert!(value["metadata"]["exportedAt"].is_string());
        assert_eq!(value["templates"][0]["retentionDays"], 7);
    }

    #[test]
    fn single_export_omits_count() {
        let export = TemplateExport::new(vec![], "s", "e", chrono::Utc::now(), false);
        let value = serde_json::to_value(&export).unwrap();
        assert!(value["metadata"].get("count").is_none());
    }

    #[test]
    fn import_result_bookkeeping() {
        let mut result: ImportResult<i64> = ImportResult::default();
        result.record_failure("Bad", "boom");
        assert!(!result.success);
        result.record_success(42);
        assert!(result.success);
        assert_eq!(result.imported, 1);
        assert_eq!(result.failed, 1);
        assert_eq!(result.errors, vec!["Failed to import template \"Bad\": boom"]);
    }
}
