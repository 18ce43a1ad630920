//! Source-map cleanup template rules.
//!
//! Constants and pure validation helpers shared by the template repository,
//! the template service and the import path.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Frequency
// ---------------------------------------------------------------------------

/// How often a template's cleanup is meant to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    /// Value stored in the `frequency` column.
    pub fn as_str(self) -> &'static str {
        match self {
            Frequency::Daily => "DAILY",
            Frequency::Weekly => "WEEKLY",
            Frequency::Monthly => "MONTHLY",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DAILY" => Ok(Frequency::Daily),
            "WEEKLY" => Ok(Frequency::Weekly),
            "MONTHLY" => Ok(Frequency::Monthly),
            other => Err(format!("Unknown frequency: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Fixed messages
// ---------------------------------------------------------------------------

pub const INITIAL_VERSION_DESCRIPTION: &str = "Initial version";
pub const DEFAULT_UPDATE_DESCRIPTION: &str = "Updated template";

pub const CANNOT_UPDATE_BUILT_IN: &str = "Cannot update built-in template";
pub const CANNOT_DELETE_BUILT_IN: &str = "Cannot delete built-in template";
pub const CANNOT_RESTORE_BUILT_IN: &str = "Cannot restore version for built-in template";
pub const TEMPLATE_NOT_FOUND: &str = "Template not found";
pub const VERSION_NOT_FOUND: &str = "Version not found";

/// Tag appended to every template created through the admin API.
pub const CUSTOM_TAG: &str = "custom";

/// Change description recorded when an old version is restored.
pub fn restored_description(version_number: i32) -> String {
    format!("Restored from version {version_number}")
}

/// Name given to a duplicated template.
pub fn copy_name(name: &str) -> String {
    format!("Copy of {name}")
}

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

/// Trim, drop empties and de-duplicate tags, keeping a stable order.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let set: BTreeSet<String> = tags
        .into_iter()
        .map(|t| t.as_ref().trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    set.into_iter().collect()
}

/// Normalise tags and make sure the `custom` tag is present.
pub fn with_custom_tag(tags: Vec<String>) -> Vec<String> {
    let mut tags = normalize_tags(tags);
    if !tags.iter().any(|t| t == CUSTOM_TAG) {
        tags.push(CUSTOM_TAG.to_string());
        tags.sort();
    }
    tags
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Borrowed view of the template fields that carry range constraints.
#[derive(Debug, Clone, Copy)]
pub struct TemplateFieldCheck<'a> {
    pub name: &'a str,
    pub day_of_week: Option<i16>,
    pub day_of_month: Option<i16>,
    pub hour: i16,
    pub minute: i16,
    pub retention_days: i32,
    pub min_deployments_to_keep: i32,
    pub storage_provider: &'a str,
}

/// Validate a full set of template fields.
///
/// Returns one message per violated constraint; an empty vector means the
/// fields are valid.
pub fn validate_template_fields(fields: &TemplateFieldCheck<'_>) -> Vec<String> {
    let mut errors = Vec::new();

    if fields.name.trim().is_empty() {
        errors.push("name: must not be empty".to_string());
    }
    if let Some(dow) = fields.day_of_week {
        if !(0..=6).contains(&dow) {
            errors.push(format!("dayOfWeek: {dow} is outside 0..=6"));
        }
    }
    if let Some(dom) = fields.day_of_month {
        if !(1..=31).contains(&dom) {
            errors.push(format!("dayOfMonth: {dom} is outside 1..=31"));
        }
    }
    if !(0..=23).contains(&fields.hour) {
        errors.push(format!("hour: {} is outside 0..=23", fields.hour));
    }
    if !(0..=59).contains(&fields.minute) {
        errors.push(format!("minute: {} is outside 0..=59", fields.minute));
    }
    if fields.retention_days < 1 {
        errors.push("retentionDays: must be at least 1".to_string());
    }
    if fields.min_deployments_to_keep < 1 {
        errors.push("minDeploymentsToKeep: must be at least 1".to_string());
    }
    if fields.storage_provider.trim().is_empty() {
        errors.push("storageProvider: must not be empty".to_string());
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> TemplateFieldCheck<'static> {
        TemplateFieldCheck {
            name: "T1",
            day_of_week: None,
            day_of_month: None,
            hour: 1,
            minute: 0,
            retention_days: 7,
            min_deployments_to_keep: 3,
            storage_provider: "s3",
        }
    }

    #[test]
    fn valid_fields_produce_no_errors() {
        assert!(validate_template_fields(&valid()).is_empty());
    }

    #[test]
    fn out_of_range_values_are_all_reported() {
        let fields = TemplateFieldCheck {
            day_of_week: Some(7),
            day_of_month: Some(0),
            hour: 24,
            minute: 60,
            retention_days: 0,
            min_deployments_to_keep: 0,
            ..valid()
        };
        let errors = validate_template_fields(&fields);
        assert_eq!(errors.len(), 6, "got: {errors:?}");
        assert!(errors.iter().any(|e| e.starts_with("hour:")));
        assert!(errors.iter().any(|e| e.starts_with("dayOfWeek:")));
    }

    #[test]
    fn blank_name_and_provider_rejected() {
        let fields = TemplateFieldCheck {
            name: "  ",
            storage_provider: "",
            ..valid()
        };
        assert_eq!(validate_template_fields(&fields).len(), 2);
    }

    #[test]
    fn frequency_parses_uppercase_only() {
        assert_eq!("WEEKLY".parse::<Frequency>(), Ok(Frequency::Weekly));
        assert!("weekly".parse::<Frequency>().is_err());
        assert_eq!(
            serde_json::to_string(&Frequency::Monthly).unwrap(),
            "\"MONTHLY\""
        );
    }

    #[test]
    fn tags_are_trimmed_and_deduplicated() {
        let tags = normalize_tags(["daily", " daily ", "", "balanced"]);
        assert_eq!(tags, vec!["balanced", "daily"]);
    }

    #[test]
    fn custom_tag_added_once() {
        let tags = with_custom_tag(vec!["daily".into()]);
        assert_eq!(tags, vec!["custom", "daily"]);
        let again = with_custom_tag(tags.clone());
        assert_eq!(again, tags);
    }

    #[test]
    fn fixed_message_helpers() {
        assert_eq!(restored_description(1), "Restored from version 1");
        assert_eq!(copy_name("Nightly"), "Copy of Nightly");
    }
}
