//! Cleanup schedule validation.
//!
//! Schedules are inert configuration records; nothing in this service runs
//! them, so validation only checks shape (cron has five fields, channels are
//! known), not that the cron expression is satisfiable.

/// Notification channel names accepted on a schedule.
pub const CHANNEL_EMAIL: &str = "email";
pub const CHANNEL_SLACK: &str = "slack";
pub const VALID_CHANNELS: &[&str] = &[CHANNEL_EMAIL, CHANNEL_SLACK];

/// Minimum schedule name length.
pub const MIN_NAME_LEN: usize = 3;

/// Minimum cron expression length (`* * * * *`).
pub const MIN_CRON_LEN: usize = 9;

/// Creator recorded when the session carries no email.
pub const SYSTEM_CREATOR: &str = "system";

/// Borrowed view of the schedule fields that carry constraints.
#[derive(Debug, Clone, Copy)]
pub struct ScheduleFieldCheck<'a> {
    pub name: &'a str,
    pub retention_days: i32,
    pub min_versions_to_keep: i32,
    pub cron_schedule: &'a str,
    pub notification_channels: &'a [String],
}

/// Validate schedule fields, returning one message per violation.
pub fn validate_schedule_fields(fields: &ScheduleFieldCheck<'_>) -> Vec<String> {
    let mut errors = Vec::new();

    if fields.name.chars().count() < MIN_NAME_LEN {
        errors.push(format!("name: must be at least {MIN_NAME_LEN} characters"));
    }
    if fields.retention_days < 1 {
        errors.push("retentionDays: must be at least 1".to_string());
    }
    if fields.min_versions_to_keep < 1 {
        errors.push("minVersionsToKeep: must be at least 1".to_string());
    }
    errors.extend(validate_cron_shape(fields.cron_schedule));
    for channel in fields.notification_channels {
        if !VALID_CHANNELS.contains(&channel.as_str()) {
            errors.push(format!(
                "notificationChannels: '{channel}' is not one of {VALID_CHANNELS:?}"
            ));
        }
    }

    errors
}

/// Check that a cron expression has the standard five fields.
fn validate_cron_shape(cron: &str) -> Option<String> {
    if cron.len() < MIN_CRON_LEN {
        return Some(format!(
            "cronSchedule: must be at least {MIN_CRON_LEN} characters"
        ));
    }
    let fields = cron.split_whitespace().count();
    if fields != 5 {
        return Some(format!("cronSchedule: expected 5 fields, found {fields}"));
    }
    None
}
