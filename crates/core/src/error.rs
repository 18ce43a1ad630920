use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// Not-found with a fixed, caller-facing message (e.g. "Version not found").
    #[error("{0}")]
    NotFoundMessage(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    /// Validation failure carrying one message per offending field.
    #[error("Validation failed: {}", .0.join("; "))]
    ValidationList(Vec<String>),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_list_joins_messages() {
        let err = CoreError::ValidationList(vec!["hour: out of range".into(), "name: empty".into()]);
        assert_eq!(
            err.to_string(),
            "Validation failed: hour: out of range; name: empty"
        );
    }

    #[test]
    fn not_found_message_is_verbatim() {
        let err = CoreError::NotFoundMessage("Version not found".into());
        assert_eq!(err.to_string(), "Version not found");
    }
}
