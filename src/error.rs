/// Error types for workflow configuration, status changes and field validation
///
/// Domain failures are typed so callers can render actionable feedback.
/// Infrastructure paths (registry, workflow sources) use `anyhow` instead.

use std::collections::BTreeSet;
use thiserror::Error;

/// A workflow definition that cannot be activated.
///
/// Raised when a project's workflow is created or edited. The previously
/// active workflow (if any) stays in place.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The status list is empty
    #[error("workflow must define at least one status")]
    EmptyStatuses,

    /// A status has an empty id
    #[error("workflow status ids must not be empty")]
    EmptyStatusId,

    /// The same status id is declared twice
    #[error("duplicate workflow status id: {0}")]
    DuplicateStatus(String),

    /// No status is flagged `is_initial`
    #[error("workflow has no initial status")]
    MissingInitial,

    /// More than one status is flagged `is_initial`
    #[error("workflow has multiple initial statuses: {}", .0.join(", "))]
    MultipleInitial(Vec<String>),

    /// A transition names a status id that is not in the status list
    #[error("transition from '{from}' references unknown status '{status}'")]
    UnknownStatus { from: String, status: String },

    /// Two transition entries share the same source status
    #[error("duplicate transition entry for status '{0}'")]
    DuplicateTransition(String),

    /// The definition could not be decoded at all
    #[error("malformed workflow definition: {0}")]
    Malformed(String),
}

impl ConfigError {
    /// Stable error code for programmatic handling
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::EmptyStatuses => "EMPTY_STATUSES",
            ConfigError::EmptyStatusId => "EMPTY_STATUS_ID",
            ConfigError::DuplicateStatus(_) => "DUPLICATE_STATUS",
            ConfigError::MissingInitial => "MISSING_INITIAL",
            ConfigError::MultipleInitial(_) => "MULTIPLE_INITIAL",
            ConfigError::UnknownStatus { .. } => "UNKNOWN_STATUS",
            ConfigError::DuplicateTransition(_) => "DUPLICATE_TRANSITION",
            ConfigError::Malformed(_) => "MALFORMED",
        }
    }
}

/// A rejected status change.
///
/// Carries the legal targets from `from` so the caller can present them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot change status from '{from}' to '{to}' (allowed: {})", join_allowed(.allowed))]
pub struct TransitionError {
    pub from: String,
    pub to: String,
    pub allowed: BTreeSet<String>,
}

fn join_allowed(allowed: &BTreeSet<String>) -> String {
    if allowed.is_empty() {
        return "none".to_string();
    }
    allowed.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}

/// A single field that failed validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_codes() {
        assert_eq!(ConfigError::EmptyStatuses.code(), "EMPTY_STATUSES");
        assert_eq!(ConfigError::MissingInitial.code(), "MISSING_INITIAL");
        assert_eq!(
            ConfigError::MultipleInitial(vec!["a".into(), "b".into()]).code(),
            "MULTIPLE_INITIAL"
        );
        assert_eq!(
            ConfigError::UnknownStatus {
                from: "open".into(),
                status: "archived".into()
            }
            .code(),
            "UNKNOWN_STATUS"
        );
    }

    #[test]
    fn test_multiple_initial_message_lists_ids() {
        let err = ConfigError::MultipleInitial(vec!["open".into(), "new".into()]);
        assert_eq!(err.to_string(), "workflow has multiple initial statuses: open, new");
    }

    #[test]
    fn test_transition_error_message() {
        let err = TransitionError {
            from: "open".into(),
            to: "resolved".into(),
            allowed: ["in_progress", "closed"].iter().map(|s| s.to_string()).collect(),
        };
        assert_eq!(
            err.to_string(),
            "cannot change status from 'open' to 'resolved' (allowed: closed, in_progress)"
        );

        let dead_end = TransitionError {
            from: "closed".into(),
            to: "open".into(),
            allowed: BTreeSet::new(),
        };
        assert!(dead_end.to_string().ends_with("(allowed: none)"));
    }

    #[test]
    fn test_validation_error_message() {
        let err = ValidationError::new("key", "must be alphanumeric");
        assert_eq!(err.to_string(), "key: must be alphanumeric");
    }
}
