/// Issueflow: data layer for an issue tracker
///
/// This library provides per-project configurable workflows (status graphs with
/// validated transitions), a hot-reload workflow registry, and the domain
/// records and input validators of the tracker.

// Shared string-valued enum machinery
mod enums;

// Core configuration and setup
pub mod config;

// Typed domain errors
pub mod error;

// Tracing subscriber setup for host applications
pub mod telemetry;

// Workflow management layer - status graphs, transition checks and the registry
pub mod workflow;

// Project management layer - projects, settings, members and invitations
pub mod project;

// User accounts and credential input validation
pub mod user;

// Issues and their lifecycle through a project's workflow
pub mod issue;

// Comments and activity feed
pub mod comment;

// Attachment metadata
pub mod attachment;

// Notifications and channel preferences
pub mod notification;

// Paging for list endpoints
pub mod pagination;

// Re-export commonly used types for external consumers
pub use config::Config;
pub use error::{ConfigError, TransitionError, ValidationError};
pub use issue::{apply_status_change, apply_update, Issue, IssueUpdateError};
pub use project::Project;
pub use workflow::{
    is_closing_status, load_workflow, ClosingRule, Workflow, WorkflowDefinition, WorkflowRegistry, WorkflowSource,
};
