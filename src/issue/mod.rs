/// Issues
///
/// Issue records, their input schemas and the lifecycle functions that move
/// them through a project's workflow.

pub mod types;

// Creation, status changes and partial updates
pub mod lifecycle;

pub use lifecycle::{apply_status_change, apply_update, IssueChange, IssueUpdateError};
pub use types::{
    validate_title, Issue, IssueCreate, IssueFilter, IssueHistory, IssueLink, IssueLinkCreate, IssueLinkType,
    IssuePriority, IssueStats, IssueSummary, IssueType, IssueUpdate, Tag,
};
