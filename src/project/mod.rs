/// Project management module
///
/// Projects, their embedded settings (workflow, issue types, priorities),
/// memberships and invitations.

pub mod types;

pub use types::{
    normalize_project_key, IssueTypeConfig, MemberPermissions, PriorityConfig, Project, ProjectCreate, ProjectError,
    ProjectInvitation, ProjectInviteRequest, ProjectMember, ProjectSettings, ProjectStats, ProjectSummary,
    ProjectUpdate,
};
