/// Project type definitions
///
/// A project owns its issues and embeds its own configuration: the status
/// workflow, the issue types and the priority levels offered to users.

use crate::error::{ConfigError, ValidationError};
use crate::issue::{Issue, IssuePriority, IssueType};
use crate::user::{normalize_email, UserRole};
use crate::workflow::{ClosingRule, Workflow, WorkflowDefinition};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

pub const MAX_PROJECT_KEY_LEN: usize = 10;

/// A project container for issues and their workflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    /// Human-readable project name (e.g. "Payments Platform")
    pub name: String,
    pub description: Option<String>,
    /// Short uppercase key used as issue key prefix (e.g. "PAY")
    pub key: String,
    pub owner_id: Uuid,
    /// Embedded configuration, replaced wholesale by project admins
    #[serde(default)]
    pub settings: ProjectSettings,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Project {
    /// Create a project from validated input
    ///
    /// The settings' workflow must load; a project is never created with a
    /// workflow that cannot be activated.
    pub fn create(input: ProjectCreate, owner_id: Uuid, now: DateTime<Utc>) -> Result<Self, ProjectError> {
        let input = input.validate()?;
        let settings = input.settings.unwrap_or_default();
        Workflow::load(&settings.workflow, ClosingRule::default())?;

        Ok(Self {
            id: Uuid::new_v4(),
            name: input.name,
            description: input.description,
            key: input.key,
            owner_id,
            settings,
            is_public: input.is_public,
            is_archived: false,
            created_at: now,
            updated_at: None,
        })
    }

    /// Load this project's embedded workflow
    pub fn load_workflow(&self, closing_rule: ClosingRule) -> Result<Workflow, ConfigError> {
        Workflow::load(&self.settings.workflow, closing_rule)
    }

    /// Replace the workflow after validating it; the old one is kept on error
    pub fn replace_workflow(
        &mut self,
        definition: WorkflowDefinition,
        closing_rule: ClosingRule,
        now: DateTime<Utc>,
    ) -> Result<Workflow, ConfigError> {
        let workflow = Workflow::load(&definition, closing_rule)?;
        self.settings.workflow = definition;
        self.updated_at = Some(now);
        Ok(workflow)
    }

    /// Issue key for the n-th issue of this project (e.g. "PAY-42")
    pub fn issue_key(&self, number: u64) -> String {
        format!("{}-{}", self.key, number)
    }

    pub fn summary(&self) -> ProjectSummary {
        ProjectSummary {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            key: self.key.clone(),
            is_public: self.is_public,
            is_archived: self.is_archived,
        }
    }
}

/// Project reference nested inside issues and notifications
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub key: String,
    pub is_public: bool,
    pub is_archived: bool,
}

/// Per-project configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSettings {
    #[serde(default)]
    pub workflow: WorkflowDefinition,
    #[serde(default = "default_issue_types")]
    pub issue_types: Vec<IssueTypeConfig>,
    #[serde(default = "default_priorities")]
    pub priorities: Vec<PriorityConfig>,
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            workflow: WorkflowDefinition::default(),
            issue_types: default_issue_types(),
            priorities: default_priorities(),
        }
    }
}

/// Display configuration for one issue type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueTypeConfig {
    pub id: IssueType,
    pub name: String,
    pub color: String,
    pub icon: String,
}

/// Display configuration for one priority; level 1 is the most urgent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityConfig {
    pub id: IssuePriority,
    pub name: String,
    pub color: String,
    pub level: u8,
}

fn default_issue_types() -> Vec<IssueTypeConfig> {
    [
        (IssueType::Bug, "Bug", "#e74c3c", "🐛"),
        (IssueType::Feature, "Feature", "#2ecc71", "✨"),
        (IssueType::Task, "Task", "#3498db", "✅"),
        (IssueType::Improvement, "Improvement", "#9b59b6", "🔧"),
    ]
    .into_iter()
    .map(|(id, name, color, icon)| IssueTypeConfig {
        id,
        name: name.to_string(),
        color: color.to_string(),
        icon: icon.to_string(),
    })
    .collect()
}

fn default_priorities() -> Vec<PriorityConfig> {
    [
        (IssuePriority::Critical, "Critical", "#e74c3c", 1),
        (IssuePriority::High, "High", "#e67e22", 2),
        (IssuePriority::Medium, "Medium", "#f1c40f", 3),
        (IssuePriority::Low, "Low", "#2ecc71", 4),
    ]
    .into_iter()
    .map(|(id, name, color, level)| PriorityConfig {
        id,
        name: name.to_string(),
        color: color.to_string(),
        level,
    })
    .collect()
}

/// Project creation input
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectCreate {
    pub name: String,
    pub description: Option<String>,
    pub key: String,
    #[serde(default)]
    pub is_public: bool,
    pub settings: Option<ProjectSettings>,
}

impl ProjectCreate {
    pub fn validate(self) -> Result<Self, ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::new("name", "must not be empty"));
        }
        Ok(Self {
            key: normalize_project_key(&self.key)?,
            ..self
        })
    }
}

/// Project update input; `settings` replaces the whole settings object
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_public: Option<bool>,
    pub is_archived: Option<bool>,
    pub settings: Option<ProjectSettings>,
}

/// Errors raised while creating or updating a project
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProjectError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Workflow(#[from] ConfigError),
}

impl Project {
    /// Apply an update; a new workflow in `settings` is validated first and
    /// nothing changes if it fails
    pub fn apply_update(
        &mut self,
        update: ProjectUpdate,
        closing_rule: ClosingRule,
        now: DateTime<Utc>,
    ) -> Result<Option<Workflow>, ProjectError> {
        if let Some(name) = &update.name {
            if name.trim().is_empty() {
                return Err(ValidationError::new("name", "must not be empty").into());
            }
        }
        let workflow = match &update.settings {
            Some(settings) => Some(Workflow::load(&settings.workflow, closing_rule)?),
            None => None,
        };

        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = Some(description);
        }
        if let Some(is_public) = update.is_public {
            self.is_public = is_public;
        }
        if let Some(is_archived) = update.is_archived {
            self.is_archived = is_archived;
        }
        if let Some(settings) = update.settings {
            self.settings = settings;
        }
        self.updated_at = Some(now);

        Ok(workflow)
    }
}

/// Uppercase a project key after checking it is 1-10 ASCII alphanumerics
pub fn normalize_project_key(key: &str) -> Result<String, ValidationError> {
    if key.is_empty() || key.chars().count() > MAX_PROJECT_KEY_LEN {
        return Err(ValidationError::new(
            "key",
            format!("must be 1-{} characters", MAX_PROJECT_KEY_LEN),
        ));
    }
    if !key.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ValidationError::new("key", "must be alphanumeric"));
    }
    Ok(key.to_ascii_uppercase())
}

/// What a project member may do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberPermissions {
    pub can_create: bool,
    pub can_edit: bool,
    pub can_delete: bool,
    pub can_manage_members: bool,
}

impl Default for MemberPermissions {
    fn default() -> Self {
        Self {
            can_create: true,
            can_edit: true,
            can_delete: false,
            can_manage_members: false,
        }
    }
}

/// Membership of a user in a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMember {
    pub id: Uuid,
    pub project_id: Uuid,
    pub user_id: Uuid,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default)]
    pub permissions: MemberPermissions,
    pub joined_at: DateTime<Utc>,
    pub invited_by: Option<Uuid>,
}

/// Pending invitation of an email address into a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectInvitation {
    pub id: Uuid,
    pub project_id: Uuid,
    pub email: String,
    #[serde(default)]
    pub role: UserRole,
    #[serde(skip_serializing, default)]
    pub token_hash: String,
    pub invited_by: Uuid,
    pub expires_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl ProjectInvitation {
    /// Not yet accepted and not expired at `now`
    pub fn is_pending(&self, now: DateTime<Utc>) -> bool {
        self.accepted_at.is_none() && now < self.expires_at
    }
}

/// Invitation request input
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectInviteRequest {
    pub email: String,
    #[serde(default)]
    pub role: UserRole,
}

impl ProjectInviteRequest {
    pub fn validate(self) -> Result<Self, ValidationError> {
        Ok(Self {
            email: normalize_email(&self.email)?,
            ..self
        })
    }
}

/// Issue counts for a project dashboard
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectStats {
    pub total_issues: usize,
    pub open_issues: usize,
    pub closed_issues: usize,
    pub by_type: BTreeMap<String, usize>,
    pub by_priority: BTreeMap<String, usize>,
    pub by_status: BTreeMap<String, usize>,
}

impl ProjectStats {
    pub fn from_issues<'a>(issues: impl IntoIterator<Item = &'a Issue>) -> Self {
        let mut stats = Self::default();
        for issue in issues {
            stats.total_issues += 1;
            if issue.is_closed {
                stats.closed_issues += 1;
            } else {
                stats.open_issues += 1;
            }
            *stats.by_type.entry(issue.issue_type.to_string()).or_default() += 1;
            *stats.by_priority.entry(issue.priority.to_string()).or_default() += 1;
            *stats.by_status.entry(issue.status.clone()).or_default() += 1;
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::{WorkflowStatus, WorkflowTransition};
    use serde_json::json;

    fn create_input(key: &str) -> ProjectCreate {
        ProjectCreate {
            name: "Payments".into(),
            description: None,
            key: key.into(),
            is_public: false,
            settings: None,
        }
    }

    #[test]
    fn test_normalize_project_key() {
        assert_eq!(normalize_project_key("pay").unwrap(), "PAY");
        assert_eq!(normalize_project_key("Web2").unwrap(), "WEB2");
        assert!(normalize_project_key("").is_err());
        assert!(normalize_project_key("ABCDEFGHIJK").is_err());
        assert!(normalize_project_key("AB-C").is_err());
        assert!(normalize_project_key("ÄBC").is_err());
    }

    #[test]
    fn test_create_project_with_default_settings() {
        let project = Project::create(create_input("pay"), Uuid::new_v4(), Utc::now()).unwrap();
        assert_eq!(project.key, "PAY");
        assert_eq!(project.issue_key(42), "PAY-42");
        assert_eq!(project.settings.issue_types.len(), 4);
        assert_eq!(project.settings.priorities[0].level, 1);
        assert_eq!(
            project.load_workflow(ClosingRule::FinalFlag).unwrap().initial_status(),
            "open"
        );
    }

    #[test]
    fn test_create_project_rejects_broken_workflow() {
        let mut input = create_input("pay");
        let mut settings = ProjectSettings::default();
        settings.workflow.statuses[1].is_initial = true;
        input.settings = Some(settings);

        let err = Project::create(input, Uuid::new_v4(), Utc::now()).unwrap_err();
        assert!(matches!(err, ProjectError::Workflow(ConfigError::MultipleInitial(_))));
    }

    #[test]
    fn test_replace_workflow_keeps_old_on_error() {
        let mut project = Project::create(create_input("pay"), Uuid::new_v4(), Utc::now()).unwrap();
        let broken = WorkflowDefinition {
            statuses: vec![WorkflowStatus::new("new", "New", "#fff").initial()],
            transitions: vec![WorkflowTransition::new("new", ["archived"])],
        };

        assert!(project
            .replace_workflow(broken, ClosingRule::FinalFlag, Utc::now())
            .is_err());
        assert_eq!(project.settings.workflow, WorkflowDefinition::default());
        assert!(project.updated_at.is_none());
    }

    #[test]
    fn test_apply_update_validates_settings_first() {
        let mut project = Project::create(create_input("pay"), Uuid::new_v4(), Utc::now()).unwrap();
        let mut settings = ProjectSettings::default();
        settings.workflow.statuses.clear();
        let update = ProjectUpdate {
            name: Some("Renamed".into()),
            settings: Some(settings),
            ..Default::default()
        };

        let err = project.apply_update(update, ClosingRule::FinalFlag, Utc::now()).unwrap_err();
        assert_eq!(err, ProjectError::Workflow(ConfigError::EmptyStatuses));
        assert_eq!(project.name, "Payments");

        let update = ProjectUpdate {
            is_archived: Some(true),
            ..Default::default()
        };
        let workflow = project.apply_update(update, ClosingRule::FinalFlag, Utc::now()).unwrap();
        assert!(workflow.is_none());
        assert!(project.is_archived);
    }

    #[test]
    fn test_settings_decode_from_stored_json() {
        let settings: ProjectSettings = serde_json::from_value(json!({
            "workflow": {
                "statuses": [{"id": "todo", "name": "To Do", "color": "#fff", "is_initial": true}],
                "transitions": []
            }
        }))
        .unwrap();
        assert_eq!(settings.workflow.statuses[0].id, "todo");
        assert_eq!(settings.issue_types, default_issue_types());
        assert_eq!(settings.priorities[3].id, IssuePriority::Low);
    }

    #[test]
    fn test_invitation_pending() {
        let now = Utc::now();
        let mut invitation = ProjectInvitation {
            id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            email: "dev@example.com".into(),
            role: UserRole::Tester,
            token_hash: "hash".into(),
            invited_by: Uuid::new_v4(),
            expires_at: now + chrono::Duration::days(7),
            accepted_at: None,
            created_at: now,
        };
        assert!(invitation.is_pending(now));
        assert!(!invitation.is_pending(now + chrono::Duration::days(8)));

        invitation.accepted_at = Some(now);
        assert!(!invitation.is_pending(now));

        let json = serde_json::to_value(&invitation).unwrap();
        assert!(json.get("token_hash").is_none());
    }

    #[test]
    fn test_invite_request_normalizes_email() {
        let request: ProjectInviteRequest = serde_json::from_value(json!({"email": "QA@Example.com"})).unwrap();
        let request = request.validate().unwrap();
        assert_eq!(request.email, "qa@example.com");
        assert_eq!(request.role, UserRole::Developer);
    }

    #[test]
    fn test_member_permission_defaults() {
        let permissions = MemberPermissions::default();
        assert!(permissions.can_create && permissions.can_edit);
        assert!(!permissions.can_delete && !permissions.can_manage_members);
    }
}
