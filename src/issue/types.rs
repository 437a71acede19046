/// Issue type definitions
///
/// Issues reference their project's workflow only by status id. The id is
/// checked against the workflow when an issue is created or changed, never
/// as a standing constraint.

use crate::enums::string_enum;
use crate::error::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

pub const MIN_TITLE_LEN: usize = 5;
pub const MAX_TITLE_LEN: usize = 500;
pub const DEFAULT_TAG_COLOR: &str = "#3498db";

string_enum! {
    pub enum IssueType {
        Bug => "bug",
        Feature => "feature",
        Task => "task",
        Improvement => "improvement",
    }
}

impl Default for IssueType {
    fn default() -> Self {
        IssueType::Bug
    }
}

string_enum! {
    pub enum IssuePriority {
        Critical => "critical",
        High => "high",
        Medium => "medium",
        Low => "low",
    }
}

impl Default for IssuePriority {
    fn default() -> Self {
        IssuePriority::Medium
    }
}

string_enum! {
    /// Directed relation between two issues
    pub enum IssueLinkType {
        Blocks => "blocks",
        IsBlockedBy => "is_blocked_by",
        Duplicates => "duplicates",
        IsDuplicatedBy => "is_duplicated_by",
        RelatesTo => "relates_to",
        Parent => "parent",
        Child => "child",
    }
}

impl IssueLinkType {
    /// The same relation seen from the target issue
    pub fn inverse(&self) -> Self {
        match self {
            IssueLinkType::Blocks => IssueLinkType::IsBlockedBy,
            IssueLinkType::IsBlockedBy => IssueLinkType::Blocks,
            IssueLinkType::Duplicates => IssueLinkType::IsDuplicatedBy,
            IssueLinkType::IsDuplicatedBy => IssueLinkType::Duplicates,
            IssueLinkType::RelatesTo => IssueLinkType::RelatesTo,
            IssueLinkType::Parent => IssueLinkType::Child,
            IssueLinkType::Child => IssueLinkType::Parent,
        }
    }
}

/// A tracked issue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub id: Uuid,
    pub project_id: Uuid,
    /// Project-scoped key (e.g. "PAY-42")
    pub key: String,
    pub title: String,
    pub description: Option<String>,
    pub description_html: Option<String>,
    #[serde(rename = "type", default)]
    pub issue_type: IssueType,
    /// Status id within the project's workflow
    pub status: String,
    #[serde(default)]
    pub priority: IssuePriority,
    pub assignee_id: Option<Uuid>,
    pub reporter_id: Uuid,
    pub estimate_hours: Option<u32>,
    #[serde(default)]
    pub spent_hours: u32,
    pub due_date: Option<DateTime<Utc>>,
    /// Set when the issue enters a closing status, cleared when reopened
    pub closed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub custom_fields: Map<String, Value>,
    /// Derived from `status` by the workflow's closing rule
    pub is_closed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Issue reference nested inside links, comments and notifications
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueSummary {
    pub id: Uuid,
    pub key: String,
    pub title: String,
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    pub status: String,
    pub priority: IssuePriority,
    pub is_closed: bool,
}

impl Issue {
    pub fn summary(&self) -> IssueSummary {
        IssueSummary {
            id: self.id,
            key: self.key.clone(),
            title: self.title.clone(),
            issue_type: self.issue_type,
            status: self.status.clone(),
            priority: self.priority,
            is_closed: self.is_closed,
        }
    }
}

/// Issue creation input
#[derive(Debug, Clone, Deserialize)]
pub struct IssueCreate {
    pub title: String,
    pub description: Option<String>,
    #[serde(rename = "type", default)]
    pub issue_type: IssueType,
    #[serde(default)]
    pub priority: IssuePriority,
    pub assignee_id: Option<Uuid>,
    pub estimate_hours: Option<i64>,
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub custom_fields: Map<String, Value>,
}

impl IssueCreate {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            issue_type: IssueType::default(),
            priority: IssuePriority::default(),
            assignee_id: None,
            estimate_hours: None,
            due_date: None,
            tags: Vec::new(),
            custom_fields: Map::new(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_title(&self.title)?;
        if let Some(hours) = self.estimate_hours {
            hours_from("estimate_hours", hours)?;
        }
        Ok(())
    }
}

/// Partial issue update; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IssueUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub issue_type: Option<IssueType>,
    pub status: Option<String>,
    pub priority: Option<IssuePriority>,
    pub assignee_id: Option<Uuid>,
    pub estimate_hours: Option<i64>,
    pub spent_hours: Option<i64>,
    pub due_date: Option<DateTime<Utc>>,
    pub custom_fields: Option<Map<String, Value>>,
}

impl IssueUpdate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        if let Some(hours) = self.estimate_hours {
            hours_from("estimate_hours", hours)?;
        }
        if let Some(hours) = self.spent_hours {
            hours_from("spent_hours", hours)?;
        }
        Ok(())
    }
}

/// Structured listing filter
///
/// `search` and `tags` are resolved by the search collaborator; `matches`
/// evaluates only the fields an `Issue` carries itself.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IssueFilter {
    pub status: Option<Vec<String>>,
    #[serde(rename = "type")]
    pub issue_type: Option<Vec<IssueType>>,
    pub priority: Option<Vec<IssuePriority>>,
    pub assignee_id: Option<Vec<Uuid>>,
    pub reporter_id: Option<Vec<Uuid>>,
    pub tags: Option<Vec<String>>,
    pub is_closed: Option<bool>,
    pub search: Option<String>,
    pub created_after: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
    pub due_before: Option<DateTime<Utc>>,
    pub due_after: Option<DateTime<Utc>>,
}

impl IssueFilter {
    pub fn matches(&self, issue: &Issue) -> bool {
        fn one_of<T: PartialEq>(wanted: &Option<Vec<T>>, value: &T) -> bool {
            wanted.as_ref().map_or(true, |values| values.contains(value))
        }

        one_of(&self.status, &issue.status)
            && one_of(&self.issue_type, &issue.issue_type)
            && one_of(&self.priority, &issue.priority)
            && issue
                .assignee_id
                .map_or(self.assignee_id.is_none(), |id| one_of(&self.assignee_id, &id))
            && one_of(&self.reporter_id, &issue.reporter_id)
            && self.is_closed.map_or(true, |closed| issue.is_closed == closed)
            && self.created_after.map_or(true, |t| issue.created_at >= t)
            && self.created_before.map_or(true, |t| issue.created_at <= t)
            && self.due_after.map_or(true, |t| issue.due_date.is_some_and(|d| d >= t))
            && self.due_before.map_or(true, |t| issue.due_date.is_some_and(|d| d <= t))
    }
}

/// A directed link between two issues
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueLink {
    pub id: Uuid,
    pub source_issue_id: Uuid,
    pub target_issue_id: Uuid,
    pub link_type: IssueLinkType,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Link creation input, relative to a source issue
#[derive(Debug, Clone, Deserialize)]
pub struct IssueLinkCreate {
    pub target_issue_id: Uuid,
    pub link_type: IssueLinkType,
}

impl IssueLink {
    /// Create a link; an issue cannot be linked to itself
    pub fn create(
        source_issue_id: Uuid,
        input: IssueLinkCreate,
        created_by: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        if input.target_issue_id == source_issue_id {
            return Err(ValidationError::new("target_issue_id", "cannot link issue to itself"));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            source_issue_id,
            target_issue_id: input.target_issue_id,
            link_type: input.link_type,
            created_by,
            created_at: now,
        })
    }

    /// This link as seen from the target issue
    pub fn reversed(&self) -> Self {
        Self {
            source_issue_id: self.target_issue_id,
            target_issue_id: self.source_issue_id,
            link_type: self.link_type.inverse(),
            ..self.clone()
        }
    }
}

/// Project-scoped label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: Uuid,
    pub project_id: Uuid,
    pub name: String,
    #[serde(default = "default_tag_color")]
    pub color: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

fn default_tag_color() -> String {
    DEFAULT_TAG_COLOR.to_string()
}

/// One recorded field change on an issue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueHistory {
    pub id: Uuid,
    pub issue_id: Uuid,
    pub changed_by: Uuid,
    pub changed_field: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub change_data: Option<Value>,
    pub created_at: DateTime<Utc>,
}

/// Time tracking figures derived from an issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueStats {
    pub time_estimate: Option<u32>,
    pub time_spent: u32,
    /// Estimate minus spent, floored at zero
    pub time_remaining: Option<u32>,
    /// Open and past its due date
    pub overdue: bool,
    /// Whole days from creation to closing (or to `now` while open)
    pub days_open: i64,
}

impl IssueStats {
    pub fn compute(issue: &Issue, now: DateTime<Utc>) -> Self {
        let end = if issue.is_closed {
            issue.closed_at.unwrap_or(now)
        } else {
            now
        };
        Self {
            time_estimate: issue.estimate_hours,
            time_spent: issue.spent_hours,
            time_remaining: issue.estimate_hours.map(|e| e.saturating_sub(issue.spent_hours)),
            overdue: !issue.is_closed && issue.due_date.is_some_and(|due| due < now),
            days_open: (end - issue.created_at).num_days().max(0),
        }
    }
}

pub fn validate_title(title: &str) -> Result<(), ValidationError> {
    let len = title.chars().count();
    if len < MIN_TITLE_LEN {
        return Err(ValidationError::new(
            "title",
            format!("must be at least {} characters", MIN_TITLE_LEN),
        ));
    }
    if len > MAX_TITLE_LEN {
        return Err(ValidationError::new(
            "title",
            format!("must be at most {} characters", MAX_TITLE_LEN),
        ));
    }
    Ok(())
}

/// Convert a wire hour count, rejecting negatives
pub(crate) fn hours_from(field: &'static str, hours: i64) -> Result<u32, ValidationError> {
    u32::try_from(hours).map_err(|_| {
        if hours < 0 {
            ValidationError::new(field, "cannot be negative")
        } else {
            ValidationError::new(field, "is too large")
        }
    })
}
