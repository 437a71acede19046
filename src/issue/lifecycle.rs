/// Issue lifecycle
///
/// Pure functions used by the issue-mutation path. Each one takes the current
/// issue and the project's loaded workflow and returns a new issue plus the
/// history records to persist. The input issue is never mutated, so a rejected
/// change leaves nothing to roll back.

use crate::error::{TransitionError, ValidationError};
use crate::issue::types::{hours_from, Issue, IssueCreate, IssueHistory, IssueUpdate};
use crate::workflow::Workflow;
use chrono::{DateTime, Utc};
use serde_json::json;
use uuid::Uuid;

/// Why an issue update was rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IssueUpdateError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Transition(#[from] TransitionError),
}

/// An accepted change: the new issue state and what changed
#[derive(Debug, Clone, PartialEq)]
pub struct IssueChange {
    pub issue: Issue,
    pub history: Vec<IssueHistory>,
}

impl IssueChange {
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}

impl Issue {
    /// Build a new issue in the workflow's initial status
    pub fn create(
        project_id: Uuid,
        key: String,
        workflow: &Workflow,
        reporter_id: Uuid,
        input: IssueCreate,
        now: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        input.validate()?;
        let estimate_hours = input
            .estimate_hours
            .map(|h| hours_from("estimate_hours", h))
            .transpose()?;

        let status = workflow.initial_status().to_string();
        let is_closed = workflow.is_closing_status(&status);

        Ok(Self {
            id: Uuid::new_v4(),
            project_id,
            key,
            title: input.title,
            description: input.description,
            description_html: None,
            issue_type: input.issue_type,
            status,
            priority: input.priority,
            assignee_id: input.assignee_id,
            reporter_id,
            estimate_hours,
            spent_hours: 0,
            due_date: input.due_date,
            closed_at: if is_closed { Some(now) } else { None },
            custom_fields: input.custom_fields,
            is_closed,
            created_at: now,
            updated_at: None,
        })
    }
}

/// Move an issue to `to_status` if the workflow allows it
///
/// `is_closed` is recomputed from the new status. `closed_at` is stamped when
/// the issue enters a closing status from an open one and cleared when it
/// leaves the closing statuses.
pub fn apply_status_change(
    issue: &Issue,
    workflow: &Workflow,
    to_status: &str,
    changed_by: Uuid,
    now: DateTime<Utc>,
) -> Result<IssueChange, TransitionError> {
    workflow.validate_status_change(&issue.status, to_status)?;

    let mut next = issue.clone();
    let history = change_status(&mut next, workflow, to_status, changed_by, now);
    next.updated_at = Some(now);

    Ok(IssueChange {
        issue: next,
        history: vec![history],
    })
}

/// Apply a partial update
///
/// Fields are validated first, then a status change (if the requested status
/// differs from the current one) is checked against the workflow. One history
/// record is produced per field whose value actually changed.
pub fn apply_update(
    issue: &Issue,
    workflow: &Workflow,
    update: IssueUpdate,
    changed_by: Uuid,
    now: DateTime<Utc>,
) -> Result<IssueChange, IssueUpdateError> {
    update.validate()?;

    let status_change = update.status.as_deref().filter(|to| *to != issue.status);
    if let Some(to_status) = status_change {
        workflow.validate_status_change(&issue.status, to_status)?;
    }

    let mut next = issue.clone();
    let mut history = Vec::new();
    let mut record = |field: &str, old: Option<String>, new: Option<String>| {
        if old != new {
            history.push(history_entry(issue.id, changed_by, field, old, new, None, now));
        }
    };

    if let Some(title) = update.title {
        record("title", Some(next.title.clone()), Some(title.clone()));
        next.title = title;
    }
    if let Some(description) = update.description {
        record("description", next.description.clone(), Some(description.clone()));
        next.description = Some(description);
    }
    if let Some(issue_type) = update.issue_type {
        record("type", Some(next.issue_type.to_string()), Some(issue_type.to_string()));
        next.issue_type = issue_type;
    }
    if let Some(priority) = update.priority {
        record("priority", Some(next.priority.to_string()), Some(priority.to_string()));
        next.priority = priority;
    }
    if let Some(assignee_id) = update.assignee_id {
        record(
            "assignee_id",
            next.assignee_id.map(|id| id.to_string()),
            Some(assignee_id.to_string()),
        );
        next.assignee_id = Some(assignee_id);
    }
    if let Some(hours) = update.estimate_hours {
        let hours = hours_from("estimate_hours", hours)?;
        record(
            "estimate_hours",
            next.estimate_hours.map(|h| h.to_string()),
            Some(hours.to_string()),
        );
        next.estimate_hours = Some(hours);
    }
    if let Some(hours) = update.spent_hours {
        let hours = hours_from("spent_hours", hours)?;
        record("spent_hours", Some(next.spent_hours.to_string()), Some(hours.to_string()));
        next.spent_hours = hours;
    }
    if let Some(due_date) = update.due_date {
        record(
            "due_date",
            next.due_date.map(|d| d.to_rfc3339()),
            Some(due_date.to_rfc3339()),
        );
        next.due_date = Some(due_date);
    }
    if let Some(custom_fields) = update.custom_fields {
        let old = serde_json::Value::Object(next.custom_fields.clone()).to_string();
        let new = serde_json::Value::Object(custom_fields.clone()).to_string();
        record("custom_fields", Some(old), Some(new));
        next.custom_fields = custom_fields;
    }

    if let Some(to_status) = status_change {
        history.push(change_status(&mut next, workflow, to_status, changed_by, now));
    }

    if !history.is_empty() {
        next.updated_at = Some(now);
    }

    Ok(IssueChange { issue: next, history })
}

/// Set status, derived closed state and `closed_at`; returns the history entry
fn change_status(
    issue: &mut Issue,
    workflow: &Workflow,
    to_status: &str,
    changed_by: Uuid,
    now: DateTime<Utc>,
) -> IssueHistory {
    let from_status = std::mem::replace(&mut issue.status, to_status.to_string());
    let was_closed = issue.is_closed;
    issue.is_closed = workflow.is_closing_status(to_status);

    match (was_closed, issue.is_closed) {
        (false, true) => issue.closed_at = Some(now),
        (true, true) => issue.closed_at = issue.closed_at.or(Some(now)),
        (_, false) => issue.closed_at = None,
    }

    tracing::debug!(
        "Issue {} status {} -> {} (closed: {})",
        issue.key,
        from_status,
        to_status,
        issue.is_closed
    );

    history_entry(
        issue.id,
        changed_by,
        "status",
        Some(from_status.clone()),
        Some(to_status.to_string()),
        Some(json!({
            "from": from_status,
            "to": to_status,
            "is_closed": issue.is_closed,
        })),
        now,
    )
}

fn history_entry(
    issue_id: Uuid,
    changed_by: Uuid,
    field: &str,
    old_value: Option<String>,
    new_value: Option<String>,
    change_data: Option<serde_json::Value>,
    now: DateTime<Utc>,
) -> IssueHistory {
    IssueHistory {
        id: Uuid::new_v4(),
        issue_id,
        changed_by,
        changed_field: field.to_string(),
        old_value,
        new_value,
        change_data,
        created_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::IssuePriority;
    use crate::workflow::{load_workflow, ClosingRule, WorkflowDefinition, WorkflowTransition};
    use chrono::Duration;
    use std::collections::BTreeSet;

    fn workflow() -> Workflow {
        load_workflow(&WorkflowDefinition::default()).unwrap()
    }

    fn literal_workflow() -> Workflow {
        Workflow::load(&WorkflowDefinition::default(), ClosingRule::LiteralNames).unwrap()
    }

    fn new_issue(workflow: &Workflow) -> Issue {
        Issue::create(
            Uuid::new_v4(),
            "PAY-1".into(),
            workflow,
            Uuid::new_v4(),
            IssueCreate::new("Refunds are not applied"),
            Utc::now(),
        )
        .unwrap()
    }

    fn walk(issue: &Issue, workflow: &Workflow, path: &[&str]) -> Issue {
        let mut current = issue.clone();
        for status in path {
            current = apply_status_change(&current, workflow, status, Uuid::new_v4(), Utc::now())
                .unwrap()
                .issue;
        }
        current
    }

    #[test]
    fn test_create_starts_in_initial_status() {
        let workflow = workflow();
        let issue = new_issue(&workflow);
        assert_eq!(issue.status, "open");
        assert!(!issue.is_closed);
        assert!(issue.closed_at.is_none());
        assert_eq!(issue.spent_hours, 0);
    }

    #[test]
    fn test_create_rejects_invalid_input() {
        let err = Issue::create(
            Uuid::new_v4(),
            "PAY-2".into(),
            &workflow(),
            Uuid::new_v4(),
            IssueCreate::new("Bug"),
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(err.field, "title");
    }

    #[test]
    fn test_status_change_does_not_mutate_input() {
        let workflow = workflow();
        let issue = new_issue(&workflow);
        let change = apply_status_change(&issue, &workflow, "in_progress", Uuid::new_v4(), Utc::now()).unwrap();

        assert_eq!(issue.status, "open");
        assert_eq!(change.issue.status, "in_progress");
        assert_eq!(change.history.len(), 1);
        assert_eq!(change.history[0].changed_field, "status");
        assert_eq!(change.history[0].old_value.as_deref(), Some("open"));
        assert_eq!(change.history[0].new_value.as_deref(), Some("in_progress"));
    }

    #[test]
    fn test_illegal_status_change_reports_allowed() {
        let workflow = workflow();
        let issue = new_issue(&workflow);
        let err = apply_status_change(&issue, &workflow, "resolved", Uuid::new_v4(), Utc::now()).unwrap_err();
        let expected: BTreeSet<String> = ["in_progress", "closed"].iter().map(|s| s.to_string()).collect();
        assert_eq!(err.allowed, expected);
    }

    #[test]
    fn test_closing_sets_and_reopening_clears_closed_at() {
        let mut def = WorkflowDefinition::default();
        def.transitions.push(WorkflowTransition::new("closed", ["open"]));
        let workflow = load_workflow(&def).unwrap();

        let closed = walk(&new_issue(&workflow), &workflow, &["closed"]);
        assert!(closed.is_closed);
        assert!(closed.closed_at.is_some());

        let reopened = walk(&closed, &workflow, &["open"]);
        assert!(!reopened.is_closed);
        assert!(reopened.closed_at.is_none());
    }

    #[test]
    fn test_closed_at_kept_between_closing_statuses() {
        let workflow = literal_workflow();
        let resolved = walk(&new_issue(&workflow), &workflow, &["in_progress", "in_review", "resolved"]);
        assert!(resolved.is_closed);
        let first_closed = resolved.closed_at.unwrap();

        let later = first_closed + Duration::hours(2);
        let closed = apply_status_change(&resolved, &workflow, "closed", Uuid::new_v4(), later)
            .unwrap()
            .issue;
        assert!(closed.is_closed);
        assert_eq!(closed.closed_at, Some(first_closed));
    }

    #[test]
    fn test_resolved_is_open_under_final_flag_rule() {
        let workflow = workflow();
        let resolved = walk(&new_issue(&workflow), &workflow, &["in_progress", "in_review", "resolved"]);
        assert!(!resolved.is_closed);
        assert!(resolved.closed_at.is_none());
    }

    #[test]
    fn test_update_records_changed_fields_only() {
        let workflow = workflow();
        let issue = new_issue(&workflow);
        let update = IssueUpdate {
            title: Some(issue.title.clone()),
            priority: Some(IssuePriority::Critical),
            spent_hours: Some(2),
            ..Default::default()
        };

        let change = apply_update(&issue, &workflow, update, Uuid::new_v4(), Utc::now()).unwrap();
        let fields: Vec<&str> = change.history.iter().map(|h| h.changed_field.as_str()).collect();
        assert_eq!(fields, ["priority", "spent_hours"]);
        assert_eq!(change.issue.priority, IssuePriority::Critical);
        assert_eq!(change.issue.spent_hours, 2);
        assert!(change.issue.updated_at.is_some());
    }

    #[test]
    fn test_update_with_status_validates_transition() {
        let workflow = workflow();
        let issue = new_issue(&workflow);
        let update = IssueUpdate {
            priority: Some(IssuePriority::Low),
            status: Some("in_review".into()),
            ..Default::default()
        };

        let err = apply_update(&issue, &workflow, update, Uuid::new_v4(), Utc::now()).unwrap_err();
        assert!(matches!(err, IssueUpdateError::Transition(ref e) if e.to == "in_review"));
    }

    #[test]
    fn test_update_with_unknown_status_is_rejected() {
        let workflow = workflow();
        let issue = new_issue(&workflow);
        let update = IssueUpdate {
            status: Some("archived".into()),
            ..Default::default()
        };
        assert!(matches!(
            apply_update(&issue, &workflow, update, Uuid::new_v4(), Utc::now()),
            Err(IssueUpdateError::Transition(_))
        ));
    }

    #[test]
    fn test_update_with_unchanged_status_is_not_a_transition() {
        let workflow = workflow();
        let issue = new_issue(&workflow);
        let update = IssueUpdate {
            status: Some("open".into()),
            ..Default::default()
        };
        let change = apply_update(&issue, &workflow, update, Uuid::new_v4(), Utc::now()).unwrap();
        assert!(change.is_empty());
        assert_eq!(change.issue, issue);
    }

    #[test]
    fn test_update_validation_runs_before_transition() {
        let workflow = workflow();
        let issue = new_issue(&workflow);
        let update = IssueUpdate {
            title: Some("no".into()),
            status: Some("closed".into()),
            ..Default::default()
        };
        assert!(matches!(
            apply_update(&issue, &workflow, update, Uuid::new_v4(), Utc::now()),
            Err(IssueUpdateError::Validation(_))
        ));
    }

    #[test]
    fn test_update_status_to_closing() {
        let workflow = workflow();
        let issue = new_issue(&workflow);
        let update = IssueUpdate {
            status: Some("closed".into()),
            ..Default::default()
        };
        let change = apply_update(&issue, &workflow, update, Uuid::new_v4(), Utc::now()).unwrap();
        assert!(change.issue.is_closed);
        assert!(change.issue.closed_at.is_some());
        assert_eq!(change.history.last().unwrap().changed_field, "status");
    }
}
