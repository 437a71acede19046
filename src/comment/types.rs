/// Comment type definitions

use crate::error::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// A comment on an issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub issue_id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub content_html: Option<String>,
    /// Visible to project members only
    #[serde(default)]
    pub is_internal: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Comment {
    pub fn create(issue_id: Uuid, author_id: Uuid, input: CommentCreate, now: DateTime<Utc>) -> Result<Self, ValidationError> {
        input.validate()?;
        Ok(Self {
            id: Uuid::new_v4(),
            issue_id,
            author_id,
            content: input.content,
            content_html: None,
            is_internal: input.is_internal,
            created_at: now,
            updated_at: None,
        })
    }

    /// Apply an edit; the rendered HTML is dropped when the content changes
    pub fn apply_update(&mut self, update: CommentUpdate, now: DateTime<Utc>) -> Result<(), ValidationError> {
        update.validate()?;
        if let Some(content) = update.content {
            if content != self.content {
                self.content = content;
                self.content_html = None;
            }
        }
        if let Some(is_internal) = update.is_internal {
            self.is_internal = is_internal;
        }
        self.updated_at = Some(now);
        Ok(())
    }
}

/// Comment creation input
#[derive(Debug, Clone, Deserialize)]
pub struct CommentCreate {
    pub content: String,
    #[serde(default)]
    pub is_internal: bool,
    /// Ids of already uploaded attachments to bind to the comment
    #[serde(default)]
    pub attachments: Vec<Uuid>,
}

impl CommentCreate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_content(&self.content)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentUpdate {
    pub content: Option<String>,
    pub is_internal: Option<bool>,
}

impl CommentUpdate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        match &self.content {
            Some(content) => validate_content(content),
            None => Ok(()),
        }
    }
}

fn validate_content(content: &str) -> Result<(), ValidationError> {
    if content.trim().is_empty() {
        return Err(ValidationError::new("content", "comment cannot be empty"));
    }
    Ok(())
}

/// Project activity feed entry (e.g. "issue_created", "status_changed")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: Uuid,
    pub project_id: Uuid,
    pub issue_id: Option<Uuid>,
    pub user_id: Uuid,
    pub activity_type: String,
    #[serde(default)]
    pub data: Map<String, Value>,
    pub created_at: DateTime<Utc>,
}
