/// Notification type definitions

use crate::enums::string_enum;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use uuid::Uuid;

string_enum! {
    pub enum NotificationType {
        IssueAssigned => "issue_assigned",
        IssueMentioned => "issue_mentioned",
        CommentAdded => "comment_added",
        StatusChanged => "status_changed",
        DueDateApproaching => "due_date_approaching",
        ProjectInvitation => "project_invitation",
        IssueCreated => "issue_created",
    }
}

string_enum! {
    pub enum NotificationStatus {
        Unread => "unread",
        Read => "read",
        Archived => "archived",
    }
}

impl Default for NotificationStatus {
    fn default() -> Self {
        NotificationStatus::Unread
    }
}

/// A notification addressed to one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    #[serde(default)]
    pub status: NotificationStatus,
    pub issue_id: Option<Uuid>,
    pub comment_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
    pub title: String,
    pub message: Option<String>,
    #[serde(default)]
    pub data: Map<String, Value>,
    pub sender_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}

impl Notification {
    pub fn new(user_id: Uuid, notification_type: NotificationType, title: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            notification_type,
            status: NotificationStatus::Unread,
            issue_id: None,
            comment_id: None,
            project_id: None,
            title: title.into(),
            message: None,
            data: Map::new(),
            sender_id: None,
            created_at: now,
            read_at: None,
        }
    }

    /// Mark as read, keeping the first read time
    ///
    /// Archived notifications stay archived.
    pub fn mark_read(&mut self, now: DateTime<Utc>) {
        if self.status == NotificationStatus::Unread {
            self.status = NotificationStatus::Read;
        }
        self.read_at.get_or_insert(now);
    }

    pub fn archive(&mut self) {
        self.status = NotificationStatus::Archived;
    }

    pub fn is_unread(&self) -> bool {
        self.status == NotificationStatus::Unread
    }
}

/// Delivery channels for one notification type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelPrefs {
    pub email: bool,
    pub push: bool,
    pub in_app: bool,
}

impl ChannelPrefs {
    pub const fn new(email: bool, push: bool, in_app: bool) -> Self {
        Self { email, push, in_app }
    }

    pub const IN_APP_ONLY: ChannelPrefs = ChannelPrefs::new(false, false, true);

    pub fn any(&self) -> bool {
        self.email || self.push || self.in_app
    }
}

/// Per-user (optionally per-project) notification preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationSettings {
    pub user_id: Uuid,
    pub project_id: Option<Uuid>,
    pub email_enabled: bool,
    pub push_enabled: bool,
    pub in_app_enabled: bool,
    pub settings: BTreeMap<NotificationType, ChannelPrefs>,
}

impl NotificationSettings {
    pub fn new(user_id: Uuid, project_id: Option<Uuid>) -> Self {
        Self {
            user_id,
            project_id,
            email_enabled: true,
            push_enabled: true,
            in_app_enabled: true,
            settings: default_channel_settings(),
        }
    }

    /// Effective channels for `notification_type`
    ///
    /// The per-type preference is masked by the master switches. Types
    /// without a configured entry go to the in-app channel only.
    pub fn channels_for(&self, notification_type: NotificationType) -> ChannelPrefs {
        let prefs = self
            .settings
            .get(&notification_type)
            .copied()
            .unwrap_or(ChannelPrefs::IN_APP_ONLY);

        ChannelPrefs {
            email: prefs.email && self.email_enabled,
            push: prefs.push && self.push_enabled,
            in_app: prefs.in_app && self.in_app_enabled,
        }
    }
}

/// Built-in per-type defaults; `issue_created` has no entry
pub fn default_channel_settings() -> BTreeMap<NotificationType, ChannelPrefs> {
    BTreeMap::from([
        (NotificationType::IssueAssigned, ChannelPrefs::new(true, true, true)),
        (NotificationType::IssueMentioned, ChannelPrefs::new(true, true, true)),
        (NotificationType::CommentAdded, ChannelPrefs::new(false, true, true)),
        (NotificationType::StatusChanged, ChannelPrefs::new(false, false, true)),
        (NotificationType::DueDateApproaching, ChannelPrefs::new(true, true, true)),
        (NotificationType::ProjectInvitation, ChannelPrefs::new(true, true, true)),
    ])
}

/// Status change request from a client
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationUpdate {
    pub status: Option<NotificationStatus>,
}
