/// In-app notifications and per-user channel preferences
///
/// Delivery is handled elsewhere; this module only decides which channels
/// a notification should go to.

pub mod types;

pub use types::{
    default_channel_settings, ChannelPrefs, Notification, NotificationSettings, NotificationStatus, NotificationType,
    NotificationUpdate,
};
