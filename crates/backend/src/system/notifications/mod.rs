pub mod notification;
pub mod repository;
pub mod user_notification;

pub use repository::{NotificationRepository, PendingNotification, UserNotificationRepository};
