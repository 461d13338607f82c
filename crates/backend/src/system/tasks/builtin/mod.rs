//! Встроенные реализации заданий

pub mod dispatch_notifications;
pub mod expire_cache;
pub mod purge_logs;

pub use dispatch_notifications::DispatchNotificationsTask;
pub use expire_cache::ExpireCacheTask;
pub use purge_logs::PurgeLogsTask;
