pub mod notifications;
pub mod preferences;
pub mod tasks;
pub mod tracing;
pub mod users;
