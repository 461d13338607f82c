pub mod logs;
pub mod preferences;
pub mod tasks;
pub mod toolbar;
