pub mod repository;

pub use repository::LogRepository;

/// Формат времени в `system_log`; строки сравниваются лексикографически
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";
