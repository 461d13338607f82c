use contracts::system::tasks::aggregate::TaskId;
use sea_orm::DbErr;
use thiserror::Error;

/// Ошибка выполнения задания. Записывается в `last_run_message` и не пробрасывается.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("Invalid option '{key}': {reason}")]
    InvalidOption { key: String, reason: String },

    #[error("Missing required option '{0}'")]
    MissingOption(String),

    #[error("{0}")]
    Failed(String),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TaskError {
    pub fn failed(message: impl Into<String>) -> Self {
        TaskError::Failed(message.into())
    }
}

/// Ошибка запуска, которую получает вызывающий
#[derive(Debug, Error)]
pub enum TaskRunError {
    #[error("Task {0} not found")]
    NotFound(TaskId),

    #[error("Unknown task implementation '{0}'")]
    Resolution(String),

    #[error("Task {0} is already running")]
    AlreadyRunning(TaskId),

    #[error("Failed to save task: {0}")]
    Persistence(#[from] DbErr),
}

#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("Cannot read task descriptor {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid task descriptor {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Task descriptor {0} is not a .task file in the task directories")]
    OutsideTaskDirs(String),
}

/// Ошибки административных операций
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Task {0} not found")]
    NotFound(TaskId),

    #[error("Task configuration is locked")]
    ConfigLocked,

    #[error(transparent)]
    Descriptor(#[from] DescriptorError),

    #[error("Invalid schedule '{schedule}': {reason}")]
    InvalidSchedule { schedule: String, reason: String },

    #[error(transparent)]
    Run(#[from] TaskRunError),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}
