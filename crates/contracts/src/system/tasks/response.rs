use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::aggregate::TaskDefinition;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResponse {
    pub id: i64,
    pub name: String,
    pub implementation_ref: String,
    pub config_file: String,
    pub schedule: String,
    pub options: BTreeMap<String, String>,
    pub is_active: bool,
    pub run_now: bool,
    pub status: String,
    pub last_run_status: String,
    pub last_run_dt: Option<DateTime<Utc>>,
    pub last_run_duration: Option<i64>,
    pub last_run_message: Option<String>,
    /// Вычисляется по расписанию при выдаче списка
    pub next_run_dt: Option<DateTime<Utc>>,
}

impl From<TaskDefinition> for TaskResponse {
    fn from(task: TaskDefinition) -> Self {
        Self {
            id: task.id.value(),
            name: task.name,
            implementation_ref: task.implementation_ref,
            config_file: task.config_file,
            schedule: task.schedule,
            options: task.options,
            is_active: task.is_active,
            run_now: task.run_now,
            status: task.status.to_string(),
            last_run_status: task.last_run_status.to_string(),
            last_run_dt: task.last_run_dt,
            last_run_duration: task.last_run_duration,
            last_run_message: task.last_run_message,
            next_run_dt: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskListResponse {
    pub tasks: Vec<TaskResponse>,
    pub records_total: u64,
}

/// Результат административной операции (для toast/alert в UI)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResult {
    pub http_status: u16,
    pub message: String,
    pub id: Option<i64>,
    pub data: Option<TaskResponse>,
}

impl ApiResult {
    pub fn new(http_status: u16, message: impl Into<String>) -> Self {
        Self {
            http_status,
            message: message.into(),
            id: None,
            data: None,
        }
    }

    pub fn with_task(mut self, task: TaskDefinition) -> Self {
        self.id = Some(task.id.value());
        self.data = Some(task.into());
        self
    }
}
