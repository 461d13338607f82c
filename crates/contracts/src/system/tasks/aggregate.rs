use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::descriptor::TaskDescriptor;

// ============================================================================
// ID Type
// ============================================================================

/// Уникальный идентификатор регламентного задания
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub i64);

impl TaskId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn as_string(&self) -> String {
        self.0.to_string()
    }

    pub fn from_string(s: &str) -> Result<Self, String> {
        s.parse::<i64>()
            .map(TaskId::new)
            .map_err(|e| format!("Invalid task id: {}", e))
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Statuses
// ============================================================================

/// Административное состояние задания. Результат выполнения его не меняет.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TaskStatus {
    #[default]
    Idle,
    Running,
    Disabled,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Idle => "Idle",
            TaskStatus::Running => "Running",
            TaskStatus::Disabled => "Disabled",
        }
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Idle" => Ok(TaskStatus::Idle),
            "Running" => Ok(TaskStatus::Running),
            "Disabled" => Ok(TaskStatus::Disabled),
            other => Err(format!("Unknown task status: {}", other)),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Итог последнего запуска
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum LastRunStatus {
    #[default]
    NotRun,
    Success,
    Error,
}

impl LastRunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LastRunStatus::NotRun => "NotRun",
            LastRunStatus::Success => "Success",
            LastRunStatus::Error => "Error",
        }
    }
}

impl FromStr for LastRunStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NotRun" => Ok(LastRunStatus::NotRun),
            "Success" => Ok(LastRunStatus::Success),
            "Error" => Ok(LastRunStatus::Error),
            other => Err(format!("Unknown last run status: {}", other)),
        }
    }
}

impl fmt::Display for LastRunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// Регламентное задание (Task Definition)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDefinition {
    pub id: TaskId,

    /// Отображаемое имя
    pub name: String,

    /// Ключ реализации в реестре задач
    pub implementation_ref: String,

    /// Путь к дескриптору (.task), из которого задание было создано
    pub config_file: String,

    /// Расписание (cron)
    pub schedule: String,

    /// Параметры задания
    pub options: BTreeMap<String, String>,

    pub is_active: bool,

    /// Принудительный запуск на ближайшем тике планировщика
    pub run_now: bool,

    pub status: TaskStatus,

    pub last_run_status: LastRunStatus,

    /// Время окончания последней попытки запуска
    pub last_run_dt: Option<DateTime<Utc>>,

    /// Длительность последней попытки, в секундах
    pub last_run_duration: Option<i64>,

    pub last_run_message: Option<String>,
}

impl TaskDefinition {
    /// Новое задание, ещё не сохранённое в БД (id присваивает хранилище).
    pub fn new_for_insert(name: String, config_file: String, schedule: String) -> Self {
        Self {
            id: TaskId(0),
            name,
            implementation_ref: String::new(),
            config_file,
            schedule,
            options: BTreeMap::new(),
            is_active: false,
            run_now: false,
            status: TaskStatus::Idle,
            last_run_status: LastRunStatus::NotRun,
            last_run_dt: None,
            last_run_duration: None,
            last_run_message: None,
        }
    }

    /// Применяет дескриптор: класс реализации и набор параметров.
    ///
    /// Значения по умолчанию берутся из дескриптора, текущие значения задания
    /// их перекрывают. Параметры, которых дескриптор больше не объявляет, удаляются.
    pub fn apply_descriptor(&mut self, descriptor: &TaskDescriptor) {
        self.implementation_ref = descriptor.class.clone();

        let mut options = descriptor.options.clone();
        for (key, value) in options.iter_mut() {
            if let Some(current) = self.options.get(key) {
                *value = current.clone();
            }
        }
        self.options = options;
    }

    /// Отметка успешного запуска
    pub fn record_success(&mut self, duration_secs: i64, message: String, finished_at: DateTime<Utc>) {
        self.last_run_duration = Some(duration_secs.max(0));
        self.last_run_message = Some(message);
        self.last_run_status = LastRunStatus::Success;
        self.finish_attempt(finished_at);
    }

    /// Отметка неудачного запуска. Длительность предыдущего запуска не трогаем.
    pub fn record_error(&mut self, message: String, finished_at: DateTime<Utc>) {
        self.last_run_message = Some(message);
        self.last_run_status = LastRunStatus::Error;
        self.finish_attempt(finished_at);
    }

    fn finish_attempt(&mut self, finished_at: DateTime<Utc>) {
        self.last_run_dt = Some(finished_at);
        self.run_now = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(options: &[(&str, &str)]) -> TaskDescriptor {
        TaskDescriptor {
            name: "Purge".to_string(),
            class: "maintenance.purge_logs".to_string(),
            options: options
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            file: "tasks/purge-logs.task".to_string(),
        }
    }

    #[test]
    fn test_apply_descriptor_keeps_stored_values() {
        let mut task = TaskDefinition::new_for_insert(
            "Purge".to_string(),
            "tasks/purge-logs.task".to_string(),
            "0 3 * * *".to_string(),
        );
        task.options.insert("max_age_days".to_string(), "7".to_string());
        task.options.insert("obsolete".to_string(), "x".to_string());

        task.apply_descriptor(&descriptor(&[("max_age_days", "30"), ("category", "")]));

        assert_eq!(task.implementation_ref, "maintenance.purge_logs");
        assert_eq!(task.options.get("max_age_days").map(String::as_str), Some("7"));
        assert_eq!(task.options.get("category").map(String::as_str), Some(""));
        assert!(!task.options.contains_key("obsolete"));
    }

    #[test]
    fn test_apply_descriptor_is_idempotent() {
        let mut task = TaskDefinition::new_for_insert(
            "Purge".to_string(),
            "tasks/purge-logs.task".to_string(),
            "@daily".to_string(),
        );
        let desc = descriptor(&[("max_age_days", "30")]);
        task.apply_descriptor(&desc);
        let once = task.clone();
        task.apply_descriptor(&desc);
        assert_eq!(task, once);
    }

    #[test]
    fn test_record_error_clears_run_now() {
        let mut task = TaskDefinition::new_for_insert(
            "t".to_string(),
            "tasks/t.task".to_string(),
            "@hourly".to_string(),
        );
        task.run_now = true;
        task.last_run_duration = Some(4);
        let now = Utc::now();

        task.record_error("disk full".to_string(), now);

        assert!(!task.run_now);
        assert_eq!(task.last_run_status, LastRunStatus::Error);
        assert_eq!(task.last_run_message.as_deref(), Some("disk full"));
        assert_eq!(task.last_run_dt, Some(now));
        assert_eq!(task.last_run_duration, Some(4));
    }

    #[test]
    fn test_status_round_trip_through_str() {
        for status in [TaskStatus::Idle, TaskStatus::Running, TaskStatus::Disabled] {
            assert_eq!(status.as_str().parse::<TaskStatus>(), Ok(status));
        }
        assert!("Paused".parse::<TaskStatus>().is_err());
        assert_eq!("Error".parse::<LastRunStatus>(), Ok(LastRunStatus::Error));
    }
}
