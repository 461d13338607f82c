use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTaskDto {
    pub name: String,
    /// Путь к дескриптору, как его вернул `/api/task/available`
    pub file: String,
    pub schedule: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditTaskDto {
    pub name: String,
    pub schedule: String,
    /// Флажок формы: отсутствует, значит выключен
    #[serde(default)]
    pub is_active: bool,
    /// Новые значения параметров; неизвестные заданию ключи игнорируются
    #[serde(default)]
    pub options: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskSortColumn {
    #[default]
    Id,
    Name,
    LastRunDt,
}

/// Фильтр и сортировка списка заданий
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TaskListQuery {
    /// Подстрока имени
    pub name: Option<String>,
    pub is_active: Option<bool>,
    #[serde(default)]
    pub sort_by: TaskSortColumn,
    #[serde(default)]
    pub sort_desc: bool,
    pub start: Option<u64>,
    pub length: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_without_checkbox_is_inactive() {
        let dto: EditTaskDto =
            serde_json::from_str(r#"{"name": "Purge", "schedule": "@daily"}"#).unwrap();
        assert!(!dto.is_active);
        assert!(dto.options.is_empty());

        let dto: EditTaskDto = serde_json::from_str(
            r#"{"name": "Purge", "schedule": "@daily", "is_active": true}"#,
        )
        .unwrap();
        assert!(dto.is_active);
    }
}
