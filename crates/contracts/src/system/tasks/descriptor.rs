use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Дескриптор реализации задания (файл `*.task`).
///
/// ```json
/// { "name": "Purge Old Log Entries", "class": "maintenance.purge_logs",
///   "options": { "max_age_days": 30 } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDescriptor {
    pub name: String,

    /// Ключ реализации в реестре
    pub class: String,

    /// Параметры по умолчанию
    #[serde(default, deserialize_with = "deserialize_option_map")]
    pub options: BTreeMap<String, String>,

    /// Путь к файлу относительно корня (заполняется при обнаружении)
    #[serde(default)]
    pub file: String,
}

/// Значения параметров в дескрипторах бывают числами и булевыми: храним строки.
fn deserialize_option_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, serde_json::Value>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(key, value)| {
            let value = match value {
                serde_json::Value::String(s) => s,
                serde_json::Value::Null => String::new(),
                serde_json::Value::Bool(b) => if b { "1" } else { "0" }.to_string(),
                other => other.to_string(),
            };
            (key, value)
        })
        .collect())
}
