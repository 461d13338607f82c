use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

use super::error::TaskError;

/// Значения флажков (checkbox), которые считаются включёнными
const TRUTHY: [&str; 5] = ["1", "on", "true", "yes", "checked"];

/// Типизированный доступ к строковым параметрам задания.
///
/// Пустая строка равнозначна отсутствующему параметру.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskOptions {
    values: BTreeMap<String, String>,
}

impl TaskOptions {
    pub fn new(values: BTreeMap<String, String>) -> Self {
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn required(&self, key: &str) -> Result<&str, TaskError> {
        self.get(key)
            .ok_or_else(|| TaskError::MissingOption(key.to_string()))
    }

    pub fn parse<T>(&self, key: &str) -> Result<T, TaskError>
    where
        T: FromStr,
        T::Err: Display,
    {
        let raw = self.required(key)?;
        parse_value(key, raw)
    }

    pub fn parse_or<T>(&self, key: &str, default: T) -> Result<T, TaskError>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.get(key) {
            Some(raw) => parse_value(key, raw),
            None => Ok(default),
        }
    }

    pub fn flag(&self, key: &str) -> bool {
        self.get(key)
            .map(|v| TRUTHY.iter().any(|t| v.eq_ignore_ascii_case(t)))
            .unwrap_or(false)
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, TaskError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.parse::<T>().map_err(|e| TaskError::InvalidOption {
        key: key.to_string(),
        reason: format!("'{}': {}", raw, e),
    })
}
