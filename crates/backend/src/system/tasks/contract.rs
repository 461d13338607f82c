use async_trait::async_trait;

use super::context::TaskContext;
use super::error::TaskError;

/// Итог успешного запуска
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Сообщение для администратора (`last_run_message`)
    pub message: String,
}

impl RunReport {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Исполняемая реализация регламентного задания.
///
/// Экземпляр создаётся фабрикой реестра на каждый запуск и получает всё
/// необходимое через `ctx`. Параметры задания следует разобрать в
/// типизированную конфигурацию в самом начале `run`.
#[async_trait]
pub trait Task: Send {
    async fn run(&mut self, ctx: &TaskContext<'_>) -> Result<RunReport, TaskError>;
}
