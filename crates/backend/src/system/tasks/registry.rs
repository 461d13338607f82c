use std::collections::HashMap;
use std::sync::Arc;

use super::contract::Task;

type TaskFactory = Arc<dyn Fn() -> Box<dyn Task> + Send + Sync>;

/// Реестр реализаций заданий.
/// Ключ: `implementation_ref` (поле `class` дескриптора), значение: фабрика экземпляров.
pub struct TaskRegistry {
    factories: HashMap<String, TaskFactory>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Регистрирует фабрику. Повторная регистрация ключа заменяет прежнюю.
    pub fn register<F>(&mut self, reference: &str, factory: F)
    where
        F: Fn() -> Box<dyn Task> + Send + Sync + 'static,
    {
        self.factories
            .insert(reference.to_string(), Arc::new(factory));
    }

    /// Новый экземпляр задания по ключу реализации
    pub fn resolve(&self, reference: &str) -> Option<Box<dyn Task>> {
        self.factories.get(reference).map(|factory| factory())
    }

    /// Зарегистрированные ключи, по алфавиту
    pub fn references(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.factories.keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl Default for TaskRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::tasks::context::TaskContext;
    use crate::system::tasks::contract::RunReport;
    use crate::system::tasks::error::TaskError;
    use async_trait::async_trait;

    struct Noop;

    #[async_trait]
    impl Task for Noop {
        async fn run(&mut self, _ctx: &TaskContext<'_>) -> Result<RunReport, TaskError> {
            Ok(RunReport::new("noop"))
        }
    }

    #[test]
    fn test_resolve_known_and_unknown() {
        let mut registry = TaskRegistry::new();
        registry.register("test.noop", || Box::new(Noop));
        registry.register("test.another", || Box::new(Noop));

        assert!(registry.resolve("test.noop").is_some());
        assert!(registry.resolve("test.missing").is_none());
        assert_eq!(registry.references(), vec!["test.another", "test.noop"]);
    }
}
