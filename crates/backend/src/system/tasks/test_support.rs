//! Тестовые двойники: сценарные задания, хранилище с отказом сохранения.

use async_trait::async_trait;
use contracts::system::tasks::aggregate::{TaskDefinition, TaskId};
use contracts::system::tasks::request::TaskListQuery;
use sea_orm::{DatabaseConnection, DbErr};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Notify;

use super::context::{TaskContext, TaskEnvironment};
use super::contract::{RunReport, Task};
use super::error::TaskError;
use super::executor::TaskExecutor;
use super::registry::TaskRegistry;
use super::repository::{SqliteTaskStore, TaskStore};
use crate::shared::config::{parse_config, Config};
use crate::shared::data::db::test_connection;

pub struct ScriptedTask {
    pub outcome: Result<&'static str, &'static str>,
}

#[async_trait]
impl Task for ScriptedTask {
    async fn run(&mut self, _ctx: &TaskContext<'_>) -> Result<RunReport, TaskError> {
        match self.outcome {
            Ok(message) => Ok(RunReport::new(message)),
            Err(message) => Err(TaskError::failed(message)),
        }
    }
}

/// Сообщает о старте и ждёт разрешения завершиться
pub struct BlockingTask {
    pub started: Arc<Notify>,
    pub release: Arc<Notify>,
}

#[async_trait]
impl Task for BlockingTask {
    async fn run(&mut self, _ctx: &TaskContext<'_>) -> Result<RunReport, TaskError> {
        self.started.notify_one();
        self.release.notified().await;
        Ok(RunReport::new("released"))
    }
}

/// `test.ok` завершается успешно, `test.disk_full` с ошибкой "disk full"
pub fn scripted_registry() -> TaskRegistry {
    let mut registry = TaskRegistry::new();
    registry.register("test.ok", || Box::new(ScriptedTask { outcome: Ok("all good") }));
    registry.register("test.disk_full", || {
        Box::new(ScriptedTask {
            outcome: Err("disk full"),
        })
    });
    registry
}

pub fn test_config() -> Config {
    parse_config(
        r#"
        [database]
        path = ":memory:"
        "#,
    )
    .expect("test config")
}

pub fn test_environment(db: DatabaseConnection) -> TaskEnvironment {
    TaskEnvironment::new(db, Arc::new(test_config()))
}

pub async fn insert_task(
    store: &dyn TaskStore,
    reference: &str,
    run_now: bool,
    options: BTreeMap<String, String>,
) -> TaskId {
    let mut task = TaskDefinition::new_for_insert(
        format!("Task {}", reference),
        "tasks/test.task".to_string(),
        "0 3 * * *".to_string(),
    );
    task.implementation_ref = reference.to_string();
    task.run_now = run_now;
    task.is_active = true;
    task.options = options;
    store.insert(&task).await.expect("insert task")
}

pub struct Fixture {
    pub store: Arc<SqliteTaskStore>,
    pub registry: Arc<TaskRegistry>,
    pub env: TaskEnvironment,
    pub executor: Arc<TaskExecutor>,
}

impl Fixture {
    pub async fn new() -> Self {
        let db = test_connection().await;
        let store = Arc::new(SqliteTaskStore::new(db.clone()));
        let registry = Arc::new(scripted_registry());
        let env = test_environment(db.clone());
        let executor = Arc::new(TaskExecutor::new(
            store.clone(),
            registry.clone(),
            env.clone(),
        ));
        Self {
            store,
            registry,
            env,
            executor,
        }
    }

    pub async fn insert(&self, reference: &str, run_now: bool) -> TaskId {
        self.insert_with(reference, run_now, BTreeMap::new()).await
    }

    pub async fn insert_with(
        &self,
        reference: &str,
        run_now: bool,
        options: BTreeMap<String, String>,
    ) -> TaskId {
        insert_task(self.store.as_ref(), reference, run_now, options).await
    }
}

/// Хранилище, у которого не работает запись
pub struct FailingSaveStore {
    inner: Arc<SqliteTaskStore>,
}

impl FailingSaveStore {
    pub fn new(inner: Arc<SqliteTaskStore>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl TaskStore for FailingSaveStore {
    async fn get_by_id(&self, id: TaskId) -> Result<Option<TaskDefinition>, DbErr> {
        self.inner.get_by_id(id).await
    }

    async fn insert(&self, task: &TaskDefinition) -> Result<TaskId, DbErr> {
        self.inner.insert(task).await
    }

    async fn save(&self, _task: &TaskDefinition) -> Result<(), DbErr> {
        Err(DbErr::Custom("database is locked".to_string()))
    }

    async fn delete(&self, id: TaskId) -> Result<bool, DbErr> {
        self.inner.delete(id).await
    }

    async fn query(&self, query: &TaskListQuery) -> Result<Vec<TaskDefinition>, DbErr> {
        self.inner.query(query).await
    }

    async fn count(&self, query: &TaskListQuery) -> Result<u64, DbErr> {
        self.inner.count(query).await
    }

    async fn list_active(&self) -> Result<Vec<TaskDefinition>, DbErr> {
        self.inner.list_active().await
    }
}
