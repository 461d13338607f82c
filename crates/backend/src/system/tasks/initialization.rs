use sea_orm::DatabaseConnection;
use std::sync::Arc;

use super::builtin::{
    dispatch_notifications, expire_cache, purge_logs, DispatchNotificationsTask, ExpireCacheTask,
    PurgeLogsTask,
};
use super::context::TaskEnvironment;
use super::descriptor::DescriptorCatalog;
use super::executor::TaskExecutor;
use super::registry::TaskRegistry;
use super::repository::{SqliteTaskStore, TaskStore};
use super::service::TaskAdminService;
use super::worker::ScheduledTaskWorker;
use crate::shared::config::{get_tasks_root, Config};

/// Реестр со встроенными реализациями
pub fn builtin_registry() -> TaskRegistry {
    let mut registry = TaskRegistry::new();
    registry.register(purge_logs::REFERENCE, || Box::new(PurgeLogsTask));
    registry.register(expire_cache::REFERENCE, || Box::new(ExpireCacheTask));
    registry.register(dispatch_notifications::REFERENCE, || {
        Box::new(DispatchNotificationsTask)
    });
    registry
}

/// Собранная подсистема заданий
pub struct TaskSystem {
    pub service: Arc<TaskAdminService>,
    pub worker: ScheduledTaskWorker,
}

/// Инициализирует реестр задач, исполнитель, административный сервис и фоновый воркер.
pub fn initialize_scheduled_tasks(db: DatabaseConnection, config: Arc<Config>) -> TaskSystem {
    let registry = Arc::new(builtin_registry());
    tracing::info!("Registered task implementations: {:?}", registry.references());

    let store: Arc<dyn TaskStore> = Arc::new(SqliteTaskStore::new(db.clone()));
    let env = TaskEnvironment::new(db, config.clone());
    let executor = Arc::new(TaskExecutor::new(store.clone(), registry, env));

    let root = get_tasks_root(&config);
    tracing::info!("Task descriptors root: {}", root.display());
    let catalog = DescriptorCatalog::from_config(root, &config.tasks);

    let service = Arc::new(TaskAdminService::new(
        store.clone(),
        executor.clone(),
        catalog,
        config.tasks.config_locked,
    ));
    let worker = ScheduledTaskWorker::new(executor, store, config.tasks.worker_interval_seconds);

    TaskSystem { service, worker }
}
