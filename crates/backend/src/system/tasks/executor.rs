use chrono::Utc;
use contracts::system::tasks::aggregate::{TaskDefinition, TaskId};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use super::context::{TaskContext, TaskEnvironment};
use super::error::TaskRunError;
use super::options::TaskOptions;
use super::registry::TaskRegistry;
use super::repository::TaskStore;

/// Категория записей `system_log` о запусках заданий
pub const AUDIT_CATEGORY: &str = "task";

/// Выполняет одно задание по id и записывает результат в хранилище.
pub struct TaskExecutor {
    store: Arc<dyn TaskStore>,
    registry: Arc<TaskRegistry>,
    env: TaskEnvironment,
    in_flight: Mutex<HashSet<TaskId>>,
}

/// Снимает отметку «выполняется» при выходе из `run`, в том числе по ошибке
struct InFlightGuard<'a> {
    set: &'a Mutex<HashSet<TaskId>>,
    id: TaskId,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.set
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.id);
    }
}

impl TaskExecutor {
    pub fn new(store: Arc<dyn TaskStore>, registry: Arc<TaskRegistry>, env: TaskEnvironment) -> Self {
        Self {
            store,
            registry,
            env,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    fn acquire(&self, id: TaskId) -> Result<InFlightGuard<'_>, TaskRunError> {
        let mut running = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        if !running.insert(id) {
            return Err(TaskRunError::AlreadyRunning(id));
        }
        Ok(InFlightGuard {
            set: &self.in_flight,
            id,
        })
    }

    /// Запускает задание и сохраняет итог.
    ///
    /// Ошибка самого задания записывается в определение и наружу не выходит.
    /// `NotFound`, `Resolution` и `AlreadyRunning` ничего не меняют в хранилище.
    pub async fn run(&self, id: TaskId) -> Result<TaskDefinition, TaskRunError> {
        let span = info_span!("task_run", task_id = %id, run_id = %Uuid::new_v4());
        self.run_inner(id).instrument(span).await
    }

    async fn run_inner(&self, id: TaskId) -> Result<TaskDefinition, TaskRunError> {
        let _guard = self.acquire(id)?;

        let mut task = self
            .store
            .get_by_id(id)
            .await?
            .ok_or(TaskRunError::NotFound(id))?;

        let mut implementation = self
            .registry
            .resolve(&task.implementation_ref)
            .ok_or_else(|| TaskRunError::Resolution(task.implementation_ref.clone()))?;

        let ctx = TaskContext {
            env: &self.env,
            task_id: id,
            task_name: task.name.clone(),
            options: TaskOptions::new(task.options.clone()),
            started_at: Utc::now(),
        };

        info!("Running task '{}' ({})", task.name, task.implementation_ref);
        let start = Instant::now();

        match implementation.run(&ctx).await {
            Ok(report) => {
                let duration = i64::try_from(start.elapsed().as_secs()).unwrap_or(i64::MAX);
                info!("Task '{}' finished in {}s: {}", task.name, duration, report.message);
                task.record_success(duration, report.message, Utc::now());
            }
            Err(e) => {
                error!("Task '{}' failed: {}", task.name, e);
                debug!("Task '{}' error chain: {:?}", task.name, e);
                task.record_error(e.to_string(), Utc::now());
            }
        }

        self.store.save(&task).await?;
        self.audit(&task).await;

        Ok(task)
    }

    async fn audit(&self, task: &TaskDefinition) {
        let message = format!(
            "Task {} '{}': {} - {}",
            task.id,
            task.name,
            task.last_run_status,
            task.last_run_message.as_deref().unwrap_or_default()
        );
        if let Err(e) = self
            .env
            .factories
            .logs
            .log_event("task_runner", AUDIT_CATEGORY, &message)
            .await
        {
            warn!("Failed to write task audit log: {}", e);
        }
    }
}
