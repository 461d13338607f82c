use anyhow::Result;
use chrono::{DateTime, Utc};
use contracts::system::tasks::aggregate::TaskStatus;
use std::sync::Arc;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use super::executor::TaskExecutor;
use super::repository::TaskStore;
use super::schedule;

/// Фоновый воркер для выполнения запланированных задач.
pub struct ScheduledTaskWorker {
    executor: Arc<TaskExecutor>,
    store: Arc<dyn TaskStore>,
    interval_seconds: u64,
}

impl ScheduledTaskWorker {
    pub fn new(executor: Arc<TaskExecutor>, store: Arc<dyn TaskStore>, interval_seconds: u64) -> Self {
        Self {
            executor,
            store,
            interval_seconds: interval_seconds.max(1),
        }
    }

    /// Запускает цикл выполнения задач.
    pub async fn run_loop(&self) {
        info!(
            "Scheduled task worker started with interval {} seconds",
            self.interval_seconds
        );
        let mut interval = time::interval(time::Duration::from_secs(self.interval_seconds));
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            interval.tick().await;
            debug!("Checking for scheduled tasks to run...");
            if let Err(e) = self.process_due_tasks(Utc::now()).await {
                error!("Error processing scheduled tasks: {:?}", e);
            }
        }
    }

    /// Последовательно выполняет задачи, время которых наступило. Возвращает число запусков.
    pub async fn process_due_tasks(&self, now: DateTime<Utc>) -> Result<usize> {
        let tasks = self.store.list_active().await?;
        let mut executed = 0;

        for task in tasks {
            if task.status == TaskStatus::Disabled {
                continue;
            }

            match schedule::is_due(&task, now) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) => {
                    warn!("Task '{}' ({}) skipped: {}", task.name, task.id, e);
                    continue;
                }
            }

            info!("Task '{}' ({}) is due. Running...", task.name, task.id);
            match self.executor.run(task.id).await {
                Ok(_) => executed += 1,
                Err(e) => error!("Task '{}' ({}) was not run: {}", task.name, task.id, e),
            }
        }

        Ok(executed)
    }
}
