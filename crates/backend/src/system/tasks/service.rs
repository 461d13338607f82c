use chrono::Utc;
use contracts::system::tasks::aggregate::{TaskDefinition, TaskId};
use contracts::system::tasks::descriptor::TaskDescriptor;
use contracts::system::tasks::request::{AddTaskDto, EditTaskDto, TaskListQuery};
use contracts::system::tasks::response::{ApiResult, TaskListResponse, TaskResponse};
use std::sync::Arc;

use super::descriptor::DescriptorCatalog;
use super::error::ServiceError;
use super::executor::TaskExecutor;
use super::repository::TaskStore;
use super::schedule;

/// Административные операции над заданиями
pub struct TaskAdminService {
    store: Arc<dyn TaskStore>,
    executor: Arc<TaskExecutor>,
    catalog: DescriptorCatalog,
    config_locked: bool,
}

impl TaskAdminService {
    pub fn new(
        store: Arc<dyn TaskStore>,
        executor: Arc<TaskExecutor>,
        catalog: DescriptorCatalog,
        config_locked: bool,
    ) -> Self {
        Self {
            store,
            executor,
            catalog,
            config_locked,
        }
    }

    fn ensure_unlocked(&self) -> Result<(), ServiceError> {
        if self.config_locked {
            return Err(ServiceError::ConfigLocked);
        }
        Ok(())
    }

    async fn load(&self, id: TaskId) -> Result<TaskDefinition, ServiceError> {
        self.store
            .get_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound(id))
    }

    fn to_response(task: TaskDefinition, now: chrono::DateTime<Utc>) -> TaskResponse {
        let next_run_dt = schedule::next_run_date(&task, now).ok().flatten();
        let mut response = TaskResponse::from(task);
        response.next_run_dt = next_run_dt;
        response
    }

    pub async fn list(&self, query: &TaskListQuery) -> Result<TaskListResponse, ServiceError> {
        let now = Utc::now();
        let tasks = self.store.query(query).await?;
        let records_total = self.store.count(query).await?;

        Ok(TaskListResponse {
            tasks: tasks
                .into_iter()
                .map(|t| Self::to_response(t, now))
                .collect(),
            records_total,
        })
    }

    pub async fn get(&self, id: TaskId) -> Result<TaskResponse, ServiceError> {
        Ok(Self::to_response(self.load(id).await?, Utc::now()))
    }

    /// Дескрипторы, из которых можно создать задание. При заблокированной конфигурации: пусто.
    pub fn available(&self) -> Result<Vec<TaskDescriptor>, ServiceError> {
        if self.config_locked {
            return Ok(Vec::new());
        }
        Ok(self.catalog.discover()?)
    }

    pub async fn add(&self, dto: AddTaskDto) -> Result<ApiResult, ServiceError> {
        self.ensure_unlocked()?;
        validate_schedule(&dto.schedule)?;

        let descriptor = self.catalog.load(&dto.file)?;
        let mut task = TaskDefinition::new_for_insert(dto.name, descriptor.file.clone(), dto.schedule);
        task.apply_descriptor(&descriptor);

        task.id = self.store.insert(&task).await?;
        tracing::info!("Task '{}' ({}) added from {}", task.name, task.id, task.config_file);

        Ok(ApiResult::new(201, format!("Added {}", task.name)).with_task(task))
    }

    /// Меняет имя, расписание, активность и значения объявленных параметров
    pub async fn edit(&self, id: TaskId, dto: EditTaskDto) -> Result<ApiResult, ServiceError> {
        self.ensure_unlocked()?;
        validate_schedule(&dto.schedule)?;

        let mut task = self.load(id).await?;
        let descriptor = self.catalog.load(&task.config_file)?;
        task.apply_descriptor(&descriptor);

        task.name = dto.name;
        task.schedule = dto.schedule;
        task.is_active = dto.is_active;
        for (key, value) in dto.options {
            if let Some(current) = task.options.get_mut(&key) {
                *current = value;
            }
        }

        self.store.save(&task).await?;
        Ok(ApiResult::new(200, format!("Edited {}", task.name)).with_task(task))
    }

    pub async fn delete(&self, id: TaskId) -> Result<ApiResult, ServiceError> {
        self.ensure_unlocked()?;
        let task = self.load(id).await?;
        self.store.delete(id).await?;
        tracing::info!("Task '{}' ({}) deleted", task.name, task.id);

        let mut result = ApiResult::new(200, format!("Deleted {}", task.name));
        result.id = Some(id.value());
        Ok(result)
    }

    /// Ставит задание в очередь на ближайший тик планировщика
    pub async fn run_now(&self, id: TaskId) -> Result<ApiResult, ServiceError> {
        let mut task = self.load(id).await?;
        task.run_now = true;
        self.store.save(&task).await?;
        Ok(ApiResult::new(200, format!("Run Now set on {}", task.name)).with_task(task))
    }

    /// Немедленный запуск в текущем запросе
    pub async fn run(&self, id: TaskId) -> Result<(), ServiceError> {
        self.executor.run(id).await?;
        Ok(())
    }
}

fn validate_schedule(expression: &str) -> Result<(), ServiceError> {
    schedule::parse_schedule(expression)
        .map(|_| ())
        .map_err(|e| ServiceError::InvalidSchedule {
            schedule: e.expression,
            reason: e.reason,
        })
}
