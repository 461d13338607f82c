use async_trait::async_trait;
use contracts::system::tasks::aggregate::{LastRunStatus, TaskDefinition, TaskId, TaskStatus};
use contracts::system::tasks::request::{TaskListQuery, TaskSortColumn};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::NotSet, Condition, Order, QueryOrder, QuerySelect, Select, Set};
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "sys_tasks")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub task_id: i64,
    pub name: String,
    pub class: String,
    pub config_file: String,
    pub schedule: String,
    /// JSON-объект строк
    pub options: String,
    pub is_active: bool,
    pub run_now: bool,
    pub status: String,
    pub last_run_status: String,
    pub last_run_dt: Option<DateTimeUtc>,
    pub last_run_duration: Option<i64>,
    pub last_run_message: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for TaskDefinition {
    type Error = DbErr;

    fn try_from(m: Model) -> Result<Self, Self::Error> {
        let options: BTreeMap<String, String> = serde_json::from_str(&m.options)
            .map_err(|e| DbErr::Type(format!("task {}: invalid options: {}", m.task_id, e)))?;
        let status: TaskStatus = m.status.parse().map_err(DbErr::Type)?;
        let last_run_status: LastRunStatus = m.last_run_status.parse().map_err(DbErr::Type)?;

        Ok(TaskDefinition {
            id: TaskId::new(m.task_id),
            name: m.name,
            implementation_ref: m.class,
            config_file: m.config_file,
            schedule: m.schedule,
            options,
            is_active: m.is_active,
            run_now: m.run_now,
            status,
            last_run_status,
            last_run_dt: m.last_run_dt,
            last_run_duration: m.last_run_duration,
            last_run_message: m.last_run_message,
        })
    }
}

fn to_active_model(task: &TaskDefinition) -> Result<ActiveModel, DbErr> {
    let options = serde_json::to_string(&task.options)
        .map_err(|e| DbErr::Type(format!("task {}: cannot encode options: {}", task.id, e)))?;

    Ok(ActiveModel {
        task_id: Set(task.id.value()),
        name: Set(task.name.clone()),
        class: Set(task.implementation_ref.clone()),
        config_file: Set(task.config_file.clone()),
        schedule: Set(task.schedule.clone()),
        options: Set(options),
        is_active: Set(task.is_active),
        run_now: Set(task.run_now),
        status: Set(task.status.to_string()),
        last_run_status: Set(task.last_run_status.to_string()),
        last_run_dt: Set(task.last_run_dt),
        last_run_duration: Set(task.last_run_duration),
        last_run_message: Set(task.last_run_message.clone()),
    })
}

fn to_definitions(models: Vec<Model>) -> Result<Vec<TaskDefinition>, DbErr> {
    models.into_iter().map(TaskDefinition::try_from).collect()
}

/// Хранилище определений заданий
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn get_by_id(&self, id: TaskId) -> Result<Option<TaskDefinition>, DbErr>;

    /// Вставляет новое задание; `task.id` игнорируется
    async fn insert(&self, task: &TaskDefinition) -> Result<TaskId, DbErr>;

    /// Перезаписывает строку задания целиком
    async fn save(&self, task: &TaskDefinition) -> Result<(), DbErr>;

    /// Удаляет строку; `false`, если её не было
    async fn delete(&self, id: TaskId) -> Result<bool, DbErr>;

    async fn query(&self, query: &TaskListQuery) -> Result<Vec<TaskDefinition>, DbErr>;

    async fn count(&self, query: &TaskListQuery) -> Result<u64, DbErr>;

    /// Активные задания (кандидаты для планировщика)
    async fn list_active(&self) -> Result<Vec<TaskDefinition>, DbErr>;
}

pub struct SqliteTaskStore {
    db: DatabaseConnection,
}

impl SqliteTaskStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn filtered(query: &TaskListQuery) -> Select<Entity> {
        let mut condition = Condition::all();
        if let Some(name) = query.name.as_deref().filter(|n| !n.is_empty()) {
            condition = condition.add(Column::Name.contains(name));
        }
        if let Some(is_active) = query.is_active {
            condition = condition.add(Column::IsActive.eq(is_active));
        }
        Entity::find().filter(condition)
    }
}

#[async_trait]
impl TaskStore for SqliteTaskStore {
    async fn get_by_id(&self, id: TaskId) -> Result<Option<TaskDefinition>, DbErr> {
        Entity::find_by_id(id.value())
            .one(&self.db)
            .await?
            .map(TaskDefinition::try_from)
            .transpose()
    }

    async fn insert(&self, task: &TaskDefinition) -> Result<TaskId, DbErr> {
        let mut active = to_active_model(task)?;
        active.task_id = NotSet;
        let inserted = active.insert(&self.db).await?;
        Ok(TaskId::new(inserted.task_id))
    }

    async fn save(&self, task: &TaskDefinition) -> Result<(), DbErr> {
        to_active_model(task)?.update(&self.db).await?;
        Ok(())
    }

    async fn delete(&self, id: TaskId) -> Result<bool, DbErr> {
        let result = Entity::delete_by_id(id.value()).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }

    async fn query(&self, query: &TaskListQuery) -> Result<Vec<TaskDefinition>, DbErr> {
        let order = if query.sort_desc { Order::Desc } else { Order::Asc };
        let column = match query.sort_by {
            TaskSortColumn::Id => Column::TaskId,
            TaskSortColumn::Name => Column::Name,
            TaskSortColumn::LastRunDt => Column::LastRunDt,
        };

        let mut select = Self::filtered(query)
            .order_by(column, order)
            .order_by_asc(Column::TaskId);
        if let Some(start) = query.start {
            select = select.offset(start);
        }
        if let Some(length) = query.length {
            select = select.limit(length);
        }

        to_definitions(select.all(&self.db).await?)
    }

    async fn count(&self, query: &TaskListQuery) -> Result<u64, DbErr> {
        Self::filtered(query).count(&self.db).await
    }

    async fn list_active(&self) -> Result<Vec<TaskDefinition>, DbErr> {
        let models = Entity::find()
            .filter(Column::IsActive.eq(true))
            .order_by_asc(Column::TaskId)
            .all(&self.db)
            .await?;
        to_definitions(models)
    }
}
