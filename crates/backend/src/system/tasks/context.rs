use chrono::{DateTime, Utc};
use contracts::system::tasks::aggregate::TaskId;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use super::options::TaskOptions;
use crate::shared::cache::CachePool;
use crate::shared::config::Config;
use crate::shared::logger::LogRepository;
use crate::system::notifications::{NotificationRepository, UserNotificationRepository};
use crate::system::users::{UserGroupRepository, UserRepository};

/// Репозитории сущностей, доступные заданиям.
///
/// Макеты, дисплеи, медиа и обновления принадлежат основной CMS и сюда не входят.
#[derive(Clone)]
pub struct EntityFactories {
    pub logs: LogRepository,
    pub users: UserRepository,
    pub user_groups: UserGroupRepository,
    pub notifications: NotificationRepository,
    pub user_notifications: UserNotificationRepository,
}

impl EntityFactories {
    pub fn new(db: &DatabaseConnection) -> Self {
        Self {
            logs: LogRepository::new(db.clone()),
            users: UserRepository::new(db.clone()),
            user_groups: UserGroupRepository::new(db.clone()),
            notifications: NotificationRepository::new(db.clone()),
            user_notifications: UserNotificationRepository::new(db.clone()),
        }
    }
}

/// Общие сервисы процесса, разделяемые всеми заданиями
#[derive(Clone)]
pub struct TaskEnvironment {
    pub db: DatabaseConnection,
    pub config: Arc<Config>,
    pub pool: CachePool,
    pub factories: EntityFactories,
    /// Пользователь, от имени которого выполняются задания
    pub operator: String,
}

impl TaskEnvironment {
    pub fn new(db: DatabaseConnection, config: Arc<Config>) -> Self {
        let pool = CachePool::new(config.cache.default_ttl_seconds);
        let factories = EntityFactories::new(&db);
        let operator = config.tasks.run_as.clone();
        Self {
            db,
            config,
            pool,
            factories,
            operator,
        }
    }
}

/// Всё, что получает задание на один запуск
pub struct TaskContext<'a> {
    pub env: &'a TaskEnvironment,
    pub task_id: TaskId,
    pub task_name: String,
    pub options: TaskOptions,
    pub started_at: DateTime<Utc>,
}
