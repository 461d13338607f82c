use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::shared::config::Config;
use crate::shared::logger::LogRepository;
use crate::system::preferences::PreferenceRepository;
use crate::system::tasks::service::TaskAdminService;

/// Состояние, доступное обработчикам HTTP
#[derive(Clone)]
pub struct AppState {
    pub tasks: Arc<TaskAdminService>,
    pub preferences: PreferenceRepository,
    pub logs: LogRepository,
    /// Пользователь, от имени которого сохраняются настройки UI
    pub user: String,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: &Config, tasks: Arc<TaskAdminService>) -> Self {
        Self {
            tasks,
            preferences: PreferenceRepository::new(db.clone()),
            logs: LogRepository::new(db),
            user: config.server.user.clone(),
        }
    }
}
