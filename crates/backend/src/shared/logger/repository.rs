use chrono::{DateTime, Utc};
use contracts::system::logs::LogEntry;
use sea_orm::entity::prelude::*;
use sea_orm::{EntityTrait, QueryOrder, QuerySelect, Set};

use super::TIMESTAMP_FORMAT;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "system_log")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub timestamp: String,
    pub source: String,
    pub category: String,
    pub message: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for LogEntry {
    fn from(m: Model) -> Self {
        LogEntry {
            id: m.id,
            timestamp: m.timestamp,
            source: m.source,
            category: m.category,
            message: m.message,
        }
    }
}

/// Журнал событий в таблице `system_log`
#[derive(Clone)]
pub struct LogRepository {
    db: DatabaseConnection,
}

impl LogRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Добавить запись в лог
    pub async fn log_event(&self, source: &str, category: &str, message: &str) -> Result<(), DbErr> {
        self.log_event_at(source, category, message, Utc::now()).await
    }

    pub async fn log_event_at(
        &self,
        source: &str,
        category: &str,
        message: &str,
        at: DateTime<Utc>,
    ) -> Result<(), DbErr> {
        let active = ActiveModel {
            id: sea_orm::ActiveValue::NotSet,
            timestamp: Set(at.format(TIMESTAMP_FORMAT).to_string()),
            source: Set(source.to_string()),
            category: Set(category.to_string()),
            message: Set(message.to_string()),
        };

        active.insert(&self.db).await?;
        Ok(())
    }

    /// Последние записи лога (новые сверху)
    pub async fn list_recent(&self, limit: u64) -> Result<Vec<LogEntry>, DbErr> {
        let logs = Entity::find()
            .order_by_desc(Column::Id)
            .limit(limit)
            .all(&self.db)
            .await?
            .into_iter()
            .map(Into::into)
            .collect();
        Ok(logs)
    }

    /// Удаляет записи старше `cutoff`; при заданной категории только её.
    pub async fn purge_older_than(
        &self,
        cutoff: DateTime<Utc>,
        category: Option<&str>,
    ) -> Result<u64, DbErr> {
        let mut delete = Entity::delete_many()
            .filter(Column::Timestamp.lt(cutoff.format(TIMESTAMP_FORMAT).to_string()));
        if let Some(category) = category {
            delete = delete.filter(Column::Category.eq(category));
        }
        let result = delete.exec(&self.db).await?;
        Ok(result.rows_affected)
    }
}
