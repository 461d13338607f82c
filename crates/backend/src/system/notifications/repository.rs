use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DatabaseBackend, Set, Statement, TransactionTrait};

use super::{notification, user_notification};
use crate::shared::logger::TIMESTAMP_FORMAT;

/// Уведомления (тема и текст)
#[derive(Clone)]
pub struct NotificationRepository {
    db: DatabaseConnection,
}

impl NotificationRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Создаёт уведомление и строки адресатов одной транзакцией. Возвращает id.
    pub async fn create(
        &self,
        subject: &str,
        body: &str,
        is_email: bool,
        user_ids: &[String],
    ) -> Result<i64, DbErr> {
        let txn = self.db.begin().await?;

        let inserted = notification::ActiveModel {
            notification_id: sea_orm::ActiveValue::NotSet,
            subject: Set(subject.to_string()),
            body: Set(body.to_string()),
            created_dt: Set(Utc::now().format(TIMESTAMP_FORMAT).to_string()),
            is_email: Set(is_email),
        }
        .insert(&txn)
        .await?;

        for user_id in user_ids {
            user_notification::ActiveModel {
                notification_id: Set(inserted.notification_id),
                user_id: Set(user_id.clone()),
                is_read: Set(false),
                sent_dt: Set(None),
            }
            .insert(&txn)
            .await?;
        }

        txn.commit().await?;
        Ok(inserted.notification_id)
    }
}

/// Неотправленное письмо конкретному пользователю
#[derive(Debug, Clone, PartialEq)]
pub struct PendingNotification {
    pub notification_id: i64,
    pub user_id: String,
    pub subject: String,
    pub body: String,
}

/// Доставка уведомлений пользователям
#[derive(Clone)]
pub struct UserNotificationRepository {
    db: DatabaseConnection,
}

impl UserNotificationRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Email-уведомления, ещё не отправленные адресатам (старые первыми)
    pub async fn pending(&self, limit: u64) -> Result<Vec<PendingNotification>, DbErr> {
        let query = r#"
            SELECT un.notification_id, un.user_id, n.subject, n.body
            FROM user_notification un
            INNER JOIN notification n ON n.notification_id = un.notification_id
            WHERE n.is_email = 1 AND un.sent_dt IS NULL
            ORDER BY n.created_dt, un.notification_id, un.user_id
            LIMIT ?
        "#;

        let rows = self
            .db
            .query_all(Statement::from_sql_and_values(
                DatabaseBackend::Sqlite,
                query,
                vec![(limit as i64).into()],
            ))
            .await?;

        rows.iter()
            .map(|row| {
                Ok(PendingNotification {
                    notification_id: row.try_get("", "notification_id")?,
                    user_id: row.try_get("", "user_id")?,
                    subject: row.try_get("", "subject")?,
                    body: row.try_get("", "body")?,
                })
            })
            .collect()
    }

    pub async fn mark_sent(
        &self,
        notification_id: i64,
        user_id: &str,
        sent_at: DateTime<Utc>,
    ) -> Result<(), DbErr> {
        user_notification::Entity::update_many()
            .col_expr(
                user_notification::Column::SentDt,
                Expr::value(sent_at.format(TIMESTAMP_FORMAT).to_string()),
            )
            .filter(user_notification::Column::NotificationId.eq(notification_id))
            .filter(user_notification::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    pub async fn get(
        &self,
        notification_id: i64,
        user_id: &str,
    ) -> Result<Option<user_notification::Model>, DbErr> {
        user_notification::Entity::find_by_id((notification_id, user_id.to_string()))
            .one(&self.db)
            .await
    }
}
