use async_trait::async_trait;
use chrono::Utc;

use crate::system::tasks::context::TaskContext;
use crate::system::tasks::contract::{RunReport, Task};
use crate::system::tasks::error::TaskError;
use crate::system::tasks::options::TaskOptions;
use crate::system::users::user;

pub const REFERENCE: &str = "notifications.dispatch";

const DEFAULT_BATCH_SIZE: u64 = 50;

#[derive(Debug, Clone, PartialEq)]
pub struct DispatchConfig {
    pub batch_size: u64,
}

impl DispatchConfig {
    pub fn from_options(options: &TaskOptions) -> Result<Self, TaskError> {
        let batch_size = options.parse_or("batch_size", DEFAULT_BATCH_SIZE)?;
        if batch_size == 0 {
            return Err(TaskError::InvalidOption {
                key: "batch_size".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(Self { batch_size })
    }
}

/// Рассылает ожидающие email-уведомления и отмечает их отправленными.
///
/// Адрес берётся из карточки пользователя. Неизвестные, уволенные и пользователи
/// без адреса пропускаются, но тоже отмечаются, чтобы не попадать в каждую пачку.
/// Доставка фиксируется в журнале; SMTP остаётся за внешним сервисом.
#[derive(Default)]
pub struct DispatchNotificationsTask;

#[async_trait]
impl Task for DispatchNotificationsTask {
    async fn run(&mut self, ctx: &TaskContext<'_>) -> Result<RunReport, TaskError> {
        let config = DispatchConfig::from_options(&ctx.options)?;
        let factories = &ctx.env.factories;
        let deliveries = &factories.user_notifications;

        let pending = deliveries.pending(config.batch_size).await?;
        let mut sent = 0;
        let mut skipped = 0;
        for item in &pending {
            let recipient = factories.users.get(&item.user_id).await?;
            match recipient.as_ref().and_then(user::Model::deliverable_email) {
                Some(email) => {
                    tracing::info!(
                        "Notification {} '{}' sent to {} <{}> by {}",
                        item.notification_id,
                        item.subject,
                        item.user_id,
                        email,
                        ctx.env.operator
                    );
                    sent += 1;
                }
                None => {
                    tracing::warn!(
                        "Notification {} skipped: user {} has no email address",
                        item.notification_id,
                        item.user_id
                    );
                    skipped += 1;
                }
            }
            deliveries
                .mark_sent(item.notification_id, &item.user_id, Utc::now())
                .await?;
        }

        let message = if skipped == 0 {
            format!("Sent {} notifications", sent)
        } else {
            format!("Sent {} notifications, skipped {}", sent, skipped)
        };
        Ok(RunReport::new(message))
    }
}
