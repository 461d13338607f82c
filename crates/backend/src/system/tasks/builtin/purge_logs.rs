use async_trait::async_trait;
use chrono::Duration;

use crate::system::tasks::context::TaskContext;
use crate::system::tasks::contract::{RunReport, Task};
use crate::system::tasks::error::TaskError;
use crate::system::tasks::options::TaskOptions;

pub const REFERENCE: &str = "maintenance.purge_logs";

#[derive(Debug, Clone, PartialEq)]
pub struct PurgeLogsConfig {
    pub max_age_days: u32,
    /// Пусто: все категории
    pub category: Option<String>,
    /// Группа, которой уходит письмо с итогом очистки
    pub notify_group: Option<String>,
}

impl PurgeLogsConfig {
    pub fn from_options(options: &TaskOptions) -> Result<Self, TaskError> {
        let max_age_days: u32 = options.parse("max_age_days")?;
        if max_age_days == 0 {
            return Err(TaskError::InvalidOption {
                key: "max_age_days".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(Self {
            max_age_days,
            category: options.get("category").map(str::to_string),
            notify_group: options.get("notify_group").map(str::to_string),
        })
    }
}

/// Удаляет старые записи `system_log`
#[derive(Default)]
pub struct PurgeLogsTask;

#[async_trait]
impl Task for PurgeLogsTask {
    async fn run(&mut self, ctx: &TaskContext<'_>) -> Result<RunReport, TaskError> {
        let config = PurgeLogsConfig::from_options(&ctx.options)?;
        let factories = &ctx.env.factories;

        let group = match &config.notify_group {
            Some(name) => Some(factories.user_groups.find_by_name(name).await?.ok_or_else(
                || TaskError::InvalidOption {
                    key: "notify_group".to_string(),
                    reason: format!("user group '{}' does not exist", name),
                },
            )?),
            None => None,
        };

        let cutoff = ctx.started_at - Duration::days(i64::from(config.max_age_days));
        let deleted = factories
            .logs
            .purge_older_than(cutoff, config.category.as_deref())
            .await?;
        let message = format!(
            "Deleted {} log entries older than {} days",
            deleted, config.max_age_days
        );

        if let Some(group) = group {
            let recipients: Vec<String> = factories
                .user_groups
                .active_members(group.group_id)
                .await?
                .into_iter()
                .map(|user| user.user_id)
                .collect();
            if !recipients.is_empty() {
                factories
                    .notifications
                    .create(&ctx.task_name, &message, true, &recipients)
                    .await?;
            }
        }

        Ok(RunReport::new(message))
    }
}
