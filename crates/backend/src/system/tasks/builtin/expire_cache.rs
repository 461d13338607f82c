use async_trait::async_trait;

use crate::system::tasks::context::TaskContext;
use crate::system::tasks::contract::{RunReport, Task};
use crate::system::tasks::error::TaskError;

pub const REFERENCE: &str = "maintenance.expire_cache";

/// Чистит общий кэш-пул: просроченные записи или всё целиком (`flush_all`)
#[derive(Default)]
pub struct ExpireCacheTask;

#[async_trait]
impl Task for ExpireCacheTask {
    async fn run(&mut self, ctx: &TaskContext<'_>) -> Result<RunReport, TaskError> {
        let flush_all = ctx.options.flag("flush_all");
        let pool = &ctx.env.pool;

        let removed = if flush_all {
            pool.clear()
        } else {
            pool.purge_expired(ctx.started_at)
        };

        Ok(RunReport::new(format!(
            "Removed {} cache entries, {} left",
            removed,
            pool.len()
        )))
    }
}
