use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::state::AppState;

/// Конфигурация всех роутов приложения
pub fn configure_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // SCHEDULED TASKS
        // ========================================
        .route(
            "/api/task",
            get(handlers::sys_task::list).post(handlers::sys_task::add),
        )
        .route("/api/task/available", get(handlers::sys_task::available))
        .route(
            "/api/task/:id",
            get(handlers::sys_task::get_by_id)
                .put(handlers::sys_task::edit)
                .delete(handlers::sys_task::delete),
        )
        .route("/api/task/:id/run-now", post(handlers::sys_task::run_now))
        .route("/api/task/:id/run", post(handlers::sys_task::run))
        // ========================================
        // USER PREFERENCES
        // ========================================
        .route(
            "/api/user/pref",
            get(handlers::user_preferences::get_preference)
                .post(handlers::user_preferences::save_preferences),
        )
        // ========================================
        // SYSTEM LOG
        // ========================================
        .route("/api/logs", get(handlers::logs::list_recent))
        .with_state(state)
}
