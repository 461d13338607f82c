pub mod logs;
pub mod sys_task;
pub mod user_preferences;

#[cfg(test)]
pub(crate) mod testing {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    use crate::routes::configure_routes;
    use crate::shared::config::parse_config;
    use crate::shared::data::db::test_connection;
    use crate::state::AppState;
    use crate::system::tasks::initialization::initialize_scheduled_tasks;

    const DESCRIPTORS: [(&str, &str); 3] = [
        (
            "expire-cache.task",
            include_str!("../../../../tasks/expire-cache.task"),
        ),
        (
            "purge-logs.task",
            include_str!("../../../../tasks/purge-logs.task"),
        ),
        (
            "dispatch-notifications.task",
            include_str!("../../../../tasks/dispatch-notifications.task"),
        ),
    ];

    /// Роутер на БД в памяти; дескрипторы: копии поставляемых в `tasks/`
    pub async fn test_router(config_locked: bool) -> (axum::Router, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let tasks_dir = dir.path().join("tasks");
        std::fs::create_dir_all(&tasks_dir).unwrap();
        for (file, contents) in DESCRIPTORS {
            std::fs::write(tasks_dir.join(file), contents).unwrap();
        }

        let config = parse_config(&format!(
            r#"
            [database]
            path = ":memory:"

            [tasks]
            root_dir = "{}"
            config_locked = {}
            "#,
            dir.path().display().to_string().replace('\\', "/"),
            config_locked
        ))
        .unwrap();
        let config = Arc::new(config);

        let db = test_connection().await;
        let tasks = initialize_scheduled_tasks(db.clone(), config.clone());
        let state = AppState::new(db, &config, tasks.service);
        (configure_routes(state), dir)
    }

    pub async fn api(
        router: &axum::Router,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if body.is_some() {
            builder = builder.header("content-type", "application/json");
        }
        let body = match body {
            Some(v) => Body::from(serde_json::to_string(&v).unwrap()),
            None => Body::empty(),
        };
        let req = builder.body(body).unwrap();
        let resp = router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            serde_json::json!(null)
        } else {
            serde_json::from_slice(&bytes).unwrap_or(serde_json::json!(null))
        };
        (status, json)
    }
}
