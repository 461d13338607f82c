use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use contracts::system::tasks::aggregate::TaskId;
use contracts::system::tasks::descriptor::TaskDescriptor;
use contracts::system::tasks::request::{AddTaskDto, EditTaskDto, TaskListQuery};
use contracts::system::tasks::response::{ApiResult, TaskListResponse, TaskResponse};

use crate::state::AppState;
use crate::system::tasks::error::{DescriptorError, ServiceError, TaskRunError};

type ApiError = (StatusCode, Json<ApiResult>);

fn status_of(e: &ServiceError) -> StatusCode {
    match e {
        ServiceError::NotFound(_) | ServiceError::Run(TaskRunError::NotFound(_)) => {
            StatusCode::NOT_FOUND
        }
        ServiceError::ConfigLocked => StatusCode::FORBIDDEN,
        ServiceError::InvalidSchedule { .. }
        | ServiceError::Descriptor(DescriptorError::OutsideTaskDirs(_)) => StatusCode::BAD_REQUEST,
        ServiceError::Descriptor(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ServiceError::Run(TaskRunError::AlreadyRunning(_)) => StatusCode::CONFLICT,
        ServiceError::Run(_) | ServiceError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn api_error(operation: &str, e: ServiceError) -> ApiError {
    let status = status_of(&e);
    if status.is_server_error() {
        tracing::error!("Failed to {}: {}", operation, e);
    } else {
        tracing::warn!("Refused to {}: {}", operation, e);
    }
    (status, Json(ApiResult::new(status.as_u16(), e.to_string())))
}

fn api_ok(result: ApiResult) -> (StatusCode, Json<ApiResult>) {
    let status = StatusCode::from_u16(result.http_status).unwrap_or(StatusCode::OK);
    (status, Json(result))
}

/// GET /api/task
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<TaskListQuery>,
) -> Result<Json<TaskListResponse>, ApiError> {
    state
        .tasks
        .list(&query)
        .await
        .map(Json)
        .map_err(|e| api_error("list tasks", e))
}

/// GET /api/task/available
pub async fn available(
    State(state): State<AppState>,
) -> Result<Json<Vec<TaskDescriptor>>, ApiError> {
    state
        .tasks
        .available()
        .map(Json)
        .map_err(|e| api_error("discover task descriptors", e))
}

/// GET /api/task/:id
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<TaskResponse>, ApiError> {
    state
        .tasks
        .get(TaskId::new(id))
        .await
        .map(Json)
        .map_err(|e| api_error("get task", e))
}

/// POST /api/task
pub async fn add(
    State(state): State<AppState>,
    Json(dto): Json<AddTaskDto>,
) -> Result<(StatusCode, Json<ApiResult>), ApiError> {
    state
        .tasks
        .add(dto)
        .await
        .map(api_ok)
        .map_err(|e| api_error("add task", e))
}

/// PUT /api/task/:id
pub async fn edit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(dto): Json<EditTaskDto>,
) -> Result<(StatusCode, Json<ApiResult>), ApiError> {
    state
        .tasks
        .edit(TaskId::new(id), dto)
        .await
        .map(api_ok)
        .map_err(|e| api_error("edit task", e))
}

/// DELETE /api/task/:id
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<(StatusCode, Json<ApiResult>), ApiError> {
    state
        .tasks
        .delete(TaskId::new(id))
        .await
        .map(api_ok)
        .map_err(|e| api_error("delete task", e))
}

/// POST /api/task/:id/run-now
pub async fn run_now(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<(StatusCode, Json<ApiResult>), ApiError> {
    state
        .tasks
        .run_now(TaskId::new(id))
        .await
        .map(api_ok)
        .map_err(|e| api_error("set run now", e))
}

/// POST /api/task/:id/run
///
/// Выполняет задание в рамках запроса; ответ без тела.
pub async fn run(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state
        .tasks
        .run(TaskId::new(id))
        .await
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(|e| api_error("run task", e))
}
