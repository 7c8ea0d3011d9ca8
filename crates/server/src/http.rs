use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use trellis_core::api::{
    BulkUpdateRequest, CreateTaskRequest, DataEnvelope, DeletedTask, ListTasksQuery, TaskView,
    UpdateTaskRequest,
};
use trellis_core::ids::TaskId;
use trellis_core::model::Task;
use trellis_store::Store;

use crate::auth::Principal;
use crate::error::ApiError;
use crate::tasks;

#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn Store>,
}

pub fn router(store: Arc<dyn Store>) -> Router {
    let state = AppState { store };
    Router::new()
        .route("/healthz", get(healthz))
        .route("/v1/tasks", get(list_tasks).post(create_task))
        .route("/v1/tasks/bulk-update", post(bulk_update))
        .route(
            "/v1/tasks/{task_id}",
            get(get_task).patch(update_task).delete(delete_task),
        )
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn create_task(
    State(st): State<AppState>,
    principal: Principal,
    Json(req): Json<CreateTaskRequest>,
) -> Result<Json<DataEnvelope<Task>>, ApiError> {
    let task = tasks::create_task(st.store.as_ref(), &principal, req)?;
    Ok(Json(DataEnvelope { data: task }))
}

async fn list_tasks(
    State(st): State<AppState>,
    principal: Principal,
    Query(query): Query<ListTasksQuery>,
) -> Result<Json<DataEnvelope<Vec<TaskView>>>, ApiError> {
    let views = tasks::list_tasks(st.store.as_ref(), &principal, query)?;
    Ok(Json(DataEnvelope { data: views }))
}

async fn get_task(
    State(st): State<AppState>,
    principal: Principal,
    Path(task_id): Path<String>,
) -> Result<Json<DataEnvelope<TaskView>>, ApiError> {
    let view = tasks::get_task(st.store.as_ref(), &principal, &TaskId::from_str(task_id))?;
    Ok(Json(DataEnvelope { data: view }))
}

async fn update_task(
    State(st): State<AppState>,
    principal: Principal,
    Path(task_id): Path<String>,
    Json(req): Json<UpdateTaskRequest>,
) -> Result<Json<DataEnvelope<Task>>, ApiError> {
    let task = tasks::update_task(st.store.as_ref(), &principal, &TaskId::from_str(task_id), req)?;
    Ok(Json(DataEnvelope { data: task }))
}

async fn delete_task(
    State(st): State<AppState>,
    principal: Principal,
    Path(task_id): Path<String>,
) -> Result<Json<DataEnvelope<DeletedTask>>, ApiError> {
    let gone = tasks::delete_task(st.store.as_ref(), &principal, &TaskId::from_str(task_id))?;
    Ok(Json(DataEnvelope { data: gone }))
}

async fn bulk_update(
    State(st): State<AppState>,
    principal: Principal,
    Json(req): Json<BulkUpdateRequest>,
) -> Result<Json<DataEnvelope<Vec<Task>>>, ApiError> {
    let applied = tasks::bulk_update(st.store.as_ref(), &principal, req)?;
    Ok(Json(DataEnvelope { data: applied }))
}
