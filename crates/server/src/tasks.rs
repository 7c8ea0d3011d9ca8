//! Task service: creation with column placement, filtered reads with
//! denormalization, partial updates, and the bulk placement batch.

use std::collections::HashSet;

use trellis_core::api::{
    BulkUpdateRequest, CreateTaskRequest, DeletedTask, ListTasksQuery, TaskView,
    UpdateTaskRequest,
};
use trellis_core::ids::{TaskId, WorkspaceId};
use trellis_core::model::{Status, Task};
use trellis_core::position::{position_after, validate_position};
use trellis_store::{NewTask, Store, TaskFilter, TaskOrder, TaskPatch};

use crate::auth::{ensure_member, Principal};
use crate::error::ApiError;

/// Creates a task at the end of its column: current column maximum plus one
/// step, `1000` for an empty column, capped at the saturation bound.
pub fn create_task(
    store: &dyn Store,
    principal: &Principal,
    req: CreateTaskRequest,
) -> Result<Task, ApiError> {
    ensure_member(store, &req.workspace_id, principal)?;
    let status = req.status.unwrap_or(Status::Backlog);

    let top = store.list_tasks(&TaskFilter {
        workspace_id: Some(req.workspace_id.clone()),
        status: Some(status),
        order: TaskOrder::PositionDesc,
        limit: Some(1),
        ..TaskFilter::default()
    })?;
    let position = position_after(top.first().map(|t| t.position));

    let task = store.create_task(NewTask {
        id: None,
        workspace_id: req.workspace_id,
        project_id: req.project_id,
        assignee_id: req.assignee_id,
        name: req.name,
        description: req.description,
        status,
        position,
        due_date: req.due_date,
    })?;
    Ok(task)
}

/// Lists a workspace's tasks, newest first, with read-time project and
/// assignee snapshots attached.
pub fn list_tasks(
    store: &dyn Store,
    principal: &Principal,
    query: ListTasksQuery,
) -> Result<Vec<TaskView>, ApiError> {
    ensure_member(store, &query.workspace_id, principal)?;
    let tasks = store.list_tasks(&TaskFilter {
        workspace_id: Some(query.workspace_id),
        project_id: query.project_id,
        assignee_id: query.assignee_id,
        status: query.status,
        due_date: query.due_date,
        search: query.search,
        order: TaskOrder::CreatedDesc,
        limit: None,
    })?;
    denormalize(store, tasks)
}

/// Fetches one task with its snapshots.
pub fn get_task(
    store: &dyn Store,
    principal: &Principal,
    id: &TaskId,
) -> Result<TaskView, ApiError> {
    let task = store.get_task(id)?;
    ensure_member(store, &task.workspace_id, principal)?;
    denormalize(store, vec![task])?
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::not_found("Task not found"))
}

/// Applies an explicit partial update. Position moves only when the caller
/// sends one, and it must be in range.
pub fn update_task(
    store: &dyn Store,
    principal: &Principal,
    id: &TaskId,
    req: UpdateTaskRequest,
) -> Result<Task, ApiError> {
    let task = store.get_task(id)?;
    ensure_member(store, &task.workspace_id, principal)?;

    if let Some(position) = req.position {
        validate_position(position).map_err(|e| ApiError::bad_request(e.to_string()))?;
    }
    let patch = TaskPatch {
        name: req.name,
        description: req.description,
        project_id: req.project_id,
        assignee_id: req.assignee_id,
        status: req.status,
        position: req.position,
        due_date: req.due_date,
    };
    Ok(store.update_task(id, &patch)?)
}

/// Deletes a task.
pub fn delete_task(
    store: &dyn Store,
    principal: &Principal,
    id: &TaskId,
) -> Result<DeletedTask, ApiError> {
    let task = store.get_task(id)?;
    ensure_member(store, &task.workspace_id, principal)?;
    store.delete_task(id)?;
    Ok(DeletedTask { id: task.id })
}

/// Applies a reconciliation batch.
///
/// Validation order, all before any write: position bounds, then the
/// one-workspace rule over the referenced tasks, then membership. The apply
/// loop itself is not transactional; a mid-loop failure surfaces as-is with
/// earlier entries already committed, and callers recover by re-fetching.
pub fn bulk_update(
    store: &dyn Store,
    principal: &Principal,
    req: BulkUpdateRequest,
) -> Result<Vec<Task>, ApiError> {
    for update in &req.tasks {
        validate_position(update.position).map_err(|e| ApiError::bad_request(e.to_string()))?;
    }

    let ids: Vec<TaskId> = req.tasks.iter().map(|u| u.id.clone()).collect();
    let referenced = store.get_tasks(&ids)?;
    let workspace_ids: HashSet<String> = referenced
        .iter()
        .map(|t| t.workspace_id.0.clone())
        .collect();
    if workspace_ids.len() != 1 {
        return Err(ApiError::bad_request(
            "All tasks must be in the same workspace",
        ));
    }
    let workspace_id = match workspace_ids.into_iter().next() {
        Some(id) if !id.is_empty() => WorkspaceId::from_str(id),
        _ => return Err(ApiError::bad_request("Workspace not found")),
    };

    ensure_member(store, &workspace_id, principal)?;

    let mut applied = Vec::with_capacity(req.tasks.len());
    for update in &req.tasks {
        let task = store.update_task(
            &update.id,
            &TaskPatch::placement(update.status, update.position),
        )?;
        applied.push(task);
    }
    Ok(applied)
}

fn denormalize(store: &dyn Store, tasks: Vec<Task>) -> Result<Vec<TaskView>, ApiError> {
    let project_ids: Vec<_> = tasks.iter().filter_map(|t| t.project_id.clone()).collect();
    let assignee_ids: Vec<_> = tasks.iter().filter_map(|t| t.assignee_id.clone()).collect();
    let projects = store.get_projects(&project_ids)?;
    let members = store.get_members(&assignee_ids)?;

    Ok(tasks
        .into_iter()
        .map(|task| {
            let project = task
                .project_id
                .as_ref()
                .and_then(|id| projects.iter().find(|p| &p.id == id).cloned());
            let assignee = task
                .assignee_id
                .as_ref()
                .and_then(|id| members.iter().find(|m| &m.id == id).cloned());
            TaskView {
                task,
                project,
                assignee,
            }
        })
        .collect())
}
