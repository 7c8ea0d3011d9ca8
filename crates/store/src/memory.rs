use std::collections::HashMap;
use std::sync::Mutex;

use trellis_core::ids::{MemberId, ProjectId, TaskId, UserId, WorkspaceId};
use trellis_core::model::{Member, Project, Task, Workspace};
use trellis_core::{new_id, now_ms};

use crate::error::StoreError;
use crate::traits::{NewTask, Store, TaskFilter, TaskOrder, TaskPatch};

/// In-memory store. Not durable; backs tests and `--db memory` runs.
#[derive(Default)]
pub struct InMemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    workspaces: HashMap<String, Workspace>,
    members: HashMap<String, Member>,
    projects: HashMap<String, Project>,
    tasks: HashMap<String, Task>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches(task: &Task, filter: &TaskFilter) -> bool {
    if let Some(ws) = &filter.workspace_id {
        if &task.workspace_id != ws {
            return false;
        }
    }
    if let Some(project) = &filter.project_id {
        if task.project_id.as_ref() != Some(project) {
            return false;
        }
    }
    if let Some(assignee) = &filter.assignee_id {
        if task.assignee_id.as_ref() != Some(assignee) {
            return false;
        }
    }
    if let Some(status) = filter.status {
        if task.status != status {
            return false;
        }
    }
    if let Some(due) = &filter.due_date {
        if task.due_date.as_deref() != Some(due.as_str()) {
            return false;
        }
    }
    if let Some(query) = &filter.search {
        if !task.name.to_lowercase().contains(&query.to_lowercase()) {
            return false;
        }
    }
    true
}

impl Store for InMemoryStore {
    fn create_workspace(&self, workspace: Workspace) -> Result<Workspace, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner
            .workspaces
            .insert(workspace.id.0.clone(), workspace.clone());
        Ok(workspace)
    }

    fn create_member(&self, member: Member) -> Result<Member, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.members.insert(member.id.0.clone(), member.clone());
        Ok(member)
    }

    fn find_member(
        &self,
        workspace_id: &WorkspaceId,
        user_id: &UserId,
    ) -> Result<Option<Member>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .members
            .values()
            .find(|m| &m.workspace_id == workspace_id && &m.user_id == user_id)
            .cloned())
    }

    fn get_members(&self, ids: &[MemberId]) -> Result<Vec<Member>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(ids
            .iter()
            .filter_map(|id| inner.members.get(&id.0).cloned())
            .collect())
    }

    fn create_project(&self, project: Project) -> Result<Project, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.projects.insert(project.id.0.clone(), project.clone());
        Ok(project)
    }

    fn get_projects(&self, ids: &[ProjectId]) -> Result<Vec<Project>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(ids
            .iter()
            .filter_map(|id| inner.projects.get(&id.0).cloned())
            .collect())
    }

    fn create_task(&self, new: NewTask) -> Result<Task, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let now = now_ms();
        let task = Task {
            id: new.id.unwrap_or_else(|| TaskId::from_str(new_id())),
            workspace_id: new.workspace_id,
            project_id: new.project_id,
            assignee_id: new.assignee_id,
            name: new.name,
            description: new.description,
            status: new.status,
            position: new.position,
            due_date: new.due_date,
            created_at: now,
            updated_at: now,
        };
        inner.tasks.insert(task.id.0.clone(), task.clone());
        Ok(task)
    }

    fn get_task(&self, id: &TaskId) -> Result<Task, StoreError> {
        let inner = self.inner.lock().unwrap();
        inner
            .tasks
            .get(&id.0)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Task", id.as_str()))
    }

    fn get_tasks(&self, ids: &[TaskId]) -> Result<Vec<Task>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(ids
            .iter()
            .filter_map(|id| inner.tasks.get(&id.0).cloned())
            .collect())
    }

    fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut tasks: Vec<Task> = inner
            .tasks
            .values()
            .filter(|t| matches(t, filter))
            .cloned()
            .collect();
        match filter.order {
            TaskOrder::CreatedDesc => {
                // Id as tie-break keeps equal-millisecond rows deterministic.
                tasks.sort_by(|a, b| {
                    b.created_at
                        .cmp(&a.created_at)
                        .then_with(|| b.id.0.cmp(&a.id.0))
                });
            }
            TaskOrder::PositionDesc => {
                tasks.sort_by(|a, b| {
                    b.position
                        .cmp(&a.position)
                        .then_with(|| a.id.0.cmp(&b.id.0))
                });
            }
        }
        if let Some(limit) = filter.limit {
            tasks.truncate(limit);
        }
        Ok(tasks)
    }

    fn update_task(&self, id: &TaskId, patch: &TaskPatch) -> Result<Task, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let task = inner
            .tasks
            .get_mut(&id.0)
            .ok_or_else(|| StoreError::not_found("Task", id.as_str()))?;
        patch.apply_to(task);
        task.updated_at = now_ms();
        Ok(task.clone())
    }

    fn delete_task(&self, id: &TaskId) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner
            .tasks
            .remove(&id.0)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found("Task", id.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::model::Status;

    fn new_task(ws: &str, name: &str, status: Status, position: i64) -> NewTask {
        NewTask {
            id: None,
            workspace_id: WorkspaceId::from_str(ws),
            project_id: None,
            assignee_id: None,
            name: name.to_string(),
            description: None,
            status,
            position,
            due_date: None,
        }
    }

    #[test]
    fn test_create_allocates_id_and_timestamps() {
        let store = InMemoryStore::new();
        let task = store
            .create_task(new_task("w1", "first", Status::Backlog, 1_000))
            .unwrap();
        assert!(!task.id.as_str().is_empty());
        assert!(task.created_at > 0);
        assert_eq!(task.created_at, task.updated_at);
        assert_eq!(store.get_task(&task.id).unwrap(), task);
    }

    #[test]
    fn test_get_missing_task_is_not_found() {
        let store = InMemoryStore::new();
        let err = store.get_task(&TaskId::from_str("nope")).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { entity: "Task", .. }));
    }

    #[test]
    fn test_list_applies_equality_filters() {
        let store = InMemoryStore::new();
        store
            .create_task(new_task("w1", "a", Status::Todo, 1_000))
            .unwrap();
        store
            .create_task(new_task("w1", "b", Status::Done, 1_000))
            .unwrap();
        store
            .create_task(new_task("w2", "c", Status::Todo, 1_000))
            .unwrap();

        let filter = TaskFilter {
            workspace_id: Some(WorkspaceId::from_str("w1")),
            status: Some(Status::Todo),
            ..TaskFilter::default()
        };
        let tasks = store.list_tasks(&filter).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].name, "a");
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let store = InMemoryStore::new();
        store
            .create_task(new_task("w1", "Fix Login Flow", Status::Todo, 1_000))
            .unwrap();
        store
            .create_task(new_task("w1", "write docs", Status::Todo, 2_000))
            .unwrap();

        let filter = TaskFilter {
            workspace_id: Some(WorkspaceId::from_str("w1")),
            search: Some("login".to_string()),
            ..TaskFilter::default()
        };
        let tasks = store.list_tasks(&filter).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].name, "Fix Login Flow");
    }

    #[test]
    fn test_position_desc_with_limit_finds_column_max() {
        let store = InMemoryStore::new();
        for (name, position) in [("a", 1_000), ("b", 3_000), ("c", 2_000)] {
            store
                .create_task(new_task("w1", name, Status::InProgress, position))
                .unwrap();
        }
        let filter = TaskFilter {
            workspace_id: Some(WorkspaceId::from_str("w1")),
            status: Some(Status::InProgress),
            order: TaskOrder::PositionDesc,
            limit: Some(1),
            ..TaskFilter::default()
        };
        let tasks = store.list_tasks(&filter).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].position, 3_000);
    }

    #[test]
    fn test_patch_touches_only_named_fields() {
        let store = InMemoryStore::new();
        let task = store
            .create_task(new_task("w1", "original", Status::Todo, 1_000))
            .unwrap();

        let patch = TaskPatch {
            name: Some("renamed".to_string()),
            ..TaskPatch::default()
        };
        let updated = store.update_task(&task.id, &patch).unwrap();
        assert_eq!(updated.name, "renamed");
        assert_eq!(updated.status, Status::Todo);
        assert_eq!(updated.position, 1_000);

        let placed = store
            .update_task(&task.id, &TaskPatch::placement(Status::Done, 5_000))
            .unwrap();
        assert_eq!(placed.name, "renamed");
        assert_eq!(placed.status, Status::Done);
        assert_eq!(placed.position, 5_000);
    }

    #[test]
    fn test_delete_then_get() {
        let store = InMemoryStore::new();
        let task = store
            .create_task(new_task("w1", "gone", Status::Todo, 1_000))
            .unwrap();
        store.delete_task(&task.id).unwrap();
        assert!(store.get_task(&task.id).is_err());
        assert!(store.delete_task(&task.id).is_err());
    }

    #[test]
    fn test_get_tasks_skips_unknown_ids_and_keeps_request_order() {
        let store = InMemoryStore::new();
        let a = store
            .create_task(new_task("w1", "a", Status::Todo, 1_000))
            .unwrap();
        let b = store
            .create_task(new_task("w1", "b", Status::Todo, 2_000))
            .unwrap();

        let got = store
            .get_tasks(&[b.id.clone(), TaskId::from_str("ghost"), a.id.clone()])
            .unwrap();
        let names: Vec<&str> = got.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_find_member() {
        let store = InMemoryStore::new();
        let member = Member {
            id: MemberId::from_str("m1"),
            workspace_id: WorkspaceId::from_str("w1"),
            user_id: UserId::from_str("u1"),
            name: "Dana".to_string(),
            email: "dana@example.com".to_string(),
            created_at: 1,
            updated_at: 1,
        };
        store.create_member(member.clone()).unwrap();

        let found = store
            .find_member(&WorkspaceId::from_str("w1"), &UserId::from_str("u1"))
            .unwrap();
        assert_eq!(found, Some(member));

        let missing = store
            .find_member(&WorkspaceId::from_str("w1"), &UserId::from_str("u2"))
            .unwrap();
        assert!(missing.is_none());
    }
}
