use trellis_core::ids::{MemberId, ProjectId, TaskId, UserId, WorkspaceId};
use trellis_core::model::{Member, Project, Status, Task, Workspace};

use crate::error::StoreError;

/// Fields for creating a task. The store allocates a ULID id when `id` is
/// `None` and stamps `createdAt`/`updatedAt` itself.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub id: Option<TaskId>,
    pub workspace_id: WorkspaceId,
    pub project_id: Option<ProjectId>,
    pub assignee_id: Option<MemberId>,
    pub name: String,
    pub description: Option<String>,
    pub status: Status,
    pub position: i64,
    pub due_date: Option<String>,
}

/// Partial task update. `None` fields are left untouched; position and
/// status change only when explicitly present.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub project_id: Option<ProjectId>,
    pub assignee_id: Option<MemberId>,
    pub status: Option<Status>,
    pub position: Option<i64>,
    pub due_date: Option<String>,
}

impl TaskPatch {
    /// Patch carrying only the reconciliation pair.
    pub fn placement(status: Status, position: i64) -> Self {
        TaskPatch {
            status: Some(status),
            position: Some(position),
            ..TaskPatch::default()
        }
    }

    /// Copies the set fields onto `task`, leaving the rest alone.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(name) = &self.name {
            task.name = name.clone();
        }
        if let Some(description) = &self.description {
            task.description = Some(description.clone());
        }
        if let Some(project_id) = &self.project_id {
            task.project_id = Some(project_id.clone());
        }
        if let Some(assignee_id) = &self.assignee_id {
            task.assignee_id = Some(assignee_id.clone());
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(position) = self.position {
            task.position = position;
        }
        if let Some(due_date) = &self.due_date {
            task.due_date = Some(due_date.clone());
        }
    }
}

/// Result ordering for task listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskOrder {
    /// Newest first. The read surface's default.
    #[default]
    CreatedDesc,
    /// Descending by position; with `limit: 1` this fetches a column's
    /// current maximum for creation-time placement.
    PositionDesc,
}

/// Filter for task listings. Set fields must all match (equality); `search`
/// is a case-insensitive name substring.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub workspace_id: Option<WorkspaceId>,
    pub project_id: Option<ProjectId>,
    pub assignee_id: Option<MemberId>,
    pub status: Option<Status>,
    pub due_date: Option<String>,
    pub search: Option<String>,
    pub order: TaskOrder,
    pub limit: Option<usize>,
}

/// Record store shared by the service layer and the seeding path.
///
/// Workspace, member, and project records are inserted as built by the
/// provisioning caller; tasks go through [`NewTask`]/[`TaskPatch`] and get
/// their system fields stamped here.
pub trait Store: Send + Sync {
    fn create_workspace(&self, workspace: Workspace) -> Result<Workspace, StoreError>;

    fn create_member(&self, member: Member) -> Result<Member, StoreError>;
    /// Membership lookup backing every authorization check.
    fn find_member(
        &self,
        workspace_id: &WorkspaceId,
        user_id: &UserId,
    ) -> Result<Option<Member>, StoreError>;
    /// Fetches the members whose ids are in `ids`; unknown ids are skipped.
    fn get_members(&self, ids: &[MemberId]) -> Result<Vec<Member>, StoreError>;

    fn create_project(&self, project: Project) -> Result<Project, StoreError>;
    /// Fetches the projects whose ids are in `ids`; unknown ids are skipped.
    fn get_projects(&self, ids: &[ProjectId]) -> Result<Vec<Project>, StoreError>;

    fn create_task(&self, new: NewTask) -> Result<Task, StoreError>;
    fn get_task(&self, id: &TaskId) -> Result<Task, StoreError>;
    /// Fetches the tasks whose ids are in `ids`; unknown ids are skipped, so
    /// the result can be shorter than the input.
    fn get_tasks(&self, ids: &[TaskId]) -> Result<Vec<Task>, StoreError>;
    fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, StoreError>;
    fn update_task(&self, id: &TaskId, patch: &TaskPatch) -> Result<Task, StoreError>;
    fn delete_task(&self, id: &TaskId) -> Result<(), StoreError>;
}
