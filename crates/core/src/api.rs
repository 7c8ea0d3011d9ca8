//! Wire types shared by the server and its clients.

use serde::{Deserialize, Serialize};

use crate::ids::{MemberId, ProjectId, TaskId, WorkspaceId};
use crate::model::{Member, PositionUpdate, Project, Status, Task};

/// Header carrying the verified principal id, forwarded by the gateway.
pub const USER_HEADER: &str = "x-user-id";

/// Standard `{"data": ...}` success envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

/// Task creation body. The position is computed server-side from the target
/// column's current maximum.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub name: String,
    pub workspace_id: WorkspaceId,
    /// Defaults to `BACKLOG` when omitted.
    #[serde(default)]
    pub status: Option<Status>,
    #[serde(default)]
    pub project_id: Option<ProjectId>,
    #[serde(default)]
    pub assignee_id: Option<MemberId>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
}

/// Partial task update body. Status and position change only when explicitly
/// present; nothing here ever changes position implicitly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub project_id: Option<ProjectId>,
    #[serde(default)]
    pub assignee_id: Option<MemberId>,
    #[serde(default)]
    pub status: Option<Status>,
    #[serde(default)]
    pub position: Option<i64>,
    #[serde(default)]
    pub due_date: Option<String>,
}

/// Task list query: equality filters plus a name search, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTasksQuery {
    pub workspace_id: WorkspaceId,
    #[serde(default)]
    pub project_id: Option<ProjectId>,
    #[serde(default)]
    pub assignee_id: Option<MemberId>,
    #[serde(default)]
    pub status: Option<Status>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
}

/// Bulk placement body. Every entry must reference a task in the same
/// workspace; entries are applied one by one in the order given.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkUpdateRequest {
    pub tasks: Vec<PositionUpdate>,
}

/// Deletion acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletedTask {
    pub id: TaskId,
}

/// Task enriched with read-time project/assignee snapshots.
///
/// The ordering engine never consumes these enriched fields; they exist for
/// display surfaces only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskView {
    #[serde(flatten)]
    pub task: Task,
    #[serde(default)]
    pub project: Option<Project>,
    #[serde(default)]
    pub assignee: Option<Member>,
}
