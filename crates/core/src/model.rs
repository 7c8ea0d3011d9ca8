//! Persisted record types and the board status enumeration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ids::{MemberId, ProjectId, TaskId, UserId, WorkspaceId};

/// Column a task sits in on the board.
///
/// The set is closed; column initialization iterates [`Status::ALL`] so a new
/// variant cannot be forgotten anywhere tasks are grouped.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    /// Not yet scheduled.
    Backlog,
    /// Scheduled, not started.
    Todo,
    /// Being worked on.
    InProgress,
    /// Awaiting review.
    InReview,
    /// Finished.
    Done,
}

impl Status {
    /// All columns in board display order.
    pub const ALL: [Status; 5] = [
        Status::Backlog,
        Status::Todo,
        Status::InProgress,
        Status::InReview,
        Status::Done,
    ];

    /// Stable wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Backlog => "BACKLOG",
            Status::Todo => "TODO",
            Status::InProgress => "IN_PROGRESS",
            Status::InReview => "IN_REVIEW",
            Status::Done => "DONE",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error parsing a status wire name.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown status: {0}")]
pub struct ParseStatusError(pub String);

impl std::str::FromStr for Status {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BACKLOG" => Ok(Status::Backlog),
            "TODO" => Ok(Status::Todo),
            "IN_PROGRESS" => Ok(Status::InProgress),
            "IN_REVIEW" => Ok(Status::InReview),
            "DONE" => Ok(Status::Done),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}

/// Persisted task record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Opaque unique identifier, immutable after creation.
    pub id: TaskId,
    /// Tenant scope; fixed for the task's lifetime.
    pub workspace_id: WorkspaceId,
    /// Owning project, when assigned.
    #[serde(default)]
    pub project_id: Option<ProjectId>,
    /// Assigned member, when any.
    #[serde(default)]
    pub assignee_id: Option<MemberId>,
    /// Human name.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Board column.
    pub status: Status,
    /// Rank within the `(workspace, status)` column; ascending, multiples of
    /// 1000 by construction, capped at 1,000,000.
    pub position: i64,
    /// Due date (RFC 3339), opaque to the ordering engine.
    #[serde(default)]
    pub due_date: Option<String>,
    /// Creation time (epoch ms), stamped by the store.
    pub created_at: i64,
    /// Last update time (epoch ms), stamped by the store.
    pub updated_at: i64,
}

/// One `(task, status, position)` change, produced by reconciliation and
/// consumed by the bulk-update endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PositionUpdate {
    /// Task to move.
    pub id: TaskId,
    /// Column the task ends up in.
    pub status: Status,
    /// New rank within that column.
    pub position: i64,
}

/// Tenant record. Held for membership checks; no HTTP surface of its own.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    /// Workspace identifier.
    pub id: WorkspaceId,
    /// Human name.
    pub name: String,
    /// Creation time (epoch ms).
    pub created_at: i64,
    /// Last update time (epoch ms).
    pub updated_at: i64,
}

/// Project record, used to denormalize task reads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Project identifier.
    pub id: ProjectId,
    /// Workspace the project belongs to.
    pub workspace_id: WorkspaceId,
    /// Human name.
    pub name: String,
    /// Creation time (epoch ms).
    pub created_at: i64,
    /// Last update time (epoch ms).
    pub updated_at: i64,
}

/// Membership of an external principal in a workspace.
///
/// Name and email are snapshots taken when the membership was provisioned;
/// the identity service itself is outside this system.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    /// Membership record identifier. Task `assigneeId` points here.
    pub id: MemberId,
    /// Workspace the membership grants access to.
    pub workspace_id: WorkspaceId,
    /// External principal.
    pub user_id: UserId,
    /// Display name snapshot.
    pub name: String,
    /// Email snapshot.
    pub email: String,
    /// Creation time (epoch ms).
    pub created_at: i64,
    /// Last update time (epoch ms).
    pub updated_at: i64,
}
