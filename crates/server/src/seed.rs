//! Demo fixtures for local runs.

use trellis_core::ids::{MemberId, ProjectId, TaskId, UserId, WorkspaceId};
use trellis_core::model::{Member, Project, Status, Workspace};
use trellis_core::now_ms;
use trellis_store::{NewTask, Store, StoreError};

/// What [`seed_demo`] wrote, for the startup log line.
pub struct SeedSummary {
    pub workspace: WorkspaceId,
    pub members: usize,
    pub projects: usize,
    pub tasks: usize,
}

/// Seeds the fixed `demo` workspace with two members, a project, and a board
/// spread across every column. All ids are stable, so seeding an existing
/// database converges instead of duplicating.
pub fn seed_demo(store: &dyn Store) -> Result<SeedSummary, StoreError> {
    let now = now_ms();
    let workspace_id = WorkspaceId::from_str("demo");
    store.create_workspace(Workspace {
        id: workspace_id.clone(),
        name: "Demo Workspace".to_string(),
        created_at: now,
        updated_at: now,
    })?;

    let members = [("alice", "Alice"), ("bob", "Bob")];
    for (user, name) in members {
        store.create_member(Member {
            id: MemberId::from_str(format!("member-{user}")),
            workspace_id: workspace_id.clone(),
            user_id: UserId::from_str(user),
            name: name.to_string(),
            email: format!("{user}@example.com"),
            created_at: now,
            updated_at: now,
        })?;
    }

    let project_id = ProjectId::from_str("project-board");
    store.create_project(Project {
        id: project_id.clone(),
        workspace_id: workspace_id.clone(),
        name: "Board".to_string(),
        created_at: now,
        updated_at: now,
    })?;

    // (id, name, status, position, assignee)
    let tasks: &[(&str, &str, Status, i64, Option<&str>)] = &[
        ("task-01", "Collect launch feedback", Status::Backlog, 1_000, None),
        ("task-02", "Write onboarding guide", Status::Backlog, 2_000, Some("member-bob")),
        ("task-03", "Fix drag handle hitbox", Status::Todo, 1_000, Some("member-alice")),
        ("task-04", "Virtualize long columns", Status::Todo, 2_000, None),
        ("task-05", "Harden bulk reorder", Status::InProgress, 1_000, Some("member-alice")),
        ("task-06", "Rate limit middleware", Status::InReview, 1_000, Some("member-bob")),
        ("task-07", "Workspace switcher", Status::Done, 1_000, None),
    ];
    for (id, name, status, position, assignee) in tasks {
        store.create_task(NewTask {
            id: Some(TaskId::from_str(*id)),
            workspace_id: workspace_id.clone(),
            project_id: Some(project_id.clone()),
            assignee_id: assignee.map(MemberId::from_str),
            name: name.to_string(),
            description: None,
            status: *status,
            position: *position,
            due_date: None,
        })?;
    }

    Ok(SeedSummary {
        workspace: workspace_id,
        members: members.len(),
        projects: 1,
        tasks: tasks.len(),
    })
}
