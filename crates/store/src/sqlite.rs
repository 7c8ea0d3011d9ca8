use std::path::Path;
use std::sync::Mutex;

use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};

use trellis_core::ids::{MemberId, ProjectId, TaskId, UserId, WorkspaceId};
use trellis_core::model::{Member, Project, Status, Task, Workspace};
use trellis_core::{new_id, now_ms};

use crate::error::StoreError;
use crate::traits::{NewTask, Store, TaskFilter, TaskOrder, TaskPatch};

const TASK_COLS: &str =
    "id, workspace_id, project_id, assignee_id, name, description, status, position, due_date, created_at, updated_at";

/// Embedded SQLite store.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens (creating if needed) the database at `db_path` and applies the
    /// schema.
    pub fn open(db_path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let conn = Connection::open(db_path).map_err(|e| {
            StoreError::Backend(format!("open sqlite db {}: {e}", db_path.display()))
        })?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        let init_sql = include_str!("../migrations/0001_init.sql");
        conn.execute_batch(init_sql)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn task_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Task> {
        Ok(Task {
            id: TaskId::from_str(row.get::<_, String>(0)?),
            workspace_id: WorkspaceId::from_str(row.get::<_, String>(1)?),
            project_id: row.get::<_, Option<String>>(2)?.map(ProjectId::from_str),
            assignee_id: row.get::<_, Option<String>>(3)?.map(MemberId::from_str),
            name: row.get(4)?,
            description: row.get(5)?,
            status: row.get::<_, String>(6)?.parse().unwrap_or(Status::Backlog),
            position: row.get(7)?,
            due_date: row.get(8)?,
            created_at: row.get(9)?,
            updated_at: row.get(10)?,
        })
    }

    fn member_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Member> {
        Ok(Member {
            id: MemberId::from_str(row.get::<_, String>(0)?),
            workspace_id: WorkspaceId::from_str(row.get::<_, String>(1)?),
            user_id: UserId::from_str(row.get::<_, String>(2)?),
            name: row.get(3)?,
            email: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }

    fn project_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Project> {
        Ok(Project {
            id: ProjectId::from_str(row.get::<_, String>(0)?),
            workspace_id: WorkspaceId::from_str(row.get::<_, String>(1)?),
            name: row.get(2)?,
            created_at: row.get(3)?,
            updated_at: row.get(4)?,
        })
    }

    fn query_task(conn: &Connection, id: &TaskId) -> Result<Option<Task>, StoreError> {
        let sql = format!("SELECT {TASK_COLS} FROM tasks WHERE id = ?1");
        let task = conn
            .query_row(&sql, params![id.0], Self::task_from_row)
            .optional()?;
        Ok(task)
    }

    fn write_task(conn: &Connection, task: &Task) -> Result<(), StoreError> {
        conn.execute(
            "INSERT INTO tasks(id, workspace_id, project_id, assignee_id, name, description, status, position, due_date, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
             ON CONFLICT(id) DO UPDATE SET
               workspace_id = excluded.workspace_id,
               project_id = excluded.project_id,
               assignee_id = excluded.assignee_id,
               name = excluded.name,
               description = excluded.description,
               status = excluded.status,
               position = excluded.position,
               due_date = excluded.due_date,
               created_at = excluded.created_at,
               updated_at = excluded.updated_at",
            params![
                task.id.0,
                task.workspace_id.0,
                task.project_id.as_ref().map(|p| p.0.clone()),
                task.assignee_id.as_ref().map(|a| a.0.clone()),
                task.name,
                task.description,
                task.status.as_str(),
                task.position,
                task.due_date,
                task.created_at,
                task.updated_at,
            ],
        )?;
        Ok(())
    }
}

impl Store for SqliteStore {
    fn create_workspace(&self, workspace: Workspace) -> Result<Workspace, StoreError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO workspaces(id, name, created_at, updated_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                workspace.id.0,
                workspace.name,
                workspace.created_at,
                workspace.updated_at
            ],
        )?;
        Ok(workspace)
    }

    fn create_member(&self, member: Member) -> Result<Member, StoreError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO members(id, workspace_id, user_id, name, email, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                member.id.0,
                member.workspace_id.0,
                member.user_id.0,
                member.name,
                member.email,
                member.created_at,
                member.updated_at
            ],
        )?;
        Ok(member)
    }

    fn find_member(
        &self,
        workspace_id: &WorkspaceId,
        user_id: &UserId,
    ) -> Result<Option<Member>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let member = conn
            .query_row(
                "SELECT id, workspace_id, user_id, name, email, created_at, updated_at
                 FROM members WHERE workspace_id = ?1 AND user_id = ?2 LIMIT 1",
                params![workspace_id.0, user_id.0],
                Self::member_from_row,
            )
            .optional()?;
        Ok(member)
    }

    fn get_members(&self, ids: &[MemberId]) -> Result<Vec<Member>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let conn = self.conn.lock().unwrap();
        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "SELECT id, workspace_id, user_id, name, email, created_at, updated_at
             FROM members WHERE id IN ({placeholders})"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(
            params_from_iter(ids.iter().map(|id| id.0.clone())),
            Self::member_from_row,
        )?;
        let mut members = Vec::new();
        for row in rows {
            members.push(row?);
        }
        Ok(members)
    }

    fn create_project(&self, project: Project) -> Result<Project, StoreError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO projects(id, workspace_id, name, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                project.id.0,
                project.workspace_id.0,
                project.name,
                project.created_at,
                project.updated_at
            ],
        )?;
        Ok(project)
    }

    fn get_projects(&self, ids: &[ProjectId]) -> Result<Vec<Project>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let conn = self.conn.lock().unwrap();
        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "SELECT id, workspace_id, name, created_at, updated_at
             FROM projects WHERE id IN ({placeholders})"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(
            params_from_iter(ids.iter().map(|id| id.0.clone())),
            Self::project_from_row,
        )?;
        let mut projects = Vec::new();
        for row in rows {
            projects.push(row?);
        }
        Ok(projects)
    }

    fn create_task(&self, new: NewTask) -> Result<Task, StoreError> {
        let conn = self.conn.lock().unwrap();
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
        Self::write_task(&conn, &task)?;
        Ok(task)
    }

    fn get_task(&self, id: &TaskId) -> Result<Task, StoreError> {
        let conn = self.conn.lock().unwrap();
        Self::query_task(&conn, id)?.ok_or_else(|| StoreError::not_found("Task", id.as_str()))
    }

    fn get_tasks(&self, ids: &[TaskId]) -> Result<Vec<Task>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let conn = self.conn.lock().unwrap();
        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!("SELECT {TASK_COLS} FROM tasks WHERE id IN ({placeholders})");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(
            params_from_iter(ids.iter().map(|id| id.0.clone())),
            Self::task_from_row,
        )?;
        let mut tasks = Vec::new();
        for row in rows {
            tasks.push(row?);
        }
        Ok(tasks)
    }

    fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let mut sql = format!("SELECT {TASK_COLS} FROM tasks WHERE 1=1");
        let mut args: Vec<Value> = Vec::new();
        if let Some(ws) = &filter.workspace_id {
            sql.push_str(" AND workspace_id = ?");
            args.push(Value::Text(ws.0.clone()));
        }
        if let Some(project) = &filter.project_id {
            sql.push_str(" AND project_id = ?");
            args.push(Value::Text(project.0.clone()));
        }
        if let Some(assignee) = &filter.assignee_id {
            sql.push_str(" AND assignee_id = ?");
            args.push(Value::Text(assignee.0.clone()));
        }
        if let Some(status) = filter.status {
            sql.push_str(" AND status = ?");
            args.push(Value::Text(status.as_str().to_string()));
        }
        if let Some(due) = &filter.due_date {
            sql.push_str(" AND due_date = ?");
            args.push(Value::Text(due.clone()));
        }
        if let Some(query) = &filter.search {
            sql.push_str(" AND lower(name) LIKE ?");
            args.push(Value::Text(format!("%{}%", query.to_lowercase())));
        }
        match filter.order {
            TaskOrder::CreatedDesc => sql.push_str(" ORDER BY created_at DESC, id DESC"),
            TaskOrder::PositionDesc => sql.push_str(" ORDER BY position DESC, id ASC"),
        }
        if let Some(limit) = filter.limit {
            sql.push_str(" LIMIT ?");
            args.push(Value::Integer(limit as i64));
        }

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(args), Self::task_from_row)?;
        let mut tasks = Vec::new();
        for row in rows {
            tasks.push(row?);
        }
        Ok(tasks)
    }

    fn update_task(&self, id: &TaskId, patch: &TaskPatch) -> Result<Task, StoreError> {
        let conn = self.conn.lock().unwrap();
        let mut task =
            Self::query_task(&conn, id)?.ok_or_else(|| StoreError::not_found("Task", id.as_str()))?;
        patch.apply_to(&mut task);
        task.updated_at = now_ms();
        Self::write_task(&conn, &task)?;
        Ok(task)
    }

    fn delete_task(&self, id: &TaskId) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();
        let affected = conn.execute("DELETE FROM tasks WHERE id = ?1", params![id.0])?;
        if affected == 0 {
            return Err(StoreError::not_found("Task", id.as_str()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

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
    fn sqlite_open_and_migrate() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("trellis.db");
        let _ = SqliteStore::open(&db_path).unwrap();
        // Re-opening against the existing schema must also work.
        let _ = SqliteStore::open(&db_path).unwrap();
    }

    #[test]
    fn task_round_trip_with_optional_fields() {
        let dir = tempdir().unwrap();
        let store = SqliteStore::open(&dir.path().join("trellis.db")).unwrap();

        let created = store
            .create_task(NewTask {
                id: Some(TaskId::from_str("t1")),
                workspace_id: WorkspaceId::from_str("w1"),
                project_id: Some(ProjectId::from_str("p1")),
                assignee_id: None,
                name: "ship it".to_string(),
                description: Some("the big one".to_string()),
                status: Status::InReview,
                position: 3_000,
                due_date: Some("2026-09-01T00:00:00Z".to_string()),
            })
            .unwrap();
        let fetched = store.get_task(&TaskId::from_str("t1")).unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.project_id, Some(ProjectId::from_str("p1")));
        assert_eq!(fetched.assignee_id, None);
        assert_eq!(fetched.status, Status::InReview);
    }

    #[test]
    fn list_orders_and_limits() {
        let dir = tempdir().unwrap();
        let store = SqliteStore::open(&dir.path().join("trellis.db")).unwrap();
        for (name, position) in [("a", 2_000), ("b", 4_000), ("c", 1_000)] {
            store
                .create_task(new_task("w1", name, Status::Todo, position))
                .unwrap();
        }

        let max = store
            .list_tasks(&TaskFilter {
                workspace_id: Some(WorkspaceId::from_str("w1")),
                status: Some(Status::Todo),
                order: TaskOrder::PositionDesc,
                limit: Some(1),
                ..TaskFilter::default()
            })
            .unwrap();
        assert_eq!(max.len(), 1);
        assert_eq!(max[0].position, 4_000);

        let other_ws = store
            .list_tasks(&TaskFilter {
                workspace_id: Some(WorkspaceId::from_str("w2")),
                ..TaskFilter::default()
            })
            .unwrap();
        assert!(other_ws.is_empty());
    }

    #[test]
    fn search_matches_name_substring() {
        let dir = tempdir().unwrap();
        let store = SqliteStore::open(&dir.path().join("trellis.db")).unwrap();
        store
            .create_task(new_task("w1", "Review PR queue", Status::Todo, 1_000))
            .unwrap();
        store
            .create_task(new_task("w1", "water plants", Status::Todo, 2_000))
            .unwrap();

        let hits = store
            .list_tasks(&TaskFilter {
                workspace_id: Some(WorkspaceId::from_str("w1")),
                search: Some("pr QUEUE".to_string()),
                ..TaskFilter::default()
            })
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Review PR queue");
    }

    #[test]
    fn patch_and_delete() {
        let dir = tempdir().unwrap();
        let store = SqliteStore::open(&dir.path().join("trellis.db")).unwrap();
        let task = store
            .create_task(new_task("w1", "draft", Status::Backlog, 1_000))
            .unwrap();

        let moved = store
            .update_task(&task.id, &TaskPatch::placement(Status::Done, 7_000))
            .unwrap();
        assert_eq!(moved.status, Status::Done);
        assert_eq!(moved.position, 7_000);
        assert_eq!(moved.name, "draft");

        store.delete_task(&task.id).unwrap();
        assert!(matches!(
            store.get_task(&task.id),
            Err(StoreError::NotFound { .. })
        ));
        assert!(store.delete_task(&task.id).is_err());
    }

    #[test]
    fn rows_survive_reopen() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("trellis.db");
        {
            let store = SqliteStore::open(&db_path).unwrap();
            store
                .create_task(new_task("w1", "durable", Status::Todo, 1_000))
                .unwrap();
        }
        let store = SqliteStore::open(&db_path).unwrap();
        let tasks = store
            .list_tasks(&TaskFilter {
                workspace_id: Some(WorkspaceId::from_str("w1")),
                ..TaskFilter::default()
            })
            .unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].name, "durable");
    }

    #[test]
    fn member_and_project_lookups() {
        let dir = tempdir().unwrap();
        let store = SqliteStore::open(&dir.path().join("trellis.db")).unwrap();
        store
            .create_member(Member {
                id: MemberId::from_str("m1"),
                workspace_id: WorkspaceId::from_str("w1"),
                user_id: UserId::from_str("u1"),
                name: "Dana".to_string(),
                email: "dana@example.com".to_string(),
                created_at: 1,
                updated_at: 1,
            })
            .unwrap();
        store
            .create_project(Project {
                id: ProjectId::from_str("p1"),
                workspace_id: WorkspaceId::from_str("w1"),
                name: "Platform".to_string(),
                created_at: 1,
                updated_at: 1,
            })
            .unwrap();

        let member = store
            .find_member(&WorkspaceId::from_str("w1"), &UserId::from_str("u1"))
            .unwrap();
        assert_eq!(member.map(|m| m.name), Some("Dana".to_string()));

        let none = store
            .find_member(&WorkspaceId::from_str("w9"), &UserId::from_str("u1"))
            .unwrap();
        assert!(none.is_none());

        let projects = store
            .get_projects(&[ProjectId::from_str("p1"), ProjectId::from_str("ghost")])
            .unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].name, "Platform");

        let members = store.get_members(&[MemberId::from_str("m1")]).unwrap();
        assert_eq!(members.len(), 1);
    }
}
