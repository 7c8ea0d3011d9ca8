use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use trellis_core::api::{
    BulkUpdateRequest, CreateTaskRequest, DataEnvelope, DeletedTask, TaskView, UpdateTaskRequest,
    USER_HEADER,
};
use trellis_core::board::Board;
use trellis_core::ids::{MemberId, ProjectId, TaskId, WorkspaceId};
use trellis_core::model::{Status, Task};
use trellis_core::reconcile::{reconcile, Slot};

#[derive(Parser, Debug)]
#[command(name = "trellisctl")]
struct Args {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Render the board, one column per status.
    Board {
        #[arg(long)]
        server: String,
        #[arg(long)]
        user: Option<String>,
        #[arg(long)]
        workspace: String,
    },
    /// Create a task at the bottom of its column.
    Create {
        #[arg(long)]
        server: String,
        #[arg(long)]
        user: Option<String>,
        #[arg(long)]
        workspace: String,
        #[arg(long)]
        name: String,
        /// Column wire name, e.g. TODO. Defaults to BACKLOG.
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        project: Option<String>,
        #[arg(long)]
        assignee: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        due_date: Option<String>,
    },
    /// Fetch one task with its project/assignee snapshots.
    Get {
        #[arg(long)]
        server: String,
        #[arg(long)]
        user: Option<String>,
        #[arg(long)]
        task_id: String,
    },
    /// Patch named fields; anything omitted is left alone.
    Patch {
        #[arg(long)]
        server: String,
        #[arg(long)]
        user: Option<String>,
        #[arg(long)]
        task_id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        position: Option<i64>,
        #[arg(long)]
        project: Option<String>,
        #[arg(long)]
        assignee: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        due_date: Option<String>,
    },
    /// Delete a task.
    Delete {
        #[arg(long)]
        server: String,
        #[arg(long)]
        user: Option<String>,
        #[arg(long)]
        task_id: String,
    },
    /// List tasks as JSON, newest first.
    List {
        #[arg(long)]
        server: String,
        #[arg(long)]
        user: Option<String>,
        #[arg(long)]
        workspace: String,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        project: Option<String>,
        #[arg(long)]
        assignee: Option<String>,
        #[arg(long)]
        due_date: Option<String>,
        #[arg(long)]
        search: Option<String>,
    },
    /// Drag a task to a column slot: reconcile locally, push the diff.
    Move {
        #[arg(long)]
        server: String,
        #[arg(long)]
        user: Option<String>,
        #[arg(long)]
        workspace: String,
        #[arg(long)]
        task_id: String,
        /// Destination column wire name, e.g. IN_PROGRESS.
        #[arg(long)]
        to_status: String,
        /// 0-based slot in the destination column; past-the-end appends.
        #[arg(long)]
        to_index: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let client = reqwest::Client::new();

    match args.cmd {
        Cmd::Board {
            server,
            user,
            workspace,
        } => {
            let user = resolve_user(user)?;
            let views =
                fetch_tasks(&client, &server, &user, vec![("workspaceId", workspace)]).await?;
            let board = Board::project(views.into_iter().map(|v| v.task).collect());
            for (status, column) in board.iter() {
                println!("{status}");
                for (i, task) in column.iter().enumerate() {
                    println!(
                        "  {:>2}. {}  [{}]  {}",
                        i,
                        task.id.as_str(),
                        task.position,
                        task.name
                    );
                }
            }
        }
        Cmd::Create {
            server,
            user,
            workspace,
            name,
            status,
            project,
            assignee,
            description,
            due_date,
        } => {
            let user = resolve_user(user)?;
            let req = CreateTaskRequest {
                name,
                workspace_id: WorkspaceId::from_str(workspace),
                status: parse_status(status)?,
                project_id: project.map(ProjectId::from_str),
                assignee_id: assignee.map(MemberId::from_str),
                description,
                due_date,
            };
            let url = format!("{}/v1/tasks", server.trim_end_matches('/'));
            let resp: DataEnvelope<Task> = client
                .post(url)
                .header(USER_HEADER, &user)
                .json(&req)
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;
            println!("{}", serde_json::to_string_pretty(&resp.data)?);
        }
        Cmd::Get {
            server,
            user,
            task_id,
        } => {
            let user = resolve_user(user)?;
            let url = format!("{}/v1/tasks/{}", server.trim_end_matches('/'), task_id);
            let resp: DataEnvelope<TaskView> = client
                .get(url)
                .header(USER_HEADER, &user)
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;
            println!("{}", serde_json::to_string_pretty(&resp.data)?);
        }
        Cmd::Patch {
            server,
            user,
            task_id,
            name,
            status,
            position,
            project,
            assignee,
            description,
            due_date,
        } => {
            let user = resolve_user(user)?;
            let req = UpdateTaskRequest {
                name,
                description,
                project_id: project.map(ProjectId::from_str),
                assignee_id: assignee.map(MemberId::from_str),
                status: parse_status(status)?,
                position,
                due_date,
            };
            let url = format!("{}/v1/tasks/{}", server.trim_end_matches('/'), task_id);
            let resp: DataEnvelope<Task> = client
                .patch(url)
                .header(USER_HEADER, &user)
                .json(&req)
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;
            println!("{}", serde_json::to_string_pretty(&resp.data)?);
        }
        Cmd::Delete {
            server,
            user,
            task_id,
        } => {
            let user = resolve_user(user)?;
            let url = format!("{}/v1/tasks/{}", server.trim_end_matches('/'), task_id);
            let resp: DataEnvelope<DeletedTask> = client
                .delete(url)
                .header(USER_HEADER, &user)
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;
            println!("{}", serde_json::to_string_pretty(&resp.data)?);
        }
        Cmd::List {
            server,
            user,
            workspace,
            status,
            project,
            assignee,
            due_date,
            search,
        } => {
            let user = resolve_user(user)?;
            let mut query: Vec<(&str, String)> = vec![("workspaceId", workspace)];
            if let Some(status) = status {
                query.push(("status", status));
            }
            if let Some(project) = project {
                query.push(("projectId", project));
            }
            if let Some(assignee) = assignee {
                query.push(("assigneeId", assignee));
            }
            if let Some(due_date) = due_date {
                query.push(("dueDate", due_date));
            }
            if let Some(search) = search {
                query.push(("search", search));
            }
            let views = fetch_tasks(&client, &server, &user, query).await?;
            println!("{}", serde_json::to_string_pretty(&views)?);
        }
        Cmd::Move {
            server,
            user,
            workspace,
            task_id,
            to_status,
            to_index,
        } => {
            let user = resolve_user(user)?;
            let views =
                fetch_tasks(&client, &server, &user, vec![("workspaceId", workspace)]).await?;
            let board = Board::project(views.into_iter().map(|v| v.task).collect());
            let id = TaskId::from_str(task_id);
            let Some((status, index)) = board.find(&id) else {
                bail!("task {} is not on the board", id.as_str());
            };
            let out = reconcile(
                &board,
                trellis_core::reconcile::Move {
                    source: Slot { status, index },
                    dest: Some(Slot {
                        status: to_status.parse()?,
                        index: to_index,
                    }),
                },
            )?;
            println!("applying {} placement updates", out.diff.len());
            let url = format!("{}/v1/tasks/bulk-update", server.trim_end_matches('/'));
            let resp: DataEnvelope<Vec<Task>> = client
                .post(url)
                .header(USER_HEADER, &user)
                .json(&BulkUpdateRequest { tasks: out.diff })
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;
            println!("{}", serde_json::to_string_pretty(&resp.data)?);
        }
    }

    Ok(())
}

fn resolve_user(user: Option<String>) -> anyhow::Result<String> {
    user.or_else(|| std::env::var("TRELLIS_USER").ok())
        .context("no user id: pass --user or set TRELLIS_USER")
}

fn parse_status(status: Option<String>) -> anyhow::Result<Option<Status>> {
    Ok(status.map(|s| s.parse::<Status>()).transpose()?)
}

async fn fetch_tasks(
    client: &reqwest::Client,
    server: &str,
    user: &str,
    query: Vec<(&str, String)>,
) -> anyhow::Result<Vec<TaskView>> {
    let url = format!("{}/v1/tasks", server.trim_end_matches('/'));
    let resp: DataEnvelope<Vec<TaskView>> = client
        .get(url)
        .query(&query)
        .header(USER_HEADER, user)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    Ok(resp.data)
}
