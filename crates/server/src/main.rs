use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use tokio::signal;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use trellis_server::config::ServerConfig;
use trellis_server::{http, seed};
use trellis_store::{InMemoryStore, SqliteStore, Store};

#[derive(Debug, Parser)]
#[command(name = "trellis-server", version, about = "Task board ordering server")]
struct Cli {
    /// Where the HTTP API will listen, e.g. 127.0.0.1:8321
    #[arg(long, default_value = "127.0.0.1:8321")]
    listen: String,

    /// SQLite database path, or the literal "memory" for a non-durable store.
    #[arg(long, default_value = ".trellis/trellis.db")]
    db: String,

    /// Provision the demo workspace fixtures on startup.
    #[arg(long, default_value_t = false)]
    seed: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt()
        .with_target(false)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = ServerConfig {
        listen: cli.listen,
        db: cli.db,
        seed: cli.seed,
    };
    info!("starting server with config: {:?}", config);

    let store: Arc<dyn Store> = if config.db == "memory" {
        Arc::new(InMemoryStore::new())
    } else {
        Arc::new(SqliteStore::open(Path::new(&config.db))?)
    };

    if config.seed {
        let summary = seed::seed_demo(store.as_ref())?;
        info!(
            "seeded workspace {}: {} members, {} projects, {} tasks",
            summary.workspace.as_str(),
            summary.members,
            summary.projects,
            summary.tasks
        );
    }

    let app = http::router(store)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = config.listen.parse()?;
    info!("listening on http://{}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = signal::ctrl_c().await;
    info!("shutdown requested");
}
