pub mod handlers;
pub mod routes;
pub mod shared;
pub mod state;
pub mod system;

use axum::http::{header, Method};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = shared::config::find_config_path();
    let config = Arc::new(shared::config::load_config(config_path.as_deref())?);

    let log_file = system::tracing::initialize(&config.logging)?;
    tracing::info!("Logging to {}", log_file.display());
    match &config_path {
        Some(path) => tracing::info!("Loaded config from: {}", path.display()),
        None => tracing::info!("Using default embedded configuration"),
    }

    let db_path = shared::config::get_database_path(&config);
    let db = shared::data::db::connect(&db_path)
        .await
        .map_err(|e| anyhow::anyhow!("db init failed: {e}"))?;

    let tasks = system::tasks::initialization::initialize_scheduled_tasks(db.clone(), config.clone());
    let worker = tasks.worker;
    tokio::spawn(async move {
        worker.run_loop().await;
    });

    let state = state::AppState::new(db, &config, tasks.service);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    let app = routes::configure_routes(state).layer(cors);

    let port = config.server.port;
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();

    tracing::info!("Attempting to bind server to http://{}", addr);
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => {
            tracing::info!("Server successfully bound to {}", addr);
            listener
        }
        Err(e) => {
            if e.kind() == std::io::ErrorKind::AddrInUse {
                tracing::error!(
                    "Error: Port {} is already in use. Please ensure no other process is using this port.",
                    port
                );
            } else {
                tracing::error!("Failed to bind to port {}. Error: {}", port, e);
            }
            return Err(e.into());
        }
    };

    axum::serve(listener, app).await?;

    Ok(())
}
