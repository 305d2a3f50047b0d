use school_portal::{resolve_api_base, resolve_session_path, ApiClient, AppState, SessionStore};
use std::{env, net::SocketAddr};
use tokio::fs;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let session_path = resolve_session_path();
    if let Some(parent) = session_path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let sessions = SessionStore::open(session_path).await;
    let api_base = resolve_api_base();
    info!("using backend API at {api_base}");
    let state = AppState::new(ApiClient::new(api_base), sessions);

    let app = school_portal::router(state);

    let port = env::var("PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
