use interview_coordinator::{config::init_config, router, AppState};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"));
    if json_logs {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let config = init_config()?;
    let app_state = AppState::new(config)?;

    if app_state.backend.has_token() {
        match app_state.store.load().await {
            Ok(snapshot) => info!(
                count = snapshot.applications.len(),
                "Initial interview list loaded"
            ),
            Err(e) => warn!("Initial interview list unavailable: {}", e),
        }
    } else {
        info!("No API_TOKEN configured; waiting for POST /api/session");
        app_state.store.mark_unauthorized().await;
    }

    let app = router(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Interview surface listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
