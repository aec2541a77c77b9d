use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};
use newscheck::{
    api::client::HttpBackend,
    config::Config,
    controller::Controller,
    web::routes::create_router,
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    // Load configuration
    let config = Config::load()?;
    let server_addr = config.server_addr;
    info!(backend = %config.backend_url, "using verification backend");

    let backend = HttpBackend::from_config(&config)?;
    let controller = Arc::new(Controller::with_limits(backend, config.session_limits));

    let status = controller.backend_status().await;
    if !status.healthy {
        warn!(status = %status.status, "backend is not healthy yet");
    }

    let app_state = AppState {
        config: Arc::new(config),
        controller,
    };

    let app = create_router(app_state);

    let listener = TcpListener::bind(server_addr).await?;
    info!("Listening on http://{}", server_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
