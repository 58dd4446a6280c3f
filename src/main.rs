use tokio::net::TcpListener;
use tracing::info;
use scrape_dispatch::{
    config::Config,
    api::routes::create_router,
    telemetry,
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    telemetry::init_tracing();

    // Load configuration
    let config = Config::load()?;
    let server_addr = config.server_addr;
    info!("Starting server on {}", server_addr);
    info!("Writing request log to {}", config.log_db_path.display());

    // Create application state
    let app_state = AppState::new(config)?;
    for descriptor in app_state.dispatcher.registry().descriptors() {
        info!(provider = %descriptor.id, endpoint = %descriptor.endpoint, "Provider registered");
    }

    // Build the router with routes
    let app = create_router(app_state);

    // Create the listener
    let listener = TcpListener::bind(server_addr).await?;

    // Start the server
    info!("Listening on {}", server_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
