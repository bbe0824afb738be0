use std::net::SocketAddr;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use landrop::config::Config;
use landrop::{create_router, net, sweeper, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "landrop=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting landrop...");

    // Failure to create the storage directory is fatal.
    let config = Config::load()?;
    let port = config.server.port;
    let addr = format!("{}:{}", config.server.host, port);
    let lifetime = config.file_lifetime();
    let interval = config.sweep_interval();

    let state = AppState::new(config);

    sweeper::spawn(
        state.storage.clone(),
        state.events.clone(),
        lifetime,
        interval,
    );

    let local_ip = state.local_ip.clone();
    let storage_path = state.storage.base().to_path_buf();
    let app = create_router(state);

    // Failure to bind the listening port is fatal.
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Local access: http://localhost:{}", port);
    tracing::info!("Network access: http://{}:{}", local_ip, port);
    tracing::info!("Upload directory: {:?}", storage_path);
    tracing::info!("Network status: {}", net::test_connectivity().status);
    if local_ip == "localhost" {
        tracing::warn!("No network IP detected; only local access is available");
    }

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
