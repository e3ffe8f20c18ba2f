// Dashboard server binary entry point
//
// Usage: cargo run --bin dashboard_server
// Data:  DATA_DIR/countbyyear.csv and DATA_DIR/heatmap.csv

use bird_banding_dashboard::{create_router, AppState, DashboardConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (structured logging)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    // Default log level: info for our crate, warn for others
                    "bird_banding_dashboard=info,tower_http=debug,axum=debug,warn".into()
                }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting dashboard server...");

    let config = DashboardConfig::from_env()?;
    tracing::info!("Configuration:");
    tracing::info!("  DATA_DIR: {}", config.data_dir.display());
    tracing::info!("  HEATMAP_YEAR: {}", config.views.heatmap_year);
    tracing::info!("  DEFAULT_SPECIES: {}", config.default_species);
    tracing::info!("  IMAGE: {:?}", config.image);

    // Startup data errors are fatal: no partial-degradation mode
    let state = AppState::new(&config).await?;
    tracing::info!("Application state initialized successfully");

    let app = create_router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
