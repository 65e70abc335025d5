use library_borrowing::{
    adapters::{memory::MemoryStore, postgres},
    api::{handlers::AppState, router::create_router},
    config::AppConfig,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "library_borrowing=debug,tower_http=debug,axum=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    // Initialize the entity store
    let service_deps = match &config.database_url {
        Some(database_url) => {
            tracing::info!("Using PostgreSQL store");

            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(config.database_max_connections)
                .connect(database_url)
                .await?;

            postgres::MIGRATOR.run(&pool).await?;

            postgres::service_dependencies(pool)
        }
        None => {
            tracing::warn!("DATABASE_URL is not set; using in-memory store");
            Arc::new(MemoryStore::new()).into_dependencies()
        }
    };

    // Create application state
    let app_state = Arc::new(AppState { service_deps });

    // Create router
    let app = create_router(app_state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    // Start server
    axum::serve(listener, app).await?;

    Ok(())
}
