//! SlotHub Server: reservation leases for bookable time slots.
//!
//! Main entry point that wires the crates together, hydrates the booking
//! core, and runs until a shutdown signal arrives.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use slothub_core::config::{AppConfig, StoreProvider};
use slothub_core::error::AppError;
use slothub_database::{DatabasePool, MemorySlotStore, SlotRepository, SlotStore};
use slothub_realtime::{EventBroadcaster, OutboundMessage};
use slothub_service::BookingContext;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("SLOTHUB_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting SlotHub v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Persistence gateway ──────────────────────────────
    let (store, db_pool): (Arc<dyn SlotStore>, Option<DatabasePool>) =
        match config.database.provider {
            StoreProvider::Postgres => {
                tracing::info!("Connecting to database...");
                let pool = DatabasePool::connect(&config.database).await?;

                slothub_database::migration::run_migrations(pool.pool()).await?;

                let repo: Arc<dyn SlotStore> = Arc::new(SlotRepository::new(pool.pool().clone()));
                (repo, Some(pool))
            }
            StoreProvider::Memory => {
                tracing::warn!("Using in-memory slot store; bookings are lost on exit");
                let memory: Arc<dyn SlotStore> = Arc::new(MemorySlotStore::new());
                (memory, None)
            }
        };

    if !store.health_check().await? {
        return Err(AppError::database("Slot store health check failed"));
    }

    // ── Step 2: Booking core ─────────────────────────────────────
    let broadcaster = Arc::new(EventBroadcaster::new(&config.realtime));
    let context = BookingContext::init(&config, store, broadcaster).await?;

    // ── Step 3: Event log observer ───────────────────────────────
    context.on_event(|envelope| match OutboundMessage::from(&envelope).to_json() {
        Ok(payload) => tracing::info!(target: "slothub::events", %payload, "Slot event"),
        Err(e) => tracing::warn!("Failed to encode slot event: {}", e),
    });

    let open = context.list_available().await.len();
    tracing::info!(
        slots = context.registry().len(),
        open,
        "SlotHub ready"
    );

    // ── Step 4: Graceful shutdown ────────────────────────────────
    shutdown_signal().await;
    tracing::info!("Shutdown signal received, starting graceful shutdown...");

    context.shutdown().await;
    if let Some(pool) = db_pool {
        pool.close().await;
    }

    tracing::info!("SlotHub shut down");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
