//! Schema setup for the `timeslots` table.
//!
//! Migrations are embedded at build time from the workspace `migrations/`
//! directory, so the server binary carries the schema it expects.

use sqlx::PgPool;
use sqlx::migrate::Migrator;
use tracing::{debug, info};

use slothub_core::error::{AppError, ErrorKind};

static SLOT_MIGRATIONS: Migrator = sqlx::migrate!("../../migrations");

/// Brings the slot schema up to date before the registry is hydrated.
pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    let known = SLOT_MIGRATIONS.iter().count();
    info!(migrations = known, "Applying timeslot schema migrations");

    for migration in SLOT_MIGRATIONS.iter() {
        debug!(
            version = migration.version,
            description = %migration.description,
            "Embedded migration"
        );
    }

    SLOT_MIGRATIONS.run(pool).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Database,
            format!("Timeslot schema migration failed: {e}"),
            e,
        )
    })?;

    info!("Timeslot schema is up to date");
    Ok(())
}
