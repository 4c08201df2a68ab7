//! CLI command implementations

pub mod migrate;
pub mod serve;
pub mod stats;

pub use migrate::MigrateArgs;
pub use serve::ServeArgs;
pub use stats::StatsArgs;

use roster_core::Config;
use roster_db::{Database, DatabaseConfig};

/// Connect to the configured database and bring its schema up to date
pub(crate) async fn open_database(config: &Config) -> anyhow::Result<Database> {
    let db_config = DatabaseConfig::from(&config.database);
    let path = db_config.path.clone();

    let db = Database::connect(db_config)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to open database {}: {}", path.display(), e))?;
    db.migrate()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to migrate database: {}", e))?;

    Ok(db)
}
