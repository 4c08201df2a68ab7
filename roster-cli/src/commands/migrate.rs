//! Migrate command - create or upgrade the database schema

use clap::Args;
use roster_core::Config;

use super::open_database;

/// Apply pending migrations
#[derive(Args, Debug)]
pub struct MigrateArgs {}

impl MigrateArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let db = open_database(config).await?;
        println!(
            "Database ready: {}",
            config.database.resolved_path().display()
        );
        db.close().await;
        Ok(())
    }
}
