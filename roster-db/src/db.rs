//! Database connection and configuration

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use roster_core::config::DatabaseSettings;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::ConnectOptions;

use crate::error::Result;
use crate::store::SqliteStore;

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Path to SQLite database file
    pub path: PathBuf,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseSettings::default().into()
    }
}

impl From<&DatabaseSettings> for DatabaseConfig {
    fn from(settings: &DatabaseSettings) -> Self {
        Self {
            path: settings.resolved_path(),
            max_connections: settings.max_connections,
        }
    }
}

impl From<DatabaseSettings> for DatabaseConfig {
    fn from(settings: DatabaseSettings) -> Self {
        (&settings).into()
    }
}

impl DatabaseConfig {
    /// Create a new database config with the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_connections: 5,
        }
    }

    /// Set the maximum number of connections
    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }
}

/// Database connection pool
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect to the database with the given configuration
    pub async fn connect(config: DatabaseConfig) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = config.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let options =
            SqliteConnectOptions::from_str(&format!("sqlite://{}", config.path.display()))?
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
                .foreign_keys(true)
                .busy_timeout(Duration::from_secs(5))
                .disable_statement_logging();

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;

        tracing::debug!(path = %config.path.display(), "Connected to database");
        Ok(Self { pool })
    }

    /// Run embedded schema migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("Database migrations applied");
        Ok(())
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Persistence gateway backed by this pool
    pub fn store(&self) -> SqliteStore {
        SqliteStore::new(self.pool.clone())
    }

    /// Close the database connection
    pub async fn close(self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_database_connection() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("nested").join("test.db");

        let db = Database::connect(DatabaseConfig::new(&db_path)).await.unwrap();
        db.migrate().await.unwrap();

        assert!(db_path.exists());
        db.close().await;
    }

    #[tokio::test]
    async fn test_database_migrations() {
        let temp_dir = TempDir::new().unwrap();
        let db = Database::connect(DatabaseConfig::new(temp_dir.path().join("test.db")))
            .await
            .unwrap();
        db.migrate().await.unwrap();
        // running twice is a no-op
        db.migrate().await.unwrap();

        for table in [
            "teams",
            "users",
            "pull_requests",
            "pr_reviewers",
            "pr_reviewer_history",
        ] {
            let result: (i64,) = sqlx::query_as(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?",
            )
            .bind(table)
            .fetch_one(db.pool())
            .await
            .unwrap();
            assert_eq!(result.0, 1, "missing table {}", table);
        }
    }

    #[tokio::test]
    async fn test_wal_journal_mode() {
        let temp_dir = TempDir::new().unwrap();
        let db = Database::connect(DatabaseConfig::new(temp_dir.path().join("test.db")))
            .await
            .unwrap();

        let mode: (String,) = sqlx::query_as("PRAGMA journal_mode")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(mode.0.to_lowercase(), "wal");
        db.close().await;
    }

    #[test]
    fn test_config_from_settings() {
        let settings = DatabaseSettings {
            path: Some(PathBuf::from("/tmp/roster.db")),
            max_connections: 2,
        };
        let config = DatabaseConfig::from(&settings);
        assert_eq!(config.path, PathBuf::from("/tmp/roster.db"));
        assert_eq!(config.max_connections, 2);
        assert_eq!(DatabaseConfig::new("x.db").with_max_connections(9).max_connections, 9);
    }
}
