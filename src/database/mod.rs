//! SeaORM-based database access
//!
//! Supports SQLite (the default, with auto-creation of the database file)
//! and PostgreSQL. Repositories live under [`repositories`]; schema setup is
//! handled by the migrations in [`migrations`].

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use sea_orm::{ConnectOptions, Database as SeaOrmDatabase, DatabaseConnection};
use tracing::info;

use crate::config::DatabaseConfig;

pub mod migrations;
pub mod repositories;

/// Database connection manager
#[derive(Clone)]
pub struct Database {
    connection: Arc<DatabaseConnection>,
    database_type: DatabaseType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseType {
    SQLite,
    PostgreSQL,
}

impl DatabaseType {
    fn as_str(&self) -> &'static str {
        match self {
            DatabaseType::SQLite => "SQLite",
            DatabaseType::PostgreSQL => "PostgreSQL",
        }
    }
}

impl Database {
    /// Create a new database connection from configuration
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        let database_type = Self::detect_database_type(&config.url)?;
        info!("Connecting to {} database", database_type.as_str());

        let connection_url = match database_type {
            DatabaseType::SQLite => {
                Self::ensure_sqlite_parent_dir(&config.url)?;
                Self::ensure_sqlite_auto_creation(&config.url)
            }
            DatabaseType::PostgreSQL => config.url.clone(),
        };

        let mut connect_options = ConnectOptions::new(connection_url);
        connect_options
            .max_connections(config.max_connections.unwrap_or(10))
            .min_connections(1)
            .connect_timeout(Duration::from_secs(5))
            .acquire_timeout(Duration::from_secs(3))
            .idle_timeout(Duration::from_secs(600))
            .sqlx_logging(false);

        let connection = SeaOrmDatabase::connect(connect_options)
            .await
            .context("Failed to connect to database")?;

        Ok(Self {
            connection: Arc::new(connection),
            database_type,
        })
    }

    /// In-memory SQLite database with migrations applied, for tests.
    ///
    /// Pinned to a single pooled connection: every connection to
    /// `sqlite::memory:` gets its own database, so a wider pool would
    /// scatter the schema.
    pub async fn new_in_memory() -> Result<Self> {
        let mut connect_options = ConnectOptions::new("sqlite::memory:");
        connect_options
            .max_connections(1)
            .min_connections(1)
            .sqlx_logging(false);

        let connection = SeaOrmDatabase::connect(connect_options)
            .await
            .context("Failed to create in-memory database")?;

        let db = Self {
            connection: Arc::new(connection),
            database_type: DatabaseType::SQLite,
        };
        db.migrate().await?;
        Ok(db)
    }

    /// Run all pending migrations
    pub async fn migrate(&self) -> Result<()> {
        use migrations::Migrator;
        use sea_orm_migration::MigratorTrait;

        info!(
            "Running database migrations for {}",
            self.database_type.as_str()
        );
        Migrator::up(&*self.connection, None)
            .await
            .context("Failed to run migrations")?;
        Ok(())
    }

    /// The shared connection handle repositories are built over
    pub fn connection(&self) -> &Arc<DatabaseConnection> {
        &self.connection
    }

    fn detect_database_type(url: &str) -> Result<DatabaseType> {
        if url.starts_with("sqlite:") {
            Ok(DatabaseType::SQLite)
        } else if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            Ok(DatabaseType::PostgreSQL)
        } else {
            bail!("Unsupported database URL: {url}")
        }
    }

    /// File-backed SQLite databases are created on first use
    fn ensure_sqlite_auto_creation(url: &str) -> String {
        if url.contains(":memory:") || url.contains("mode=") {
            url.to_string()
        } else {
            format!("{url}?mode=rwc")
        }
    }

    /// SQLite creates the database file but not its parent directory
    fn ensure_sqlite_parent_dir(url: &str) -> Result<()> {
        if url.contains(":memory:") {
            return Ok(());
        }
        let path = url
            .trim_start_matches("sqlite://")
            .trim_start_matches("sqlite:");
        if let Some(parent) = std::path::Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create database directory {parent:?}"))?;
        }
        Ok(())
    }
}
