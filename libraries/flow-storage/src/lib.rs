//! FlowPlayer Storage
//!
//! `SQLite` media catalog for FlowPlayer.
//!
//! # Architecture
//!
//! - **Vertical Slicing**: each feature owns its own queries (`catalog`, `import`)
//! - **Embedded Migrations**: the schema ships inside the binary
//! - **Deduplication**: a media location is cataloged at most once
//!
//! # Example
//!
//! ```rust,no_run
//! use flow_core::FlowKey;
//! use flow_storage::{create_pool, run_migrations, CatalogStore};
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool("sqlite://flowplayer.db").await?;
//! run_migrations(&pool).await?;
//!
//! let store = CatalogStore::new(pool);
//! let report = store
//!     .import_files(&[PathBuf::from("/home/me/Music")], FlowKey::Orange)
//!     .await;
//! println!("{} imported", report.imported.len());
//! # Ok(())
//! # }
//! ```

mod error;

// Vertical slices
pub mod catalog;
pub mod import;

pub use catalog::InsertOutcome;
pub use error::{Result, StorageError};
pub use import::{ImportFailure, ImportReport};

use flow_core::{FlowKey, MediaEntry, MediaKind, NewMediaEntry};
use sqlx::migrate::Migrator;
use sqlx::sqlite::SqlitePool;
use std::path::PathBuf;
use tracing::debug;

// Embed migrations into binary
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Run database migrations
///
/// Call once at startup, before any catalog query.
///
/// # Errors
///
/// Returns an error if migrations fail to run
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    MIGRATOR.run(pool).await?;
    Ok(())
}

/// Create a new `SQLite` pool
///
/// # Arguments
///
/// * `database_url` - `SQLite` connection string (e.g., `<sqlite://flowplayer.db>`)
///
/// # Errors
///
/// Returns an error if the connection fails
pub async fn create_pool(database_url: &str) -> Result<SqlitePool> {
    use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
    use std::str::FromStr;

    debug!(database_url, "Creating catalog pool");

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Catalog operations bound to one pool
#[derive(Debug, Clone)]
pub struct CatalogStore {
    pool: SqlitePool,
}

impl CatalogStore {
    /// Wrap an existing, migrated pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if needed) and migrate the database at `database_url`
    pub async fn open(database_url: &str) -> Result<Self> {
        let pool = create_pool(database_url).await?;
        run_migrations(&pool).await?;
        Ok(Self::new(pool))
    }

    /// Underlying pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// See [`catalog::insert_if_absent`]
    pub async fn insert_if_absent(&self, entry: &NewMediaEntry) -> Result<InsertOutcome> {
        catalog::insert_if_absent(&self.pool, entry).await
    }

    /// See [`catalog::query_by_kind`]
    pub async fn query_by_kind(&self, kind: Option<MediaKind>) -> Result<Vec<MediaEntry>> {
        catalog::query_by_kind(&self.pool, kind).await
    }

    /// See [`catalog::query_by_flow`]
    pub async fn query_by_flow(&self, flow: FlowKey) -> Result<Vec<MediaEntry>> {
        catalog::query_by_flow(&self.pool, flow).await
    }

    /// See [`catalog::get_by_id`]
    pub async fn get_by_id(&self, id: i64) -> Result<Option<MediaEntry>> {
        catalog::get_by_id(&self.pool, id).await
    }

    /// See [`catalog::update`]
    pub async fn update(&self, id: i64, title: &str, flow: FlowKey) -> Result<()> {
        catalog::update(&self.pool, id, title, flow).await
    }

    /// See [`catalog::delete`]
    pub async fn delete(&self, id: i64) -> Result<()> {
        catalog::delete(&self.pool, id).await
    }

    /// See [`catalog::delete_all`]
    pub async fn delete_all(&self) -> Result<u64> {
        catalog::delete_all(&self.pool).await
    }

    /// See [`catalog::count_by_flow`]
    pub async fn count_by_flow(&self) -> Result<Vec<(FlowKey, i64)>> {
        catalog::count_by_flow(&self.pool).await
    }

    /// See [`catalog::count_content_uri_videos`]
    pub async fn count_content_uri_videos(&self) -> Result<i64> {
        catalog::count_content_uri_videos(&self.pool).await
    }

    /// See [`catalog::purge_content_uri_videos`]
    pub async fn purge_content_uri_videos(&self) -> Result<u64> {
        catalog::purge_content_uri_videos(&self.pool).await
    }

    /// See [`import::import_files`]
    pub async fn import_files(&self, paths: &[PathBuf], flow: FlowKey) -> ImportReport {
        import::import_files(&self.pool, paths, flow).await
    }
}
