//! Local media catalog
//!
//! One row per media file, deduplicated by URI and tagged with a Flow.
//! Listings are newest first.
//!
//! # Example
//!
//! ```rust,no_run
//! use flow_core::{FlowKey, MediaKind, NewMediaEntry};
//! use flow_storage::catalog;
//!
//! # async fn example(pool: &sqlx::SqlitePool) -> Result<(), Box<dyn std::error::Error>> {
//! let outcome = catalog::insert_if_absent(pool, &NewMediaEntry {
//!     uri: "/music/rain.flac".to_string(),
//!     title: "rain.flac".to_string(),
//!     kind: MediaKind::Audio,
//!     flow: FlowKey::Blue,
//!     duration_ms: None,
//! }).await?;
//!
//! let calm = catalog::query_by_flow(pool, FlowKey::Blue).await?;
//! # Ok(())
//! # }
//! ```

use crate::error::{Result, StorageError};
use flow_core::{FlowKey, MediaEntry, MediaKind, NewMediaEntry};
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};

const CONTENT_URI_PATTERN: &str = "content://%";

/// Result of an insert that skips existing URIs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InsertOutcome {
    /// Whether a new row was created
    pub inserted: bool,
    /// ID of the row holding the URI
    pub id: i64,
}

/// Insert an entry unless its URI is already cataloged
pub async fn insert_if_absent(pool: &SqlitePool, entry: &NewMediaEntry) -> Result<InsertOutcome> {
    let duration_ms = entry.duration_ms.map(|d| i64::try_from(d).unwrap_or(i64::MAX));

    let result = sqlx::query(
        r#"
        INSERT OR IGNORE INTO media_local (uri, title, kind, flow, duration_ms)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&entry.uri)
    .bind(&entry.title)
    .bind(entry.kind.as_str())
    .bind(entry.flow.as_str())
    .bind(duration_ms)
    .execute(pool)
    .await?;

    if result.rows_affected() > 0 {
        let id = result.last_insert_rowid();
        debug!(id, uri = %entry.uri, flow = %entry.flow, "Cataloged media");
        return Ok(InsertOutcome { inserted: true, id });
    }

    let id: i64 = sqlx::query("SELECT id FROM media_local WHERE uri = ?")
        .bind(&entry.uri)
        .fetch_one(pool)
        .await?
        .get("id");

    debug!(id, uri = %entry.uri, "Media already cataloged");
    Ok(InsertOutcome {
        inserted: false,
        id,
    })
}

/// List entries of one kind, or every entry when `kind` is `None`
pub async fn query_by_kind(pool: &SqlitePool, kind: Option<MediaKind>) -> Result<Vec<MediaEntry>> {
    let rows = match kind {
        Some(kind) => {
            sqlx::query(
                r#"
                SELECT id, uri, title, kind, flow, duration_ms
                FROM media_local
                WHERE kind = ?
                ORDER BY id DESC
                "#,
            )
            .bind(kind.as_str())
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query(
                r#"
                SELECT id, uri, title, kind, flow, duration_ms
                FROM media_local
                ORDER BY id DESC
                "#,
            )
            .fetch_all(pool)
            .await?
        }
    };

    rows.iter().map(entry_from_row).collect()
}

/// List every entry tagged with `flow`
pub async fn query_by_flow(pool: &SqlitePool, flow: FlowKey) -> Result<Vec<MediaEntry>> {
    let rows = sqlx::query(
        r#"
        SELECT id, uri, title, kind, flow, duration_ms
        FROM media_local
        WHERE flow = ?
        ORDER BY id DESC
        "#,
    )
    .bind(flow.as_str())
    .fetch_all(pool)
    .await?;

    rows.iter().map(entry_from_row).collect()
}

/// Get an entry by ID
pub async fn get_by_id(pool: &SqlitePool, id: i64) -> Result<Option<MediaEntry>> {
    let row = sqlx::query(
        r#"
        SELECT id, uri, title, kind, flow, duration_ms
        FROM media_local
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(entry_from_row).transpose()
}

/// Rename an entry and move it to another Flow
pub async fn update(pool: &SqlitePool, id: i64, title: &str, flow: FlowKey) -> Result<()> {
    let result = sqlx::query("UPDATE media_local SET title = ?, flow = ? WHERE id = ?")
        .bind(title)
        .bind(flow.as_str())
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(StorageError::not_found("Media", id.to_string()));
    }

    debug!(id, title, %flow, "Updated media");
    Ok(())
}

/// Delete an entry
pub async fn delete(pool: &SqlitePool, id: i64) -> Result<()> {
    let result = sqlx::query("DELETE FROM media_local WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(StorageError::not_found("Media", id.to_string()));
    }

    debug!(id, "Deleted media");
    Ok(())
}

/// Delete every entry, returning how many were removed
pub async fn delete_all(pool: &SqlitePool) -> Result<u64> {
    let removed = sqlx::query("DELETE FROM media_local")
        .execute(pool)
        .await?
        .rows_affected();

    info!(removed, "Cleared media catalog");
    Ok(removed)
}

/// Number of entries per Flow, in display order, including empty Flows
pub async fn count_by_flow(pool: &SqlitePool) -> Result<Vec<(FlowKey, i64)>> {
    let rows = sqlx::query("SELECT flow, COUNT(*) AS count FROM media_local GROUP BY flow")
        .fetch_all(pool)
        .await?;

    let mut counts: Vec<(FlowKey, i64)> = FlowKey::ALL.iter().map(|&f| (f, 0)).collect();
    for row in rows {
        let flow: FlowKey = row.try_get::<String, _>("flow")?.parse()?;
        let count: i64 = row.try_get("count")?;
        if let Some(slot) = counts.iter_mut().find(|(f, _)| *f == flow) {
            slot.1 = count;
        }
    }

    Ok(counts)
}

/// Number of videos stored under platform content URIs
pub async fn count_content_uri_videos(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query(
        "SELECT COUNT(*) AS count FROM media_local WHERE kind = 'video' AND uri LIKE ?",
    )
    .bind(CONTENT_URI_PATTERN)
    .fetch_one(pool)
    .await?
    .try_get("count")?;

    Ok(count)
}

/// Delete videos stored under platform content URIs, which the video engine
/// cannot open
pub async fn purge_content_uri_videos(pool: &SqlitePool) -> Result<u64> {
    let removed = sqlx::query("DELETE FROM media_local WHERE kind = 'video' AND uri LIKE ?")
        .bind(CONTENT_URI_PATTERN)
        .execute(pool)
        .await?
        .rows_affected();

    info!(removed, "Purged content-URI videos");
    Ok(removed)
}

fn entry_from_row(row: &SqliteRow) -> Result<MediaEntry> {
    let kind: MediaKind = row.try_get::<String, _>("kind")?.parse()?;
    let flow: FlowKey = row.try_get::<String, _>("flow")?.parse()?;
    let duration_ms: Option<i64> = row.try_get("duration_ms")?;

    Ok(MediaEntry {
        id: row.try_get("id")?,
        uri: row.try_get("uri")?,
        title: row.try_get("title")?,
        kind,
        flow,
        duration_ms: duration_ms.and_then(|d| u64::try_from(d).ok()),
    })
}
