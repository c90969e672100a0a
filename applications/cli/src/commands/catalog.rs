//! Local catalog commands

use crate::error::{AppError, Result};
use flow_core::{FlowKey, MediaEntry, MediaKind};
use flow_storage::{CatalogStore, ImportReport};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

/// Import files and directories under `flow`
pub async fn import(
    store: &CatalogStore,
    paths: &[PathBuf],
    flow: FlowKey,
    out: &mut impl Write,
) -> Result<ImportReport> {
    let report = store.import_files(paths, flow).await;

    writeln!(
        out,
        "Imported {} into {}, {} already cataloged, {} failed",
        report.imported.len(),
        flow.label(),
        report.duplicates,
        report.failed.len()
    )?;
    for failure in &report.failed {
        writeln!(out, "  {}: {}", failure.path.display(), failure.reason)?;
    }

    Ok(report)
}

/// Print catalog entries, newest first
pub async fn list(
    store: &CatalogStore,
    kind: Option<MediaKind>,
    flow: Option<FlowKey>,
    out: &mut impl Write,
) -> Result<Vec<MediaEntry>> {
    let mut entries = match flow {
        Some(flow) => store.query_by_flow(flow).await?,
        None => store.query_by_kind(kind).await?,
    };
    if let Some(kind) = kind {
        entries.retain(|e| e.kind == kind);
    }

    if entries.is_empty() {
        writeln!(out, "No media in the catalog")?;
        return Ok(entries);
    }

    for entry in &entries {
        writeln!(
            out,
            "{:>5}  {:<6} {:<7} {}  ({})",
            entry.id,
            entry.flow.as_str(),
            entry.kind.as_str(),
            entry.title,
            entry.uri
        )?;
    }

    Ok(entries)
}

/// Change an entry's title and/or Flow, keeping whatever is not given
pub async fn retag(
    store: &CatalogStore,
    id: i64,
    title: Option<&str>,
    flow: Option<FlowKey>,
    out: &mut impl Write,
) -> Result<()> {
    let entry = store
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("media {}", id)))?;

    let title = title.unwrap_or(&entry.title);
    let flow = flow.unwrap_or(entry.flow);
    store.update(id, title, flow).await?;

    info!(id, title = %title, flow = %flow, "Media retagged");
    writeln!(out, "Updated {}: {} ({})", id, title, flow.label())?;
    Ok(())
}

/// Remove one entry
pub async fn remove(store: &CatalogStore, id: i64, out: &mut impl Write) -> Result<()> {
    store.delete(id).await?;
    writeln!(out, "Removed {}", id)?;
    Ok(())
}

/// Remove every entry
pub async fn clear(store: &CatalogStore, out: &mut impl Write) -> Result<u64> {
    let removed = store.delete_all().await?;
    writeln!(out, "Removed {} entries", removed)?;
    Ok(removed)
}

/// Print how many entries each Flow holds
pub async fn flows(store: &CatalogStore, out: &mut impl Write) -> Result<()> {
    for (flow, count) in store.count_by_flow().await? {
        writeln!(
            out,
            "{:<32} {:>5}  {}",
            flow.label(),
            count,
            flow.palette().primary
        )?;
    }
    Ok(())
}

/// Drop videos stored as `content://` locations
pub async fn purge_content_videos(store: &CatalogStore, out: &mut impl Write) -> Result<u64> {
    let found = store.count_content_uri_videos().await?;
    if found == 0 {
        writeln!(out, "No content:// videos in the catalog")?;
        return Ok(0);
    }

    let purged = store.purge_content_uri_videos().await?;
    writeln!(
        out,
        "Removed {} videos that can only be opened through a content provider",
        purged
    )?;
    Ok(purged)
}
