//! File import into the catalog
//!
//! Classifies files by extension, tags them with a Flow and inserts them,
//! counting new entries, already-cataloged ones and failures separately.
//! Directories are scanned recursively; files inside them with unsupported
//! extensions are skipped rather than reported.

use crate::catalog;
use flow_core::{FlowKey, MediaKind, NewMediaEntry};
use serde::Serialize;
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// A file that could not be imported
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportFailure {
    /// Path as given or found
    pub path: PathBuf,
    /// Why it was rejected
    pub reason: String,
}

/// Outcome of an import run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    /// IDs of newly cataloged entries
    pub imported: Vec<i64>,
    /// Files whose URI was already cataloged
    pub duplicates: usize,
    /// Files that could not be imported
    pub failed: Vec<ImportFailure>,
}

impl ImportReport {
    /// Number of files considered
    pub fn total(&self) -> usize {
        self.imported.len() + self.duplicates + self.failed.len()
    }

    /// Whether every file was imported or already present
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    fn fail(&mut self, path: &Path, reason: impl Into<String>) {
        let reason = reason.into();
        warn!(path = %path.display(), %reason, "Import failed");
        self.failed.push(ImportFailure {
            path: path.to_path_buf(),
            reason,
        });
    }
}

/// Import files and directories, tagging every new entry with `flow`
pub async fn import_files(pool: &SqlitePool, paths: &[PathBuf], flow: FlowKey) -> ImportReport {
    let mut report = ImportReport::default();

    // Directory walks and path resolution block, keep them off the runtime
    let inputs = paths.to_vec();
    let candidates = match tokio::task::spawn_blocking(move || collect_candidates(&inputs)).await {
        Ok(candidates) => candidates,
        Err(e) => {
            for path in paths {
                report.fail(path, format!("scan task failed: {}", e));
            }
            return report;
        }
    };

    for candidate in candidates {
        match candidate {
            Candidate::File { path, resolved } => {
                import_one(pool, &path, &resolved, flow, &mut report).await;
            }
            Candidate::Missing(path) => report.fail(&path, "file not found"),
        }
    }

    info!(
        imported = report.imported.len(),
        duplicates = report.duplicates,
        failed = report.failed.len(),
        %flow,
        "Import finished"
    );
    report
}

/// An input path after directory expansion
#[derive(Debug, PartialEq, Eq)]
enum Candidate {
    File { path: PathBuf, resolved: PathBuf },
    Missing(PathBuf),
}

fn collect_candidates(paths: &[PathBuf]) -> Vec<Candidate> {
    let mut candidates = Vec::new();
    for path in paths {
        if path.is_dir() {
            candidates.extend(scan_directory(path).into_iter().map(resolve));
        } else {
            candidates.push(resolve(path.clone()));
        }
    }
    candidates
}

fn resolve(path: PathBuf) -> Candidate {
    if !path.is_file() {
        return Candidate::Missing(path);
    }
    let resolved = std::fs::canonicalize(&path).unwrap_or_else(|_| path.clone());
    Candidate::File { path, resolved }
}

async fn import_one(
    pool: &SqlitePool,
    path: &Path,
    resolved: &Path,
    flow: FlowKey,
    report: &mut ImportReport,
) {
    let entry = match NewMediaEntry::from_path(resolved, flow) {
        Ok(entry) => entry,
        Err(e) => {
            report.fail(path, e.to_string());
            return;
        }
    };

    match catalog::insert_if_absent(pool, &entry).await {
        Ok(outcome) if outcome.inserted => report.imported.push(outcome.id),
        Ok(_) => {
            debug!(path = %path.display(), "Already cataloged");
            report.duplicates += 1;
        }
        Err(e) => report.fail(path, e.to_string()),
    }
}

/// Playable files below `dir`, in a stable order
fn scan_directory(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| is_media_file(p))
        .collect();
    files.sort();
    files
}

fn is_media_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .and_then(MediaKind::from_file_name)
        .is_some()
}
