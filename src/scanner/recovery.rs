//! Startup check for files left behind by an interrupted run.
//!
//! Only reports. Nothing is renamed or deleted.

use anyhow::{Context, Result};
use cinetag_common::paths::{has_processed_marker, original_from_backup, original_from_processed};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

/// A leftover found in the library directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoveryFinding {
    /// A remux output that was never swapped in.
    OrphanedProcessed {
        processed: PathBuf,
        original: PathBuf,
        original_exists: bool,
    },
    /// A backup whose original path is empty.
    OrphanedBackup { backup: PathBuf, original: PathBuf },
}

impl RecoveryFinding {
    /// What the user can do about it.
    pub fn hint(&self) -> String {
        match self {
            RecoveryFinding::OrphanedProcessed {
                processed,
                original,
                original_exists: true,
            } => format!(
                "{} is a leftover from an interrupted write; {} is intact and {} can be deleted",
                processed.display(),
                original.display(),
                processed.display()
            ),
            RecoveryFinding::OrphanedProcessed {
                processed,
                original,
                original_exists: false,
            } => format!(
                "rename {} to {} to finish the interrupted swap",
                processed.display(),
                original.display()
            ),
            RecoveryFinding::OrphanedBackup { backup, original } => format!(
                "rename {} to {} to restore the original",
                backup.display(),
                original.display()
            ),
        }
    }
}

impl fmt::Display for RecoveryFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecoveryFinding::OrphanedProcessed { processed, .. } => {
                write!(f, "orphaned processed file {}", processed.display())
            }
            RecoveryFinding::OrphanedBackup { backup, .. } => {
                write!(f, "backup without original {}", backup.display())
            }
        }
    }
}

/// Inspect `dir` (depth 1) for orphaned processed files and backups, logging
/// a warning with a hint for each.
pub fn check_directory(dir: &Path, marker: &str) -> Result<Vec<RecoveryFinding>> {
    let mut findings = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.with_context(|| format!("Failed to read directory {:?}", dir))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let name = entry.file_name().to_string_lossy();

        if let Some(original) = original_from_backup(path) {
            if !original.exists() {
                findings.push(RecoveryFinding::OrphanedBackup {
                    backup: path.to_path_buf(),
                    original,
                });
            }
            continue;
        }

        if has_processed_marker(&name, marker) {
            if let Some(original) = original_from_processed(path, marker) {
                let original_exists = original.exists();
                findings.push(RecoveryFinding::OrphanedProcessed {
                    processed: path.to_path_buf(),
                    original,
                    original_exists,
                });
            }
        }
    }

    for finding in &findings {
        warn!(hint = %finding.hint(), "Found {}", finding);
    }

    Ok(findings)
}
