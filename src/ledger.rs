//! Durable tracking of rename sessions, with undo.
//!
//! Every execute run owns one session: an in-memory, append-only sequence of
//! rename records flushed to a uniquely timestamped JSON file when the run
//! finishes. Sessions are never mutated after persisting; undoing a session
//! reads it and reverses the filesystem mutations, leaving the log intact as
//! an audit trail.

use crate::error::{Error, Result};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const SESSION_FILE_PREFIX: &str = "renames_";

/// One attempted rename, success or failure.
///
/// Field names form the on-disk session contract; undo reads exactly what
/// the recording path writes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameRecord {
    /// When the rename was attempted (ISO-8601)
    pub timestamp: String,

    /// Absolute path before the rename
    pub old_path: PathBuf,

    /// Absolute path after the rename
    pub new_path: PathBuf,

    /// Filename before the rename
    pub old_name: String,

    /// Filename after the rename
    pub new_name: String,

    /// Directory containing the file
    pub directory: PathBuf,

    /// Whether the rename succeeded
    pub success: bool,

    /// Error detail for failed renames
    pub error: Option<String>,
}

/// A persisted rename session: aggregate counts plus the ordered records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameSession {
    /// When the session started (ISO-8601)
    pub session_start: String,

    /// Number of rename attempts
    pub total_renames: usize,

    /// Number of successful renames
    pub successful: usize,

    /// Number of failed renames
    pub failed: usize,

    /// Ordered rename records
    pub renames: Vec<RenameRecord>,
}

/// Outcome of an undo pass over one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UndoOutcome {
    /// Successful records considered for reversal
    pub candidates: usize,

    /// Reversals that would be performed (dry-run)
    pub planned: usize,

    /// Reversals actually performed
    pub reverted: usize,

    /// Records skipped because the renamed file no longer exists
    pub skipped_missing: usize,

    /// Records skipped because the original name is taken again
    pub skipped_collision: usize,

    /// Reverse renames that failed
    pub failed: usize,
}

/// Records rename attempts for one session and owns their persistence.
///
/// The ledger is the sole writer of its session file; records are appended
/// in memory and flushed exactly once via [`RenameLedger::persist`].
pub struct RenameLedger {
    log_dir: PathBuf,
    session_start: DateTime<Local>,
    session_file: PathBuf,
    records: Vec<RenameRecord>,
}

impl RenameLedger {
    /// Creates a ledger writing into `log_dir`, creating the directory if
    /// needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the log directory cannot be created.
    pub fn new(log_dir: impl Into<PathBuf>) -> Result<Self> {
        let log_dir = log_dir.into();
        fs::create_dir_all(&log_dir).map_err(|e| Error::io(&log_dir, e))?;

        let session_start = Local::now();
        let session_file = log_dir.join(format!(
            "{SESSION_FILE_PREFIX}{}.json",
            session_start.format("%Y%m%d_%H%M%S")
        ));

        debug!("Ledger session file: {}", session_file.display());
        Ok(Self {
            log_dir,
            session_start,
            session_file,
            records: Vec::new(),
        })
    }

    /// Appends a rename attempt to the session.
    pub fn record(
        &mut self,
        source: &Path,
        destination: &Path,
        success: bool,
        error: Option<String>,
    ) {
        let old_path = absolute(source);
        let new_path = absolute(destination);

        self.records.push(RenameRecord {
            timestamp: Local::now().to_rfc3339(),
            old_name: file_name_of(&old_path),
            new_name: file_name_of(&new_path),
            directory: old_path.parent().map(Path::to_path_buf).unwrap_or_default(),
            old_path,
            new_path,
            success,
            error,
        });
    }

    /// Number of recorded attempts so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of successful attempts so far.
    #[must_use]
    pub fn successful(&self) -> usize {
        self.records.iter().filter(|r| r.success).count()
    }

    /// Writes the session to its timestamped file and returns the path.
    ///
    /// # Errors
    ///
    /// Returns an error if the session file cannot be created or written.
    /// This error is allowed to terminate the run: losing the session would
    /// leave executed renames without an undo trail.
    pub fn persist(&self) -> Result<PathBuf> {
        let successful = self.successful();
        let session = RenameSession {
            session_start: self.session_start.to_rfc3339(),
            total_renames: self.records.len(),
            successful,
            failed: self.records.len() - successful,
            renames: self.records.clone(),
        };

        let file = fs::File::create(&self.session_file)
            .map_err(|e| Error::io(&self.session_file, e))?;
        serde_json::to_writer_pretty(file, &session)?;

        info!("Rename session persisted to {}", self.session_file.display());
        Ok(self.session_file.clone())
    }

    /// Human-readable summary of the session so far.
    #[must_use]
    pub fn summary(&self) -> String {
        let successful = self.successful();
        format!(
            "Rename summary:\n  Total: {}\n  Successful: {}\n  Failed: {}\n  Log file: {}",
            self.records.len(),
            successful,
            self.records.len() - successful,
            self.session_file.display()
        )
    }

    /// Lists persisted session files in a log directory, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory exists but cannot be read. A
    /// missing directory yields an empty list.
    pub fn list_sessions(log_dir: &Path) -> Result<Vec<PathBuf>> {
        if !log_dir.exists() {
            return Ok(Vec::new());
        }

        let mut sessions: Vec<PathBuf> = fs::read_dir(log_dir)
            .map_err(|e| Error::io(log_dir, e))?
            .filter_map(std::result::Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|name| {
                        name.starts_with(SESSION_FILE_PREFIX) && name.ends_with(".json")
                    })
            })
            .collect();

        // Timestamped names sort chronologically; newest first.
        sessions.sort();
        sessions.reverse();
        Ok(sessions)
    }

    /// Loads a persisted session document.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_session(path: &Path) -> Result<RenameSession> {
        let raw = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let session: RenameSession = serde_json::from_str(&raw)?;
        Ok(session)
    }

    /// Reverses the successful renames of a persisted session.
    ///
    /// Every record is evaluated independently: the renamed file must still
    /// exist and the original name must be free, otherwise the record is
    /// reported and skipped. With `execute` false this is a dry run that
    /// only reports what would be reverted. Failures on one record never
    /// block the rest, and the session file itself is never modified.
    ///
    /// # Errors
    ///
    /// Returns an error only if the session file cannot be loaded.
    pub fn undo(session_file: &Path, execute: bool) -> Result<UndoOutcome> {
        let session = Self::load_session(session_file)?;
        let successful: Vec<&RenameRecord> =
            session.renames.iter().filter(|r| r.success).collect();

        let mut outcome = UndoOutcome {
            candidates: successful.len(),
            ..UndoOutcome::default()
        };

        if successful.is_empty() {
            println!("No successful renames to undo.");
            return Ok(outcome);
        }

        println!("Found {} rename(s) to undo", successful.len());
        println!("{}", "-".repeat(60));

        for record in successful {
            if !record.new_path.exists() {
                println!(
                    "Skipping {}: not found, possibly already reverted",
                    record.new_name
                );
                outcome.skipped_missing += 1;
                continue;
            }

            if record.old_path.exists() {
                println!(
                    "Skipping {}: cannot revert, name collision with {}",
                    record.new_name, record.old_name
                );
                outcome.skipped_collision += 1;
                continue;
            }

            if execute {
                match fs::rename(&record.new_path, &record.old_path) {
                    Ok(()) => {
                        println!("Reverted: {} -> {}", record.new_name, record.old_name);
                        outcome.reverted += 1;
                    }
                    Err(e) => {
                        println!("Failed to revert {}: {}", record.new_name, e);
                        outcome.failed += 1;
                    }
                }
            } else {
                println!("Would revert: {} -> {}", record.new_name, record.old_name);
                outcome.planned += 1;
            }
        }

        println!();
        if execute {
            println!("Reverted {} file(s)", outcome.reverted);
        } else {
            println!("Dry run only; no files were reverted.");
        }

        Ok(outcome)
    }

    /// The directory this ledger writes into.
    #[must_use]
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// The session file this ledger will persist to.
    #[must_use]
    pub fn session_file(&self) -> &Path {
        &self.session_file
    }
}

/// Default per-user log directory, `~/.llm-rename`.
#[must_use]
pub fn default_log_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".llm-rename")
}

/// Absolute form of a path without touching the filesystem; renamed sources
/// no longer exist, so canonicalization is not an option.
fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}
