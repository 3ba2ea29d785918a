//! # llm-rename
//!
//! Content-aware file renaming backed by a locally-hosted language model.
//!
//! ## Features
//!
//! - Bounded text extraction from PDF, Word, spreadsheet, and plain-text files
//! - Vision-model analysis for images
//! - Deterministic filename formatting with configurable case styles
//! - Batched, strictly sequential processing to bound model server load
//! - A durable, append-only rename ledger with dry-run undo
//!
//! ## Quick Start
//!
//! ```no_run
//! use llm_rename::{Config, RunOptions, run};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = Config::builder()
//!     .batch_size(10)
//!     .build()?;
//!
//! let stats = run(&config, &RunOptions::dry_run("./downloads"))?;
//! stats.print_summary();
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! The library follows a pipeline architecture:
//! 1. **Extractor**: Produces bounded text per supported format
//! 2. **Analyzer**: Maps content to semantic components via a model call
//! 3. **Formatter**: Folds components and a date into a sanitized stem
//! 4. **Planner**: Orchestrates the above into per-file rename proposals
//! 5. **Ledger**: Records executed renames and can reverse them

#![warn(
    missing_docs,
    rust_2018_idioms,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]
#![allow(clippy::module_name_repetitions)]

mod analyzer;
mod components;
mod config;
mod error;
mod extractor;
mod formatter;
mod ledger;
mod planner;

pub use analyzer::{ComponentAnalyzer, LmClient};
pub use components::{COMPONENT_KEYS, FilenameComponents, parse_model_response};
pub use config::{
    Config, ConfigBuilder, DEFAULT_CONFIG_FILE, ExtractionConfig, FileTypesConfig, NamingConfig,
    ProcessingConfig, PromptsConfig, ServerConfig,
};
pub use error::{Error, Result};
pub use extractor::{ContentExtractor, ExtractStrategy};
pub use formatter::{CaseStyle, DateFormat, DatePosition, FilenameFormatter};
pub use ledger::{
    RenameLedger, RenameRecord, RenameSession, UndoOutcome, default_log_dir,
};
pub use planner::{RenamePlanner, RenameProposal, RunStats};

use std::path::PathBuf;

/// Options for a non-interactive [`run`].
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Directory to process
    pub root: PathBuf,

    /// Descend into subdirectories
    pub recursive: bool,

    /// Restrict processing to these extensions (without dots)
    pub types: Option<Vec<String>>,

    /// Perform the renames; false means dry run
    pub execute: bool,
}

impl RunOptions {
    /// Options for a dry run over `root`, non-recursive, all supported types.
    #[must_use]
    pub fn dry_run(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            recursive: false,
            types: None,
            execute: false,
        }
    }
}

/// Runs the complete rename pipeline with the given configuration.
///
/// Non-interactive entry point: discovers files, derives proposals, and,
/// when `options.execute` is set, performs the renames and persists the
/// session ledger. The CLI drives the same components individually so it
/// can show proposals and confirm before mutating anything.
///
/// # Errors
///
/// Returns an error if:
/// - The model server client cannot be constructed
/// - The root directory does not exist
/// - In execute mode, the ledger cannot be created or persisted
///
/// # Examples
///
/// ```no_run
/// use llm_rename::{Config, RunOptions, run};
///
/// # fn main() -> anyhow::Result<()> {
/// let config = Config::builder().build()?;
/// let stats = run(&config, &RunOptions::dry_run("."))?;
/// println!("{} proposal(s)", stats.proposed);
/// # Ok(())
/// # }
/// ```
pub fn run(config: &Config, options: &RunOptions) -> Result<RunStats> {
    let client = LmClient::new(&config.server)?;
    let planner = RenamePlanner::new(config, Box::new(client));

    planner.run(
        &options.root,
        options.recursive,
        options.types.as_deref(),
        options.execute,
        &config.resolved_log_dir(),
    )
}
