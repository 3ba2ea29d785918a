//! Rename planning and execution.
//!
//! The planner walks a directory for supported files, routes each one
//! through extraction and model analysis, and folds the result into a
//! rename proposal. Files are processed strictly one at a time; batches
//! exist only to insert a pause between groups of model calls and bound
//! the load on the local server.

use crate::analyzer::ComponentAnalyzer;
use crate::config::{Config, FileTypesConfig, ProcessingConfig, PromptsConfig};
use crate::error::{Error, Result};
use crate::extractor::ContentExtractor;
use crate::formatter::FilenameFormatter;
use crate::ledger::RenameLedger;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Extensions routed to the vision model instead of text extraction.
const IMAGE_ANALYSIS_EXTENSIONS: [&str; 8] =
    ["jpg", "jpeg", "png", "gif", "webp", "heic", "bmp", "tiff"];

/// Characters of extracted text forwarded to the analyzer per file.
const ANALYSIS_CONTENT_LIMIT: usize = 1000;

/// A proposed rename for one file.
#[derive(Debug, Clone)]
pub struct RenameProposal {
    /// Current path of the file
    pub source: PathBuf,

    /// Proposed path, absent when proposal generation failed
    pub destination: Option<PathBuf>,

    /// Current filename
    pub original_name: String,

    /// Proposed filename, absent when proposal generation failed
    pub proposed_name: Option<String>,

    /// Why proposal generation failed, when it did
    pub failure: Option<String>,
}

impl RenameProposal {
    /// Returns true if a destination was successfully derived.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    fn failed(source: &Path, original_name: String, error: &Error) -> Self {
        Self {
            source: source.to_path_buf(),
            destination: None,
            original_name,
            proposed_name: None,
            failure: Some(error.to_string()),
        }
    }
}

/// Statistics collected over one rename run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunStats {
    /// Files matching the supported extension set
    pub discovered: usize,

    /// Proposals successfully derived
    pub proposed: usize,

    /// Files skipped (already formatted, unreadable, no analyzer result)
    pub skipped: usize,

    /// Files whose proposal generation failed outright
    pub failed_proposals: usize,

    /// Renames performed
    pub renamed: usize,

    /// Renames attempted and failed
    pub failed_renames: usize,

    /// Wall-clock duration of the run
    pub duration: Duration,
}

impl RunStats {
    /// Prints a human-readable summary to stdout.
    pub fn print_summary(&self) {
        println!("\n╔═══════════════════════════════════════════╗");
        println!("║              Rename Summary               ║");
        println!("╠═══════════════════════════════════════════╣");
        println!("║ Files discovered:    {:>8}             ║", self.discovered);
        println!("║ Proposals:           {:>8}             ║", self.proposed);
        println!("║ Skipped:             {:>8}             ║", self.skipped);
        println!("║ Failed proposals:    {:>8}             ║", self.failed_proposals);
        println!("║ Renamed:             {:>8}             ║", self.renamed);
        println!("║ Failed renames:      {:>8}             ║", self.failed_renames);
        println!(
            "║ Duration:            {:>8.2}s            ║",
            self.duration.as_secs_f64()
        );
        println!("╚═══════════════════════════════════════════╝\n");
    }
}

/// Derives and executes rename proposals for a set of files.
pub struct RenamePlanner {
    processing: ProcessingConfig,
    file_types: FileTypesConfig,
    prompts: PromptsConfig,
    extractor: ContentExtractor,
    formatter: FilenameFormatter,
    analyzer: Box<dyn ComponentAnalyzer>,
}

impl RenamePlanner {
    /// Creates a planner from configuration and an analyzer backend.
    #[must_use]
    pub fn new(config: &Config, analyzer: Box<dyn ComponentAnalyzer>) -> Self {
        Self {
            processing: config.processing.clone(),
            file_types: config.file_types.clone(),
            prompts: config.prompts.clone(),
            extractor: ContentExtractor::new(&config.extraction),
            formatter: FilenameFormatter::new(&config.naming),
            analyzer,
        }
    }

    /// Lists the files under `root` eligible for processing, sorted.
    ///
    /// Eligibility: regular file, supported extension (optionally narrowed
    /// by `types`), and not hidden when hidden files are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if `root` does not exist. Individual walk errors
    /// are logged and skipped.
    pub fn discover(
        &self,
        root: &Path,
        recursive: bool,
        types: Option<&[String]>,
    ) -> Result<Vec<PathBuf>> {
        if !root.exists() {
            return Err(Error::config(format!(
                "path does not exist: {}",
                root.display()
            )));
        }

        let mut allowed: HashSet<String> = self
            .file_types
            .all()
            .into_iter()
            .map(|e| e.to_lowercase())
            .collect();

        if let Some(types) = types {
            let requested: HashSet<String> = types
                .iter()
                .map(|t| t.trim().trim_start_matches('.').to_lowercase())
                .collect();
            allowed.retain(|e| requested.contains(e));
        }

        let max_depth = if recursive { usize::MAX } else { 1 };
        let mut files = Vec::new();

        for entry in WalkDir::new(root).max_depth(max_depth) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Walk error: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let name = entry.file_name().to_string_lossy();
            if self.processing.skip_hidden && name.starts_with('.') {
                continue;
            }

            let extension = entry
                .path()
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_lowercase)
                .unwrap_or_default();

            if allowed.contains(&extension) {
                files.push(entry.into_path());
            }
        }

        files.sort();
        debug!("Discovered {} candidate file(s)", files.len());
        Ok(files)
    }

    /// Derives rename proposals for the files, in batches.
    ///
    /// Batches bound the load on the model server: within a batch files are
    /// analyzed one at a time, and between batches (when there is more than
    /// one) the planner pauses briefly. A failure on one file never aborts
    /// the run; it yields a failure-flagged proposal and processing moves
    /// on.
    #[must_use]
    pub fn propose(&self, files: &[PathBuf]) -> Vec<RenameProposal> {
        let batch_size = self.processing.batch_size;
        let total_batches = files.len().div_ceil(batch_size);
        let mut proposals = Vec::new();

        for (batch_index, batch) in files.chunks(batch_size).enumerate() {
            if total_batches > 1 {
                println!(
                    "Batch {}/{} ({} file(s))",
                    batch_index + 1,
                    total_batches,
                    batch.len()
                );
            }

            for path in batch {
                let original_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();

                match self.process_file(path) {
                    Ok(Some(proposal)) => proposals.push(proposal),
                    Ok(None) => {}
                    Err(e) => {
                        warn!("Failed to process {}: {}", path.display(), e);
                        proposals.push(RenameProposal::failed(path, original_name, &e));
                    }
                }
            }

            // Let the model server breathe between batches.
            if batch_index + 1 < total_batches && self.processing.batch_pause_secs > 0 {
                info!(
                    "Pausing {}s before next batch",
                    self.processing.batch_pause_secs
                );
                thread::sleep(Duration::from_secs(self.processing.batch_pause_secs));
            }
        }

        proposals
    }

    /// Processes one file into a proposal.
    ///
    /// Returns `Ok(None)` when the file is skipped: its name already follows
    /// the convention, its content cannot be extracted, or the analyzer
    /// produced no usable result. Those are recoverable per-file conditions
    /// reported as warnings, not failures.
    fn process_file(&self, path: &Path) -> Result<Option<RenameProposal>> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| Error::extraction(path, "file name is not valid UTF-8"))?
            .to_string();

        if self.processing.skip_already_formatted && self.formatter.is_already_formatted(&file_name)
        {
            debug!("Skipping (already formatted): {}", file_name);
            return Ok(None);
        }

        let components = if is_image(path) {
            debug!("Analyzing image: {}", file_name);
            match self
                .analyzer
                .analyze_image(path, &self.prompts.vision_instruction)
            {
                Ok(components) => components,
                Err(e) => {
                    warn!("Could not analyze image {}: {}", file_name, e);
                    return Ok(None);
                }
            }
        } else {
            debug!("Extracting content from: {}", file_name);
            let content = match self.extractor.extract(path) {
                Ok(content) => content,
                Err(e) => {
                    warn!("Could not extract content from {}: {}", file_name, e);
                    return Ok(None);
                }
            };

            if content.trim().is_empty() {
                warn!("No content extracted from {}", file_name);
                return Ok(None);
            }

            let head = analysis_head(&content);
            match self.analyzer.analyze_text(head, &self.prompts.text_instruction) {
                Ok(components) => components,
                Err(e) => {
                    warn!("Could not analyze {}: {}", file_name, e);
                    return Ok(None);
                }
            }
        };

        let date = self
            .formatter
            .extract_date_from_filename(&file_name)
            .unwrap_or_else(|| self.formatter.current_date());

        let stem = self.formatter.format_components(&components, Some(&date));
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{e}"))
            .unwrap_or_default();
        let proposed_name = format!("{stem}{extension}");
        let destination = path
            .parent()
            .map(|parent| parent.join(&proposed_name))
            .unwrap_or_else(|| PathBuf::from(&proposed_name));

        Ok(Some(RenameProposal {
            source: path.to_path_buf(),
            destination: Some(destination),
            original_name: file_name,
            proposed_name: Some(proposed_name),
            failure: None,
        }))
    }

    /// Applies the successful proposals, recording every attempt in the
    /// ledger.
    ///
    /// A failed rename is recorded and reported; it never aborts the batch.
    /// Returns the number of renames performed and the number that failed.
    pub fn execute(&self, proposals: &[RenameProposal], ledger: &mut RenameLedger) -> (usize, usize) {
        let mut renamed = 0;
        let mut failed = 0;

        for proposal in proposals.iter().filter(|p| p.is_success()) {
            let Some(destination) = proposal.destination.as_ref() else {
                continue;
            };

            if destination == &proposal.source {
                debug!("Skipping {}: name unchanged", proposal.original_name);
                continue;
            }

            if destination.exists() {
                let detail = format!("destination already exists: {}", destination.display());
                println!("Failed to rename {}: {}", proposal.original_name, detail);
                ledger.record(&proposal.source, destination, false, Some(detail));
                failed += 1;
                continue;
            }

            match std::fs::rename(&proposal.source, destination) {
                Ok(()) => {
                    println!(
                        "Renamed: {}",
                        proposal.proposed_name.as_deref().unwrap_or_default()
                    );
                    ledger.record(&proposal.source, destination, true, None);
                    renamed += 1;
                }
                Err(e) => {
                    println!("Failed to rename {}: {}", proposal.original_name, e);
                    ledger.record(&proposal.source, destination, false, Some(e.to_string()));
                    failed += 1;
                }
            }
        }

        (renamed, failed)
    }

    /// Runs discovery, proposal, and optional execution in one call.
    ///
    /// Non-interactive entry point used by [`crate::run`]; the CLI drives
    /// the same pieces separately so it can confirm with the user between
    /// proposing and executing.
    ///
    /// # Errors
    ///
    /// Returns an error on discovery failure or, in execute mode, when the
    /// ledger cannot be created or persisted.
    pub fn run(
        &self,
        root: &Path,
        recursive: bool,
        types: Option<&[String]>,
        execute: bool,
        log_dir: &Path,
    ) -> Result<RunStats> {
        let start = Instant::now();
        let files = self.discover(root, recursive, types)?;
        let proposals = self.propose(&files);

        let mut stats = RunStats {
            discovered: files.len(),
            proposed: proposals.iter().filter(|p| p.is_success()).count(),
            failed_proposals: proposals.iter().filter(|p| !p.is_success()).count(),
            skipped: files.len() - proposals.len(),
            ..RunStats::default()
        };

        if execute && !proposals.is_empty() {
            let mut ledger = RenameLedger::new(log_dir)?;
            let (renamed, failed) = self.execute(&proposals, &mut ledger);
            ledger.persist()?;
            stats.renamed = renamed;
            stats.failed_renames = failed;
        }

        stats.duration = start.elapsed();
        Ok(stats)
    }
}

/// Files routed to the vision model rather than text extraction.
fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .is_some_and(|e| IMAGE_ANALYSIS_EXTENSIONS.contains(&e.as_str()))
}

/// First `ANALYSIS_CONTENT_LIMIT` characters of the extracted content;
/// bounds the request size sent to the model.
fn analysis_head(content: &str) -> &str {
    match content.char_indices().nth(ANALYSIS_CONTENT_LIMIT) {
        Some((idx, _)) => &content[..idx],
        None => content,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::FilenameComponents;
    use assert_fs::prelude::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Analyzer stub returning canned components; records the content it was
    /// given so tests can observe the planner's request bounding.
    struct StubAnalyzer {
        components: FilenameComponents,
        fail: bool,
        seen_content: Rc<RefCell<String>>,
    }

    impl StubAnalyzer {
        fn returning(components: FilenameComponents) -> Self {
            Self {
                components,
                fail: false,
                seen_content: Rc::new(RefCell::new(String::new())),
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::returning(FilenameComponents::default())
            }
        }
    }

    impl ComponentAnalyzer for StubAnalyzer {
        fn analyze_text(&self, content: &str, _instruction: &str) -> Result<FilenameComponents> {
            *self.seen_content.borrow_mut() = content.to_string();
            if self.fail {
                return Err(Error::analysis("stub failure"));
            }
            Ok(self.components.clone())
        }

        fn analyze_image(&self, _path: &Path, _instruction: &str) -> Result<FilenameComponents> {
            if self.fail {
                return Err(Error::analysis("stub failure"));
            }
            Ok(self.components.clone())
        }
    }

    fn test_config() -> Config {
        Config::builder()
            .batch_pause_secs(0)
            .skip_already_formatted(true)
            .build()
            .unwrap()
    }

    fn invoice_components() -> FilenameComponents {
        FilenameComponents {
            brand: Some("nike".to_string()),
            kind: Some("invoice".to_string()),
            description: Some("Q1 order".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_discover_filters_by_extension() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("a.pdf").write_str("x").unwrap();
        temp.child("b.txt").write_str("x").unwrap();
        temp.child("c.rs").write_str("x").unwrap();
        temp.child(".hidden.pdf").write_str("x").unwrap();

        let config = test_config();
        let planner = RenamePlanner::new(&config, Box::new(StubAnalyzer::failing()));
        let files = planner.discover(temp.path(), false, None).unwrap();

        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, ["a.pdf", "b.txt"]);
    }

    #[test]
    fn test_discover_respects_types_filter() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("a.pdf").write_str("x").unwrap();
        temp.child("b.txt").write_str("x").unwrap();

        let config = test_config();
        let planner = RenamePlanner::new(&config, Box::new(StubAnalyzer::failing()));
        let files = planner
            .discover(temp.path(), false, Some(&["pdf".to_string()]))
            .unwrap();

        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("a.pdf"));
    }

    #[test]
    fn test_discover_recursive() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("top.txt").write_str("x").unwrap();
        temp.child("nested/deep.txt").write_str("x").unwrap();

        let config = test_config();
        let planner = RenamePlanner::new(&config, Box::new(StubAnalyzer::failing()));

        assert_eq!(planner.discover(temp.path(), false, None).unwrap().len(), 1);
        assert_eq!(planner.discover(temp.path(), true, None).unwrap().len(), 2);
    }

    #[test]
    fn test_discover_missing_root() {
        let config = test_config();
        let planner = RenamePlanner::new(&config, Box::new(StubAnalyzer::failing()));
        assert!(planner.discover(Path::new("/nonexistent"), false, None).is_err());
    }

    #[test]
    fn test_propose_builds_destination_next_to_source() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("Scan 0001 20240115.txt");
        file.write_str("an invoice from nike for the Q1 order").unwrap();

        let config = test_config();
        let planner =
            RenamePlanner::new(&config, Box::new(StubAnalyzer::returning(invoice_components())));
        let proposals = planner.propose(&[file.path().to_path_buf()]);

        assert_eq!(proposals.len(), 1);
        let proposal = &proposals[0];
        assert!(proposal.is_success());
        assert_eq!(
            proposal.proposed_name.as_deref(),
            Some("nike-invoice-q1-order-20240115.txt")
        );
        assert_eq!(
            proposal.destination.as_deref(),
            Some(temp.path().join("nike-invoice-q1-order-20240115.txt").as_path())
        );
    }

    #[test]
    fn test_propose_skips_already_formatted() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("nike-invoice-20240115.txt");
        file.write_str("content").unwrap();

        let config = test_config();
        let stub = StubAnalyzer::returning(invoice_components());
        let planner = RenamePlanner::new(&config, Box::new(stub));
        let proposals = planner.propose(&[file.path().to_path_buf()]);

        assert!(proposals.is_empty());
    }

    #[test]
    fn test_propose_skips_on_analyzer_failure() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("Scan 0001.txt");
        file.write_str("content").unwrap();

        let config = test_config();
        let planner = RenamePlanner::new(&config, Box::new(StubAnalyzer::failing()));
        let proposals = planner.propose(&[file.path().to_path_buf()]);

        // Analyzer failure is a skip, not a failure-flagged proposal.
        assert!(proposals.is_empty());
    }

    #[test]
    fn test_propose_skips_empty_content() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("Scan 0001.txt");
        file.write_str("   \n  ").unwrap();

        let config = test_config();
        let stub = StubAnalyzer::returning(invoice_components());
        let planner = RenamePlanner::new(&config, Box::new(stub));
        let proposals = planner.propose(&[file.path().to_path_buf()]);

        assert!(proposals.is_empty());
    }

    #[test]
    fn test_analysis_content_is_bounded() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("Big Document.txt");
        file.write_str(&"lorem ipsum ".repeat(500)).unwrap();

        let config = Config::builder()
            .batch_pause_secs(0)
            .max_text_length(5000)
            .build()
            .unwrap();
        let stub = StubAnalyzer::returning(invoice_components());
        let seen = Rc::clone(&stub.seen_content);
        let planner = RenamePlanner::new(&config, Box::new(stub));
        planner.propose(&[file.path().to_path_buf()]);

        let forwarded = seen.borrow();
        assert!(!forwarded.is_empty());
        assert!(forwarded.chars().count() <= ANALYSIS_CONTENT_LIMIT);
    }

    #[test]
    fn test_image_dispatch() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("IMG 4123.png");
        file.write_binary(&[0x89, 0x50, 0x4e, 0x47]).unwrap();

        let config = test_config();
        let stub = StubAnalyzer::returning(invoice_components());
        let planner = RenamePlanner::new(&config, Box::new(stub));
        let proposals = planner.propose(&[file.path().to_path_buf()]);

        assert_eq!(proposals.len(), 1);
        assert!(proposals[0]
            .proposed_name
            .as_deref()
            .unwrap()
            .ends_with(".png"));
    }

    #[test]
    fn test_execute_renames_and_records() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("Scan 0001 20240115.txt");
        file.write_str("nike invoice").unwrap();

        let config = test_config();
        let planner =
            RenamePlanner::new(&config, Box::new(StubAnalyzer::returning(invoice_components())));
        let proposals = planner.propose(&[file.path().to_path_buf()]);

        let mut ledger = RenameLedger::new(temp.path().join("logs")).unwrap();
        let (renamed, failed) = planner.execute(&proposals, &mut ledger);

        assert_eq!((renamed, failed), (1, 0));
        assert!(!file.exists());
        assert!(temp.child("nike-invoice-q1-order-20240115.txt").exists());
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.successful(), 1);
    }

    #[test]
    fn test_execute_records_collision_as_failure() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("Scan 0001 20240115.txt");
        file.write_str("nike invoice").unwrap();
        temp.child("nike-invoice-q1-order-20240115.txt")
            .write_str("already here")
            .unwrap();

        let config = test_config();
        let planner =
            RenamePlanner::new(&config, Box::new(StubAnalyzer::returning(invoice_components())));
        let proposals = planner.propose(&[file.path().to_path_buf()]);

        let mut ledger = RenameLedger::new(temp.path().join("logs")).unwrap();
        let (renamed, failed) = planner.execute(&proposals, &mut ledger);

        assert_eq!((renamed, failed), (0, 1));
        assert!(file.exists());
        assert_eq!(ledger.successful(), 0);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_execute_continues_past_failures() {
        let temp = assert_fs::TempDir::new().unwrap();
        let blocked = temp.child("Blocked File 20240101.txt");
        blocked.write_str("nike invoice").unwrap();
        // Occupy the destination the first file would take.
        temp.child("nike-invoice-q1-order-20240101.txt")
            .write_str("x")
            .unwrap();
        let fine = temp.child("Fine File 20240202.txt");
        fine.write_str("nike invoice").unwrap();

        let config = test_config();
        let planner =
            RenamePlanner::new(&config, Box::new(StubAnalyzer::returning(invoice_components())));
        let proposals = planner.propose(&[
            blocked.path().to_path_buf(),
            fine.path().to_path_buf(),
        ]);

        let mut ledger = RenameLedger::new(temp.path().join("logs")).unwrap();
        let (renamed, failed) = planner.execute(&proposals, &mut ledger);

        assert_eq!((renamed, failed), (1, 1));
        assert!(temp.child("nike-invoice-q1-order-20240202.txt").exists());
    }

    #[test]
    fn test_run_dry_mode_touches_nothing() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("Scan 0001.txt");
        file.write_str("nike invoice").unwrap();

        let config = test_config();
        let planner =
            RenamePlanner::new(&config, Box::new(StubAnalyzer::returning(invoice_components())));
        let stats = planner
            .run(temp.path(), false, None, false, &temp.path().join("logs"))
            .unwrap();

        assert_eq!(stats.discovered, 1);
        assert_eq!(stats.proposed, 1);
        assert_eq!(stats.renamed, 0);
        assert!(file.exists());
        assert!(!temp.path().join("logs").exists());
    }

    #[test]
    fn test_run_execute_persists_session() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("Scan 0001 20240115.txt")
            .write_str("nike invoice")
            .unwrap();

        let config = test_config();
        let planner =
            RenamePlanner::new(&config, Box::new(StubAnalyzer::returning(invoice_components())));
        let log_dir = temp.path().join("logs");
        let stats = planner.run(temp.path(), false, None, true, &log_dir).unwrap();

        assert_eq!(stats.renamed, 1);
        let sessions = RenameLedger::list_sessions(&log_dir).unwrap();
        assert_eq!(sessions.len(), 1);

        let session = RenameLedger::load_session(&sessions[0]).unwrap();
        assert_eq!(session.total_renames, 1);
        assert_eq!(session.successful, 1);
    }

    #[test]
    fn test_is_image() {
        assert!(is_image(Path::new("photo.JPG")));
        assert!(is_image(Path::new("photo.webp")));
        assert!(!is_image(Path::new("report.pdf")));
        assert!(!is_image(Path::new("no_extension")));
    }

    #[test]
    fn test_analysis_head_bound() {
        let long = "a".repeat(1500);
        assert_eq!(analysis_head(&long).len(), ANALYSIS_CONTENT_LIMIT);
        assert_eq!(analysis_head("short"), "short");
    }
}
