use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use llm_rename::{
    Config, LmClient, RenameLedger, RenamePlanner, RenameProposal, RenameSession, RunStats,
    default_log_dir,
};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    name = "llm-rename",
    version,
    author,
    about = "Rename files based on their content using a local language model",
    long_about = "Rename files based on their content using a locally-hosted language model.\n\n\
    The tool extracts text from supported documents (or sends images to a vision \
    model), asks the model for semantic components, and builds standardized \
    filenames from them. Renames are dry-run by default and every executed run \
    is recorded in a session log that can be reverted.\n\n\
    USAGE EXAMPLES:\n  \
      # Preview renames for the current directory\n  \
      llm-rename rename\n\n  \
      # Actually rename everything under ./scans\n  \
      llm-rename rename --path ./scans --recursive --execute\n\n  \
      # Only PDFs, smaller batches\n  \
      llm-rename rename --types pdf --batch-size 5\n\n  \
      # Revert the most recent session\n  \
      llm-rename undo --execute"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze files and propose (or perform) renames
    Rename(RenameArgs),
    /// List, inspect, and revert previous rename sessions
    Undo(UndoArgs),
}

#[derive(Args, Debug)]
struct RenameArgs {
    /// Directory to process
    #[arg(short, long, default_value = ".", value_name = "PATH")]
    path: PathBuf,

    /// Path to config file (default: llm-rename.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Actually rename files (default: dry-run)
    #[arg(short, long)]
    execute: bool,

    /// Skip the confirmation prompt (use with --execute)
    #[arg(short, long)]
    yes: bool,

    /// Process subdirectories recursively
    #[arg(short, long)]
    recursive: bool,

    /// Comma-separated file extensions to process (e.g. pdf,docx)
    #[arg(short, long, value_name = "EXTS")]
    types: Option<String>,

    /// Files to process per batch (overrides config)
    #[arg(short, long, value_name = "N")]
    batch_size: Option<usize>,
}

#[derive(Args, Debug)]
struct UndoArgs {
    /// Specific session log to undo (default: most recent)
    #[arg(short, long, value_name = "FILE")]
    log: Option<PathBuf>,

    /// List all available rename sessions
    #[arg(long)]
    list: bool,

    /// Show the records of a session without reverting
    #[arg(short, long)]
    show: bool,

    /// Actually revert files (default: dry-run)
    #[arg(short, long)]
    execute: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_tracing(cli.verbose);

    match cli.command {
        Command::Rename(args) => cmd_rename(&args),
        Command::Undo(args) => cmd_undo(&args),
    }
}

fn setup_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => EnvFilter::new("llm_rename=warn"),
        1 => EnvFilter::new("llm_rename=debug"),
        _ => EnvFilter::new("llm_rename=trace"),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_thread_ids(false))
        .init();
}

fn cmd_rename(args: &RenameArgs) -> anyhow::Result<()> {
    let mut config =
        Config::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(batch_size) = args.batch_size {
        config.processing.batch_size = batch_size;
    }
    config.validate().context("Invalid configuration")?;

    println!("{}", "=".repeat(60));
    println!("llm-rename - content-aware file renaming");
    println!("{}", "=".repeat(60));
    println!();

    if args.execute {
        println!("EXECUTE MODE: files will be renamed");
        if !args.yes && !confirm("Are you sure you want to continue?") {
            println!("Cancelled.");
            return Ok(());
        }
    } else {
        println!("DRY-RUN MODE: no files will be renamed");
    }
    println!();

    let client = LmClient::new(&config.server).context("Failed to create model client")?;

    println!("Testing model server connection...");
    match client.ping() {
        Ok(models) => println!("Connected to {} ({} model(s) loaded)", config.server.base_url, models.len()),
        Err(e) => {
            println!(
                "Could not connect to the model server at {}: {e}",
                config.server.base_url
            );
            println!("Please ensure it is running, then try again.");
            return Ok(());
        }
    }
    println!();

    let types: Option<Vec<String>> = args
        .types
        .as_ref()
        .map(|t| t.split(',').map(str::to_string).collect());

    let start = Instant::now();
    let planner = RenamePlanner::new(&config, Box::new(client));
    let files = planner.discover(&args.path, args.recursive, types.as_deref())?;

    if files.is_empty() {
        println!("No files found to process.");
        return Ok(());
    }

    println!("Found {} file(s) to process", files.len());
    if files.len() > config.processing.batch_size {
        println!(
            "Processing in batches of {} to bound model server load",
            config.processing.batch_size
        );
    }
    println!();

    let proposals = planner.propose(&files);

    if proposals.is_empty() {
        println!("No files were processed.");
        return Ok(());
    }

    println!();
    println!("Proposed renames:");
    println!();
    print_proposals(&proposals);

    let mut stats = RunStats {
        discovered: files.len(),
        proposed: proposals.iter().filter(|p| p.is_success()).count(),
        failed_proposals: proposals.iter().filter(|p| !p.is_success()).count(),
        skipped: files.len() - proposals.len(),
        ..RunStats::default()
    };

    if args.execute {
        println!();
        println!("Renaming files...");

        let mut ledger = RenameLedger::new(config.resolved_log_dir())
            .context("Failed to create rename ledger")?;
        let (renamed, failed) = planner.execute(&proposals, &mut ledger);
        let session_file = ledger.persist().context("Failed to persist rename session")?;

        stats.renamed = renamed;
        stats.failed_renames = failed;

        println!();
        println!("Rename log saved: {}", session_file.display());
        println!();
        println!("{}", ledger.summary());
    }

    stats.duration = start.elapsed();
    stats.print_summary();
    Ok(())
}

fn cmd_undo(args: &UndoArgs) -> anyhow::Result<()> {
    let log_dir = default_log_dir();

    if args.list {
        return list_sessions(&log_dir);
    }

    let session_file = match &args.log {
        Some(path) => path.clone(),
        None => {
            let sessions = RenameLedger::list_sessions(&log_dir)?;
            let Some(newest) = sessions.into_iter().next() else {
                println!("No rename sessions found in {}", log_dir.display());
                println!("Run `llm-rename rename --execute` at least once first.");
                return Ok(());
            };
            println!(
                "Using most recent session: {}",
                newest.file_name().unwrap_or_default().to_string_lossy()
            );
            newest
        }
    };

    if !session_file.exists() {
        println!("Session log not found: {}", session_file.display());
        return Ok(());
    }

    if args.show {
        return show_session(&session_file);
    }

    println!();
    println!("{}", "=".repeat(60));
    println!("Undo File Renames");
    println!("{}", "=".repeat(60));
    println!("Session log: {}", session_file.display());
    println!();

    if !args.execute {
        println!("DRY-RUN MODE: no files will be reverted");
        println!();
    }

    let session = RenameLedger::load_session(&session_file)
        .context("Failed to load rename session")?;
    println!("Session date: {}", session.session_start);
    println!("Renames in session: {}", session.total_renames);
    println!();

    if args.execute {
        println!("WARNING: this will revert your files!");
        if !confirm("Are you sure you want to continue?") {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let outcome = RenameLedger::undo(&session_file, args.execute)?;

    if !args.execute && outcome.planned > 0 {
        println!();
        println!(
            "To actually revert these {} file(s), run with --execute",
            outcome.planned
        );
    }

    Ok(())
}

fn list_sessions(log_dir: &Path) -> anyhow::Result<()> {
    let sessions = RenameLedger::list_sessions(log_dir)?;

    if sessions.is_empty() {
        println!("No rename sessions found in {}", log_dir.display());
        return Ok(());
    }

    println!("Available rename sessions:");
    println!("{}", "=".repeat(60));
    println!("{:>3}  {:<19}  {:>5}  {:>7}  Log File", "#", "Date/Time", "Total", "Success");

    for (index, session_file) in sessions.iter().enumerate() {
        match RenameLedger::load_session(session_file) {
            Ok(session) => {
                let name = session_file
                    .file_name()
                    .unwrap_or_default()
                    .to_string_lossy();
                println!(
                    "{:>3}  {:<19}  {:>5}  {:>7}  {}",
                    index + 1,
                    pretty_session_timestamp(&name),
                    session.total_renames,
                    session.successful,
                    name
                );
            }
            Err(e) => println!("Error reading {}: {e}", session_file.display()),
        }
    }

    println!();
    println!("To undo a session: llm-rename undo --log <file> --execute");
    Ok(())
}

fn show_session(session_file: &Path) -> anyhow::Result<()> {
    let session: RenameSession =
        RenameLedger::load_session(session_file).context("Failed to load rename session")?;

    println!();
    println!("{}", "=".repeat(60));
    println!("Rename Session Details");
    println!("{}", "=".repeat(60));
    println!("Session: {}", session.session_start);
    println!("Total renames: {}", session.total_renames);
    println!("Successful: {}", session.successful);
    println!("Failed: {}", session.failed);
    println!();
    println!("Files renamed:");
    println!("{}", "-".repeat(60));

    for record in &session.renames {
        let status = if record.success { "✓" } else { "✗" };
        println!("{status} {} -> {}", record.old_name, record.new_name);
        if let Some(error) = &record.error {
            println!("    {error}");
        }
    }

    println!();
    Ok(())
}

/// Renders `renames_YYYYMMDD_HHMMSS.json` as `YYYY-MM-DD HH:MM:SS`.
fn pretty_session_timestamp(file_name: &str) -> String {
    let stamp = file_name
        .trim_start_matches("renames_")
        .trim_end_matches(".json");

    let digits: String = stamp.chars().filter(char::is_ascii_digit).collect();
    if digits.len() != 14 {
        return stamp.to_string();
    }

    format!(
        "{}-{}-{} {}:{}:{}",
        &digits[..4],
        &digits[4..6],
        &digits[6..8],
        &digits[8..10],
        &digits[10..12],
        &digits[12..14]
    )
}

fn print_proposals(proposals: &[RenameProposal]) {
    let width = proposals
        .iter()
        .map(|p| p.original_name.chars().count())
        .max()
        .unwrap_or(8)
        .clamp(8, 48);

    println!("{:>2}  {:<width$}     {}", "", "Original", "New Name");
    println!("{}", "-".repeat(width + 40));

    for proposal in proposals {
        let status = if proposal.is_success() { "✓" } else { "✗" };
        let target = proposal
            .proposed_name
            .as_deref()
            .or(proposal.failure.as_deref())
            .unwrap_or("?");
        println!(
            "{status:>2}  {:<width$}  -> {target}",
            truncate_display(&proposal.original_name, width),
        );
    }
}

/// Truncates a name for table display, marking the cut with `...`.
fn truncate_display(name: &str, width: usize) -> String {
    if name.chars().count() <= width {
        return name.to_string();
    }
    let cut: String = name.chars().take(width.saturating_sub(3)).collect();
    format!("{cut}...")
}

fn confirm(prompt: &str) -> bool {
    print!("{prompt} [y/N]: ");
    let _ = io::stdout().flush();

    let mut line = String::new();
    if io::stdin().read_line(&mut line).is_err() {
        return false;
    }
    matches!(line.trim(), "y" | "Y" | "yes" | "Yes")
}
