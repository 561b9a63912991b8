//! Refrain CLI
//!
//! Command-line interface for importing lyrics, practicing, and serving the
//! practice API.

use std::io::{self, BufRead, Write};
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use refrain_core::{
    render_line, ChunkRef, FadeLevel, LinePlan, MemoryStatus, NewChunk, PracticeConfig,
    ProgressStore, Rating, SessionOrchestrator, SessionSummary, Storage,
};
use refrain_server::api::{self, AppState};
use refrain_server::ServerConfig;

/// Refrain - lyric memorization CLI
#[derive(Parser)]
#[command(name = "refrain")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Practice song lyrics with fading words and spaced repetition")]
struct Cli {
    /// Directory holding refrain.db (default: platform data dir)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// JSON tuning file for scheduler, status, fade and XP settings
    #[arg(long, global = true)]
    tuning: Option<PathBuf>,

    /// User to act as
    #[arg(long, global = true, default_value = "default")]
    user: String,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the practice HTTP API
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<IpAddr>,
        /// Port to bind
        #[arg(long)]
        port: Option<u16>,
    },

    /// Import lyric chunks from a JSON file
    Import {
        /// JSON array of chunks ({ id?, songId, label, position?, lines: [..] })
        file: PathBuf,
        /// Also assign every imported chunk to --user
        #[arg(long)]
        assign: bool,
    },

    /// Assign a chunk or a whole song to --user
    Assign {
        /// Chunk id
        #[arg(long, conflicts_with = "song", required_unless_present = "song")]
        chunk: Option<String>,
        /// Song id
        #[arg(long)]
        song: Option<String>,
    },

    /// List chunks due for practice
    Due,

    /// Practice due chunks interactively
    Practice {
        /// Stop after this many chunks
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show a chunk at a fade level
    Plan {
        /// Chunk id
        chunk_id: String,
        /// Fade level (0 = all visible, 5 = all hidden)
        #[arg(long, default_value = "0")]
        level: u8,
    },

    /// Show progress statistics for --user
    Stats {
        /// Also list the most recent reviews
        #[arg(long)]
        history: Option<usize>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let config = ServerConfig::from_env().with_overrides(
        cli.data_dir.clone(),
        None,
        None,
        cli.tuning.clone(),
    );

    match cli.command {
        Commands::Serve { host, port } => run_serve(config.with_overrides(None, host, port, None)),
        Commands::Import { file, assign } => run_import(&config, &file, assign.then_some(cli.user.as_str())),
        Commands::Assign { chunk, song } => run_assign(&config, &cli.user, chunk, song),
        Commands::Due => run_due(&config, &cli.user),
        Commands::Practice { limit } => run_practice(&config, &cli.user, limit),
        Commands::Plan { chunk_id, level } => run_plan(&config, &chunk_id, level),
        Commands::Stats { history } => run_stats(&config, &cli.user, history),
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::from_default_env().add_directive(Level::INFO.into());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Tuning plus storage opened with its classifier
fn open(config: &ServerConfig) -> anyhow::Result<(PracticeConfig, Arc<Storage>)> {
    let practice = config
        .practice_config()
        .context("Failed to load tuning file")?;
    let storage = config
        .open_storage(&practice)
        .context("Failed to open database")?;
    Ok((practice, Arc::new(storage)))
}

fn orchestrator(
    practice: &PracticeConfig,
    storage: Arc<Storage>,
) -> SessionOrchestrator<Storage> {
    SessionOrchestrator::new(storage, practice.review_scheduler())
        .with_fade_engine(practice.fade.clone())
        .with_xp_table(practice.xp.clone())
}

// ============================================================================
// SERVE
// ============================================================================

fn run_serve(config: ServerConfig) -> anyhow::Result<()> {
    let (practice, storage) = open(&config)?;
    let state = AppState::new(storage, &practice);
    let addr = config.socket_addr();

    println!("{}", "=== Refrain API ===".cyan().bold());
    println!("{}: http://{}", "Listening".white().bold(), addr);
    println!("{}", "Press Ctrl-C to stop.".dimmed());

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(api::serve(state, addr))?;
    Ok(())
}

// ============================================================================
// IMPORT & ASSIGN
// ============================================================================

fn run_import(config: &ServerConfig, file: &Path, assign_to: Option<&str>) -> anyhow::Result<()> {
    let (_, storage) = open(config)?;

    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let chunks: Vec<NewChunk> = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a JSON array of chunks", file.display()))?;

    println!("{}", "=== Importing Chunks ===".cyan().bold());

    let now = Utc::now();
    let mut imported = 0usize;
    let mut rejected = 0usize;

    for new_chunk in chunks {
        let chunk = new_chunk.into_chunk();
        match storage.register_chunk(&chunk) {
            Ok(()) => {
                imported += 1;
                println!(
                    "  {} {} {} ({} lines)",
                    "+".green(),
                    chunk.song_id.dimmed(),
                    chunk.label,
                    chunk.lines.len()
                );
                if let Some(user) = assign_to {
                    storage.assign_chunk(user, &chunk.id, now)?;
                }
            }
            Err(e) => {
                rejected += 1;
                println!("  {} {}: {}", "!".red(), chunk.label, e);
            }
        }
    }

    println!();
    println!("{}: {}", "Imported".white().bold(), imported);
    if rejected > 0 {
        println!("{}: {}", "Rejected".red().bold(), rejected);
    }
    if let Some(user) = assign_to {
        println!("{}: {}", "Assigned to".white().bold(), user);
    }
    Ok(())
}

fn run_assign(
    config: &ServerConfig,
    user: &str,
    chunk: Option<String>,
    song: Option<String>,
) -> anyhow::Result<()> {
    let (_, storage) = open(config)?;
    let now = Utc::now();

    let assigned = match (chunk, song) {
        (Some(chunk_id), _) => vec![storage.assign_chunk(user, &chunk_id, now)?],
        (None, Some(song_id)) => storage.assign_song(user, &song_id, now)?,
        (None, None) => anyhow::bail!("Pass --chunk or --song"),
    };

    for progress in &assigned {
        println!(
            "  {} {} ({})",
            "+".green(),
            progress.chunk_id,
            progress.status().as_str()
        );
    }
    println!("{}: {} chunk(s) for {}", "Assigned".white().bold(), assigned.len(), user);
    Ok(())
}

// ============================================================================
// DUE & PLAN
// ============================================================================

fn run_due(config: &ServerConfig, user: &str) -> anyhow::Result<()> {
    let (practice, storage) = open(config)?;
    let queue = orchestrator(&practice, storage).due_queue(user, Utc::now())?;

    println!("{}", format!("=== Due for {} ===", user).cyan().bold());
    if queue.is_empty() {
        println!("{}", "Nothing due. Come back later.".dimmed());
        return Ok(());
    }

    for due in &queue {
        println!(
            "  {:<24} {:<12} level {}  due {}",
            due.chunk.label,
            status_label(due.progress.status()),
            due.progress.fade_level,
            due.progress.next_review_at.format("%Y-%m-%d %H:%M")
        );
    }
    println!();
    println!("{}: {}", "Total".white().bold(), queue.len());
    Ok(())
}

fn run_plan(config: &ServerConfig, chunk_id: &str, level: u8) -> anyhow::Result<()> {
    let (practice, storage) = open(config)?;
    let level = FadeLevel::new(level)?;
    let chunk = storage
        .get_chunk(chunk_id)?
        .with_context(|| format!("No chunk with id {}", chunk_id))?;
    let plans = practice.fade.plan_chunk(&chunk, level);

    println!(
        "{}",
        format!("=== {} (level {}) ===", chunk.label, level).cyan().bold()
    );
    print_chunk(&chunk, &plans);
    Ok(())
}

fn print_chunk(chunk: &ChunkRef, plans: &[LinePlan]) {
    for (index, (words, plan)) in chunk.lines.iter().zip(plans).enumerate() {
        println!("  {:>2}  {}", (index + 1).to_string().dimmed(), render_line(words.as_slice(), plan));
    }
}

// ============================================================================
// PRACTICE
// ============================================================================

const PRACTICE_HELP: &str =
    "[n]ailed it  [a]lmost  [s]truggling  [r <line> <word>] reveal  [k] skip  [q] quit";

fn run_practice(config: &ServerConfig, user: &str, limit: Option<usize>) -> anyhow::Result<()> {
    let (practice, storage) = open(config)?;
    let orchestrator = orchestrator(&practice, storage);
    let mut session = orchestrator.start_session(user, Utc::now())?;

    if session.current().is_none() {
        println!("{}", "Nothing due. Come back later.".dimmed());
        return Ok(());
    }

    println!("{}", format!("=== Practice: {} due ===", session.remaining()).cyan().bold());
    println!("{}", PRACTICE_HELP.dimmed());

    let stdin = io::stdin();
    let mut input = stdin.lock().lines();
    let mut rated = 0usize;

    'chunks: while let Some(due) = session.current() {
        if limit.is_some_and(|max| rated >= max) {
            break;
        }

        let chunk = due.chunk.clone();
        println!();
        println!(
            "{} {}",
            chunk.label.white().bold(),
            format!("[{} | level {}]", status_label(due.progress.status()), due.progress.fade_level)
                .dimmed()
        );
        if let Some(plans) = session.current_plan() {
            print_chunk(&chunk, &plans);
        }

        loop {
            print!("{} ", ">".cyan());
            io::stdout().flush()?;
            let Some(line) = input.next().transpose()? else {
                break 'chunks;
            };

            match parse_command(&line) {
                Some(PracticeCommand::Rate(rating)) => match session.submit(rating, Utc::now()) {
                    Ok(outcome) => {
                        rated += 1;
                        let tag = if outcome.extra_practice { " (extra practice)" } else { "" };
                        println!(
                            "  +{} XP  {} -> {}  next in {} day(s){}",
                            outcome.xp_earned.to_string().green(),
                            status_label(outcome.previous_status),
                            status_label(outcome.progress.status()),
                            outcome.progress.interval_days,
                            tag.dimmed()
                        );
                        continue 'chunks;
                    }
                    Err(e) => {
                        println!("  {} {}", "Not saved:".red(), e);
                        // The session already moved past a permanent failure
                        if !e.is_retryable() {
                            continue 'chunks;
                        }
                    }
                },
                Some(PracticeCommand::Reveal(line_no, word_no)) => {
                    session.reveal(line_no.saturating_sub(1), word_no.saturating_sub(1));
                    if let Some(plans) = session.current_plan() {
                        print_chunk(&chunk, &plans);
                    }
                }
                Some(PracticeCommand::Skip) => {
                    session.skip();
                    continue 'chunks;
                }
                Some(PracticeCommand::Quit) => break 'chunks,
                None => println!("{}", PRACTICE_HELP.dimmed()),
            }
        }
    }

    print_summary(&session.finish(Utc::now()));
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum PracticeCommand {
    Rate(Rating),
    /// 1-based line and word
    Reveal(usize, usize),
    Skip,
    Quit,
}

fn parse_command(line: &str) -> Option<PracticeCommand> {
    let mut parts = line.split_whitespace();
    let head = parts.next()?.to_lowercase();
    match head.as_str() {
        "n" => Some(PracticeCommand::Rate(Rating::NailedIt)),
        "a" => Some(PracticeCommand::Rate(Rating::Almost)),
        "s" => Some(PracticeCommand::Rate(Rating::Struggling)),
        "k" | "skip" => Some(PracticeCommand::Skip),
        "q" | "quit" => Some(PracticeCommand::Quit),
        "r" | "reveal" => {
            let line_no = parts.next()?.parse().ok()?;
            let word_no = parts.next()?.parse().ok()?;
            Some(PracticeCommand::Reveal(line_no, word_no))
        }
        other => other.parse::<Rating>().ok().map(PracticeCommand::Rate),
    }
}

fn print_summary(summary: &SessionSummary) {
    println!();
    println!("{}", "=== Session Summary ===".cyan().bold());
    println!("{}: {}", "Chunks Reviewed".white().bold(), summary.chunks_reviewed);
    if summary.extra_practice > 0 {
        println!("{}: {}", "Extra Practice".white().bold(), summary.extra_practice);
    }
    println!("{}: {}", "XP Earned".white().bold(), summary.total_xp.to_string().green());

    for improvement in &summary.improvements {
        println!(
            "  {} {}: {} -> {}",
            "^".green(),
            improvement.chunk_label,
            status_label(improvement.old_status),
            status_label(improvement.new_status)
        );
    }
    for failed in &summary.failed {
        println!("  {} {}: {}", "!".red(), failed.chunk_id, failed.message);
    }
}

// ============================================================================
// STATS
// ============================================================================

fn run_stats(config: &ServerConfig, user: &str, history: Option<usize>) -> anyhow::Result<()> {
    let (_, storage) = open(config)?;
    let stats = storage.user_stats(user, Utc::now())?;

    println!("{}", format!("=== Refrain Progress: {} ===", user).cyan().bold());
    println!();
    println!("{}: {}", "Assigned Chunks".white().bold(), stats.total_chunks);
    println!("{}: {}", "Due Now".white().bold(), stats.due_now);
    println!("{}: {:.1}", "Average Strength".white().bold(), stats.average_strength);
    println!("{}: {}", "Total Reviews".white().bold(), stats.total_reviews);
    println!("{}: {}", "Total XP".white().bold(), stats.total_xp);
    if let Some(last) = stats.last_reviewed_at {
        println!("{}: {}", "Last Review".white().bold(), last.format("%Y-%m-%d %H:%M:%S"));
    }

    println!();
    println!("{}", "=== Status Distribution ===".magenta().bold());
    if stats.total_chunks == 0 {
        println!("{}", "No chunks assigned.".dimmed());
    } else {
        for status in MemoryStatus::all() {
            let count = stats.by_status.get(&status).copied().unwrap_or(0);
            print_distribution_bar(status.as_str(), count, stats.total_chunks, status_color(status));
        }
    }

    if let Some(limit) = history {
        println!();
        println!("{}", "=== Recent Reviews ===".yellow().bold());
        let entries = storage.review_history(user, None, limit.max(1))?;
        if entries.is_empty() {
            println!("{}", "No reviews yet.".dimmed());
        }
        for entry in entries {
            println!(
                "  {}  {:<20} {:<11} {} -> {}  +{} XP{}",
                entry.reviewed_at.format("%Y-%m-%d %H:%M"),
                entry.chunk_id,
                entry.rating.as_str(),
                entry.old_status.as_str(),
                entry.new_status.as_str(),
                entry.xp_earned,
                if entry.extra_practice { " (extra)" } else { "" }
            );
        }
    }

    Ok(())
}

fn status_color(status: MemoryStatus) -> &'static str {
    match status {
        MemoryStatus::Fragile => "red",
        MemoryStatus::Shaky => "yellow",
        MemoryStatus::Developing => "magenta",
        _ => "green",
    }
}

fn status_label(status: MemoryStatus) -> colored::ColoredString {
    match status_color(status) {
        "red" => status.as_str().red(),
        "yellow" => status.as_str().yellow(),
        "magenta" => status.as_str().magenta(),
        _ => status.as_str().green(),
    }
}

fn print_distribution_bar(label: &str, count: usize, total: usize, color: &str) {
    let percentage = if total > 0 {
        (count as f64 / total as f64) * 100.0
    } else {
        0.0
    };

    let bar_width: usize = 30;
    let filled = ((percentage / 100.0) * bar_width as f64) as usize;
    let empty = bar_width.saturating_sub(filled);

    let bar = format!("{}{}", "#".repeat(filled), "-".repeat(empty));
    let colored_bar = match color {
        "green" => bar.green(),
        "yellow" => bar.yellow(),
        "red" => bar.red(),
        "magenta" => bar.magenta(),
        _ => bar.white(),
    };

    println!(
        "  {:12} [{:30}] {:>4} ({:>5.1}%)",
        label, colored_bar, count, percentage
    );
}
