//! Antenna CLI
//!
//! CLI tool for running the antenna matcher against JSON fixtures and for
//! checking word mutes and mute patterns by hand.

mod fixture;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use antenna_core::{
    is_hard_muted, AntennaMatcher, MutePattern, NoteLoader, NoteView, RelationshipLoader, Visibility,
};

#[derive(Parser)]
#[command(name = "antenna-cli")]
#[command(about = "Antenna matching and word-mute tools")]
struct Cli {
    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Match a note from a fixture against its antennas
    Check {
        /// Fixture file (note, author, antennas, store)
        #[arg(short, long)]
        fixture: PathBuf,

        /// Matcher config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override the local instance host
        #[arg(long)]
        local_host: Option<String>,
    },

    /// Check whether a note would be hard-muted
    Mute {
        /// Note body
        #[arg(short, long)]
        text: String,

        /// Content warning
        #[arg(long)]
        cw: Option<String>,

        /// Muted word group, whitespace separated (repeatable)
        #[arg(short, long)]
        word: Vec<String>,

        /// Muted pattern in /pattern/flags form (repeatable)
        #[arg(short, long)]
        pattern: Vec<String>,
    },

    /// Parse a mute pattern and match it against a text
    Pattern {
        #[arg(short, long)]
        pattern: String,

        #[arg(short, long)]
        text: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Check {
            fixture,
            config,
            local_host,
        } => cmd_check(&fixture, config.as_deref(), local_host).await,
        Commands::Mute {
            text,
            cw,
            word,
            pattern,
        } => cmd_mute(text, cw, &word, &pattern),
        Commands::Pattern { pattern, text } => cmd_pattern(&pattern, &text),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn cmd_check(
    fixture_path: &std::path::Path,
    config_path: Option<&std::path::Path>,
    local_host: Option<String>,
) -> Result<(), String> {
    let fixture = fixture::read_fixture(fixture_path)?;
    let mut config = fixture::read_config(config_path)?;
    if let Some(host) = local_host {
        config = config.with_local_host(host);
    }

    let store = Arc::new(fixture.store);
    let matcher = AntennaMatcher::new(
        config,
        Arc::clone(&store) as Arc<dyn RelationshipLoader>,
        store as Arc<dyn NoteLoader>,
    );

    let start = Instant::now();
    let target = matcher
        .resolve(fixture.note, fixture.author, fixture.soft_muted_user_ids)
        .await;
    let hits = matcher.match_all(&target, &fixture.antennas).await;
    let elapsed = start.elapsed();

    log::info!(
        "checked note {} against {} antennas in {:.2}ms",
        target.note.id,
        fixture.antennas.len(),
        elapsed.as_secs_f64() * 1000.0
    );

    println!("Matched {} of {} antennas", hits.len(), fixture.antennas.len());
    for antenna in hits {
        println!("  {} ({})", antenna.id, antenna.name);
    }

    Ok(())
}

fn cmd_mute(text: String, cw: Option<String>, words: &[String], patterns: &[String]) -> Result<(), String> {
    if words.is_empty() && patterns.is_empty() {
        return Err("No muted words or patterns specified".to_string());
    }

    let groups: Vec<Vec<String>> = words
        .iter()
        .map(|group| group.split_whitespace().map(str::to_string).collect())
        .collect();

    let note = NoteView {
        id: "cli".to_string(),
        user_id: "cli".to_string(),
        user_host: None,
        visibility: Visibility::Public,
        text: Some(text),
        cw,
        reply_id: None,
        renote_id: None,
        has_poll: false,
        file_ids: Vec::new(),
        files: Vec::new(),
    };

    if is_hard_muted(&note, None, None, &groups, patterns) {
        println!("muted");
    } else {
        println!("not muted");
    }

    Ok(())
}

fn cmd_pattern(pattern: &str, text: &str) -> Result<(), String> {
    let compiled = MutePattern::parse(pattern).map_err(|e| format!("Invalid pattern: {e}"))?;
    println!("Pattern '{}' is valid", compiled.source());
    println!("  Matches: {}", compiled.is_match(text));
    Ok(())
}
