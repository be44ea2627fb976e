mod batch;
mod cache;
mod db;
mod discover;
mod mediawiki;
mod parser;
mod settings;
mod source;

use std::time::Instant;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::info;

use cache::PageCache;
use parser::series::SeriesMatcher;
use settings::Settings;
use source::{CachedSource, DumpSource};

#[derive(Parser)]
#[command(name = "liquiscrape", about = "Liquipedia Dota 2 player record extractor")]
struct Cli {
    /// SQLite database path (overrides settings)
    #[arg(long, global = true)]
    db: Option<String>,
    /// Directory of saved MediaWiki API responses (overrides settings)
    #[arg(long, global = true)]
    dump_dir: Option<String>,
    /// Reference date for ages, YYYY-MM-DD (default: today)
    #[arg(long, global = true)]
    as_of: Option<NaiveDate>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build records for every player in a list file, skipping stored ones
    Run {
        /// File with one player id per line
        #[arg(short, long)]
        players: String,
        /// Max players to process
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Collect player ids from the yearly statistics pages, most frequent first
    Discover {
        /// First year to read
        #[arg(long, default_value_t = 2011)]
        from: i32,
        /// Last year to read, inclusive
        #[arg(long, default_value_t = 2025)]
        to: i32,
        /// Output file, one `name:href:count` line per player (default: stdout)
        #[arg(short, long)]
        out: Option<String>,
    },
    /// Build one player's record and print it as JSON
    Extract { id: String },
    /// Write stored records as a JSON array
    Export {
        /// Output file (default: stdout)
        #[arg(short, long)]
        out: Option<String>,
    },
    /// Show database statistics
    Stats,
    /// List players that failed and why
    Failures,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let mut settings = Settings::load()?;
    if let Some(db) = cli.db {
        settings.db_path = db;
    }
    if let Some(dir) = cli.dump_dir {
        settings.dump_dir = dir;
    }
    let as_of = cli
        .as_of
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    info!(db = %settings.db_path, dump_dir = %settings.dump_dir, %as_of, "settings loaded");

    let conn = db::connect(&settings.db_path)?;
    db::init_schema(&conn)?;

    match cli.command {
        Commands::Run { players, limit } => {
            let players = batch::read_player_list(&players)?;
            let source = open_source(&settings)?;
            let matcher = matcher(&settings)?;
            let s = batch::run_batch(&conn, &source, &matcher, &players, as_of, limit)?;
            println!(
                "Done: {} saved, {} failed, {} skipped ({} with empty team history).",
                s.saved, s.failed, s.skipped, s.empty_history
            );
        }
        Commands::Discover { from, to, out } => {
            let source = open_source(&settings)?;
            let entries = discover::discover(&source, from..=to)?;
            let lines: String = entries.iter().map(|e| e.to_line() + "\n").collect();
            match out {
                Some(path) => {
                    std::fs::write(&path, lines).with_context(|| format!("writing {}", path))?;
                    println!("Found {} players, list written to {}", entries.len(), path);
                }
                None => print!("{}", lines),
            }
        }
        Commands::Extract { id } => {
            let source = open_source(&settings)?;
            let matcher = matcher(&settings)?;
            let id = batch::percent_decode(id.trim());
            let record = parser::assemble_player(&id, &source, &matcher, as_of)?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Commands::Export { out } => {
            let records = db::fetch_records(&conn)?;
            let json = serde_json::to_string_pretty(&records)?;
            match out {
                Some(path) => {
                    std::fs::write(&path, json).with_context(|| format!("writing {}", path))?;
                    println!("Exported {} records to {}", records.len(), path);
                }
                None => println!("{}", json),
            }
        }
        Commands::Stats => {
            let s = db::get_stats(&conn)?;
            println!("Records:       {}", s.records);
            println!("Failures:      {}", s.failures);
            println!("Cached pages:  {}", s.cached_pages);
            println!("Empty history: {}", s.empty_history);
        }
        Commands::Failures => {
            let failures = db::fetch_failures(&conn)?;
            if failures.is_empty() {
                println!("No failed players.");
            }
            for (id, reason) in &failures {
                println!("{:<24} {}", id, reason);
            }
        }
    }

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        eprintln!("\nDone in {}", format_duration(elapsed));
    }
    Ok(())
}

fn open_source(settings: &Settings) -> anyhow::Result<CachedSource<DumpSource>> {
    let cache = PageCache::open(&settings.db_path)?;
    Ok(CachedSource::new(DumpSource::new(&settings.dump_dir), cache))
}

fn matcher(settings: &Settings) -> anyhow::Result<SeriesMatcher> {
    let matcher = SeriesMatcher::new(&settings.series)
        .with_context(|| format!("invalid series name {:?}", settings.series))?;
    Ok(matcher.with_min_columns(settings.min_columns))
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
