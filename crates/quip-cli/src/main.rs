use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use quip_core::models::{JokePayload, SourcedJoke};
use quip_core::JokeManager;
use quip_db::{Database, DatabaseConfig};

#[derive(Parser)]
#[command(name = "quip", version, about = "Multi-provider joke aggregator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch jokes from random providers and print them
    Fetch {
        /// Number of jokes to fetch
        #[arg(short, long, default_value_t = 5)]
        count: usize,

        /// Persist fetched jokes to the database (requires QUIP_DB_* env vars)
        #[arg(long, default_value_t = false)]
        save: bool,

        /// Write fetched jokes to a timestamped JSON file in this directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show aggregate statistics for stored jokes
    Stats {
        /// Restrict per-provider counts to providers matching this name
        #[arg(short, long)]
        provider: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Setup tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("quip=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Fetch {
            count,
            save,
            output,
        } => {
            let db = if save { Some(connect_db().await?) } else { None };
            cmd_fetch(count, output.as_deref(), db.as_ref()).await?;
            if let Some(db) = db {
                db.close().await;
            }
        }
        Commands::Stats { provider } => {
            let db = connect_db().await?;
            cmd_stats(provider.as_deref(), &db).await?;
            db.close().await;
        }
    }

    Ok(())
}

/// Connect to PostgreSQL using the QUIP_DB_* environment variables.
async fn connect_db() -> Result<Database> {
    let config = DatabaseConfig::from_env().map_err(|e| anyhow::anyhow!(e))?;
    let db = Database::connect(&config)
        .await
        .context("Failed to connect to database")?;
    db.migrate().await.map_err(|e| anyhow::anyhow!(e))?;
    Ok(db)
}

async fn cmd_fetch(count: usize, output: Option<&std::path::Path>, db: Option<&Database>) -> Result<()> {
    let providers = quip_client::all_providers().map_err(|e| anyhow::anyhow!(e))?;
    let manager = JokeManager::new(providers);

    tracing::info!("Fetching {} jokes ...", count);
    let jokes = manager.multiple_jokes(count).await;

    if jokes.is_empty() {
        anyhow::bail!("No jokes could be fetched from any provider");
    }
    if jokes.len() < count {
        tracing::warn!("Fetched {} of {} requested jokes", jokes.len(), count);
    }

    for (i, joke) in jokes.iter().enumerate() {
        print_joke(i + 1, joke);
    }

    if let Some(dir) = output {
        let path = write_jokes_file(dir, &jokes)?;
        println!("Saved {} jokes to {}", jokes.len(), path.display());
    }

    if let Some(db) = db {
        let outcome = db
            .joke_repo()
            .insert_jokes(&jokes)
            .await
            .map_err(|e| anyhow::anyhow!(e))?;
        println!(
            "Stored {} new jokes ({} duplicates skipped)",
            outcome.inserted.len(),
            outcome.duplicates.len()
        );
    }

    Ok(())
}

fn print_joke(n: usize, joke: &SourcedJoke) {
    let category = joke.joke.category.as_deref().unwrap_or("uncategorized");
    println!("--- Joke {} [{}] ({}) ---", n, category, joke.provider);
    match &joke.joke.payload {
        JokePayload::Single { content } => println!("{content}"),
        JokePayload::Twopart { setup, punchline } => {
            println!("{setup}");
            println!("  ... {punchline}");
        }
    }
    println!();
}

/// Write the fetched batch to `<dir>/jokes-<timestamp>.json`.
fn write_jokes_file(dir: &std::path::Path, jokes: &[SourcedJoke]) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;

    let timestamp = chrono::Utc::now().format("%Y%m%d-%H%M%S");
    let path = dir.join(format!("jokes-{timestamp}.json"));
    let body = serde_json::to_string_pretty(jokes)?;
    std::fs::write(&path, body)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(path)
}

async fn cmd_stats(provider: Option<&str>, db: &Database) -> Result<()> {
    let repo = db.joke_repo();

    let stats = repo.get_joke_stats().await.map_err(|e| anyhow::anyhow!(e))?;
    println!("Totals:");
    println!("  jokes:      {}", stats.total_jokes);
    println!("  providers:  {}", stats.total_providers);
    println!("  categories: {}", stats.total_categories);
    println!("  single:     {}", stats.single_jokes);
    println!("  twopart:    {}", stats.twopart_jokes);
    println!("  safe:       {}", stats.safe_jokes);
    println!("  unsafe:     {}", stats.unsafe_jokes);

    let per_provider = repo
        .joke_count_by_provider(provider)
        .await
        .map_err(|e| anyhow::anyhow!(e))?;

    if per_provider.is_empty() {
        match provider {
            Some(p) => println!("\nNo stored jokes for provider matching '{p}'"),
            None => println!("\nNo stored jokes yet"),
        }
        return Ok(());
    }

    println!("\nPer provider:");
    for p in &per_provider {
        println!(
            "  {:<45} {:>6} jokes ({} single / {} twopart, {} safe)",
            p.provider, p.joke_count, p.single_count, p.twopart_count, p.safe_count
        );
    }

    Ok(())
}
