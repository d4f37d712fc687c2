use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use secrecy::ExposeSecret;
use std::path::PathBuf;
use tokio::io::BufReader;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;

use discussion_repl::config::{Config, Endpoints};
use discussion_repl::discussion::{DiscussionResolver, HnClient, RedditClient};
use discussion_repl::net::HttpClient;
use discussion_repl::session::{write_resolution, ReplSession};
use discussion_repl::storage::{Database, MemoryJoggerCli, MemoryJoggerStore};
use discussion_repl::wayback::SnapshotLookup;

/// Get the config directory path (~/.config/discussion-repl/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("discussion-repl"))
}

#[derive(Parser, Debug)]
#[command(
    name = "discussion-repl",
    about = "Find discussions of saved articles and triage your reading list"
)]
struct Args {
    /// Config file (default: ~/.config/discussion-repl/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// memory_jogger database URL (overrides MEMORY_JOGGER_DATABASE_URL)
    #[arg(long, value_name = "URL")]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Option<CliCommand>,
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// Print discussions for a single URL and exit
    Discussions {
        url: String,
    },
    /// Print the Wayback Machine snapshot closest to a time and exit
    Wayback {
        url: String,
        /// Snapshot time, e.g. 2013-09-19T04:46:12 (default: latest)
        #[arg(short, long)]
        time: Option<NaiveDateTime>,
    },
}

fn load_config(args: &Args) -> Result<Config> {
    let path = match &args.config {
        Some(path) => path.clone(),
        None => get_config_dir()?.join("config.toml"),
    };
    let mut config = Config::load(&path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    config.apply_env(|key| std::env::var(key).ok())?;
    if let Some(url) = &args.database_url {
        config.database_url = Some(url.clone().into());
    }
    tracing::debug!(?config, "Effective configuration");
    Ok(config)
}

fn build_resolver(http: &HttpClient, endpoints: &Endpoints) -> DiscussionResolver {
    let hn = HnClient::new(
        http.clone(),
        endpoints.hn_item_api.clone(),
        endpoints.hn_search_api.clone(),
    );
    let reddit = RedditClient::new(http.clone(), endpoints.reddit_api.clone());
    DiscussionResolver::new(hn, reddit)
}

/// Forward every SIGINT to the REPL.
///
/// Installed once, before the session starts, so an interrupt during a
/// lookup is seen just like one at the prompt.
fn forward_interrupts() -> Result<mpsc::Receiver<()>> {
    let mut sigint = signal(SignalKind::interrupt()).context("Failed to install SIGINT handler")?;
    let (tx, rx) = mpsc::channel(1);
    tokio::spawn(async move {
        while sigint.recv().await.is_some() {
            if tx.send(()).await.is_err() {
                break;
            }
        }
    });
    Ok(rx)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so they never interleave with REPL output
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;
    let endpoints = config.endpoints()?;
    let http = HttpClient::new(&config.user_agent, config.http_timeout())
        .context("Failed to build HTTP client")?;
    let resolver = build_resolver(&http, &endpoints);
    let snapshots = SnapshotLookup::new(http.clone(), endpoints.wayback_api.clone());

    match args.command {
        Some(CliCommand::Discussions { url }) => {
            let resolution = resolver
                .resolve(&url)
                .await
                .with_context(|| format!("Failed to find discussions for {url}"))?;
            write_resolution(&mut std::io::stdout().lock(), &resolution)?;
            if resolution.threads.is_empty() {
                eprintln!("No discussions found");
            }
        }
        Some(CliCommand::Wayback { url, time }) => {
            let snapshot = snapshots
                .lookup(&url, time)
                .await
                .with_context(|| format!("Failed to look up snapshot for {url}"))?;
            match snapshot {
                Some(snapshot) => println!("{snapshot}"),
                None => println!("No archive found"),
            }
        }
        None => {
            let database_url = config.require_database_url()?;
            let db = Database::open(database_url.expose_secret())
                .await
                .context("Failed to open memory_jogger database")?;
            let cli = MemoryJoggerCli::new(
                config.memory_jogger_bin.clone(),
                database_url.clone(),
                config.user_id,
            );
            let store = MemoryJoggerStore::new(db, cli);

            let mut session = ReplSession::new(
                store,
                resolver,
                snapshots,
                BufReader::new(tokio::io::stdin()),
                std::io::stdout(),
                std::io::stderr(),
            )
            .with_interrupts(forward_interrupts()?);
            session.run().await?;
        }
    }

    Ok(())
}
