mod contributors_cmd;
mod gallery_cmd;
mod sign_cmd;
mod status_cmd;
mod terminal_output;

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

use keeper_config::{KeeperConfig, load_and_prepare, process_env, redact, validate};
use keeper_gateway::{MmsWebhook, WebhookConfig, build_router, start_server};
use keeper_logging::init_logger;
use keeper_media::{HttpMediaFetcher, LocalObjectStore};
use keeper_store::SqliteDocumentStore;

use contributors_cmd::ContributorCommands;
use gallery_cmd::{GalleryCommands, HistoryCommands};

#[derive(Parser)]
#[command(name = "archive-keeper")]
#[command(about = "Archive Keeper: preserves texted family photos and videos")]
#[command(version)]
struct Cli {
    /// Config file (defaults to $KEEPER_CONFIG, then the user config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the webhook server
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Check whether a server is running
    Status,
    /// Manage contributors
    Contributors {
        #[command(subcommand)]
        command: ContributorCommands,
    },
    /// Browse preserved media
    Gallery {
        #[command(subcommand)]
        command: GalleryCommands,
    },
    /// Browse the activity log
    History {
        #[command(subcommand)]
        command: HistoryCommands,
    },
    /// Print the X-Twilio-Signature for a request
    Sign {
        /// Full URL the provider would call
        #[arg(long)]
        url: String,
        /// Form parameter, repeatable
        #[arg(long = "param", value_parser = sign_cmd::parse_param)]
        params: Vec<(String, String)>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = load_and_prepare(cli.config.as_deref(), &process_env()).await?;

    init_logger(
        &config.logging.level,
        config.logging.log_dir.as_deref().map(Path::new),
        config.logging.json,
    );

    match cli.command {
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            run_server(config).await?;
        }
        Commands::Status => status_cmd::run(config.server.port).await?,
        Commands::Contributors { command } => {
            let store = open_documents(&config)?;
            contributors_cmd::run(command, &store).await?;
        }
        Commands::Gallery { command } => {
            let store = open_documents(&config)?;
            gallery_cmd::run_gallery(command, &store).await?;
        }
        Commands::History { command } => {
            let store = open_documents(&config)?;
            gallery_cmd::run_history(command, &store).await?;
        }
        Commands::Sign { url, params } => {
            println!("{}", sign_cmd::sign(&config, &url, &params)?);
        }
    }

    Ok(())
}

fn open_documents(config: &KeeperConfig) -> Result<SqliteDocumentStore> {
    SqliteDocumentStore::open(&config.storage.db_path)
        .with_context(|| format!("Failed to open {}", config.storage.db_path))
}

async fn run_server(config: KeeperConfig) -> Result<()> {
    let report = validate(&config);
    for warning in &report.warnings {
        warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for err in &report.errors {
        error!(path = %err.path, message = %err.message, "Config error");
    }
    if !report.is_valid() {
        bail!("Invalid configuration ({} errors)", report.errors.len());
    }

    info!(config = %redact(&config), "Starting Archive Keeper");

    let documents = Arc::new(open_documents(&config)?);
    let objects = LocalObjectStore::new(&config.storage.media_dir, &config.server.public_base_url);
    let public_dir = objects.public_dir();

    let mut fetcher =
        HttpMediaFetcher::new(Duration::from_secs(config.twilio.fetch_timeout_secs))?;
    if let Some((account_sid, auth_token)) = config.twilio.media_credentials() {
        fetcher = fetcher.with_basic_auth(account_sid, auth_token);
        info!("Media downloads use account credentials");
    }

    let webhook = MmsWebhook::new(
        WebhookConfig {
            auth_token: config.twilio.auth_token.clone(),
        },
        documents,
        Arc::new(objects),
        Arc::new(fetcher),
    );

    let app = build_router(&config.server.webhook_path, Arc::new(webhook), Some(public_dir));
    let addr: SocketAddr = format!("{}:{}", config.server.bind_address, config.server.port)
        .parse()
        .context("Invalid bind address")?;

    info!(
        addr = %addr,
        webhook_path = %config.server.webhook_path,
        "HTTP API listening"
    );
    start_server(addr, app).await
}
