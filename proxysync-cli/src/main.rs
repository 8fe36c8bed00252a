//! proxysync operator CLI
//!
//! Usage:
//!   proxysync push --admin-url http://localhost:8001 --file state.json
//!   proxysync dump --admin-url http://localhost:8001 --select-tag managed
//!   proxysync version --admin-url http://localhost:8001

use anyhow::{Context, Result, bail};
use clap::{Args as ClapArgs, Parser, Subcommand};
use proxysync_admin::{AdminClient, AdminConfig};
use proxysync_cli::{read_target, render_failure};
use proxysync_sendconfig::{
    DefaultContentConverter, FetchOptions, UpdateStrategy, WholeStateStrategy,
};
use std::{fs, path::PathBuf, sync::Arc};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "proxysync")]
#[command(about = "Apply desired state to a proxy through its admin API")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(ClapArgs, Debug)]
struct AdminArgs {
    /// Admin API root URL
    #[arg(long, env = "PROXYSYNC_ADMIN_URL", default_value = "http://localhost:8001")]
    admin_url: String,

    /// Admin API token
    #[arg(long, env = "PROXYSYNC_ADMIN_TOKEN", hide_env_values = true)]
    admin_token: Option<String>,

    /// Request timeout in seconds
    #[arg(long, default_value = "30")]
    timeout: u64,
}

impl AdminArgs {
    fn client(&self) -> Result<AdminClient> {
        let config = AdminConfig {
            timeout_secs: self.timeout,
            token: self.admin_token.clone(),
            ..AdminConfig::for_url(&self.admin_url)
        };
        AdminClient::new(config).context("Failed to create admin client")
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replace the proxy configuration with a desired-state file
    Push {
        #[command(flatten)]
        admin: AdminArgs,

        /// Desired-state document (JSON)
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Print the proxy's live state as JSON
    Dump {
        #[command(flatten)]
        admin: AdminArgs,

        /// Only include entities carrying this tag (repeatable)
        #[arg(long = "select-tag")]
        select_tags: Vec<String>,

        /// Leave consumers out
        #[arg(long)]
        skip_consumers: bool,
    },
    /// Print the proxy version
    Version {
        #[command(flatten)]
        admin: AdminArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    match args.command {
        Command::Push { admin, file } => push(&admin, &file).await,
        Command::Dump {
            admin,
            select_tags,
            skip_consumers,
        } => {
            let options = FetchOptions {
                select_tags,
                skip_consumers,
            };
            let state = admin
                .client()?
                .fetch_state(&options)
                .await
                .context("Failed to fetch proxy state")?;
            println!("{}", serde_json::to_string_pretty(&state)?);
            Ok(())
        }
        Command::Version { admin } => {
            let version = admin
                .client()?
                .version()
                .await
                .context("Failed to read proxy version")?;
            println!("{version}");
            Ok(())
        }
    }
}

async fn push(admin: &AdminArgs, file: &PathBuf) -> Result<()> {
    let json = fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let target = read_target(&json).context("Failed to parse desired state")?;

    let strategy = WholeStateStrategy::new(
        Arc::new(admin.client()?),
        Arc::new(DefaultContentConverter),
    );
    info!(hash = %target.hash(), kind = strategy.kind(), "pushing configuration");

    if let Err(e) = strategy.update(&target).await {
        eprintln!("{}", render_failure(&e));
        bail!("configuration push failed");
    }
    info!("configuration applied");
    Ok(())
}
