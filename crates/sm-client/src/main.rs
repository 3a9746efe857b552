//! smctl - Service Manager command line client
//!
//! Thin CLI over [`sm_client::ServiceManagerClient`]; prints JSON.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use sm_client::auth::Token;
use sm_client::{Config, Parameters, ServiceManagerClient};

#[derive(Parser, Debug)]
#[command(name = "smctl")]
#[command(about = "Command line client for the Service Manager API")]
#[command(version)]
struct Cli {
    /// Service Manager base URL
    #[arg(long, env = "SM_URL")]
    url: String,

    /// OAuth2 client id
    #[arg(long, env = "SM_CLIENT_ID", default_value = sm_client::config::api::DEFAULT_CLIENT_ID)]
    client_id: String,

    /// OAuth2 client secret
    #[arg(long, env = "SM_CLIENT_SECRET", default_value = "", hide_env_values = true)]
    client_secret: String,

    /// Skip TLS certificate verification
    #[arg(long, env = "SM_SKIP_SSL_VALIDATION")]
    skip_ssl_validation: bool,

    /// Timeout in seconds for every call
    #[arg(long, default_value = "60", env = "SM_TIMEOUT_SECS")]
    timeout: u64,

    /// File holding a JSON token; read as seed, rewritten after the command
    #[arg(long, env = "SM_TOKEN_FILE")]
    token_file: Option<PathBuf>,

    /// Field query criterion (repeatable), e.g. "name = my-platform"
    #[arg(long = "field-query", global = true)]
    field_query: Vec<String>,

    /// Label query criterion (repeatable), e.g. "env = dev"
    #[arg(long = "label-query", global = true)]
    label_query: Vec<String>,

    /// Extra key=value query parameter (repeatable)
    #[arg(long = "param", global = true)]
    params: Vec<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", env = "RUST_LOG")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show Service Manager info
    Info,
    ListPlatforms,
    ListBrokers,
    ListVisibilities,
    /// List service offerings with their plans
    ListOfferings,
    ListPlans,
    DeletePlatform { id: String },
    DeleteBroker { id: String },
    DeleteVisibility { id: String },
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber.with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)).init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }
}

fn read_token(path: &Path) -> anyhow::Result<Option<Token>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)?;
    Ok(Some(serde_json::from_str(&content)?))
}

fn write_token(path: &Path, token: &Token) -> anyhow::Result<()> {
    std::fs::write(path, serde_json::to_vec_pretty(token)?)?;
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(client: &ServiceManagerClient, command: &Command, query: &Parameters) -> anyhow::Result<()> {
    let query = Some(query);
    match command {
        Command::Info => print_json(&client.get_info(query).await?),
        Command::ListPlatforms => print_json(&client.list_platforms(query).await?),
        Command::ListBrokers => print_json(&client.list_brokers(query).await?),
        Command::ListVisibilities => print_json(&client.list_visibilities(query).await?),
        Command::ListOfferings => print_json(&client.list_offerings(query).await?),
        Command::ListPlans => print_json(&client.list_plans(query).await?),
        Command::DeletePlatform { id } => Ok(client.delete_platform(id, query).await?),
        Command::DeleteBroker { id } => Ok(client.delete_broker(id, query).await?),
        Command::DeleteVisibility { id } => Ok(client.delete_visibility(id, query).await?),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.json_logs);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), command = ?cli.command, "Starting smctl");

    let config = Config::new(&cli.url, &cli.client_id, &cli.client_secret)
        .with_ssl_disabled(cli.skip_ssl_validation)
        .with_timeout(Duration::from_secs(cli.timeout));

    let seed = match &cli.token_file {
        Some(path) => read_token(path)?,
        None => None,
    };

    let client = ServiceManagerClient::connect(&config, seed).await?;

    let query = Parameters {
        field_query: cli.field_query.clone(),
        label_query: cli.label_query.clone(),
        general_params: cli.params.clone(),
    };

    run(&client, &cli.command, &query).await?;

    if let Some(path) = &cli.token_file {
        if let Some(token) = client.token().await? {
            write_token(path, &token)?;
            tracing::debug!(path = %path.display(), "Saved token");
        }
    }

    Ok(())
}
