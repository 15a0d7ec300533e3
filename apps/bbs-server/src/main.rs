#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

mod config;
mod logging;
mod shutdown;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use tower_http::trace::TraceLayer;
use tracing::info;

use user_profile::infra::session_store::SessionStore;
use user_profile::infra::storage::migrations::Migrator;
use user_profile::infra::storage::SeaOrmUsersRepository;
use user_profile::{NewUser, Service};

use crate::config::{AppConfig, DatabaseConfig};

/// BBS server - user profile editing over HTTP
#[derive(Parser)]
#[command(name = "bbs-server")]
#[command(about = "BBS server - user profile editing over HTTP")]
#[command(version)]
struct Cli {
    /// Path to configuration file (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port override for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print effective configuration (JSON) and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Validate configuration and exit
    Check,
    /// Insert a user into the configured database
    CreateUser {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        introduction: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = cli.config.as_deref() {
        if !path.is_file() {
            anyhow::bail!("config file does not exist: {}", path.display());
        }
    }

    // defaults -> YAML -> env (BBS__*) -> CLI
    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.apply_cli_overrides(cli.port, cli.verbose);

    logging::init(&config.logging)?;

    if cli.print_config {
        println!("{}", config.to_json()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config).await,
        Commands::Check => check_config(&config),
        Commands::CreateUser {
            name,
            email,
            introduction,
        } => {
            create_user(
                &config.database,
                NewUser {
                    name,
                    email,
                    introduction,
                },
            )
            .await
        }
    }
}

fn check_config(config: &AppConfig) -> Result<()> {
    info!("Checking configuration...");
    println!("Configuration is valid");
    println!("{}", config.to_json()?);
    Ok(())
}

/// Connects and brings the schema up to date.
async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection> {
    let db = Database::connect(config.url.as_str())
        .await
        .context("failed to connect to database")?;
    Migrator::up(&db, None)
        .await
        .context("failed to run migrations")?;
    Ok(db)
}

/// Inserts a user after checking it against the profile form rules.
async fn create_user(config: &DatabaseConfig, new_user: NewUser) -> Result<()> {
    let repo = SeaOrmUsersRepository::new(connect(config).await?);
    let service = Service::new(Arc::new(repo));
    let user = service
        .create_user(new_user)
        .await
        .context("failed to create user")?;

    info!(user_id = user.id, name = %user.name, "User created");
    println!("Created user {} ({})", user.id, user.name);
    Ok(())
}

async fn run_server(config: AppConfig) -> Result<()> {
    let db = connect(&config.database).await?;

    let service = Arc::new(Service::new(Arc::new(SeaOrmUsersRepository::new(db))));
    let sessions = Arc::new(SessionStore::from_config(&config.user_profile));
    let sweeper = sessions.spawn_sweeper(config.user_profile.session_ttl());
    let app = user_profile::api::rest::router(service, sessions).layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.server.bind_addr, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(addr = %listener.local_addr()?, "BBS server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown::signal_received())
        .await
        .context("server error")?;

    sweeper.abort();
    info!("BBS server stopped");
    Ok(())
}
