use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use crate::app::{app, AppState};
use crate::auth::{is_valid_email, Authenticator};
use crate::config::AppConfig;
use crate::database::{BeneficiaryStore, DatabaseManager, MemoryBeneficiaryStore, PgBeneficiaryStore};
use crate::services::BeneficiaryService;

#[derive(Parser)]
#[command(name = "beneficiary-api")]
#[command(about = "Beneficiary registry backend")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP API server")]
    Serve {
        #[arg(long, help = "Keep beneficiaries in process memory instead of PostgreSQL")]
        in_memory: bool,
    },

    #[command(about = "Apply database migrations and exit")]
    Migrate,

    #[command(about = "Mint a bearer token signed with the configured secret")]
    Token {
        #[arg(long, help = "Username the token identifies")]
        username: String,
        #[arg(long, help = "Email recorded as creator on beneficiaries this caller creates")]
        email: Option<String>,
    },
}

pub async fn run(cli: Cli, config: &AppConfig) -> anyhow::Result<()> {
    match cli.command {
        Commands::Serve { in_memory } => serve(config, in_memory).await,
        Commands::Migrate => {
            let pool = DatabaseManager::connect(&config.database).await?;
            DatabaseManager::migrate(&pool).await?;
            pool.close().await;
            Ok(())
        }
        Commands::Token { username, email } => {
            if let Some(email) = email.as_deref() {
                anyhow::ensure!(is_valid_email(email), "invalid email address: {}", email);
            }
            let token = Authenticator::from_config(&config.security)
                .issue(&username, email.as_deref())
                .context("failed to issue token")?;
            println!("{}", token);
            Ok(())
        }
    }
}

async fn serve(config: &AppConfig, in_memory: bool) -> anyhow::Result<()> {
    config.validate()?;

    let store: Arc<dyn BeneficiaryStore> = if in_memory {
        warn!("using in-memory store; beneficiaries are lost on exit");
        Arc::new(MemoryBeneficiaryStore::new())
    } else {
        let pool = DatabaseManager::connect(&config.database).await?;
        if config.database.run_migrations {
            DatabaseManager::migrate(&pool).await?;
        }
        Arc::new(PgBeneficiaryStore::new(pool))
    };

    let service = BeneficiaryService::new(store, config.beneficiary.clone())?;
    let state = AppState::new(service, Authenticator::from_config(&config.security));
    let app = app(state, config);

    let addr = config.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!(%addr, environment = ?config.environment, "beneficiary API listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
