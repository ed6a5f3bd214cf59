use beneficiary_api::cli::{self, Cli};
use beneficiary_api::config::{self, AppConfig};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Load .env if present so DATABASE_URL, JWT_SECRET, etc. are picked up
    let _ = dotenvy::dotenv();

    let config = config::config();
    init_logging(config);

    let cli = Cli::parse();
    if let Err(e) = cli::run(cli, config).await {
        tracing::error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(config: &AppConfig) {
    let default_directives = if beneficiary_api::is_development!() {
        "beneficiary_api=debug,tower_http=info"
    } else {
        "info"
    };
    let mut filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));
    if !config.api.enable_request_logging {
        if let Ok(directive) = "tower_http=warn".parse() {
            filter = filter.add_directive(directive);
        }
    }

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
