use anyhow::Result;
use clap::{Parser, Subcommand};
use tower_http::trace::TraceLayer;

use postbox::config::Config;
use postbox::email::Mailer;
use postbox::routes::AppState;

/// postbox - contact form mail relay
#[derive(Parser)]
#[command(name = "postbox")]
#[command(about = "Relays contact form submissions to the operator's mailbox", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Server host address (overrides config file)
        #[arg(long)]
        host: Option<String>,

        /// Server port (overrides config file)
        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.clone())?;
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    // Initialize observability (tracing + logging)
    postbox::observability::init_observability(
        "postbox",
        env!("CARGO_PKG_VERSION"),
        &config.observability.log_level,
    )?;

    match cli.command {
        Commands::Serve { host, port } => serve_command(config, host, port).await,
    }
}

#[tracing::instrument(skip(config))]
async fn serve_command(
    config: Config,
    host_override: Option<String>,
    port_override: Option<u16>,
) -> Result<()> {
    tracing::info!("Starting postbox server...");

    // Use CLI overrides if provided, otherwise use config
    let host = host_override.unwrap_or_else(|| config.server.host.clone());
    let port = port_override.unwrap_or(config.server.port);

    if config.session.is_default_secret() {
        tracing::warn!(
            "session.secret is the built-in fallback; set SECRET_KEY (or POSTBOX__SESSION__SECRET) before deploying"
        );
    }

    // Build the mail transport up front so misconfiguration fails here
    let mailer = Mailer::new(&config.mail)?;

    let app = postbox::routes::router(AppState::new(&config, mailer))
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
