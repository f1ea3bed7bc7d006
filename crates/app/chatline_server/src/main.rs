//! chatline HTTP server binary.
//!
//! Serves the chat message gateway on a single path.

use chatline_api::config::GatewayConfig;
use chatline_api::gateway::Gateway;
use clap::Parser;
use tracing::info;

/// CLI arguments for the server.
///
/// Settings stay raw strings here; [`GatewayConfig::from_lookup`] applies
/// defaults and rejects bad values.
#[derive(Parser, Debug)]
#[command(name = "chatline_server", about = "chatline chat message gateway")]
struct Args {
    /// Address to listen on [default: 127.0.0.1:3100].
    #[arg(long, env = "BIND_ADDR")]
    bind_addr: Option<String>,

    /// PostgreSQL connection URL. Required.
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Maximum number of database connections in the pool [default: 5].
    #[arg(long, env = "MAX_CONNECTIONS")]
    max_connections: Option<String>,

    /// Seconds a request waits for a free connection [default: 30].
    #[arg(long, env = "ACQUIRE_TIMEOUT_SECS")]
    acquire_timeout_secs: Option<String>,

    /// Apply the embedded schema migrations before serving.
    #[arg(long, default_value_t = false)]
    migrate: bool,
}

impl Args {
    /// Settings keyed by their environment variable names.
    fn lookup(&self, key: &str) -> Option<String> {
        match key {
            "DATABASE_URL" => self.database_url.clone(),
            "BIND_ADDR" => self.bind_addr.clone(),
            "MAX_CONNECTIONS" => self.max_connections.clone(),
            "ACQUIRE_TIMEOUT_SECS" => self.acquire_timeout_secs.clone(),
            _ => None,
        }
    }

    fn config(&self) -> Result<GatewayConfig, chatline_api::config::ConfigError> {
        GatewayConfig::from_lookup(|key| self.lookup(key))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(
                    "info,chatline_api=debug,chatline_core=debug,tower_http=info",
                )
            }),
        )
        .init();

    let args = Args::parse();
    let config = args.config()?;

    info!(
        bind_addr = %config.bind_addr,
        max_connections = config.max_connections,
        "starting chatline_server"
    );

    let gateway = Gateway::connect(&config).await?;
    let state = chatline_api::AppState { gateway };

    if args.migrate {
        info!("running database migrations");
        chatline_api::migrate(&state).await?;
    }

    let app = chatline_api::router(state);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %listener.local_addr()?, "chat gateway listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("chatline_server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    }
}
