use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use sqlx::postgres::PgPoolOptions;

use api::config::{AppConfig, StorageBackend, StorageConfig};
use api::observability::Observability;
use api::state::AppState;
use api::storage::{MemoryStore, PgStore, RegistrationStore};
use api::{admin, routes};

#[derive(Parser, Debug)]
#[command(name = "registration-api")]
#[command(about = "User self-registration service", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Create an admin account and exit
    CreateAdmin {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "ADMIN_PASSWORD")]
        password: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let cli = Cli::parse();
    let obs = Observability::init()?;
    let config = AppConfig::from_env()?;

    let store = connect_store(&config.storage).await?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::CreateAdmin {
            username,
            email,
            password,
        } => {
            let admin = admin::create_admin(store.as_ref(), &username, &email, &password)
                .await
                .context("failed to create admin")?;
            println!("Created admin '{}' (id {})", admin.admin_username, admin.id);
            Ok(())
        }
        Command::Serve => serve(store, config, obs).await,
    }
}

async fn connect_store(config: &StorageConfig) -> Result<Arc<dyn RegistrationStore>> {
    match config.backend {
        StorageBackend::Memory => {
            tracing::warn!("using in-memory storage; registrations are lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        StorageBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL must be set")?;
            let pool = PgPoolOptions::new()
                .max_connections(config.max_connections)
                .connect(database_url)
                .await?;

            sqlx::migrate!("../database/migrations").run(&pool).await?;
            tracing::info!("Database connected and migrations applied");

            Ok(Arc::new(PgStore::new(pool)))
        }
    }
}

async fn serve(store: Arc<dyn RegistrationStore>, config: AppConfig, obs: Observability) -> Result<()> {
    if let Some(admin) = admin::ensure_default_admin(store.as_ref(), &config.admin).await? {
        tracing::info!(admin_id = admin.id, "default admin seeded");
    }

    let state = AppState::new(store, &config, obs.registry)?;
    if !state.locations.has_api_key() {
        tracing::warn!("CSC_API_KEY not set; serving built-in location tables");
    }

    let app = routes::app(state, &config.http);

    let addr = config.http.bind_addr;
    tracing::info!("Registration API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
