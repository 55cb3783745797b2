use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{info, warn};

use mada_academy::api::{create_routes, AppState};
use mada_academy::config::{
    run_migrations, AppConfig, DatabaseConfig, DatabaseSeeder, DEFAULT_JWT_SECRET,
};
use mada_academy::logging::init_logging;
use mada_academy::services::build_storage;

#[derive(Parser)]
#[command(name = "mada-academy")]
#[command(about = "Mada Academy learning-management API")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run migrations and start the HTTP server (default)
    Serve,
    /// Apply pending database migrations and exit
    Migrate,
    /// Insert the demo accounts and content
    Seed,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;
    init_logging(&config.log_level, config.is_production());

    if config.is_development() && config.jwt_secret == DEFAULT_JWT_SECRET {
        warn!("JWT_SECRET is not set, signing tokens with the development default");
    }

    let database = DatabaseConfig::from_env()?;
    let pool = database.create_pool().await?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            run_migrations(&pool).await?;

            let storage = build_storage(&config.storage).await;
            let address = config.server_address();
            let app = create_routes(AppState::new(pool, config, storage));

            let listener = TcpListener::bind(&address).await?;
            info!("Mada Academy server starting on http://{}", address);
            info!("Health check available at http://{}/health", address);

            axum::serve(listener, app).await?;
        }
        Command::Migrate => {
            run_migrations(&pool).await?;
            info!("Migrations applied");
        }
        Command::Seed => {
            run_migrations(&pool).await?;
            DatabaseSeeder::new(pool).seed_all().await?;
        }
    }

    Ok(())
}
