use anyhow::Context;
use clap::{Parser, Subcommand};
use papaya_config::load as load_config;
use papaya_database::{initialize_database, NoteRepository, UserRepository};
use papaya_gateway::{build_router, AppState};
use papaya_runtime::{telemetry, BackendServices};
use tokio::net::TcpListener;
use tracing::info;

#[derive(Parser)]
#[command(name = "papaya-server")]
#[command(about = "Papaya notes backend (serves HTTP by default)")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server (default)
    Serve,
    /// Apply pending database migrations and exit
    Migrate,
    /// Dump users and notes from the database
    DumpData,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    telemetry::init_tracing().context("failed to initialise tracing")?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_server().await,
        Commands::Migrate => migrate().await,
        Commands::DumpData => dump_data().await,
    }
}

async fn run_server() -> anyhow::Result<()> {
    info!("starting Papaya backend");

    let config = load_config().context("failed to load configuration")?;

    let services = BackendServices::initialise(&config)
        .await
        .context("failed to initialise backend services")?;

    let state = AppState::new(services.authenticator.clone(), services.notes.clone());
    let app = build_router(state);

    let address = format!("{}:{}", config.http.address, config.http.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind http listener on {address}"))?;

    info!(%address, "http server listening");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(papaya_runtime::shutdown_signal())
        .await
        .context("http server error");

    services.shutdown().await;
    info!("backend shut down");
    served
}

async fn migrate() -> anyhow::Result<()> {
    let config = load_config().context("failed to load configuration")?;

    let connection = initialize_database(&config.database)
        .await
        .context("failed to migrate database")?;
    connection.close().await;

    println!("Database at {} is up to date", config.database.url);
    Ok(())
}

async fn dump_data() -> anyhow::Result<()> {
    info!("dumping users and notes from database");

    let config = load_config().context("failed to load configuration")?;

    let connection = initialize_database(&config.database)
        .await
        .context("failed to open database")?;
    let pool = connection.pool().clone();

    let users = UserRepository::new(pool.clone())
        .list()
        .await
        .context("failed to fetch users")?;

    println!("=== USERS ===");
    if users.is_empty() {
        println!("No users found in database");
    } else {
        println!("Found {} users:", users.len());
        println!(
            "{:<5} {:<40} {:<30} {:<30}",
            "ID", "Email", "Created At", "Updated At"
        );
        println!("{}", "-".repeat(110));

        for user in users {
            println!(
                "{:<5} {:<40} {:<30} {:<30}",
                user.id, user.email, user.created_at, user.updated_at
            );
        }
    }

    let notes = NoteRepository::new(pool)
        .list_all()
        .await
        .context("failed to fetch notes")?;

    println!("\n=== NOTES ===");
    if notes.is_empty() {
        println!("No notes found in database");
    } else {
        println!("Found {} notes:", notes.len());
        println!(
            "{:<5} {:<8} {:<30} {:<50} {:<8} {:<30}",
            "ID", "Owner", "Title", "Content (truncated)", "Starred", "Updated At"
        );
        println!("{}", "-".repeat(135));

        for note in notes {
            println!(
                "{:<5} {:<8} {:<30} {:<50} {:<8} {:<30}",
                note.id,
                note.owner_id,
                truncate(&note.title, 30),
                truncate(&note.content, 50),
                note.starred,
                note.updated_at
            );
        }
    }

    connection.close().await;
    Ok(())
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(3)).collect();
    format!("{kept}...")
}
