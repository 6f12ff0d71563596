use std::net::SocketAddr;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use services::{AppServices, CatalogService, Clock, seed_demo_catalog};
use storage::repository::Storage;

mod error;
mod routes;

#[derive(Debug, Parser)]
#[command(name = "quiz", about = "Timed quiz trainer over a local SQLite catalog")]
struct Cli {
    /// SQLite database URL or path.
    #[arg(long = "db", env = "QUIZ_DB_URL", default_value = "sqlite:data.db", global = true)]
    db_url: String,

    /// Address the HTTP server listens on.
    #[arg(long, env = "QUIZ_BIND", default_value = "127.0.0.1:8000", global = true)]
    bind: SocketAddr,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
enum Command {
    /// Run the HTTP server (default).
    Serve,
    /// Insert a small demo catalog.
    Seed,
}

#[derive(Debug, thiserror::Error)]
#[error("invalid --db value: {raw}")]
struct InvalidDbUrl {
    raw: String,
}

fn normalize_sqlite_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed == "sqlite::memory:" || trimmed.starts_with("sqlite://") {
        return trimmed.to_owned();
    }

    let path_str = trimmed.strip_prefix("sqlite:").unwrap_or(trimmed);
    let path = std::path::Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| InvalidDbUrl {
            raw: db_url.to_owned(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(InvalidDbUrl {
            raw: db_url.to_owned(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing();

    // Open + migrate SQLite at startup. Keep this in the binary glue so services stay storage-agnostic.
    let db_url = normalize_sqlite_url(&cli.db_url);
    prepare_sqlite_file(&db_url)?;
    let storage = Storage::sqlite(&db_url).await?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let services = AppServices::from_storage(&storage, Clock::system());
            let app = routes::router(routes::AppState::new(services));

            let listener = TcpListener::bind(cli.bind).await?;
            tracing::info!(local_addr = %listener.local_addr()?, db = %db_url, "starting server");
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
            Ok(())
        }
        Command::Seed => {
            let report = seed_demo_catalog(&CatalogService::new(&storage)).await?;
            println!(
                "Seeded {} categories, {} subcategories, {} questions and {} options into {}",
                report.categories, report.subcategories, report.questions, report.options, db_url
            );
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_urls_are_made_absolute() {
        assert_eq!(normalize_sqlite_url("sqlite::memory:"), "sqlite::memory:");
        assert_eq!(
            normalize_sqlite_url("sqlite:///tmp/quiz.db"),
            "sqlite:///tmp/quiz.db"
        );
        assert_eq!(normalize_sqlite_url("/tmp/quiz.db"), "sqlite:///tmp/quiz.db");

        let relative = normalize_sqlite_url("sqlite:quiz.db");
        assert!(relative.starts_with("sqlite:///"));
        assert!(relative.ends_with("/quiz.db"));
    }

    #[test]
    fn cli_defaults_to_serve() {
        let cli = Cli::try_parse_from(["quiz"]).unwrap();
        assert_eq!(cli.command, None);
        assert_eq!(cli.bind, "127.0.0.1:8000".parse::<SocketAddr>().unwrap());

        let cli = Cli::try_parse_from(["quiz", "seed", "--db", "sqlite::memory:"]).unwrap();
        assert_eq!(cli.command, Some(Command::Seed));
        assert_eq!(cli.db_url, "sqlite::memory:");
    }
}
