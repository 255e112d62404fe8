use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::{ArgGroup, Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

mod analytics;
mod db;
mod models;
mod notifications;
mod report;
mod session;

#[derive(Parser)]
#[command(name = "health-directory")]
#[command(about = "Analytics and notifications for a health services directory", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load realistic seed data
    Seed,
    /// Start a session for a directory role
    Login {
        #[arg(long, value_enum)]
        role: session::Role,
        #[arg(long)]
        name: String,
    },
    /// Clear the stored session
    Logout,
    /// Show the admin analytics dashboard
    Analytics {
        #[arg(long, value_enum, default_value = "week")]
        range: analytics::TimeRange,
        #[arg(long)]
        json: bool,
    },
    /// Generate a markdown dashboard report
    Report {
        #[arg(long, value_enum, default_value = "week")]
        range: analytics::TimeRange,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Review the patient notification list
    #[command(group(
        ArgGroup::new("action")
            .args(["mark_read", "mark_all_read", "clear"])
            .multiple(false)
    ))]
    Notifications {
        #[arg(long, value_enum)]
        filter: Option<notifications::NotificationKind>,
        #[arg(long)]
        mark_read: Option<i64>,
        #[arg(long)]
        mark_all_read: bool,
        #[arg(long)]
        clear: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::InitDb => {
            let pool = connect_pool().await?;
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            let pool = connect_pool().await?;
            db::seed(&pool).await?;
            println!("Seed data inserted.");
        }
        Commands::Login { role, name } => {
            let store = session::SessionStore::from_env()?;
            let created = store.login(role, &name)?;
            println!(
                "Logged in as {} ({}).",
                created.user.name,
                created.user.role.as_str()
            );
        }
        Commands::Logout => {
            let store = session::SessionStore::from_env()?;
            if store.logout()? {
                println!("Session cleared.");
            } else {
                println!("No active session.");
            }
        }
        Commands::Analytics { range, json } => {
            let store = session::SessionStore::from_env()?;
            let active = store.require_role(session::Role::Admin)?;
            let pool = connect_pool().await?;

            let cutoff = analytics::period_cutoff(Utc::now(), range);
            let data = analytics::build_dashboard(&pool, cutoff).await;

            if json {
                println!("{}", serde_json::to_string_pretty(&data)?);
                return Ok(());
            }

            println!("Welcome back, {}.", active.user.name);
            println!();
            print!("{}", report::build_report(range, cutoff, Utc::now(), &data));
        }
        Commands::Report { range, out } => {
            let store = session::SessionStore::from_env()?;
            store.require_role(session::Role::Admin)?;
            let pool = connect_pool().await?;

            let cutoff = analytics::period_cutoff(Utc::now(), range);
            let data = analytics::build_dashboard(&pool, cutoff).await;
            let rendered = report::build_report(range, cutoff, Utc::now(), &data);
            std::fs::write(&out, rendered)?;
            println!("Report written to {}.", out.display());
        }
        Commands::Notifications {
            filter,
            mark_read,
            mark_all_read,
            clear,
        } => {
            let store = session::SessionStore::from_env()?;
            let active = store.require_role(session::Role::Patient)?;
            let mut center = notifications::NotificationCenter::with_demo_data();

            if let Some(id) = mark_read {
                if center.mark_read(id) {
                    println!("Notification {id} marked as read.");
                } else {
                    println!("Notification {id} is already read or does not exist.");
                }
            }
            if mark_all_read {
                let marked = center.mark_all_read();
                if marked == 0 {
                    println!("All notifications are already read.");
                } else {
                    println!("Marked {marked} notifications as read.");
                }
            }
            if clear {
                let cleared = center.clear();
                if cleared == 0 {
                    println!("Nothing to clear.");
                } else {
                    println!("Cleared {cleared} notifications.");
                }
            }

            println!("Welcome back, {}.", active.user.name);
            println!();
            println!(
                "Notifications ({} unread of {}):",
                center.unread_count(),
                center.len()
            );

            if center.is_empty() {
                println!("No notifications to show.");
                return Ok(());
            }

            let entries = center.filter(filter);
            if entries.is_empty() {
                println!("No notifications match this filter.");
                return Ok(());
            }

            let now = Utc::now();
            for notification in entries {
                let marker = if notification.is_read { ' ' } else { '*' };
                println!(
                    "{} #{} [{}] {} ({}, {} priority)",
                    marker,
                    notification.id,
                    notification.kind.as_str(),
                    notification.title,
                    notifications::format_relative(now, notification.timestamp),
                    notification.priority.as_str()
                );
                println!("     {}", notification.message);
            }
        }
    }

    Ok(())
}

async fn connect_pool() -> anyhow::Result<sqlx::PgPool> {
    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set to a production Postgres instance")?;

    PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")
}
