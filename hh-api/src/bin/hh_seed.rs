//! hh-seed - Hobby Helper database maintenance
//!
//! Loads the hobby catalogue and hobby history from JSON files, and fills in
//! mood effects for hobbies stored before moods existed.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hh_api::init_tracing;
use hh_api::seed::{self, DEFAULT_BATCH_SIZE};
use hh_common::config::{BootstrapConfig, ConfigOverrides};
use hh_common::db::init_database;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "hh-seed")]
#[command(about = "Seed and maintain the Hobby Helper database", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the TOML config file
    #[arg(short, long, env = "HH_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Folder holding the database
    #[arg(short, long, env = "HH_ROOT_FOLDER", global = true)]
    root_folder: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replace all hobbies with the contents of a JSON file
    Hobbies {
        /// JSON array of hobbies
        file: PathBuf,
    },

    /// Replace all hobby history with the contents of a JSON file
    UserHobbies {
        /// JSON array of user hobby records
        file: PathBuf,
    },

    /// Infer mood effects for hobbies that have none
    BackfillMoods {
        /// Show what would change without writing
        #[arg(long, alias = "dryRun")]
        dry_run: bool,

        /// Hobbies updated per transaction
        #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
        batch_size: i64,
    },
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

async fn run(cli: Cli) -> Result<()> {
    let config = BootstrapConfig::resolve(ConfigOverrides {
        config_path: cli.config,
        root_folder: cli.root_folder,
        ..Default::default()
    })
    .context("Failed to load configuration")?;

    let db_path = config.database_path();
    info!("Database path: {}", db_path.display());
    let pool = init_database(&db_path)
        .await
        .context("Database initialization failed")?;

    match cli.command {
        Command::Hobbies { file } => {
            info!("📦 Seeding hobbies from {}", file.display());
            let hobbies = seed::parse_hobbies(&read_file(&file)?)
                .with_context(|| format!("Invalid hobby file {}", file.display()))?;
            let report = seed::seed_hobbies(&pool, &hobbies).await?;
            info!("✅ Hobbies seeded: {} inserted, {} removed", report.inserted, report.deleted);
        }
        Command::UserHobbies { file } => {
            info!("📦 Seeding user hobbies from {}", file.display());
            let entries = seed::parse_user_hobbies(&read_file(&file)?)
                .with_context(|| format!("Invalid user hobby file {}", file.display()))?;
            let report = seed::seed_user_hobbies(&pool, &entries).await?;
            info!("✅ User hobbies seeded: {} inserted, {} removed", report.inserted, report.deleted);
        }
        Command::BackfillMoods { dry_run: true, .. } => {
            let (total, previews) = seed::preview_backfill(&pool).await?;
            info!("📊 Hobbies missing moodEffects: {}", total);
            for preview in previews {
                info!("• {} -> {:?} (from tags: {:?})", preview.name, preview.moods, preview.tags);
            }
            if total > 0 {
                info!("💡 Run again without --dry-run to apply changes.");
            }
        }
        Command::BackfillMoods { dry_run: false, batch_size } => {
            let report = seed::backfill_moods(&pool, batch_size).await?;
            info!("✅ Backfill complete. Updated: {}", report.updated);
            info!("📉 Remaining without moodEffects: {}", report.remaining);
        }
    }

    pool.close().await;
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing("info");

    if let Err(e) = run(cli).await {
        error!("❌ {:#}", e);
        std::process::exit(1);
    }
}
