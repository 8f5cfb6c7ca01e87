use std::path::{Path, PathBuf};
use std::process::ExitCode;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use hallelujah_media::config::{get_config_path, Config};
use hallelujah_media::{Database, ImportOutcome, Importer};

#[derive(Parser)]
#[command(name = "hallelujah-media")]
#[command(about = "Import, date, rename and thumbnail media in per-user trees")]
#[command(version)]
struct Cli {
    /// Configuration file (default: ~/.hallelujah/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Import everything under an owner's originals root
    ImportTree {
        owner: String,
    },
    /// Import a single uploaded file that already sits in the owner's tree
    ImportFile {
        path: PathBuf,
        owner: String,
        /// Make the media visible to everyone
        #[arg(long)]
        public: bool,
    },
    /// Print an owner's registered media as JSON
    List {
        owner: String,
    },
    /// Write the default configuration file
    InitConfig {
        /// Replace an existing configuration file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config_path = match cli.config {
        Some(path) => path,
        None => get_config_path()?,
    };

    match cli.command {
        Command::InitConfig { force } => {
            Config::write_default(&config_path, force).context("Pass --force to replace it")?;
            println!("Wrote {}", config_path.display());
        }
        Command::ImportTree { owner } => {
            let (config, db) = open(&config_path)?;
            let importer = Importer::new(config, db);
            let report = importer.import_tree(&owner)?;

            println!(
                "{} imported, {} already present, {} failed",
                report.imported.len(),
                report.already_imported.len(),
                report.failed.len()
            );
            for record in &report.imported {
                println!("  imported {}", record.original_relpath());
            }
            for failure in &report.failed {
                println!("  skipped {}: {}", failure.path.display(), failure.error);
            }
        }
        Command::ImportFile { path, owner, public } => {
            let (config, db) = open(&config_path)?;
            let importer = Importer::new(config, db);
            match importer.import_file(&path, &owner, public) {
                Ok(ImportOutcome::Imported(record)) => {
                    println!("{}", serde_json::to_string_pretty(&record)?);
                }
                Ok(ImportOutcome::AlreadyImported(path)) => {
                    println!("Already imported: {}", path.display());
                }
                Err(e) => {
                    eprintln!("Could not import {}: {}", path.display(), e);
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Command::List { owner } => {
            let (_, db) = open(&config_path)?;
            let records = db.list_media(&owner)?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn open(config_path: &Path) -> Result<(Config, Database)> {
    let config = Config::load_from(config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
    let db = Database::open(&config.database_path)
        .with_context(|| format!("Failed to open database {}", config.database_path.display()))?;
    Ok((config, db))
}
