//! `attested` — CLI entry point. Parses arguments with `clap` derive and
//! dispatches to subcommand handlers, mapping the result to the exit codes
//! the design calls for: 0 success, 1 verification failed, 2 usage error
//! (handled by `clap` itself before `main` even runs its own logic),
//! 3 I/O error.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use attested_cli::export::run_export;
use attested_cli::keygen::run_keygen;
use attested_cli::messages::run_messages;
use attested_cli::sessions::run_sessions;
use attested_cli::verify::run_verify;

/// Tamper-evident append-only log for multi-party AI agent conversations.
#[derive(Parser, Debug)]
#[command(name = "attested", version, about, long_about = None)]
struct Cli {
    /// Path to the SQLite store. Defaults to `$XDG_DATA_HOME/attested-logs/log.db`
    /// (or the platform's equivalent data dir), overridable via
    /// `ATTESTED_LOGS_DB`.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List session ids known to the store.
    Sessions,

    /// Show a session's messages.
    Messages {
        session_id: String,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long, conflicts_with = "oldest_first")]
        newest_first: bool,
        #[arg(long, conflicts_with = "newest_first")]
        oldest_first: bool,
    },

    /// Verify a session's chain offline against a trust-map file.
    Verify {
        session_id: String,
        #[arg(long)]
        trust_map: PathBuf,
    },

    /// Export a session's chain as JSONL.
    Export {
        session_id: String,
        #[arg(long)]
        output: PathBuf,
    },

    /// Generate an Ed25519 keypair file for an agent.
    Keygen {
        #[arg(long)]
        agent_id: String,
        #[arg(long)]
        out: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .init();

    let db_path = match resolve_db_path(cli.db) {
        Ok(path) => path,
        Err(e) => {
            tracing::error!("{e:#}");
            return ExitCode::from(3);
        }
    };

    let result = match cli.command {
        Commands::Sessions => run_sessions(&db_path),
        Commands::Messages {
            session_id,
            limit,
            newest_first,
            oldest_first: _,
        } => run_messages(&db_path, &session_id, limit, newest_first),
        Commands::Verify { session_id, trust_map } => run_verify(&db_path, &session_id, &trust_map),
        Commands::Export { session_id, output } => run_export(&db_path, &session_id, &output),
        Commands::Keygen { agent_id, out } => run_keygen(&agent_id, &out),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(3)
        }
    }
}

/// Resolve the store path: explicit `--db`, then `ATTESTED_LOGS_DB`, then
/// the platform data dir under `attested-logs/log.db`.
fn resolve_db_path(explicit: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path);
    }
    if let Ok(path) = std::env::var("ATTESTED_LOGS_DB") {
        return Ok(PathBuf::from(path));
    }
    let dirs = directories::ProjectDirs::from("", "", "attested-logs")
        .ok_or_else(|| anyhow::anyhow!("could not determine a platform data directory"))?;
    let dir = dirs.data_dir();
    std::fs::create_dir_all(dir)
        .map_err(|e| anyhow::anyhow!("failed to create data directory {}: {e}", dir.display()))?;
    Ok(dir.join("log.db"))
}
