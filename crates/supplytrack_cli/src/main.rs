//! `supplytrack` server entry point.
//!
//! # Responsibility
//! - Resolve configuration from flags and `SUPPLYTRACK_*` environment.
//! - Own process lifecycle: logging init, store open, serve, shutdown.

use clap::Parser;
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;
use supplytrack_http::config::{
    ServerConfig, DEFAULT_BIND_ADDR, DEFAULT_DB_FILE_NAME, DEFAULT_MAX_BODY_BYTES,
};
use supplytrack_http::{AppState, Store};

#[derive(Debug, Parser)]
#[command(
    name = "supplytrack",
    version,
    about = "HTTP service for supply-chain items and their custody events"
)]
struct Args {
    /// Socket address to listen on.
    #[arg(long, env = "SUPPLYTRACK_BIND_ADDR", default_value = DEFAULT_BIND_ADDR)]
    bind_addr: String,
    /// SQLite database file; created and migrated on startup.
    #[arg(long, env = "SUPPLYTRACK_DB_PATH", default_value = DEFAULT_DB_FILE_NAME)]
    db_path: PathBuf,
    /// trace|debug|info|warn|error. Defaults by build mode.
    #[arg(long, env = "SUPPLYTRACK_LOG_LEVEL")]
    log_level: Option<String>,
    /// Absolute directory for rolling log files; stderr only when unset.
    #[arg(long, env = "SUPPLYTRACK_LOG_DIR")]
    log_dir: Option<PathBuf>,
    /// Largest accepted request body.
    #[arg(long, env = "SUPPLYTRACK_MAX_BODY_BYTES", default_value_t = DEFAULT_MAX_BODY_BYTES)]
    max_body_bytes: usize,
}

impl Args {
    fn into_config(self) -> ServerConfig {
        ServerConfig {
            bind_addr: self.bind_addr,
            db_path: self.db_path,
            log_level: self
                .log_level
                .unwrap_or_else(|| supplytrack_core::default_log_level().to_string()),
            log_dir: self.log_dir,
            max_body_bytes: self.max_body_bytes,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = Args::parse().into_config();

    if let Err(err) = config.validate() {
        eprintln!("supplytrack: {err}");
        return ExitCode::FAILURE;
    }
    if let Err(err) = init_logging(&config) {
        eprintln!("supplytrack: {err}");
        return ExitCode::FAILURE;
    }

    match run(config).await {
        Ok(()) => {
            info!("event=app_stop module=cli status=ok");
            supplytrack_core::flush_logs();
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("event=app_stop module=cli status=error error={err}");
            supplytrack_core::flush_logs();
            eprintln!("supplytrack: {err}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(config: &ServerConfig) -> Result<(), String> {
    let log_dir = config
        .log_dir
        .as_deref()
        .map(|dir| {
            dir.to_str()
                .ok_or_else(|| format!("log_dir `{}` is not valid UTF-8", dir.display()))
        })
        .transpose()?;
    supplytrack_core::init_logging(&config.log_level, log_dir)
}

async fn run(config: ServerConfig) -> Result<(), String> {
    let store = Store::open(config.db_path.clone())
        .map_err(|err| format!("failed to open store `{}`: {err}", config.db_path.display()))?;
    let state = AppState::new(store.clone()).with_max_body_bytes(config.max_body_bytes);

    let served = supplytrack_http::serve(&config, state, wait_for_shutdown_signal()).await;
    store.shutdown();
    served
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = sigint.recv() => {}
                }
            }
            _ => {
                error!("event=signal_register module=cli status=error fallback=ctrl_c");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    info!("event=shutdown_signal module=cli status=ok");
}

#[cfg(test)]
mod tests {
    use super::Args;
    use clap::Parser;
    use std::path::PathBuf;

    #[test]
    fn flags_map_onto_server_config() {
        let args = Args::try_parse_from([
            "supplytrack",
            "--bind-addr",
            "0.0.0.0:8080",
            "--db-path",
            "/var/lib/supplytrack/items.sqlite3",
            "--log-level",
            "warn",
            "--max-body-bytes",
            "2048",
        ])
        .expect("flags should parse");

        let config = args.into_config();
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(
            config.db_path,
            PathBuf::from("/var/lib/supplytrack/items.sqlite3")
        );
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.max_body_bytes, 2048);
        assert!(config.validate().is_ok());
    }
}
