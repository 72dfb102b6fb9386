use std::net::SocketAddr;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::igc::{IgcLocationParser, TrackParser};
use crate::server::{self, ServerConfig, DEFAULT_BIND_ADDR};
use crate::track::TrackSummary;

#[derive(Debug, Parser)]
#[command(name = "igcinfo", version, about = "In-memory registry of IGC flight tracks")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP API.
    Serve(ServeArgs),
    /// Parse one IGC file (URL or path) and print its metadata as JSON.
    Inspect(InspectArgs),
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Defaults to `127.0.0.1:8080`, or all interfaces when only a port is given.
    #[arg(long, env = "IGCINFO_BIND")]
    pub bind: Option<String>,
    /// Overrides the port of `--bind` (hosting platforms set PORT).
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,
    #[arg(long, env = "IGCINFO_FETCH_TIMEOUT_SECS", default_value_t = 30)]
    pub fetch_timeout_secs: u64,
}

#[derive(Debug, Args)]
pub struct InspectArgs {
    pub location: String,
    #[arg(long, env = "IGCINFO_FETCH_TIMEOUT_SECS", default_value_t = 30)]
    pub fetch_timeout_secs: u64,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid bind address '{addr}': {source}")]
    InvalidBind {
        addr: String,
        source: std::net::AddrParseError,
    },
    #[error("fetch timeout must be at least one second")]
    ZeroTimeout,
}

impl ServeArgs {
    pub fn to_config(&self) -> Result<ServerConfig, ConfigError> {
        let bind = match (&self.bind, self.port) {
            (Some(bind), _) => bind.as_str(),
            (None, Some(_)) => ANY_INTERFACE_ADDR,
            (None, None) => DEFAULT_BIND_ADDR,
        };
        let mut addr: SocketAddr = bind.parse().map_err(|source| ConfigError::InvalidBind {
            addr: bind.to_string(),
            source,
        })?;
        if let Some(port) = self.port {
            addr.set_port(port);
        }
        Ok(ServerConfig {
            bind_addr: addr.to_string(),
            fetch_timeout: fetch_timeout(self.fetch_timeout_secs)?,
        })
    }
}

const ANY_INTERFACE_ADDR: &str = "0.0.0.0:0";

fn fetch_timeout(secs: u64) -> Result<Duration, ConfigError> {
    if secs == 0 {
        return Err(ConfigError::ZeroTimeout);
    }
    Ok(Duration::from_secs(secs))
}

#[derive(Debug, Serialize)]
struct InspectReport {
    id: String,
    points: usize,
    #[serde(flatten)]
    summary: TrackSummary,
}

/// Logs go to stderr so `inspect` output stays machine-readable.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn run_with_args(args: &[String]) -> i32 {
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return err.exit_code();
        }
    };

    init_logging();
    match cli.command {
        Command::Serve(args) => handle_serve(&args),
        Command::Inspect(args) => handle_inspect(&args),
    }
}

fn handle_serve(args: &ServeArgs) -> i32 {
    let config = match args.to_config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("configuration error: {err}");
            return 2;
        }
    };
    match server::run_server(&config) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("server error: {err}");
            1
        }
    }
}

fn handle_inspect(args: &InspectArgs) -> i32 {
    let timeout = match fetch_timeout(args.fetch_timeout_secs) {
        Ok(timeout) => timeout,
        Err(err) => {
            eprintln!("configuration error: {err}");
            return 2;
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("failed to start runtime: {err}");
            return 1;
        }
    };
    let parser = match IgcLocationParser::new(timeout) {
        Ok(parser) => parser,
        Err(err) => {
            eprintln!("failed to build http client: {err}");
            return 1;
        }
    };

    let track = match runtime.block_on(parser.parse(&args.location)) {
        Ok(track) => track,
        Err(err) => {
            eprintln!("inspect failed: {err}");
            return 1;
        }
    };
    let report = InspectReport {
        id: track.id.clone(),
        points: track.points.len(),
        summary: TrackSummary::from(&track),
    };
    match serde_json::to_string_pretty(&report) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize track summary: {err}");
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use clap::Parser;

    use super::{Cli, Command, ConfigError};

    fn serve_args(args: &[&str]) -> super::ServeArgs {
        match Cli::try_parse_from(args).expect("args should parse").command {
            Command::Serve(args) => args,
            other => panic!("expected serve, got {other:?}"),
        }
    }

    #[test]
    fn port_overrides_bind_port() {
        let args = serve_args(&["igcinfo", "serve", "--bind", "0.0.0.0:9000", "--port", "7000"]);
        let config = args.to_config().unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:7000");
    }

    #[test]
    fn port_alone_listens_on_all_interfaces() {
        let args = serve_args(&["igcinfo", "serve", "--port", "7000"]);
        assert_eq!(args.to_config().unwrap().bind_addr, "0.0.0.0:7000");
    }

    #[test]
    fn explicit_bind_keeps_its_host() {
        let args = serve_args(&["igcinfo", "serve", "--bind", "127.0.0.1:9000", "--port", "7000"]);
        assert_eq!(args.to_config().unwrap().bind_addr, "127.0.0.1:7000");
    }

    #[test]
    fn timeout_flag_is_applied() {
        let args = serve_args(&[
            "igcinfo",
            "serve",
            "--bind",
            "127.0.0.1:1",
            "--port",
            "8081",
            "--fetch-timeout-secs",
            "5",
        ]);
        assert_eq!(args.to_config().unwrap().fetch_timeout, Duration::from_secs(5));
    }

    #[test]
    fn invalid_bind_is_rejected() {
        let args = serve_args(&["igcinfo", "serve", "--bind", "not-an-addr", "--port", "1"]);
        assert!(matches!(args.to_config(), Err(ConfigError::InvalidBind { .. })));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let args = serve_args(&[
            "igcinfo",
            "serve",
            "--bind",
            "127.0.0.1:1",
            "--port",
            "1",
            "--fetch-timeout-secs",
            "0",
        ]);
        assert!(matches!(args.to_config(), Err(ConfigError::ZeroTimeout)));
    }

    #[test]
    fn missing_subcommand_is_a_usage_error() {
        assert!(Cli::try_parse_from(["igcinfo"]).is_err());
    }
}
