//! Triage API server binary.
//!
//! Usage:
//!   triage-api --config config.toml
//!   triage-api --port 8000
//!   triage-api --port 8000 --bind 0.0.0.0 --kb data/kb.json
//!
//! # Environment Variables
//!
//! - `TRIAGE_BIND_ADDR` - Server bind address (default: 127.0.0.1)
//! - `OPENAI_API_KEY` - API key when the openai provider is configured

use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use triage_api::{serve, AppState};
use triage_core::TriageConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,triage_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().collect();
    let mut port: u16 = 8000;
    let mut config_path: Option<String> = None;
    let mut kb_path: Option<String> = None;
    let mut bind_addr: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--port" | "-p" => {
                if i + 1 < args.len() {
                    port = args[i + 1]
                        .parse()
                        .map_err(|_| anyhow::anyhow!("invalid port number: {}", args[i + 1]))?;
                    i += 1;
                }
            }
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--bind" | "-b" => {
                if i + 1 < args.len() {
                    bind_addr = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--kb" => {
                if i + 1 < args.len() {
                    kb_path = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Triage API Server");
                println!();
                println!("Usage: triage-api [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -p, --port <PORT>     Port to listen on (default: 8000)");
                println!(
                    "  -b, --bind <ADDR>     Bind address (default: 127.0.0.1, env: TRIAGE_BIND_ADDR)"
                );
                println!("  -c, --config <FILE>   Path to config.toml file");
                println!("      --kb <FILE>       Path to the knowledge base JSON file");
                println!("  -h, --help            Show this help message");
                println!();
                println!("Environment variables:");
                println!("  TRIAGE_BIND_ADDR      Server bind address (overridden by --bind)");
                println!("  OPENAI_API_KEY        API key for the openai provider");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    let host = bind_addr
        .or_else(|| std::env::var("TRIAGE_BIND_ADDR").ok())
        .unwrap_or_else(|| "127.0.0.1".to_string());

    if host == "0.0.0.0" {
        tracing::warn!(
            "Server binding to 0.0.0.0, exposing the API on all network interfaces."
        );
    }

    let mut config = if let Some(path) = config_path {
        tracing::info!(path = %path, "Loading configuration");
        TriageConfig::from_file(&path)?
    } else {
        tracing::info!("Using default configuration");
        TriageConfig::default()
    };

    if let Some(path) = kb_path {
        config.knowledge.path = path;
    }

    // A corpus that fails to load is fatal: the service must not start
    // without its knowledge base.
    let state = Arc::new(AppState::new(&config)?);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    serve(state, addr).await?;

    Ok(())
}
