//! Crop Advisor - location-based crop recommendation service
//!
//! # Usage
//!
//! ```bash
//! # Serve the HTTP API (default subcommand)
//! cargo run --release
//!
//! # One-shot recommendation printed as JSON
//! ./crop-advisor recommend --latitude 12.97 --longitude 77.59
//!
//! # Nearest soil region only
//! ./crop-advisor nearest --latitude 12.97 --longitude 77.59
//! ```
//!
//! # Environment Variables
//!
//! - `CROP_ADVISOR_CONFIG`: Path to a TOML config file
//! - `TOMORROW_IO_API_KEY`: Weather provider key (mock weather when unset)
//! - `PORT`: Override the bind port
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crop_advisor::api::{create_app, ApiState};
use crop_advisor::config::AdvisorConfig;
use crop_advisor::types::Coordinate;
use crop_advisor::RecommendationEngine;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "crop-advisor")]
#[command(about = "Location-based crop recommendation service")]
#[command(version)]
struct CliArgs {
    /// Override the server address (default: "0.0.0.0:5000")
    #[arg(short, long)]
    addr: Option<String>,

    /// Path to a TOML config file (skips the standard search order)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the region centroids JSON file
    #[arg(long, value_name = "FILE")]
    centroids: Option<PathBuf>,

    /// Override the soil dataset CSV file
    #[arg(long, value_name = "FILE")]
    soil: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,

    #[command(subcommand)]
    command: Option<SubCommand>,
}

#[derive(clap::Subcommand, Debug)]
enum SubCommand {
    /// Serve the HTTP API
    Serve,

    /// Recommend a crop for one coordinate and print the record as JSON
    Recommend {
        #[arg(long, allow_negative_numbers = true)]
        latitude: f64,
        #[arg(long, allow_negative_numbers = true)]
        longitude: f64,
    },

    /// Print the nearest soil region for one coordinate
    Nearest {
        #[arg(long, allow_negative_numbers = true)]
        latitude: f64,
        #[arg(long, allow_negative_numbers = true)]
        longitude: f64,
    },
}

// ============================================================================
// Startup
// ============================================================================

fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    }
}

/// Resolve the effective configuration: file, then env, then CLI flags.
fn load_config(args: &CliArgs) -> Result<AdvisorConfig> {
    let mut config = match &args.config {
        Some(path) => AdvisorConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => AdvisorConfig::load(),
    };

    config.apply_env_overrides();

    if let Some(addr) = &args.addr {
        config.server.addr = addr.clone();
    }
    if let Some(path) = &args.centroids {
        config.data.centroids_path = path.clone();
    }
    if let Some(path) = &args.soil {
        config.data.soil_path = path.clone();
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

// ============================================================================
// Subcommands
// ============================================================================

async fn run_recommend(engine: &RecommendationEngine, latitude: f64, longitude: f64) -> Result<()> {
    let record = engine.recommend(latitude, longitude).await?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

fn run_nearest(engine: &RecommendationEngine, latitude: f64, longitude: f64) -> Result<()> {
    let point = Coordinate::new(latitude, longitude)?;
    let nearest = engine.index().nearest(&point)?;
    let body = serde_json::json!({
        "region_key": nearest.key(),
        "latitude": nearest.centroid.location.latitude,
        "longitude": nearest.centroid.location.longitude,
        "distance_km": nearest.distance_km,
    });
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}

async fn run_server(engine: RecommendationEngine, config: &AdvisorConfig) -> Result<()> {
    let state = ApiState::new(Arc::new(engine));
    let app = create_app(state, &config.server.cors_origins);

    let listener = tokio::net::TcpListener::bind(&config.server.addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.addr))?;
    info!(addr = %config.server.addr, "🌐 HTTP server listening");

    // Graceful shutdown via Ctrl+C
    let cancel_token = CancellationToken::new();
    let shutdown_token = cancel_token.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("🛑 Received Ctrl+C, initiating shutdown...");
        shutdown_token.cancel();
    });

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            cancel_token.cancelled().await;
            info!("[HttpServer] Received shutdown signal");
        })
        .await;

    match result {
        Ok(()) => {
            info!("[HttpServer] Graceful shutdown complete");
            Ok(())
        }
        Err(e) => {
            error!("[HttpServer] Server error: {}", e);
            Err(anyhow::anyhow!("HTTP server error: {}", e))
        }
    }
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional
    let _ = dotenvy::dotenv();

    let args = CliArgs::parse();
    init_logging(args.json_logs);

    let config = load_config(&args)?;
    if args.print_config {
        println!("{}", config.to_toml()?);
        return Ok(());
    }

    let engine = RecommendationEngine::from_config(&config)?;

    match args.command.unwrap_or(SubCommand::Serve) {
        SubCommand::Serve => {
            info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
            info!("  Crop Advisor v{}", env!("CARGO_PKG_VERSION"));
            info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
            run_server(engine, &config).await?;
            info!("✓ Crop Advisor shutdown complete");
        }
        SubCommand::Recommend { latitude, longitude } => {
            run_recommend(&engine, latitude, longitude).await?;
        }
        SubCommand::Nearest { latitude, longitude } => {
            run_nearest(&engine, latitude, longitude)?;
        }
    }

    Ok(())
}
