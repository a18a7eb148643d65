use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use blockade_detour::config::EngineConfig;
use blockade_detour::demo;
use blockade_detour::osrm::OsrmClient;
use blockade_detour::traits::{RouteEngine, StraightLineEngine};
use blockade_detour::{AdjustError, AdjustRequest, DetourEngine, GeometryError, LonLat, Polyline};

/// Adjust driving routes around reported blockades.
#[derive(Debug, Parser)]
#[command(name = "blockade-detour", version)]
struct Cli {
    /// OSRM base URL; overrides OSRM_URL.
    #[arg(long)]
    osrm_url: Option<String>,

    /// Join waypoints with straight lines instead of calling OSRM.
    #[arg(long)]
    offline: bool,

    /// Start without the demo blockades.
    #[arg(long)]
    no_demo: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Adjust a route read from a JSON file ("-" for stdin).
    ///
    /// The file holds either an adjust request (`{"route": ..., "originHint": ...}`)
    /// or a bare GeoJSON LineString.
    Adjust {
        path: PathBuf,
        #[arg(long)]
        description: Option<String>,
    },
    /// Route between two "lon,lat" points, ignoring blockades.
    Route {
        #[arg(long, value_parser = parse_lon_lat, allow_hyphen_values = true)]
        start: LonLat,
        #[arg(long, value_parser = parse_lon_lat, allow_hyphen_values = true)]
        end: LonLat,
    },
    /// Print the registered blockades.
    Blockades,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("cannot read input: {0}")]
    Io(#[from] io::Error),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot build OSRM client: {0}")]
    Client(#[from] reqwest::Error),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Adjust(#[from] AdjustError),
}

fn parse_lon_lat(raw: &str) -> Result<LonLat, String> {
    let (lon, lat) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected \"lon,lat\", got {raw:?}"))?;
    let lon = lon.trim().parse::<f64>().map_err(|e| format!("longitude: {e}"))?;
    let lat = lat.trim().parse::<f64>().map_err(|e| format!("latitude: {e}"))?;
    Ok(LonLat::new(lon, lat))
}

fn read_request(path: &Path) -> Result<AdjustRequest, CliError> {
    let raw = if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        fs::read_to_string(path)?
    };
    parse_request(&raw)
}

/// A document with a `route` key is a full request; anything else must be a
/// bare LineString.
fn parse_request(raw: &str) -> Result<AdjustRequest, CliError> {
    let value: serde_json::Value = serde_json::from_str(raw)?;
    if value.get("route").is_some() {
        Ok(serde_json::from_value(value)?)
    } else {
        Ok(AdjustRequest::new(serde_json::from_value::<Polyline>(value)?))
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}

fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = EngineConfig::from_env();
    if let Some(url) = cli.osrm_url {
        config.osrm.base_url = url;
    }

    let router: Box<dyn RouteEngine> = if cli.offline {
        Box::new(StraightLineEngine)
    } else {
        info!(url = %config.osrm.base_url, "using OSRM");
        Box::new(OsrmClient::new(config.osrm.clone())?)
    };
    let engine = DetourEngine::new(router.as_ref(), &config);

    if !cli.no_demo {
        let added = engine.register_blockades(demo::demo_blockades()?)?;
        info!(added, "registered demo blockades");
    }

    match cli.command {
        Command::Adjust { path, description } => {
            let mut request = read_request(&path)?;
            if description.is_some() {
                request.description = description;
            }
            let response = engine.adjust(&request)?;
            info!(outcome = ?response.outcome, signature = %response.collision_signature, "adjusted route");
            print_json(&response)
        }
        Command::Route { start, end } => print_json(&engine.plan_route(start, end)?),
        Command::Blockades => print_json(&engine.blockades()),
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "blockade-detour failed");
            ExitCode::FAILURE
        }
    }
}
