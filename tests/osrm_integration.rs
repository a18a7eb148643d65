//! Runs the engine against a real OSRM container with Pakistan data.
//!
//! Needs docker and a Geofabrik download on first run, so the tests are
//! ignored by default: `cargo test -- --ignored`.

mod fixtures;

use std::env;
use std::time::{Duration, Instant};

use testcontainers::core::{IntoContainerPort, Mount};
use testcontainers::runners::SyncRunner;
use testcontainers::{Container, GenericImage, ImageExt, ReuseDirective, TestcontainersError};

use blockade_detour::config::EngineConfig;
use blockade_detour::demo;
use blockade_detour::osrm::{OsrmClient, OsrmConfig};
use blockade_detour::osrm_data::{GeofabrikRegion, OSRM_IMAGE, OsrmDataset, OsrmDatasetConfig};
use blockade_detour::traits::RouteEngine;
use blockade_detour::{AdjustOutcome, AdjustRequest, DetourEngine};

use fixtures::*;

fn osrm_container() -> Result<(Container<GenericImage>, String), TestcontainersError> {
    let data_root = env::var("OSRM_DATA_DIR").unwrap_or_else(|_| "osrm-data".to_string());
    let config = OsrmDatasetConfig::new(GeofabrikRegion::pakistan(), data_root);
    let dataset = OsrmDataset::ensure(&config)
        .map_err(|err| TestcontainersError::other(format!("OSRM prep failed: {err}")))?;
    let mtime = std::fs::metadata(dataset.osrm_base.with_extension("osrm.partition"))
        .ok()
        .and_then(|meta| meta.modified().ok())
        .and_then(|time| time.duration_since(std::time::SystemTime::UNIX_EPOCH).ok())
        .map(|duration| duration.as_secs())
        .unwrap_or(0);

    let image = GenericImage::new(OSRM_IMAGE, "latest")
        .with_exposed_port(5000.tcp())
        .with_mount(Mount::bind_mount(
            dataset.data_dir.to_string_lossy().to_string(),
            "/data",
        ))
        .with_cmd(vec![
            "osrm-routed".to_string(),
            "--algorithm".to_string(),
            "mld".to_string(),
            dataset.container_path(),
        ])
        .with_container_name(format!("osrm-pakistan-mld-{mtime}"))
        .with_startup_timeout(Duration::from_secs(60))
        .with_reuse(ReuseDirective::Always);

    let container = image.start()?;
    let port = container.get_host_port_ipv4(5000.tcp())?;
    Ok((container, format!("http://127.0.0.1:{port}")))
}

fn client_for(base_url: &str) -> OsrmClient {
    OsrmClient::new(OsrmConfig {
        base_url: base_url.to_string(),
        ..OsrmConfig::default()
    })
    .expect("build OSRM client")
}

/// osrm-routed accepts connections a little before it can answer; retry briefly.
fn wait_until_routable(client: &OsrmClient) {
    let start = Instant::now();
    let waypoints = [EXPO_CENTRE.point(), MAZAR_E_QUAID.point()];
    while start.elapsed() < Duration::from_secs(30) {
        if client.compute_route(&waypoints).is_ok() {
            return;
        }
        std::thread::sleep(Duration::from_millis(500));
    }
    panic!("OSRM never became routable");
}

#[test]
#[ignore = "needs docker and the Pakistan OSRM extract"]
fn test_osrm_route_returns_geometry() {
    let (container, base_url) = osrm_container().expect("start OSRM container");
    let client = client_for(&base_url);
    wait_until_routable(&client);

    let route = client
        .compute_route(&[EXPO_CENTRE.point(), MAZAR_E_QUAID.point()])
        .expect("route between landmarks");
    assert!(route.points().len() >= 2);
    route.validate().expect("OSRM geometry is a usable route");

    drop(container);
}

#[test]
#[ignore = "needs docker and the Pakistan OSRM extract"]
fn test_osrm_detour_is_cached() {
    let (container, base_url) = osrm_container().expect("start OSRM container");
    let client = client_for(&base_url);
    wait_until_routable(&client);

    let engine = DetourEngine::new(client, &EngineConfig::default());
    engine
        .register_blockades(demo::demo_blockades().unwrap())
        .unwrap();

    let request = AdjustRequest::new(route_through_center());
    let first = engine.adjust(&request).expect("detour via OSRM");
    assert_eq!(first.outcome, AdjustOutcome::Rerouted);
    assert!(!first.collision_signature.is_empty());

    let started = Instant::now();
    let second = engine.adjust(&request).expect("cached detour");
    eprintln!("cached adjust took {:?}", started.elapsed());
    assert_eq!(second.outcome, AdjustOutcome::CacheHit);
    assert_eq!(second.route, first.route);

    drop(container);
}
