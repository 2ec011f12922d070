//! Integration tests for the dashboard server.
//!
//! Tests the page, the figures API and the health and metrics endpoints.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::path::Path;
use std::time::Duration;
use syrup_viz::Catalog;
use syrup_viz::server::{self, ServerConfig, ServerHandle};

const ENCODING_CSV: &str = "\
name,time,saved_gas,already_optimal,discovered_optimal,non_optimal_with_less_gas,non_optimal_with_same_gas,no_solution_found
block_a,120,10,1,0,0,0,0
block_b,60,0,0,1,0,0,0
";

const ZERO_OUTCOMES_CSV: &str = "\
name,time,saved_gas,already_optimal,discovered_optimal,non_optimal_with_less_gas,non_optimal_with_same_gas,no_solution_found
block_a,120,10,0,0,0,0,0
";

fn write_encoding_results(dir: &Path) {
    for encoding in ["initial_configuration", "at_most"] {
        for group in ["combined", "barcelogic", "z3", "oms"] {
            std::fs::write(dir.join(format!("{}_{}.csv", encoding, group)), ENCODING_CSV)
                .unwrap();
        }
    }
}

/// Start a server on a free port over `dir`.
fn start_server(dir: &Path) -> ServerHandle {
    server::start(ServerConfig {
        listen: "127.0.0.1:0".parse().unwrap(),
        data_dir: dir.to_path_buf(),
        catalog: Catalog::default(),
    })
    .unwrap()
}

/// Send an HTTP GET request and return the response.
fn http_get(addr: SocketAddr, path: &str) -> Result<(u16, String), std::io::Error> {
    let mut stream = TcpStream::connect(addr)?;
    stream.set_read_timeout(Some(Duration::from_secs(5)))?;
    stream.set_write_timeout(Some(Duration::from_secs(5)))?;

    let request = format!(
        "GET {} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n\r\n",
        path, addr
    );
    stream.write_all(request.as_bytes())?;

    let mut response = String::new();
    stream.read_to_string(&mut response)?;

    // Parse HTTP response
    let status_line = response.lines().next().unwrap_or("");
    let status_code: u16 = status_line
        .split_whitespace()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(0);

    // Find body (after empty line)
    let body = response.split("\r\n\r\n").nth(1).unwrap_or("").to_string();

    Ok((status_code, body))
}

fn error_message(body: &str) -> String {
    let value: serde_json::Value = serde_json::from_str(body).unwrap();
    value["error"].as_str().unwrap().to_string()
}

/// Test the /health endpoint returns 200 OK.
#[test]
fn test_health_endpoint() {
    let dir = tempfile::tempdir().unwrap();
    let handle = start_server(dir.path());

    let (status, body) = http_get(handle.local_addr(), "/health").unwrap();
    assert_eq!(status, 200, "Health check should return 200");
    assert_eq!(body, "OK", "Health check body should be 'OK'");

    handle.shutdown();
}

/// The page carries every stage, control and figure slot.
#[test]
fn test_dashboard_page() {
    let dir = tempfile::tempdir().unwrap();
    let handle = start_server(dir.path());

    let (status, body) = http_get(handle.local_addr(), "/").unwrap();
    assert_eq!(status, 200);
    assert!(body.contains("<title>Syrup Data Visualizer</title>"));
    assert!(body.contains(r#"const MODE = "live""#));
    for stage in ["encoding", "parameters", "setups"] {
        assert!(
            body.contains(&format!(r#"data-stage="{}""#, stage)),
            "missing stage {}",
            stage
        );
    }
    for slot in [
        "encoding-time",
        "encoding-gas",
        "encoding-statistics",
        "comparison-times",
        "setup-time",
        "setup-outcomes",
        "setup-paired",
    ] {
        assert!(
            body.contains(&format!(r#"id="{}""#, slot)),
            "missing slot {}",
            slot
        );
    }
    assert!(body.contains(r#"data-kind="range""#));

    handle.shutdown();
}

#[test]
fn test_encoding_figures() {
    let dir = tempfile::tempdir().unwrap();
    write_encoding_results(dir.path());
    let handle = start_server(dir.path());

    let (status, body) = http_get(handle.local_addr(), "/api/figures/encoding").unwrap();
    assert_eq!(status, 200, "body: {}", body);

    let value: serde_json::Value = serde_json::from_str(&body).unwrap();
    let figures = value["figures"].as_object().unwrap();
    assert_eq!(figures.len(), 3);
    assert_eq!(
        value["figures"]["encoding-statistics"]["data"][0]["y"][0],
        50.0
    );

    let (status, body) = http_get(
        handle.local_addr(),
        "/api/figures/encoding?groups=z3&encodings=at_most",
    )
    .unwrap();
    assert_eq!(status, 200);
    let value: serde_json::Value = serde_json::from_str(&body).unwrap();
    let traces = value["figures"]["encoding-time"]["data"].as_array().unwrap();
    assert_eq!(traces.len(), 1);
    assert_eq!(traces[0]["x"], serde_json::json!(["Z3", "Z3"]));

    handle.shutdown();
}

#[test]
fn test_missing_file_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let handle = start_server(dir.path());

    let (status, body) = http_get(handle.local_addr(), "/api/figures/setups").unwrap();
    assert_eq!(status, 404);
    assert!(error_message(&body).contains("best_encoding_barcelogic.csv"));

    handle.shutdown();
}

#[test]
fn test_invalid_requests() {
    let dir = tempfile::tempdir().unwrap();
    let handle = start_server(dir.path());
    let addr = handle.local_addr();

    let (status, body) = http_get(addr, "/api/figures/parameters?metric=gas_per_push").unwrap();
    assert_eq!(status, 400);
    assert!(error_message(&body).contains("gas_per_push"));

    let (status, _) = http_get(addr, "/api/figures/parameters?range=80,20").unwrap();
    assert_eq!(status, 400);

    let (status, _) = http_get(addr, "/api/figures/setups?solver=..%2Fz3").unwrap();
    assert_eq!(status, 400);

    let (status, _) = http_get(addr, "/api/figures/stage-three").unwrap();
    assert_eq!(status, 400);

    handle.shutdown();
}

#[test]
fn test_unusable_data_is_unprocessable() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("at_most_oms.csv"), ZERO_OUTCOMES_CSV).unwrap();
    let handle = start_server(dir.path());

    let (status, body) = http_get(
        handle.local_addr(),
        "/api/figures/encoding?groups=oms&encodings=at_most",
    )
    .unwrap();
    assert_eq!(status, 422);
    assert!(error_message(&body).contains("no outcome records"));

    handle.shutdown();
}

#[test]
fn test_metrics_endpoint() {
    let dir = tempfile::tempdir().unwrap();
    write_encoding_results(dir.path());
    let handle = start_server(dir.path());
    let addr = handle.local_addr();

    let (status, _) = http_get(addr, "/api/figures/encoding").unwrap();
    assert_eq!(status, 200);

    let (status, body) = http_get(addr, "/metrics").unwrap();
    assert_eq!(status, 200, "Metrics should return 200");
    assert!(
        body.contains("# TYPE tables_loaded counter"),
        "Metrics should include tables_loaded"
    );
    assert!(body.contains("http_requests"));
    assert!(body.contains("figures_rendered"));

    handle.shutdown();
}
