use std::net::{IpAddr, Ipv4Addr};
use std::time::{Duration, Instant};

use exposure_scan_rs::error::Error;
use exposure_scan_rs::scanner;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

/// Bind an ephemeral port, then release it so nothing is listening there.
async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

#[tokio::test]
async fn single_host_scan_reports_one_exposure() {
    // The listener's backlog completes handshakes without an accept loop.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let open_port = listener.local_addr().unwrap().port();
    let closed = closed_port().await;

    let spec = format!("{open_port},{closed}");
    let report = scanner::run_scan(
        "127.0.0.1/32",
        Some(&spec),
        Duration::from_millis(400),
        16,
        CancellationToken::new(),
    )
    .await
    .expect("scan completes");

    assert_eq!(report.target, "127.0.0.1/32");
    assert_eq!(report.host_count, 1);
    let mut expected = vec![open_port, closed];
    expected.sort_unstable();
    assert_eq!(report.ports, expected);
    assert_eq!(report.exposures.len(), 1);
    assert_eq!(report.exposures[0].host, "127.0.0.1");
    assert_eq!(report.exposures[0].port, open_port);
    assert!(report.started_at.ends_with('Z'));
    assert!(report.finished_at.ends_with('Z'));
}

#[tokio::test]
async fn admission_gate_serializes_probes() {
    // Three silent listeners: each probe connects instantly, then waits out
    // the full banner-read timeout. With a single permit the reads cannot
    // overlap, so the scan takes at least three timeout windows.
    let mut listeners = Vec::new();
    let mut ports = Vec::new();
    for _ in 0..3 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        ports.push(listener.local_addr().unwrap().port());
        listeners.push(listener);
    }
    let hosts = vec![IpAddr::V4(Ipv4Addr::LOCALHOST)];
    let timeout = Duration::from_millis(300);

    let started = Instant::now();
    let exposures = scanner::scan(&hosts, &ports, timeout, 1).await.unwrap();
    let elapsed = started.elapsed();

    assert_eq!(exposures.len(), 3);
    assert!(
        elapsed >= Duration::from_millis(600),
        "probes overlapped despite the gate: {elapsed:?}"
    );
}

#[tokio::test]
async fn mid_scan_cancellation_aborts_promptly() {
    let mut listeners = Vec::new();
    let mut ports = Vec::new();
    for _ in 0..3 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        ports.push(listener.local_addr().unwrap().port());
        listeners.push(listener);
    }
    let hosts = vec![IpAddr::V4(Ipv4Addr::LOCALHOST)];

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(150)).await;
        trigger.cancel();
    });

    let started = Instant::now();
    let err = scanner::scan_with_cancel(&hosts, &ports, Duration::from_secs(5), 1, cancel)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Interrupted));
    // Dispatch stopped at the gate and the in-flight probe unwound; nothing
    // waited out the full five-second budget per work item.
    assert!(started.elapsed() < Duration::from_secs(5));
}
