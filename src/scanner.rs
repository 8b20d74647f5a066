use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;
use tokio::time;
use tokio_util::sync::CancellationToken;
use ::time::{format_description::well_known, OffsetDateTime};

use crate::error::{Error, Result};
use crate::types::{Exposure, ScanReport};
use crate::{ports, risk, targets};

/// Attempt exactly one TCP connect to `ip:port`, bounded by `timeout`.
///
/// A successful connect yields an `Exposure` even when no banner arrives.
/// Every connect failure mode (refused, unreachable, timed out, any other
/// socket error) resolves to `None`; most of an address range does not
/// respond, so this path stays cheap and non-throwing. The stream is dropped,
/// and the socket released, on all exit paths.
pub async fn probe(ip: IpAddr, port: u16, timeout: Duration) -> Option<Exposure> {
    let addr = SocketAddr::new(ip, port);
    let mut stream = match time::timeout(timeout, TcpStream::connect(addr)).await {
        Ok(Ok(stream)) => stream,
        _ => return None,
    };

    let banner = read_banner(&mut stream, timeout).await;
    Some(Exposure {
        host: ip.to_string(),
        port,
        service_banner: banner,
        risk: risk::risk_note(port).map(str::to_string),
    })
}

/// Nudge the peer with a newline, then read up to 64 bytes within `timeout`
/// and convert them to trimmed, lossy UTF-8.
///
/// Some protocols only emit a banner after client input, hence the nudge.
/// A read that times out, errors, or yields only whitespace is reported as
/// no banner; it never fails the probe.
async fn read_banner(stream: &mut TcpStream, timeout: Duration) -> Option<String> {
    let _ = time::timeout(timeout, stream.write_all(b"\n")).await;

    let mut buf = [0u8; 64];
    match time::timeout(timeout, stream.read(&mut buf)).await {
        Ok(Ok(n)) if n > 0 => {
            let text = String::from_utf8_lossy(&buf[..n]).trim().to_string();
            if text.is_empty() {
                None
            } else {
                Some(text)
            }
        }
        _ => None,
    }
}

/// Probe every (host, port) pair with at most `concurrency` probes in flight.
pub async fn scan(
    hosts: &[IpAddr],
    ports: &[u16],
    timeout: Duration,
    concurrency: usize,
) -> Result<Vec<Exposure>> {
    scan_with_cancel(hosts, ports, timeout, concurrency, CancellationToken::new()).await
}

/// Variant that accepts a `CancellationToken` to allow external cancellation.
///
/// - A `Semaphore` is the admission gate: the dispatch loop acquires an owned
///   permit before spawning each probe, so the host x port cross product is
///   produced lazily and at most `concurrency` probes exist at any instant.
/// - Each task holds its permit for the full probe lifetime (connect + nudge
///   + banner read) to keep pressure on the target network bounded.
/// - Exposures accumulate in probe-completion order.
/// - Cancellation stops dispatch at the gate, lets in-flight probes unwind
///   (dropping their sockets), and resolves to `Error::Interrupted` rather
///   than a partial result.
pub async fn scan_with_cancel(
    hosts: &[IpAddr],
    ports: &[u16],
    timeout: Duration,
    concurrency: usize,
    cancel: CancellationToken,
) -> Result<Vec<Exposure>> {
    if concurrency == 0 {
        return Err(Error::InvalidConcurrency);
    }

    let sem = Arc::new(Semaphore::new(concurrency));
    let exposures = Arc::new(Mutex::new(Vec::new()));
    let mut set = JoinSet::new();

    'dispatch: for &ip in hosts {
        for &port in ports {
            let permit = tokio::select! {
                _ = cancel.cancelled() => break 'dispatch,
                permit = sem.clone().acquire_owned() => {
                    permit.expect("semaphore never closed")
                }
            };
            let exposures = exposures.clone();
            let cancel = cancel.clone();

            set.spawn(async move {
                let _permit = permit; // held until the probe resolves

                tokio::select! {
                    _ = cancel.cancelled() => {}
                    outcome = probe(ip, port, timeout) => {
                        if let Some(exposure) = outcome {
                            exposures.lock().await.push(exposure);
                        }
                    }
                }
            });
        }
    }

    while set.join_next().await.is_some() {}

    if cancel.is_cancelled() {
        return Err(Error::Interrupted);
    }

    // All tasks have been joined, so this Arc is normally the sole owner.
    let exposures = match Arc::try_unwrap(exposures) {
        Ok(collected) => collected.into_inner(),
        Err(shared) => shared.lock().await.clone(),
    };
    Ok(exposures)
}

/// Run one complete scan: resolve the target and port inputs, probe the full
/// cross product, and assemble the timestamped report.
///
/// Configuration errors surface here before any socket is opened.
pub async fn run_scan(
    target: &str,
    port_spec: Option<&str>,
    timeout: Duration,
    concurrency: usize,
    cancel: CancellationToken,
) -> Result<ScanReport> {
    let net = targets::parse_target(target)?;
    let ports = ports::select_ports(port_spec)?;
    let hosts = targets::expand_hosts(&net);

    let started_at = now_utc_rfc3339();
    let exposures = scan_with_cancel(&hosts, &ports, timeout, concurrency, cancel).await?;
    let finished_at = now_utc_rfc3339();

    Ok(ScanReport {
        target: target.trim().to_string(),
        ports,
        host_count: hosts.len(),
        exposures,
        started_at,
        finished_at,
    })
}

fn now_utc_rfc3339() -> String {
    let now = OffsetDateTime::now_utc();
    now.format(&well_known::Rfc3339)
        .unwrap_or_else(|_| String::from("1970-01-01T00:00:00Z"))
}
