use serde::{Deserialize, Serialize};

/// One confirmed open service on a probed host.
///
/// Exists only for a (host, port) pair whose connection attempt succeeded
/// within the timeout; failed or timed-out attempts produce nothing.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Exposure {
    pub host: String,
    pub port: u16,
    /// Trimmed, lossily decoded text of up to 64 bytes read after connecting.
    pub service_banner: Option<String>,
    /// Canned warning for well-known risky services, if catalogued.
    pub risk: Option<String>,
}

/// Immutable result of one completed scan.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ScanReport {
    /// The range descriptor as given, not the expanded addresses.
    pub target: String,
    /// Resolved port set used for the scan.
    pub ports: Vec<u16>,
    /// Usable host addresses in `target`, responding or not.
    pub host_count: usize,
    /// Accumulated in probe-completion order.
    pub exposures: Vec<Exposure>,
    pub started_at: String,
    pub finished_at: String,
}
