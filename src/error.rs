use thiserror::Error;

/// Result alias for scan operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced before, or instead of, a completed scan.
///
/// Per-probe network failures are not represented here; a probe that cannot
/// connect simply yields no exposure.
#[derive(Error, Debug)]
pub enum Error {
    /// The target descriptor is not a parseable IP network or address.
    #[error("invalid target range: {0}")]
    InvalidRange(String),

    /// A port specification token is neither an integer nor a `start-end` range.
    #[error("invalid port specification token: {0:?}")]
    InvalidPortSpec(String),

    /// The explicit port specification selects no ports in 1-65535.
    #[error("port specification selects no valid ports")]
    EmptyPortSet,

    /// A concurrency bound of zero would admit no probes.
    #[error("concurrency must be at least 1")]
    InvalidConcurrency,

    /// The scan was aborted before every probe resolved; no report exists.
    #[error("scan interrupted before completion")]
    Interrupted,
}
