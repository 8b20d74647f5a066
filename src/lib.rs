//! Library crate for exposure-scan-rs: expand a CIDR target, probe a port set
//! under a bounded-concurrency gate, and report risk-annotated exposures.
pub mod error;
pub mod ports;
pub mod report;
pub mod risk;
pub mod scanner;
pub mod targets;
pub mod types;
