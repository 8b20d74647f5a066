use crate::error::{Error, Result};
use std::collections::BTreeSet;

/// Resolve a raw port specification into the port set for a scan.
///
/// The specification is a comma-separated list of tokens, each either a
/// single port number (`443`) or an inclusive range (`8000-8010`). Blank
/// tokens are skipped. Referenced values are intersected with 1..=65535,
/// deduplicated, and returned in ascending order. A `start > end` range
/// contributes an empty sub-range rather than an error.
///
/// An absent or blank specification falls back to [`default_ports`]. An
/// explicit specification that filters down to nothing is a fatal input
/// validation failure; a scan with zero ports must never start.
pub fn select_ports(spec: Option<&str>) -> Result<Vec<u16>> {
    let spec = match spec.map(str::trim) {
        Some(s) if !s.is_empty() => s,
        _ => return Ok(default_ports()),
    };

    let mut selected = BTreeSet::new();
    for token in spec.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if let Some((start_s, end_s)) = token.split_once('-') {
            let start = parse_port_token(start_s.trim())?;
            let end = parse_port_token(end_s.trim())?;
            let lo = start.max(1);
            let hi = end.min(65_535);
            for value in lo..=hi {
                selected.insert(value as u16);
            }
        } else {
            let value = parse_port_token(token)?;
            if (1..=65_535).contains(&value) {
                selected.insert(value as u16);
            }
        }
    }

    if selected.is_empty() {
        return Err(Error::EmptyPortSet);
    }
    Ok(selected.into_iter().collect())
}

/// The curated default list of commonly exposed, risk-bearing TCP services.
/// Its authored order is itself the fallback contract.
pub fn default_ports() -> Vec<u16> {
    const DEFAULT: &[u16] = &[
        21, 22, 23, 25, 53, 80, 110, 135, 139, 143, 389, 443, 445, 465, 587, 993, 995, 1433,
        1521, 1723, 3306, 3389, 5432, 5900, 6379, 8080, 8443,
    ];
    DEFAULT.to_vec()
}

fn parse_port_token(s: &str) -> Result<i64> {
    s.parse::<i64>()
        .map_err(|_| Error::InvalidPortSpec(s.to_string()))
}
