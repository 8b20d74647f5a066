use std::fmt::Write as _;

use crate::types::{Exposure, ScanReport};

const NO_BANNER: &str = "-";
const NO_RISK: &str = "Review manually";
const NO_EXPOSURES: &str = "No exposures detected";

/// Render the report as a summary header plus an aligned table, one row per
/// exposure, with a placeholder row when nothing was found.
pub fn render_text(report: &ScanReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Target: {}", report.target);
    let _ = writeln!(out, "Hosts scanned: {}", report.host_count);
    let _ = writeln!(out, "Ports: {}", join_ports(&report.ports));
    let _ = writeln!(
        out,
        "Scan window: {} -> {}",
        report.started_at, report.finished_at
    );
    let _ = writeln!(out);

    if report.exposures.is_empty() {
        let _ = writeln!(out, "{NO_EXPOSURES}");
        return out;
    }

    let mut host_w = "host".len();
    let mut banner_w = "banner".len();
    let mut risk_w = "risk".len();
    for e in &report.exposures {
        host_w = host_w.max(e.host.len());
        banner_w = banner_w.max(banner_cell(e).len());
        risk_w = risk_w.max(risk_cell(e).len());
    }
    let port_w = "port".len().max(5);

    let _ = writeln!(
        out,
        "{:<host_w$}  {:>port_w$}  {:<banner_w$}  {:<risk_w$}",
        "host", "port", "banner", "risk",
    );
    let _ = writeln!(
        out,
        "{:-<host_w$}  {:-<port_w$}  {:-<banner_w$}  {:-<risk_w$}",
        "", "", "", "",
    );
    for e in &report.exposures {
        let _ = writeln!(
            out,
            "{:<host_w$}  {:>port_w$}  {:<banner_w$}  {:<risk_w$}",
            e.host,
            e.port,
            banner_cell(e),
            risk_cell(e),
        );
    }
    out
}

/// Render the report as a standalone HTML document with the same four-column
/// table. Banner bytes come off the wire, so every cell is escaped.
pub fn render_html(report: &ScanReport) -> String {
    let mut rows = String::new();
    for e in &report.exposures {
        let _ = writeln!(
            rows,
            "      <tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape(&e.host),
            e.port,
            escape(&banner_cell(e)),
            escape(risk_cell(e)),
        );
    }
    if rows.is_empty() {
        rows = format!("      <tr><td colspan=\"4\">{NO_EXPOSURES}</td></tr>\n");
    }

    format!(
        r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Network Exposure Report</title>
  <style>
    body {{ font-family: -apple-system, 'Segoe UI', sans-serif; margin: 2rem; }}
    table {{ border-collapse: collapse; width: 100%; }}
    th, td {{ border: 1px solid #ddd; padding: 0.5rem; }}
    th {{ background: #f3f4f6; text-align: left; }}
  </style>
</head>
<body>
  <h1>Network Exposure Report</h1>
  <p><strong>Target:</strong> {target}</p>
  <p><strong>Hosts scanned:</strong> {host_count}</p>
  <p><strong>Ports:</strong> {ports}</p>
  <p><strong>Scan window:</strong> {started} &rarr; {finished}</p>
  <table>
    <thead>
      <tr><th>Host</th><th>Port</th><th>Banner</th><th>Risk Note</th></tr>
    </thead>
    <tbody>
{rows}    </tbody>
  </table>
</body>
</html>
"#,
        target = escape(&report.target),
        host_count = report.host_count,
        ports = join_ports(&report.ports),
        started = escape(&report.started_at),
        finished = escape(&report.finished_at),
        rows = rows,
    )
}

/// Serialize the report as pretty-printed JSON.
pub fn to_json_pretty(report: &ScanReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

fn banner_cell(e: &Exposure) -> String {
    let cell = e.service_banner.as_deref().unwrap_or(NO_BANNER);
    // Char-wise cut: lossy decoding can leave multi-byte replacement chars.
    cell.chars().take(60).collect()
}

fn risk_cell(e: &Exposure) -> &str {
    e.risk.as_deref().unwrap_or(NO_RISK)
}

fn join_ports(ports: &[u16]) -> String {
    ports
        .iter()
        .map(u16::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> ScanReport {
        ScanReport {
            target: "192.0.2.0/30".to_string(),
            ports: vec![22, 80],
            host_count: 2,
            exposures: vec![
                Exposure {
                    host: "192.0.2.1".to_string(),
                    port: 22,
                    service_banner: Some("SSH-2.0-OpenSSH_9.6".to_string()),
                    risk: Some("Confirm SSH uses keys.".to_string()),
                },
                Exposure {
                    host: "192.0.2.2".to_string(),
                    port: 80,
                    service_banner: None,
                    risk: None,
                },
            ],
            started_at: "2024-01-01T00:00:00Z".to_string(),
            finished_at: "2024-01-01T00:00:05Z".to_string(),
        }
    }

    #[test]
    fn json_uses_model_field_names() {
        let json = to_json_pretty(&sample_report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["target"], "192.0.2.0/30");
        assert_eq!(value["host_count"], 2);
        assert_eq!(value["ports"], serde_json::json!([22, 80]));
        assert!(value["started_at"].as_str().unwrap().ends_with('Z'));
        assert_eq!(value["exposures"][0]["service_banner"], "SSH-2.0-OpenSSH_9.6");
        assert_eq!(value["exposures"][1]["service_banner"], serde_json::Value::Null);
        assert_eq!(value["exposures"][1]["risk"], serde_json::Value::Null);
    }

    #[test]
    fn text_table_uses_placeholders() {
        let text = render_text(&sample_report());
        assert!(text.contains("Hosts scanned: 2"));
        assert!(text.contains("Ports: 22, 80"));
        assert!(text.contains("SSH-2.0-OpenSSH_9.6"));
        assert!(text.contains(NO_BANNER));
        assert!(text.contains(NO_RISK));
    }

    #[test]
    fn empty_report_renders_placeholder_row() {
        let mut report = sample_report();
        report.exposures.clear();
        assert!(render_text(&report).contains(NO_EXPOSURES));
        assert!(render_html(&report).contains(NO_EXPOSURES));
    }

    #[test]
    fn html_escapes_cell_text() {
        let mut report = sample_report();
        report.exposures[0].service_banner = Some("<script>alert(1)</script>".to_string());
        let html = render_html(&report);
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>alert"));
    }
}
