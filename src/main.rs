use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;

use exposure_scan_rs::error::Error;
use exposure_scan_rs::{report, scanner, targets};

/// exposure-scan-rs — scan a network range for exposed TCP services and
/// generate risk-annotated reports.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "exposure-scan-rs",
    version,
    about = "Scan a network range for exposed TCP services and generate risk-annotated reports.",
    long_about = None
)]
struct Cli {
    /// CIDR range to scan (e.g., 192.168.1.0/24). If omitted, auto-detect the local network.
    target: Option<String>,

    /// Comma-separated ports and ranges (e.g., 22,80,443,1000-1010). Defaults to a curated list of risky services.
    #[arg(long)]
    ports: Option<String>,

    /// Socket timeout in seconds.
    #[arg(long, default_value_t = 1.0)]
    timeout: f64,

    /// Maximum simultaneous connection attempts.
    #[arg(long, default_value_t = 200)]
    concurrency: usize,

    /// Write the JSON report to this path (optional).
    #[arg(long)]
    json: Option<PathBuf>,

    /// Write the HTML report to this path (optional).
    #[arg(long)]
    html: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if !(cli.timeout > 0.0 && cli.timeout.is_finite()) {
        bail!("timeout must be a positive number of seconds");
    }

    let target = match cli.target {
        Some(t) => t,
        None => {
            let nets = targets::detect_local_networks()
                .context("failed to detect local networks")?;
            let Some(net) = nets.first().copied() else {
                bail!("no local IPv4 networks detected; pass a target range");
            };
            println!("No target given; scanning detected local network {net}");
            net.to_string()
        }
    };

    // Ctrl-C cancels the scan.
    let cancel = CancellationToken::new();
    let cancel_ctrlc = cancel.clone();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        cancel_ctrlc.cancel();
    });

    let timeout = Duration::from_secs_f64(cli.timeout);
    let report = match scanner::run_scan(
        &target,
        cli.ports.as_deref(),
        timeout,
        cli.concurrency,
        cancel,
    )
    .await
    {
        Ok(report) => report,
        Err(Error::Interrupted) => {
            eprintln!("Scan interrupted by user.");
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    print!("{}", report::render_text(&report));

    if let Some(path) = cli.json.as_deref() {
        let json = report::to_json_pretty(&report)?;
        fs::write(path, json)
            .with_context(|| format!("failed to write JSON report to {}", path.display()))?;
        println!("JSON saved to {}", path.display());
    }
    if let Some(path) = cli.html.as_deref() {
        fs::write(path, report::render_html(&report))
            .with_context(|| format!("failed to write HTML report to {}", path.display()))?;
        println!("HTML saved to {}", path.display());
    }

    Ok(())
}
