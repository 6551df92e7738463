//! Probe command implementation
//!
//! Tries every candidate base URL against a fixed set of endpoints, one
//! uncached request each, and reports what came back.

use colored::Colorize;
use serde::Serialize;
use tabled::Tabled;

use crate::cli::{CommandContext, OutputFormat};
use crate::client::Transport;
use crate::dashboard::{DashboardField, LogicalField};
use crate::error::{ApiError, Result};
use crate::output::formatters::excerpt;
use crate::output::{json, table};

/// Endpoints exercised for every candidate base URL
const DIAGNOSTIC_FIELDS: [DashboardField; 4] = [
    DashboardField::TotalVolume,
    DashboardField::VolumeByLane,
    DashboardField::AvgSpeedByLane,
    DashboardField::TrafficEvolution,
];

/// Characters of response body kept in the report
const EXCERPT_CHARS: usize = 200;

/// Outcome of one diagnostic request
#[derive(Debug, Clone, Serialize)]
pub struct ProbeResult {
    pub base_url: String,
    pub path: &'static str,
    pub status: Option<u16>,
    pub ok: bool,
    /// Body excerpt on response, error message otherwise
    pub detail: String,
}

/// Reachability of one base URL
#[derive(Debug, Clone, Serialize)]
pub struct BaseUrlReport {
    pub base_url: String,
    pub reachable: bool,
    pub endpoints: Vec<ProbeResult>,
}

#[derive(Tabled)]
struct ProbeDisplay {
    #[tabled(rename = "BASE URL")]
    base_url: String,
    #[tabled(rename = "ENDPOINT")]
    path: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "OK")]
    ok: String,
}

impl From<&ProbeResult> for ProbeDisplay {
    fn from(result: &ProbeResult) -> Self {
        Self {
            base_url: result.base_url.clone(),
            path: result.path.to_string(),
            status: result
                .status
                .map(|s| s.to_string())
                .unwrap_or_else(|| "-".to_string()),
            ok: if result.ok { "yes" } else { "no" }.to_string(),
        }
    }
}

/// Candidate base URLs: the configured one first, then the probe list
fn candidate_urls(ctx: &CommandContext) -> Vec<String> {
    let mut urls = vec![ctx.aggregator.accessor().base_url().to_string()];
    for url in &ctx.config.probe.base_urls {
        let url = url.trim_end_matches('/').to_string();
        if !urls.contains(&url) {
            urls.push(url);
        }
    }
    urls
}

/// One request with the configured timeout, no retry, no cache
pub async fn probe_endpoint<T: Transport>(
    transport: &T,
    base_url: &str,
    path: &'static str,
    timeout: std::time::Duration,
) -> ProbeResult {
    let url = format!("{}{}", base_url, path);
    let outcome = match tokio::time::timeout(timeout, transport.get(&url)).await {
        Ok(result) => result,
        Err(_) => Err(ApiError::Timeout {
            url: url.clone(),
            timeout,
        }
        .into()),
    };

    match outcome {
        Ok(response) => ProbeResult {
            base_url: base_url.to_string(),
            path,
            status: Some(response.status),
            ok: response.is_success(),
            detail: excerpt(&response.body, EXCERPT_CHARS),
        },
        Err(e) => ProbeResult {
            base_url: base_url.to_string(),
            path,
            status: None,
            ok: false,
            detail: e.to_string(),
        },
    }
}

/// Run the probe command
pub async fn run(ctx: &CommandContext) -> Result<()> {
    let timeout = ctx.config.fetch.timeout();
    let mut reports = Vec::new();

    for base_url in candidate_urls(ctx) {
        let reachable = ctx.aggregator.accessor().probe(&base_url).await;

        let mut endpoints = Vec::with_capacity(DIAGNOSTIC_FIELDS.len());
        for field in DIAGNOSTIC_FIELDS {
            endpoints.push(
                probe_endpoint(ctx.transport.as_ref(), &base_url, field.path(), timeout).await,
            );
        }

        reports.push(BaseUrlReport {
            base_url,
            reachable,
            endpoints,
        });
    }

    match ctx.format {
        OutputFormat::Json => println!("{}", json::format_json(&reports)?),
        OutputFormat::Table => {
            let rows: Vec<ProbeDisplay> = reports
                .iter()
                .flat_map(|r| r.endpoints.iter().map(ProbeDisplay::from))
                .collect();
            println!("{}", table::format_table(&rows));
        }
        OutputFormat::Pretty => {
            for report in &reports {
                if report.reachable {
                    println!("{} {}", "✓".green(), report.base_url.bold());
                } else {
                    println!("{} {}", "✗".red(), report.base_url.bold());
                }
                for result in &report.endpoints {
                    let status = result
                        .status
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| "---".to_string());
                    let mark = if result.ok { "✓".green() } else { "✗".red() };
                    println!("  {} {} {}", mark, status, result.path);
                    println!("      {}", result.detail.dimmed());
                }
            }

            let working: Vec<&str> = reports
                .iter()
                .filter(|r| r.reachable)
                .map(|r| r.base_url.as_str())
                .collect();
            println!();
            if working.is_empty() {
                println!("{} No candidate URL answered; dashboards will use backup data", "⚠".yellow());
            } else {
                println!("Working base URL(s): {}", working.join(", ").cyan());
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockTransport;
    use serde_json::json;
    use std::time::Duration;

    const BASE: &str = "http://backend/api";

    #[tokio::test]
    async fn test_probe_endpoint_success_keeps_excerpt() {
        let long = "x".repeat(500);
        let mock = MockTransport::new().with_json("/detections/volume/total", json!({ "pad": long }));

        let result =
            probe_endpoint(&mock, BASE, "/detections/volume/total", Duration::from_secs(1)).await;

        assert!(result.ok);
        assert_eq!(result.status, Some(200));
        assert_eq!(result.detail.chars().count(), EXCERPT_CHARS + 3);
    }

    #[tokio::test]
    async fn test_probe_endpoint_reports_status() {
        let mock = MockTransport::new().with_status("/detections/lanes/speed", 404);

        let result =
            probe_endpoint(&mock, BASE, "/detections/lanes/speed", Duration::from_secs(1)).await;

        assert!(!result.ok);
        assert_eq!(result.status, Some(404));
    }

    #[tokio::test(start_paused = true)]
    async fn test_probe_endpoint_times_out() {
        let mock = MockTransport::new().with_hang("/detections/volume/by-lane");

        let result = probe_endpoint(
            &mock,
            BASE,
            "/detections/volume/by-lane",
            Duration::from_millis(250),
        )
        .await;

        assert!(!result.ok);
        assert_eq!(result.status, None);
        assert!(result.detail.contains("Timed out"));
        assert_eq!(mock.total_calls(), 1);
    }
}
