// Report generation for crawl inventories and probe results

use crate::crawl::extract_url_path;
use crate::error::{CoreError, Result};
use crate::probe::{ProbeOutcome, ProbeResult};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use urlscout_scanner::CrawlResult;

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
    Csv,
}

impl FromStr for ReportFormat {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            "csv" => Ok(ReportFormat::Csv),
            _ => Err(CoreError::UnknownFormat(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ProbeSummary {
    pub total: usize,
    pub ok: usize,
    pub http_errors: usize,
    pub network_errors: usize,
}

impl ProbeSummary {
    pub fn from_results(results: &[ProbeResult]) -> Self {
        results.iter().fold(Self::default(), |mut summary, result| {
            summary.total += 1;
            match result.outcome {
                ProbeOutcome::Ok(_) => summary.ok += 1,
                ProbeOutcome::HttpError(_) => summary.http_errors += 1,
                ProbeOutcome::NetworkError(_) => summary.network_errors += 1,
            }
            summary
        })
    }
}

/// Quote a CSV field when it contains a comma, quote or line break.
pub fn csv_escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

pub fn generate_probe_report(results: &[ProbeResult], format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Text => Ok(generate_probe_text(results)),
        ReportFormat::Json => generate_probe_json(results),
        ReportFormat::Csv => Ok(generate_probe_csv(results)),
    }
}

/// `URL,Status` rows in input order; unreachable URLs get `Error`.
pub fn generate_probe_csv(results: &[ProbeResult]) -> String {
    let mut csv = String::from("URL,Status\n");
    for result in results {
        let (url, status) = result.to_row();
        csv.push_str(&format!("{},{}\n", csv_escape(&url), status));
    }
    csv
}

pub fn generate_probe_json(results: &[ProbeResult]) -> Result<String> {
    let report = serde_json::json!({
        "metadata": metadata(),
        "summary": ProbeSummary::from_results(results),
        "results": results,
    });
    Ok(serde_json::to_string_pretty(&report)?)
}

pub fn generate_probe_text(results: &[ProbeResult]) -> String {
    let summary = ProbeSummary::from_results(results);
    let width = results.iter().map(|r| r.url.len()).max().unwrap_or(3).max(3);

    let mut report = String::new();
    report.push_str(RULE);
    report.push('\n');
    report.push_str(&format!("{:<width$}  STATUS\n", "URL", width = width));
    for result in results {
        report.push_str(&format!(
            "{:<width$}  {}\n",
            result.url,
            result.status_label(),
            width = width
        ));
    }
    report.push_str(RULE);
    report.push('\n');
    report.push_str("# Summary:\n");
    report.push_str(&format!("  URLs checked:    {}\n", summary.total));
    report.push_str(&format!("  Reachable:       {}\n", summary.ok));
    report.push_str(&format!("  HTTP errors:     {}\n", summary.http_errors));
    report.push_str(&format!("  Network errors:  {}\n", summary.network_errors));
    report
}

/// Render a crawl inventory. When `probes` is given the URL list carries
/// their status column.
pub fn generate_crawl_report(
    result: &CrawlResult,
    probes: Option<&[ProbeResult]>,
    format: ReportFormat,
) -> Result<String> {
    match format {
        ReportFormat::Text => Ok(generate_crawl_text(result, probes)),
        ReportFormat::Json => generate_crawl_json(result, probes),
        ReportFormat::Csv => Ok(generate_crawl_csv(result, probes)),
    }
}

pub fn generate_crawl_csv(result: &CrawlResult, probes: Option<&[ProbeResult]>) -> String {
    match probes {
        Some(probes) => generate_probe_csv(probes),
        None => {
            let mut csv = String::from("URL\n");
            for url in &result.urls {
                csv.push_str(&csv_escape(url.as_str()));
                csv.push('\n');
            }
            csv
        }
    }
}

pub fn generate_crawl_json(result: &CrawlResult, probes: Option<&[ProbeResult]>) -> Result<String> {
    let mut report = serde_json::json!({
        "metadata": metadata(),
        "crawl": result,
    });
    if let Some(probes) = probes {
        report["probe"] = serde_json::json!({
            "summary": ProbeSummary::from_results(probes),
            "results": probes,
        });
    }
    Ok(serde_json::to_string_pretty(&report)?)
}

pub fn generate_crawl_text(result: &CrawlResult, probes: Option<&[ProbeResult]>) -> String {
    let mut report = String::new();
    report.push_str(RULE);
    report.push_str("\n\n# Summary:\n");
    report.push_str(&format!("  Seed:            {}\n", result.seed));
    report.push_str(&format!("  URLs found:      {}\n", result.len()));
    report.push_str(&format!("  Pages fetched:   {}\n", result.pages_fetched));
    report.push_str(&format!("  Failed fetches:  {}\n", result.failures.len()));
    report.push_str(&format!("  Stopped:         {}\n", result.stop_reason.as_str()));
    if !result.external.is_empty() {
        report.push_str(&format!("  External links:  {}\n", result.external.len()));
    }
    report.push('\n');
    report.push_str(RULE);
    report.push_str("\n\n");

    let host = result.seed.as_url().host_str().unwrap_or("unknown");
    report.push_str(&format!("## {}\n", host));
    for (idx, url) in result.urls.iter().enumerate() {
        let path = extract_url_path(url.as_str());
        match probes.and_then(|p| p.get(idx)) {
            Some(probe) => report.push_str(&format!("  {:>5} {}\n", probe.status_label(), path)),
            None => report.push_str(&format!("  {}\n", path)),
        }
    }

    if !result.external.is_empty() {
        report.push_str("\n## External\n");
        for url in &result.external {
            report.push_str(&format!("  {}\n", url));
        }
    }

    if !result.failures.is_empty() {
        report.push_str("\n## Failed fetches\n");
        for failure in &result.failures {
            report.push_str(&format!("  {} ({})\n", failure.url, failure.reason));
        }
    }

    if let Some(probes) = probes {
        let summary = ProbeSummary::from_results(probes);
        report.push_str(&format!(
            "\n# Probe: {} reachable, {} HTTP errors, {} network errors\n",
            summary.ok, summary.http_errors, summary.network_errors
        ));
    }

    report
}

pub fn save_report(content: &str, path: &Path) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

fn metadata() -> serde_json::Value {
    serde_json::json!({
        "generator": "urlscout",
        "version": env!("CARGO_PKG_VERSION"),
        "generated_at": chrono::Utc::now().to_rfc3339(),
    })
}
