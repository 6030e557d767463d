use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;
use urlscout::command_argument_builder;
use urlscout::handlers::*;
use urlscout_core::ReportFormat;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn matches_for(args: &[&str]) -> clap::ArgMatches {
    let mut argv = vec!["urlscout"];
    argv.extend_from_slice(args);
    let matches = command_argument_builder()
        .try_get_matches_from(argv)
        .unwrap();
    let (_, sub) = matches.subcommand().unwrap();
    sub.clone()
}

async fn two_page_site() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_bytes(r#"<a href="/docs">Docs</a>"#.as_bytes().to_vec()),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/docs"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_bytes(b"<p>docs</p>".to_vec()),
        )
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    server
}

// ============================================================================
// Argument mapping
// ============================================================================

#[test]
fn test_crawl_options_from_args() {
    let args = matches_for(&[
        "crawl",
        "-u",
        " https://example.com ",
        "-d",
        "3",
        "-m",
        "50",
        "-t",
        "8",
        "--crawl-timeout",
        "30",
        "--relative-links",
        "--timeout-ms",
        "1500",
    ]);
    let options = crawl_options_from(&args, true).unwrap();

    assert_eq!(options.seed, "https://example.com");
    assert_eq!(options.max_depth, 3);
    assert_eq!(options.max_urls, 50);
    assert_eq!(options.workers, 8);
    assert_eq!(options.crawl_timeout, Some(Duration::from_secs(30)));
    assert_eq!(options.fetch.timeout, Duration::from_millis(1500));
    assert!(options.relative_links);
    assert!(!options.record_external);
    assert!(!options.show_progress_bars);
}

#[test]
fn test_probe_config_from_args() {
    let args = matches_for(&["check", "-u", "a.example", "--proxy", "https://proxy.local/?u="]);
    let config = probe_config_from(&args);

    assert_eq!(config.proxy_prefix.as_deref(), Some("https://proxy.local/?u="));
    assert_eq!(config.timeout, Duration::from_millis(8000));
}

#[test]
fn test_report_format_is_case_insensitive() {
    let args = matches_for(&["check", "-u", "a.example", "-f", "JSON"]);
    assert_eq!(report_format_from(&args).unwrap(), ReportFormat::Json);
}

#[test]
fn test_expand_path_tilde() {
    let expanded = expand_path("~/inventory.csv");
    assert!(!expanded.to_string_lossy().starts_with('~'));
    assert_eq!(expand_path("/tmp/x.csv").to_string_lossy(), "/tmp/x.csv");
}

// ============================================================================
// Handlers end to end
// ============================================================================

#[tokio::test]
async fn test_handle_crawl_writes_csv_with_status() {
    let server = two_page_site().await;
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("url-inventory.csv");
    let output_str = output.to_string_lossy().to_string();
    let uri = server.uri();

    let args = matches_for(&["crawl", "-u", &uri, "--probe", "-f", "csv", "-o", &output_str]);
    handle_crawl(&args, true).await.unwrap();

    let csv = std::fs::read_to_string(&output).unwrap();
    assert_eq!(
        csv,
        format!("URL,Status\n{}/,200\n{}/docs,200\n", uri, uri)
    );
}

#[tokio::test]
async fn test_handle_crawl_invalid_seed_fails() {
    let args = matches_for(&["crawl", "-u", "example.com"]);
    assert!(handle_crawl(&args, true).await.is_err());
}

#[tokio::test]
async fn test_handle_check_reads_hosts_file() {
    let server = two_page_site().await;
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("report.json");
    let output_str = output.to_string_lossy().to_string();

    let mut hosts = NamedTempFile::new().unwrap();
    writeln!(hosts, "URL,Status").unwrap();
    writeln!(hosts, "{}/,", server.uri()).unwrap();
    writeln!(hosts, "{}/docs", server.uri()).unwrap();
    let hosts_str = hosts.path().to_string_lossy().to_string();

    let args = matches_for(&["check", "-H", &hosts_str, "-f", "json", "-o", &output_str]);
    handle_check(&args, true).await.unwrap();

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(report["summary"]["total"], 2);
    assert_eq!(report["summary"]["ok"], 2);
}

#[tokio::test]
async fn test_handle_check_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.txt");
    let missing_str = missing.to_string_lossy().to_string();

    let args = matches_for(&["check", "-H", &missing_str]);
    assert!(handle_check(&args, true).await.is_err());
}

#[test]
fn test_emit_report_to_unwritable_path_fails() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("no-such-dir").join("out.txt");
    let target = target.to_string_lossy().to_string();

    assert!(emit_report("x", Some(&target)).is_err());
}
