use anyhow::{Context, Result, anyhow};
use clap::ArgMatches;
use colored::Colorize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{Level, info};
use urlscout_core::api::ApiLimits;
use urlscout_core::crawl::{CrawlOptions, execute_crawl};
use urlscout_core::input::load_urls_from_source;
use urlscout_core::probe::{ProbeConfig, ProbeResult, execute_check};
use urlscout_core::report::{
    ProbeSummary, ReportFormat, generate_crawl_report, generate_probe_report, save_report,
};
use urlscout_scanner::FetchConfig;

use crate::server::{ServerConfig, run_server};

/// Install the stderr log subscriber. Warnings only unless `-v` is given.
pub fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    // A second init (e.g. from tests) is harmless.
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub fn print_banner() {
    eprintln!(
        "{} {}",
        "urlscout".bright_cyan().bold(),
        env!("CARGO_PKG_VERSION").bright_black()
    );
}

fn print_divider() {
    eprintln!("{}", "═".repeat(60).bright_blue().bold());
}

/// Expand a leading `~` in a user-supplied path.
pub fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

pub fn fetch_config_from(args: &ArgMatches) -> FetchConfig {
    let timeout_ms = *args.get_one::<u64>("timeout-ms").unwrap_or(&8000);
    FetchConfig::default().with_timeout(Duration::from_millis(timeout_ms))
}

pub fn probe_config_from(args: &ArgMatches) -> ProbeConfig {
    let timeout_ms = *args.get_one::<u64>("timeout-ms").unwrap_or(&8000);
    ProbeConfig::default()
        .with_timeout(Duration::from_millis(timeout_ms))
        .with_proxy_prefix(args.get_one::<String>("proxy").cloned())
}

pub fn crawl_options_from(args: &ArgMatches, quiet: bool) -> Result<CrawlOptions> {
    let seed = args
        .get_one::<String>("url")
        .ok_or_else(|| anyhow!("--url is required"))?;

    Ok(CrawlOptions {
        seed: seed.trim().to_string(),
        max_depth: *args.get_one::<usize>("depth").unwrap_or(&2),
        max_urls: *args.get_one::<usize>("max-urls").unwrap_or(&200),
        workers: *args.get_one::<usize>("threads").unwrap_or(&4),
        fetch: fetch_config_from(args),
        crawl_timeout: args
            .get_one::<u64>("crawl-timeout")
            .map(|secs| Duration::from_secs(*secs)),
        relative_links: args.get_flag("relative-links"),
        record_external: args.get_flag("record-external"),
        show_progress_bars: !quiet,
    })
}

pub fn report_format_from(args: &ArgMatches) -> Result<ReportFormat> {
    let raw = args
        .get_one::<String>("format")
        .map(String::as_str)
        .unwrap_or("text");
    Ok(raw.parse::<ReportFormat>()?)
}

/// Write the report to `output` if given, otherwise to stdout.
pub fn emit_report(content: &str, output: Option<&String>) -> Result<()> {
    match output {
        Some(raw) => {
            let path = expand_path(raw);
            save_report(content, &path)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            eprintln!("{} Report saved to {}", "✓".green(), path.display());
        }
        None => print!("{}", content),
    }
    Ok(())
}

fn print_probe_summary(results: &[ProbeResult]) {
    let summary = ProbeSummary::from_results(results);
    eprintln!(
        "{} checked, {} ok, {} HTTP errors, {} network errors",
        summary.total.to_string().bold(),
        summary.ok.to_string().green(),
        summary.http_errors.to_string().yellow(),
        summary.network_errors.to_string().red()
    );
}

pub async fn handle_crawl(args: &ArgMatches, quiet: bool) -> Result<()> {
    let options = crawl_options_from(args, quiet)?;
    let format = report_format_from(args)?;
    let probe = args.get_flag("probe");
    let concurrency = *args.get_one::<usize>("concurrency").unwrap_or(&10);

    if !quiet {
        print_divider();
        eprintln!("🕷️  Crawling {}", options.seed.bright_white().bold());
        eprintln!(
            "Max depth: {}  Max URLs: {}  Workers: {}",
            options.max_depth, options.max_urls, options.workers
        );
        print_divider();
    }

    let seed = options.seed.clone();
    let result = execute_crawl(options, None)
        .await
        .with_context(|| format!("Crawl of {} failed", seed))?;
    info!(
        "Crawl finished: {} URLs, stop reason {}",
        result.len(),
        result.stop_reason.as_str()
    );

    let probes = if probe {
        let results = execute_check(
            result.url_strings(),
            concurrency,
            &probe_config_from(args),
            !quiet,
        )
        .await?;
        if !quiet {
            print_probe_summary(&results);
        }
        Some(results)
    } else {
        None
    };

    if !quiet {
        eprintln!(
            "\n{} Crawl complete! {} URLs found\n",
            "✓".green(),
            result.len()
        );
    }

    let report = generate_crawl_report(&result, probes.as_deref(), format)?;
    emit_report(&report, args.get_one::<String>("output"))
}

pub async fn handle_check(args: &ArgMatches, quiet: bool) -> Result<()> {
    let manual: Vec<String> = args
        .get_many::<String>("url")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();
    let hosts_file = args
        .get_one::<PathBuf>("hosts-file")
        .map(|p| expand_path(&p.to_string_lossy()));
    let format = report_format_from(args)?;
    let concurrency = *args.get_one::<usize>("concurrency").unwrap_or(&10);

    let urls = load_urls_from_source(&manual, hosts_file.as_deref())
        .context("Failed to load URLs")?;

    if !quiet {
        print_divider();
        eprintln!(
            "Checking {} URL(s) with concurrency {}",
            urls.len().to_string().bright_white().bold(),
            concurrency
        );
        print_divider();
    }

    let results = execute_check(urls, concurrency, &probe_config_from(args), !quiet).await?;
    if !quiet {
        print_probe_summary(&results);
    }

    let report = generate_probe_report(&results, format)?;
    emit_report(&report, args.get_one::<String>("output"))
}

pub fn api_limits_from(args: &ArgMatches) -> ApiLimits {
    let defaults = ApiLimits::default();
    ApiLimits {
        max_depth: *args.get_one::<usize>("max-depth").unwrap_or(&defaults.max_depth),
        max_urls: *args.get_one::<usize>("max-urls").unwrap_or(&defaults.max_urls),
        max_concurrency: *args
            .get_one::<usize>("max-concurrency")
            .unwrap_or(&defaults.max_concurrency),
    }
}

pub async fn handle_serve(args: &ArgMatches, quiet: bool) -> Result<()> {
    let mut config = ServerConfig::default();
    if let Some(bind) = args.get_one::<std::net::SocketAddr>("bind") {
        config.bind = *bind;
    }
    config.fetch = fetch_config_from(args);
    config.probe = ProbeConfig::default().with_timeout(config.fetch.timeout);
    config.limits = api_limits_from(args);

    if !quiet {
        eprintln!(
            "{} Listening on {}",
            "→".bright_cyan(),
            format!("http://{}", config.bind).bright_white().bold()
        );
    }

    run_server(config).await
}
