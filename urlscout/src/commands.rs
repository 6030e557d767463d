use crate::CLAP_STYLING;
use clap::{arg, command};
use std::net::SocketAddr;
use std::path::PathBuf;

const FORMATS: [&str; 3] = ["text", "json", "csv"];

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("urlscout")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("urlscout")
        .about("Build a URL inventory of a site and check which URLs are alive")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and progress output").global(true))
        .arg(
            arg!(-v --"verbose" ... "Increase log verbosity (-v info, -vv debug, -vvv trace)")
                .global(true),
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            command!("crawl")
                .about(
                    "Crawl a site breadth-first from a seed URL and list every same-origin URL \
                found.",
                )
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(true)
                        .help("The seed URL to crawl (absolute http or https URL)"),
                )
                .arg(
                    arg!(-d --"depth" <DEPTH>)
                        .required(false)
                        .help("Maximum hop distance from the seed to fetch")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("2"),
                )
                .arg(
                    arg!(-m --"max-urls" <COUNT>)
                        .required(false)
                        .help("Stop once this many distinct URLs are known")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("200"),
                )
                .arg(
                    arg!(-t --"threads" <NUM_WORKERS>)
                        .required(false)
                        .help("Concurrent page fetches within a depth level")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("4"),
                )
                .arg(timeout_arg())
                .arg(
                    arg!(--"crawl-timeout" <SECONDS>)
                        .required(false)
                        .help("Give up after this many seconds and report what was found")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    arg!(--"relative-links")
                        .required(false)
                        .help("Also follow page-relative links such as about.html or ../x")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"record-external")
                        .required(false)
                        .help("List cross-origin links in the report (they are never followed)")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"probe")
                        .required(false)
                        .help("Check the status of every discovered URL after crawling")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(proxy_arg())
                .arg(concurrency_arg())
                .arg(format_arg())
                .arg(output_arg()),
        )
        .subcommand(
            command!("check")
                .about("Check the HTTP status of a list of URLs.")
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(false)
                        .help("A URL to check (repeatable)")
                        .action(clap::ArgAction::Append),
                )
                .arg(
                    arg!(-H --"hosts-file" <PATH>)
                        .required(false)
                        .help("Newline-delimited file of URLs, or a CSV whose first column is URLs")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .group(
                    clap::ArgGroup::new("input")
                        .args(["url", "hosts-file"])
                        .required(true)
                        .multiple(true),
                )
                .arg(proxy_arg())
                .arg(concurrency_arg())
                .arg(timeout_arg())
                .arg(format_arg())
                .arg(output_arg()),
        )
        .subcommand(
            command!("serve")
                .about("Serve the crawl and probe operations over HTTP.")
                .arg(
                    arg!(-b --"bind" <ADDR>)
                        .required(false)
                        .help("Address to listen on")
                        .value_parser(clap::value_parser!(SocketAddr))
                        .default_value("127.0.0.1:8080"),
                )
                .arg(
                    arg!(--"max-depth" <DEPTH>)
                        .required(false)
                        .help("Largest crawl depth a client may request")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("5"),
                )
                .arg(
                    arg!(--"max-urls" <COUNT>)
                        .required(false)
                        .help("Largest URL cap a client may request")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("1000"),
                )
                .arg(
                    arg!(--"max-concurrency" <COUNT>)
                        .required(false)
                        .help("Largest probe concurrency a client may request")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("50"),
                )
                .arg(timeout_arg()),
        )
}

fn timeout_arg() -> clap::Arg {
    arg!(--"timeout-ms" <MILLIS>)
        .required(false)
        .help("Per-request timeout in milliseconds")
        .value_parser(clap::value_parser!(u64))
        .default_value("8000")
}

fn proxy_arg() -> clap::Arg {
    arg!(--"proxy" <PREFIX>)
        .required(false)
        .help("Prefix prepended to every URL before it is checked")
}

fn concurrency_arg() -> clap::Arg {
    arg!(-c --"concurrency" <COUNT>)
        .required(false)
        .help("Maximum status checks in flight")
        .value_parser(clap::value_parser!(usize))
        .default_value("10")
}

fn format_arg() -> clap::Arg {
    arg!(-f --"format" <FORMAT>)
        .required(false)
        .help("Report format: text, json, csv")
        .value_parser(FORMATS)
        .ignore_case(true)
        .default_value("text")
}

fn output_arg() -> clap::Arg {
    arg!(-o --"output" <PATH>)
        .required(false)
        .help("Save report to file (default: display to screen)")
}
