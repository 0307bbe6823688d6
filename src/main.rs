// Main CLI entry point for bac-hunter
// Uses clap for argument parsing, tracing-subscriber for console + scan.log output

use anyhow::{Context, Result};
use bac_hunter::classifier::{EquivalenceClassifier, SuccessPolicy};
use bac_hunter::endpoints::{EndpointSource, SitemapFile};
use bac_hunter::models::ScanReport;
use bac_hunter::probe::ProbeOrchestrator;
use bac_hunter::reporting::{export_csv, export_markdown, save_findings, ConsoleReporter};
use bac_hunter::scanner::Scanner;
use bac_hunter::session::{SessionManager, SessionStore};
use bac_hunter::transport::{HttpTransport, DEFAULT_TIMEOUT_SECS};
use clap::builder::RangedU64ValueParser;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Debug, Clone)]
struct ScanConfig {
    sitemap: PathBuf,
    config: PathBuf,
    output: PathBuf,
    verbose: bool,
    timeout: Duration,
    concurrency: usize,
    success_statuses: Vec<u16>,
    csv_report: bool,
    markdown_report: bool,
}

impl ScanConfig {
    fn from_matches(matches: &ArgMatches) -> Self {
        let path = |id: &str| matches.get_one::<PathBuf>(id).cloned().unwrap_or_default();
        Self {
            sitemap: path("sitemap"),
            config: path("config"),
            output: path("output"),
            verbose: matches.get_flag("verbose"),
            timeout: Duration::from_secs(
                matches
                    .get_one::<u64>("timeout")
                    .copied()
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
            concurrency: matches.get_one::<usize>("concurrency").copied().unwrap_or(1),
            success_statuses: matches
                .get_many::<u16>("success_status")
                .map(|codes| codes.copied().collect())
                .unwrap_or_default(),
            csv_report: matches.get_flag("csv_report"),
            markdown_report: matches.get_flag("markdown_report"),
        }
    }

    fn output_dir(&self) -> &Path {
        self.output
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
    }
}

fn cli() -> Command {
    Command::new("bac-hunter")
        .version(clap::crate_version!())
        .about("IDOR-BAC Hunter - Detect IDOR and BAC vulnerabilities")
        .after_help("EXAMPLES:\n  bac-hunter -s input/sitemap.txt -c config/sessions.json\n  bac-hunter -s urls.txt -c sessions.json -o out/findings.json -v --success-status 200 --success-status 204")
        .arg(Arg::new("sitemap")
            .short('s')
            .long("sitemap")
            .required(true)
            .value_parser(value_parser!(PathBuf))
            .help("Path to Burp Suite sitemap export file"))
        .arg(Arg::new("config")
            .short('c')
            .long("config")
            .required(true)
            .value_parser(value_parser!(PathBuf))
            .help("Path to sessions configuration file"))
        .arg(Arg::new("output")
            .short('o')
            .long("output")
            .default_value("output/findings.json")
            .value_parser(value_parser!(PathBuf))
            .help("Output file for findings"))
        .arg(Arg::new("verbose")
            .short('v')
            .long("verbose")
            .action(ArgAction::SetTrue)
            .help("Enable verbose output"))
        .arg(Arg::new("timeout")
            .long("timeout")
            .default_value("10")
            .value_parser(value_parser!(u64).range(1..))
            .help("Per-request timeout in seconds"))
        .arg(Arg::new("concurrency")
            .long("concurrency")
            .default_value("1")
            .value_parser(RangedU64ValueParser::<usize>::new().range(1..))
            .help("Identity requests in flight per endpoint"))
        .arg(Arg::new("success_status")
            .long("success-status")
            .action(ArgAction::Append)
            .value_parser(value_parser!(u16))
            .help("Status code treated as successful access (repeatable, default 200)"))
        .arg(Arg::new("csv_report")
            .long("csv-report")
            .action(ArgAction::SetTrue)
            .help("Also write a CSV report next to the output file"))
        .arg(Arg::new("markdown_report")
            .long("markdown-report")
            .action(ArgAction::SetTrue)
            .help("Also write a Markdown report next to the output file"))
}

/// Default (console, scan.log) levels when RUST_LOG is unset.
fn default_levels(verbose: bool) -> (&'static str, &'static str) {
    if verbose {
        ("debug", "debug")
    } else {
        ("info", "info")
    }
}

/// scan.log accumulates across runs.
fn open_log_file(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

fn init_logging(config: &ScanConfig) {
    let (console_level, file_level) = default_levels(config.verbose);
    let filter = |default: &str| {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("bac_hunter={}", default)))
    };

    let console = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(filter(console_level));

    let log_path = config.output_dir().join("scan.log");
    let file_layer = open_log_file(&log_path).ok().map(|file| {
        tracing_subscriber::fmt::layer()
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .with_filter(filter(file_level))
    });

    tracing_subscriber::registry()
        .with(console)
        .with(file_layer)
        .init();

    if !log_path.exists() {
        warn!(path = %log_path.display(), "could not create log file");
    }
}

async fn run(config: ScanConfig) -> Result<()> {
    if config.verbose {
        println!("Initializing IDOR-BAC Hunter...");
    }

    let sessions = SessionManager::load(&config.config)
        .with_context(|| format!("loading sessions from {}", config.config.display()))?;
    for identity in sessions.identities() {
        if let Some(subject) = identity.token_subject() {
            debug!(user = identity.identity_id(), subject = %subject, "token identity");
        }
    }

    let endpoints = SitemapFile::new(&config.sitemap)
        .load()
        .with_context(|| format!("loading endpoints from {}", config.sitemap.display()))?;
    info!(urls = endpoints.len(), users = sessions.len(), "inputs loaded");

    let transport = HttpTransport::with_timeout(config.timeout)?;
    let orchestrator = ProbeOrchestrator::new(transport).with_concurrency(config.concurrency);
    let classifier =
        EquivalenceClassifier::new(SuccessPolicy::new(config.success_statuses.iter().copied()));
    let scanner = Scanner::new(orchestrator, classifier, &sessions);

    let mut reporter = ConsoleReporter::new(config.verbose);
    let findings = scanner.scan_with_observer(&endpoints, &mut reporter).await;

    let report = ScanReport::new(findings);
    save_findings(&config.output, &report)?;
    println!("Results saved to: {}", config.output.display());

    if config.csv_report {
        let path = export_csv(config.output_dir(), &report.findings)?;
        println!("CSV report: {}", path.display());
    }
    if config.markdown_report {
        let path = export_markdown(config.output_dir(), &report.findings)?;
        println!("Markdown report: {}", path.display());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = ScanConfig::from_matches(&cli().get_matches());

    if let Err(e) = std::fs::create_dir_all(config.output_dir()) {
        eprintln!(
            "Error: cannot create output directory {}: {}",
            config.output_dir().display(),
            e
        );
        return ExitCode::FAILURE;
    }
    init_logging(&config);

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
