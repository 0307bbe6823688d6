// Reporting and output for bac-hunter
// JSON findings record (the persisted format), CSV/Markdown exports, console progress

use crate::error::ReportError;
use crate::models::{Finding, ScanReport};
use crate::scanner::{EndpointReport, ScanObserver};
use chrono::Local;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> ReportError + '_ {
    move |source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Write the findings record as pretty-printed JSON, creating parent directories.
pub fn save_findings(path: impl AsRef<Path>, report: &ScanReport) -> Result<(), ReportError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error(parent))?;
    }
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json).map_err(io_error(path))?;
    info!(path = %path.display(), findings = report.total_findings, "saved findings");
    Ok(())
}

/// Read a findings record back, e.g. for diffing two runs.
pub fn load_findings(path: impl AsRef<Path>) -> Result<ScanReport, ReportError> {
    let path = path.as_ref();
    let data = fs::read_to_string(path).map_err(io_error(path))?;
    Ok(serde_json::from_str(&data)?)
}

/// Escape CSV field to prevent formula injection attacks
/// Cells starting with =, +, -, @, or tab are prefixed with single quote
fn escape_csv_field(field: &str) -> String {
    let Some(first_char) = field.chars().next() else {
        return String::new();
    };
    let needs_escaping = matches!(first_char, '=' | '+' | '-' | '@' | '\t');

    if needs_escaping {
        format!("\"'{}\"", field.replace('"', "\"\""))
    } else if field.contains(',') || field.contains('"') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn timestamped_path(dir: &Path, extension: &str) -> PathBuf {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    dir.join(format!("bac_hunter_report_{}.{}", timestamp, extension))
}

pub fn export_csv(dir: impl AsRef<Path>, findings: &[Finding]) -> Result<PathBuf, ReportError> {
    let path = timestamped_path(dir.as_ref(), "csv");
    let mut file = File::create(&path).map_err(io_error(&path))?;

    let mut out = String::from("Type,Endpoint,Status,Length,Users,Description\n");
    for finding in findings {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            finding.kind,
            escape_csv_field(&finding.endpoint),
            finding.status_code,
            finding.content_length,
            escape_csv_field(&finding.affected_identities.join(";")),
            escape_csv_field(&finding.description)
        ));
    }
    file.write_all(out.as_bytes()).map_err(io_error(&path))?;

    Ok(path)
}

pub fn export_markdown(dir: impl AsRef<Path>, findings: &[Finding]) -> Result<PathBuf, ReportError> {
    let path = timestamped_path(dir.as_ref(), "md");
    let mut out = String::from("# IDOR-BAC Hunter Report\n\n");
    if findings.is_empty() {
        out.push_str("No potential vulnerabilities found.\n");
    }
    for finding in findings {
        out.push_str(&format!(
            "- **{}** {} (status {}, {} bytes): {}\n",
            finding.kind,
            finding.endpoint,
            finding.status_code,
            finding.content_length,
            finding.affected_identities.join(", ")
        ));
    }
    fs::write(&path, out).map_err(io_error(&path))?;

    Ok(path)
}

/// Prints scan progress to stdout and tallies endpoints nobody could reach.
#[derive(Debug, Default)]
pub struct ConsoleReporter {
    verbose: bool,
    endpoints_scanned: usize,
    unreachable: Vec<String>,
}

impl ConsoleReporter {
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            ..Self::default()
        }
    }

    pub fn endpoints_scanned(&self) -> usize {
        self.endpoints_scanned
    }

    /// Endpoints where every identity's request failed. These produce no
    /// findings and would otherwise look identical to clean endpoints.
    pub fn unreachable_endpoints(&self) -> &[String] {
        &self.unreachable
    }
}

impl ScanObserver for ConsoleReporter {
    fn on_scan_start(&mut self, endpoint_count: usize, identity_count: usize) {
        self.endpoints_scanned = 0;
        self.unreachable.clear();
        if self.verbose {
            println!("Loaded {} URLs to test", endpoint_count);
            println!("Using {} user sessions", identity_count);
        }
        println!("\nStarting IDOR vulnerability scan...");
    }

    fn on_endpoint(&mut self, report: &EndpointReport<'_>) {
        self.endpoints_scanned += 1;
        if report.unreachable() {
            self.unreachable.push(report.endpoint.to_string());
        }
        if !self.verbose {
            return;
        }

        println!("\nTesting: {}", report.endpoint);
        if report.unreachable() {
            println!("All requests failed");
        }
        if !report.findings.is_empty() {
            println!("Potential IDOR found!");
        }
        for finding in report.findings {
            println!("- Status: {}", finding.status_code);
            println!("- Users: {}", finding.affected_identities.join(", "));
            println!("- Content Length: {}", finding.content_length);
        }
    }

    fn on_scan_complete(&mut self, findings: &[Finding]) {
        println!(
            "\nScan complete! Found {} potential vulnerabilities",
            findings.len()
        );
        if !self.unreachable.is_empty() {
            println!(
                "{} of {} endpoints were unreachable for every user",
                self.unreachable.len(),
                self.endpoints_scanned
            );
        }
    }
}
