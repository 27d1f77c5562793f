// main.rs - lfiscan - File Inclusion Leak Confirmation Tool
// Purpose: Fetch candidate LFI/RFI URLs concurrently and report which known
//          leak signatures (passwd entries, config keys, source code) come back
// License: MIT

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use std::io::IsTerminal;
use std::sync::Arc;
use std::time::Duration;

mod config;
mod fetcher;
mod input;
mod parallel_executor;
mod patterns;
mod reporter;
mod scanner;

use config::{ScanConfig, parse_duration};
use parallel_executor::ParallelScanExecutor;
use patterns::PatternSet;
use reporter::Reporter;

/// lfiscan - confirm file inclusion and config exposure from HTTP responses
#[derive(Parser, Debug)]
#[command(
    name = "lfiscan",
    version,
    about = "Scan HTTP responses for file inclusion and misconfiguration leak signatures",
    long_about = r#"
lfiscan fetches each target URL and scans the response body line by line for
markers of leaked files: /etc/passwd entries, /proc/self/environ, web server
logs, php.ini / httpd.conf / nginx.conf / sshd_config keys, Windows SAM and
registry strings, and PHP/JSP/ASP source code.

Every response body is scanned whatever its status code, since error pages
can leak as much as a 200.

EXAMPLES:

  Single URL:
    lfiscan "http://target.test/index.php?page=../../../../etc/passwd"

  URL list from a file, 30 workers, 10 second timeout:
    cat payload_urls.txt | lfiscan --workers 30 --timeout 10s

  Show errors and clean results too:
    cat payload_urls.txt | lfiscan --verbose
"#
)]
struct Args {
    /// URL to scan; when omitted, URLs are read one per line from stdin
    #[arg(value_name = "URL")]
    url: Option<String>,

    /// Print fetch/read errors and targets with no detections
    #[arg(short, long)]
    verbose: bool,

    /// Per-request timeout (e.g. 5s, 750ms, 1m30s; bare numbers are seconds)
    #[arg(short, long, default_value = "5s", value_name = "DURATION", value_parser = parse_duration)]
    timeout: Duration,

    /// Number of concurrent workers
    #[arg(short, long, default_value_t = config::DEFAULT_WORKERS, value_name = "N")]
    workers: usize,

    /// Accept invalid TLS certificates
    #[arg(short = 'k', long)]
    insecure: bool,

    /// User-Agent header sent with every request
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Print the built-in leak signatures and exit
    #[arg(long)]
    list_patterns: bool,
}

impl Args {
    fn scan_config(&self) -> ScanConfig {
        ScanConfig {
            timeout: self.timeout,
            workers: self.workers,
            verbose: self.verbose,
            insecure: self.insecure,
            user_agent: self
                .user_agent
                .clone()
                .unwrap_or_else(config::default_user_agent),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let color = !args.no_color && std::io::stdout().is_terminal();
    if !color {
        colored::control::set_override(false);
    }

    if args.list_patterns {
        print_patterns(PatternSet::builtin());
        return Ok(());
    }

    let config = Arc::new(args.scan_config());
    let reporter = Arc::new(Reporter::stdout(config.verbose, color));

    let collected = input::collect_targets(args.url).await;
    if let Some(ref e) = collected.error {
        reporter.stdin_error(e);
    }

    let client = fetcher::build_client(&config).context("failed to build HTTP client")?;
    let patterns = PatternSet::builtin();

    if config.verbose {
        eprintln!(
            "{}",
            format!(
                "[*] Scanning {} targets with {} workers ({} signatures, timeout {:?})",
                collected.targets.len(),
                config.effective_workers(collected.targets.len()),
                patterns.len(),
                config.timeout
            )
            .cyan()
        );
    }

    let executor = ParallelScanExecutor::new(Arc::clone(&config), client, patterns, Arc::clone(&reporter));
    let summary = executor.execute(collected.targets).await;
    reporter.summary(&summary);

    Ok(())
}

fn print_patterns(patterns: PatternSet) {
    for pattern in patterns.iter() {
        println!("{}\t{}", pattern.needle.bold(), pattern.description);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["lfiscan"]).unwrap();
        assert!(args.url.is_none());
        assert!(!args.verbose);
        assert_eq!(args.timeout, Duration::from_secs(5));
        assert_eq!(args.workers, 10);

        let config = args.scan_config();
        assert!(config.user_agent.starts_with("lfiscan/"));
        assert!(!config.insecure);
    }

    #[test]
    fn test_flags() {
        let args = Args::try_parse_from([
            "lfiscan",
            "--verbose",
            "--timeout",
            "1m30s",
            "--workers",
            "25",
            "-k",
            "--user-agent",
            "scanner/1.0",
            "http://t.test/?page=/etc/passwd",
        ])
        .unwrap();

        assert_eq!(args.url.as_deref(), Some("http://t.test/?page=/etc/passwd"));
        let config = args.scan_config();
        assert!(config.verbose);
        assert!(config.insecure);
        assert_eq!(config.timeout, Duration::from_secs(90));
        assert_eq!(config.workers, 25);
        assert_eq!(config.user_agent, "scanner/1.0");
    }

    #[test]
    fn test_rejects_bad_timeout() {
        assert!(Args::try_parse_from(["lfiscan", "--timeout", "soon"]).is_err());
        assert!(Args::try_parse_from(["lfiscan", "--timeout", "0s"]).is_err());
    }
}
