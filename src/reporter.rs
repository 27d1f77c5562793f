// reporter.rs - Result Reporter
// Purpose: Turn per-target outcomes into stdout lines. Each report block is
//          rendered first and written under one lock so blocks never interleave.

use crate::parallel_executor::{ScanOutcome, ScanSummary};
use colored::*;
use std::fmt::Write as _;
use std::io::{self, Write};
use std::sync::Mutex;

pub struct Reporter<W: Write + Send> {
    out: Mutex<W>,
    verbose: bool,
    color: bool,
}

impl Reporter<io::Stdout> {
    pub fn stdout(verbose: bool, color: bool) -> Self {
        Self::new(io::stdout(), verbose, color)
    }
}

impl<W: Write + Send> Reporter<W> {
    pub fn new(out: W, verbose: bool, color: bool) -> Self {
        Self {
            out: Mutex::new(out),
            verbose,
            color,
        }
    }

    /// Text for one target, or `None` when quiet mode has nothing to say
    pub fn render(&self, target: &str, outcome: &ScanOutcome) -> Option<String> {
        match outcome {
            ScanOutcome::Detected(matches) => {
                let header = format!("Detected patterns in {}:", target);
                let mut block = if self.color {
                    header.red().bold().to_string()
                } else {
                    header
                };
                block.push('\n');
                for pattern in matches.iter() {
                    let _ = writeln!(block, "- {}", pattern);
                }
                Some(block)
            }
            ScanOutcome::Clean if self.verbose => {
                Some(format!("No patterns detected in {}.\n", target))
            }
            ScanOutcome::FetchFailed(e) if self.verbose => {
                Some(self.paint_error(format!("Error fetching URL {}: {}", target, e)))
            }
            ScanOutcome::ReadFailed(e) if self.verbose => {
                Some(self.paint_error(format!("Error reading response from URL {}: {}", target, e)))
            }
            _ => None,
        }
    }

    pub fn report(&self, target: &str, outcome: &ScanOutcome) {
        if let Some(block) = self.render(target, outcome) {
            self.write_block(&block);
        }
    }

    pub fn stdin_error(&self, error: &io::Error) {
        if self.verbose {
            let block = self.paint_error(format!("Error reading stdin: {}", error));
            self.write_block(&block);
        }
    }

    /// Closing line for verbose runs, written to stderr to keep stdout clean
    pub fn summary(&self, summary: &ScanSummary) {
        if !self.verbose {
            return;
        }
        let line = format!(
            "[+] Scanned {} targets: {} with leaks, {} clean, {} fetch errors, {} read errors",
            summary.total(),
            summary.detected,
            summary.clean,
            summary.fetch_failed,
            summary.read_failed
        );
        eprintln!("{}", line.green());
    }

    fn paint_error(&self, line: String) -> String {
        let mut block = if self.color { line.yellow().to_string() } else { line };
        block.push('\n');
        block
    }

    fn write_block(&self, block: &str) {
        // A closed stdout (e.g. piped into `head`) must not stop the scan
        if let Ok(mut out) = self.out.lock() {
            let _ = out.write_all(block.as_bytes());
            let _ = out.flush();
        }
    }
}

#[cfg(test)]
impl Reporter<Vec<u8>> {
    pub fn snapshot(&self) -> Vec<u8> {
        self.out.lock().map(|out| out.clone()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::PatternSet;
    use crate::scanner::{LineScanner, ScanError};

    fn detected(body: &[u8]) -> ScanOutcome {
        let mut scanner = LineScanner::new(PatternSet::builtin());
        scanner.feed(body).unwrap();
        ScanOutcome::Detected(scanner.finish())
    }

    #[test]
    fn test_detected_block_format() {
        let reporter = Reporter::new(Vec::new(), false, false);
        let outcome = detected(b"[mysqld]\ndatadir=/var/lib/mysql\nsafe_mode = Off\n");

        let block = reporter.render("http://t.test/?f=my.cnf", &outcome).unwrap();
        assert_eq!(
            block,
            "Detected patterns in http://t.test/?f=my.cnf:\n- safe_mode\n- datadir=\n"
        );
    }

    #[test]
    fn test_quiet_mode_hides_noise() {
        let reporter = Reporter::new(Vec::new(), false, false);
        assert!(reporter.render("http://t.test/", &ScanOutcome::Clean).is_none());

        let read_error = ScanOutcome::ReadFailed(ScanError::LineTooLong { limit: 10 });
        assert!(reporter.render("http://t.test/", &read_error).is_none());

        reporter.stdin_error(&io::Error::new(io::ErrorKind::InvalidData, "bad input"));
        assert!(reporter.snapshot().is_empty());
    }

    #[test]
    fn test_verbose_messages() {
        let reporter = Reporter::new(Vec::new(), true, false);

        reporter.report("http://t.test/a", &ScanOutcome::Clean);
        reporter.report(
            "http://t.test/b",
            &ScanOutcome::ReadFailed(ScanError::LineTooLong { limit: 65536 }),
        );
        reporter.stdin_error(&io::Error::new(io::ErrorKind::InvalidData, "bad input"));

        let out = String::from_utf8(reporter.snapshot()).unwrap();
        assert_eq!(
            out,
            "No patterns detected in http://t.test/a.\n\
             Error reading response from URL http://t.test/b: line too long (limit 65536 bytes)\n\
             Error reading stdin: bad input\n"
        );
    }
}
