// parallel_executor.rs - Fetch-and-Scan Worker Pool
// Purpose: Drain one producer-closed queue of targets with a fixed number of
//          workers, each fetching a URL, scanning its body and reporting

use crate::config::ScanConfig;
use crate::fetcher::{self, FetchError};
use crate::patterns::PatternSet;
use crate::reporter::Reporter;
use crate::scanner::{self, MatchSet, ScanError};
use colored::*;
use reqwest::Client;
use std::io::Write;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

// ═══════════════════════════════════════════════════════════════════════════
// OUTCOMES
// ═══════════════════════════════════════════════════════════════════════════

/// What happened to one target
#[derive(Debug)]
pub enum ScanOutcome {
    Detected(MatchSet),
    Clean,
    FetchFailed(FetchError),
    ReadFailed(ScanError),
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScanSummary {
    pub detected: usize,
    pub clean: usize,
    pub fetch_failed: usize,
    pub read_failed: usize,
}

impl ScanSummary {
    pub fn record(&mut self, outcome: &ScanOutcome) {
        match outcome {
            ScanOutcome::Detected(_) => self.detected += 1,
            ScanOutcome::Clean => self.clean += 1,
            ScanOutcome::FetchFailed(_) => self.fetch_failed += 1,
            ScanOutcome::ReadFailed(_) => self.read_failed += 1,
        }
    }

    pub fn merge(&mut self, other: ScanSummary) {
        self.detected += other.detected;
        self.clean += other.clean;
        self.fetch_failed += other.fetch_failed;
        self.read_failed += other.read_failed;
    }

    pub fn total(&self) -> usize {
        self.detected + self.clean + self.fetch_failed + self.read_failed
    }
}

/// Fetch one target and scan the whole body.
pub async fn process_target(client: &Client, patterns: PatternSet, target: &str) -> ScanOutcome {
    let response = match fetcher::fetch(client, target).await {
        Ok(response) => response,
        Err(e) => return ScanOutcome::FetchFailed(e),
    };

    match scanner::scan_response(response, patterns).await {
        Ok(matches) if matches.is_empty() => ScanOutcome::Clean,
        Ok(matches) => ScanOutcome::Detected(matches),
        Err(e) => ScanOutcome::ReadFailed(e),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// PARALLEL EXECUTOR
// ═══════════════════════════════════════════════════════════════════════════

type TargetQueue = Arc<Mutex<mpsc::Receiver<String>>>;

pub struct ParallelScanExecutor<W: Write + Send + 'static> {
    config: Arc<ScanConfig>,
    client: Client,
    patterns: PatternSet,
    reporter: Arc<Reporter<W>>,
}

impl<W: Write + Send + 'static> ParallelScanExecutor<W> {
    pub fn new(
        config: Arc<ScanConfig>,
        client: Client,
        patterns: PatternSet,
        reporter: Arc<Reporter<W>>,
    ) -> Self {
        Self {
            config,
            client,
            patterns,
            reporter,
        }
    }

    /// Process every target exactly once and wait for all workers to exit.
    pub async fn execute(&self, targets: Vec<String>) -> ScanSummary {
        if targets.is_empty() {
            return ScanSummary::default();
        }

        let worker_count = self.config.effective_workers(targets.len());
        let (tx, rx) = mpsc::channel::<String>(targets.len());
        let queue: TargetQueue = Arc::new(Mutex::new(rx));

        let mut handles = Vec::with_capacity(worker_count);
        for _ in 0..worker_count {
            handles.push(tokio::spawn(run_worker(
                Arc::clone(&queue),
                self.client.clone(),
                self.patterns,
                Arc::clone(&self.reporter),
            )));
        }

        // Capacity matches the target count, so no send ever waits
        for target in targets {
            if tx.send(target).await.is_err() {
                break;
            }
        }
        drop(tx);

        let mut summary = ScanSummary::default();
        for result in futures::future::join_all(handles).await {
            match result {
                Ok(worker_summary) => summary.merge(worker_summary),
                Err(e) => eprintln!("{}", format!("[!] Worker stopped unexpectedly: {}", e).yellow()),
            }
        }
        summary
    }
}

async fn run_worker<W: Write + Send + 'static>(
    queue: TargetQueue,
    client: Client,
    patterns: PatternSet,
    reporter: Arc<Reporter<W>>,
) -> ScanSummary {
    let mut summary = ScanSummary::default();

    loop {
        let next = queue.lock().await.recv().await;
        let Some(target) = next else {
            break;
        };

        let outcome = process_target(&client, patterns, &target).await;
        summary.record(&outcome);
        // The sink is a blocking writer (stdout may be a slow pipe)
        tokio::task::block_in_place(|| reporter.report(&target, &outcome));
    }

    summary
}
