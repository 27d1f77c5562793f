// config.rs - Scan Configuration
// Purpose: Immutable run settings built once at startup and shared by workers

use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_WORKERS: usize = 10;

#[derive(Clone, Debug)]
pub struct ScanConfig {
    /// Per-request timeout, covering connect and body reads
    pub timeout: Duration,
    /// Number of concurrent workers (values below 1 behave as 1)
    pub workers: usize,
    /// Print fetch/read errors and "no patterns" notices
    pub verbose: bool,
    /// Accept invalid TLS certificates
    pub insecure: bool,
    pub user_agent: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            workers: DEFAULT_WORKERS,
            verbose: false,
            insecure: false,
            user_agent: default_user_agent(),
        }
    }
}

impl ScanConfig {
    pub fn effective_workers(&self, targets: usize) -> usize {
        self.workers.max(1).min(targets.max(1))
    }
}

pub fn default_user_agent() -> String {
    format!("lfiscan/{}", env!("CARGO_PKG_VERSION"))
}

/// Parse a timeout such as `5s`, `750ms`, `1m30s` or a bare number of seconds.
///
/// Units: `ns`, `us`/`µs`, `ms`, `s`, `m`, `h`. Fractions are allowed
/// (`1.5s`). The result must be greater than zero.
pub fn parse_duration(input: &str) -> Result<Duration, String> {
    let text = input.trim();
    if text.is_empty() {
        return Err("empty duration".to_string());
    }

    if let Ok(secs) = text.parse::<f64>() {
        let duration = Duration::try_from_secs_f64(secs)
            .map_err(|_| format!("invalid duration '{}'", input))?;
        return non_zero(duration, input);
    }

    let mut nanos = 0f64;
    let mut rest = text;
    while !rest.is_empty() {
        let number_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if number_end == 0 {
            return Err(format!("invalid duration '{}'", input));
        }
        let value: f64 = rest[..number_end]
            .parse()
            .map_err(|_| format!("invalid duration '{}'", input))?;
        rest = &rest[number_end..];

        let unit_end = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let scale = match &rest[..unit_end] {
            "ns" => 1.0,
            "us" | "µs" | "μs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60.0 * 1e9,
            "h" => 3600.0 * 1e9,
            "" => return Err(format!("missing unit in duration '{}'", input)),
            unit => return Err(format!("unknown unit '{}' in duration '{}'", unit, input)),
        };
        nanos += value * scale;
        rest = &rest[unit_end..];
    }

    if !nanos.is_finite() || nanos > u64::MAX as f64 {
        return Err(format!("duration '{}' out of range", input));
    }
    non_zero(Duration::from_nanos(nanos.round() as u64), input)
}

fn non_zero(duration: Duration, input: &str) -> Result<Duration, String> {
    if duration.is_zero() {
        return Err(format!("duration '{}' must be greater than zero", input));
    }
    Ok(duration)
}
