// scanner.rs - Streaming Response Scanner
// Purpose: Split a response body into lines as chunks arrive and record
//          which leak patterns appear, without buffering the whole body

use crate::patterns::PatternSet;
use reqwest::Response;
use std::collections::BTreeMap;
use thiserror::Error;

/// Longest line the scanner will buffer before giving up on a body
pub const MAX_LINE_LEN: usize = 64 * 1024;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("{0}")]
    Read(#[from] reqwest::Error),

    #[error("line too long (limit {limit} bytes)")]
    LineTooLong { limit: usize },
}

/// Patterns found in one response, deduplicated and kept in pattern table order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchSet {
    found: BTreeMap<usize, &'static str>,
}

impl MatchSet {
    /// Returns false when the pattern was already recorded
    pub fn insert(&mut self, position: usize, needle: &'static str) -> bool {
        self.found.insert(position, needle).is_none()
    }

    #[cfg(test)]
    pub fn contains(&self, needle: &str) -> bool {
        self.found.values().any(|found| *found == needle)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.found.len()
    }

    pub fn is_empty(&self) -> bool {
        self.found.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.found.values().copied()
    }
}

/// Incremental line scanner fed with arbitrary body chunks.
///
/// Lines end at `\n`; a trailing `\r` is dropped. Whatever is left in the
/// buffer when [`LineScanner::finish`] runs is scanned as the last line.
pub struct LineScanner {
    patterns: PatternSet,
    pending: Vec<u8>,
    matches: MatchSet,
}

impl LineScanner {
    pub fn new(patterns: PatternSet) -> Self {
        Self {
            patterns,
            pending: Vec::new(),
            matches: MatchSet::default(),
        }
    }

    pub fn feed(&mut self, chunk: &[u8]) -> Result<(), ScanError> {
        let mut rest = chunk;

        while let Some(newline) = rest.iter().position(|&b| b == b'\n') {
            let (head, tail) = rest.split_at(newline);
            rest = &tail[1..];

            if self.pending.is_empty() {
                check_line_len(head.len())?;
                record_line(self.patterns, &mut self.matches, head);
            } else {
                check_line_len(self.pending.len() + head.len())?;
                self.pending.extend_from_slice(head);
                record_line(self.patterns, &mut self.matches, &self.pending);
                self.pending.clear();
            }
        }

        check_line_len(self.pending.len() + rest.len())?;
        self.pending.extend_from_slice(rest);
        Ok(())
    }

    pub fn finish(mut self) -> MatchSet {
        if !self.pending.is_empty() {
            record_line(self.patterns, &mut self.matches, &self.pending);
        }
        self.matches
    }
}

fn check_line_len(len: usize) -> Result<(), ScanError> {
    if len > MAX_LINE_LEN {
        return Err(ScanError::LineTooLong { limit: MAX_LINE_LEN });
    }
    Ok(())
}

fn record_line(patterns: PatternSet, matches: &mut MatchSet, line: &[u8]) {
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    for (position, pattern) in patterns.matches(line) {
        matches.insert(position, pattern.needle);
    }
}

/// Drain a response body chunk by chunk through a [`LineScanner`].
///
/// The response is consumed and dropped on every path, which releases the
/// connection. Any read error discards what was matched so far.
pub async fn scan_response(mut response: Response, patterns: PatternSet) -> Result<MatchSet, ScanError> {
    let mut scanner = LineScanner::new(patterns);
    while let Some(chunk) = response.chunk().await? {
        scanner.feed(&chunk)?;
    }
    Ok(scanner.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(chunks: &[&[u8]]) -> Result<MatchSet, ScanError> {
        let mut scanner = LineScanner::new(PatternSet::builtin());
        for chunk in chunks {
            scanner.feed(chunk)?;
        }
        Ok(scanner.finish())
    }

    #[test]
    fn test_empty_body_gives_empty_set() {
        let matches = scan(&[]).unwrap();
        assert!(matches.is_empty());

        let matches = scan(&[b""]).unwrap();
        assert!(matches.is_empty());
    }

    #[test]
    fn test_plain_html_has_no_matches() {
        let matches = scan(&[b"<html><body>hello</body></html>"]).unwrap();
        assert!(matches.is_empty());
    }

    #[test]
    fn test_repeated_pattern_reported_once() {
        let body = b"root:x:0:0:root:/root:/bin/bash\n\
                     daemon:x:1:1:daemon:/usr/sbin:/usr/sbin/nologin\n\
                     root:x:0:0:root:/root:/bin/bash\n";
        let matches = scan(&[body]).unwrap();

        assert!(matches.contains("root:"));
        assert!(matches.contains("root:x"));
        assert_eq!(matches.iter().filter(|p| *p == "root:").count(), 1);
        assert_eq!(matches.len(), 2);
    }

    #[test]
    fn test_pattern_split_across_chunks() {
        let matches = scan(&[b"first line\nDocument", b"Root /var/www\n"]).unwrap();
        assert_eq!(matches.iter().collect::<Vec<_>>(), vec!["DocumentRoot"]);
    }

    #[test]
    fn test_pattern_does_not_span_lines() {
        let matches = scan(&[b"Document\nRoot\n"]).unwrap();
        assert!(matches.is_empty());
    }

    #[test]
    fn test_last_line_without_newline_is_scanned() {
        let matches = scan(&[b"nothing here\r\n", b"worker_processes auto;"]).unwrap();
        assert!(matches.contains("worker_processes"));
    }

    #[test]
    fn test_case_sensitive() {
        let matches = scan(&[b"LOCALHOST\n"]).unwrap();
        assert!(!matches.contains("localhost"));
    }

    #[test]
    fn test_overlong_line_is_an_error() {
        let long = vec![b'a'; MAX_LINE_LEN + 1];
        let err = scan(&[b"root:x\n", &long]).unwrap_err();
        assert!(matches!(err, ScanError::LineTooLong { .. }));
    }

    #[test]
    fn test_line_at_limit_is_accepted() {
        let mut line = vec![b'a'; MAX_LINE_LEN - 5];
        line.extend_from_slice(b"Guest");
        let matches = scan(&[&line[..10], &line[10..], b"\n"]).unwrap();
        assert!(matches.contains("Guest"));
    }

    #[test]
    fn test_insert_is_idempotent() {
        let mut set = MatchSet::default();
        assert!(set.insert(3, "HTTP_USER_AGENT"));
        assert!(!set.insert(3, "HTTP_USER_AGENT"));
        assert_eq!(set.len(), 1);
    }
}
