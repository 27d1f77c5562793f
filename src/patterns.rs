// patterns.rs - Leak Signature Catalogue
// Purpose: Fixed set of literal markers that show up when a file inclusion
//          payload returns system files, server configs or source code

use aho_corasick::AhoCorasick;
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// A literal leak marker and the file it usually comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pattern {
    pub needle: &'static str,
    pub description: &'static str,
}

// ═══════════════════════════════════════════════════════════════════
// BUILT-IN SIGNATURES
// ═══════════════════════════════════════════════════════════════════

const LEAK_PATTERNS: &[Pattern] = &[
    // Linux
    Pattern { needle: "root:", description: "/etc/passwd" },
    Pattern { needle: "root:x", description: "/etc/group" },
    Pattern { needle: "localhost", description: "/etc/hosts or Windows hosts file" },
    Pattern { needle: "HTTP_USER_AGENT", description: "/proc/self/environ" },
    Pattern { needle: "Linux version", description: "/proc/version" },
    Pattern { needle: "Accepted password", description: "/var/log/auth.log" },
    Pattern { needle: "Failed password", description: "/var/log/auth.log" },
    Pattern { needle: "GET /", description: "web server access log" },
    Pattern { needle: "POST /", description: "web server access log" },

    // Windows
    Pattern { needle: "Administrator", description: "SAM file" },
    Pattern { needle: "Guest", description: "SAM file" },
    Pattern { needle: "HKEY_LOCAL_MACHINE", description: "registry file" },
    Pattern { needle: "default=", description: "boot.ini" },

    // Server configuration
    Pattern { needle: "disable_functions", description: "php.ini" },
    Pattern { needle: "safe_mode", description: "php.ini" },
    Pattern { needle: "datadir=", description: "my.cnf or my.ini" },
    Pattern { needle: "DocumentRoot", description: "httpd.conf" },
    Pattern { needle: "Listen", description: "httpd.conf" },
    Pattern { needle: "server_name", description: "nginx.conf" },
    Pattern { needle: "worker_processes", description: "nginx.conf" },
    Pattern { needle: "PermitRootLogin", description: "sshd_config" },
    Pattern { needle: "Port", description: "sshd_config" },

    // Source code
    Pattern { needle: "<?php", description: "PHP source code" },
    Pattern { needle: "<%", description: "JSP/ASP source code" },
    Pattern { needle: "$_GET", description: "PHP superglobals" },
    Pattern { needle: "$_POST", description: "PHP superglobals" },
    Pattern { needle: "$_SERVER", description: "PHP superglobals" },
    Pattern { needle: "request.getParameter", description: "JSP source code" },
];

static BUILTIN_MATCHER: LazyLock<AhoCorasick> = LazyLock::new(|| {
    AhoCorasick::new(LEAK_PATTERNS.iter().map(|p| p.needle))
        .expect("BUG: built-in leak patterns must build a matcher")
});

/// Ordered, read-only view over the pattern table and its automaton.
///
/// Copying a `PatternSet` only copies two references, so every worker gets
/// its own handle without locking.
#[derive(Debug, Clone, Copy)]
pub struct PatternSet {
    patterns: &'static [Pattern],
    matcher: &'static AhoCorasick,
}

impl PatternSet {
    pub fn builtin() -> Self {
        Self {
            patterns: LEAK_PATTERNS,
            matcher: &BUILTIN_MATCHER,
        }
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn iter(self) -> impl Iterator<Item = &'static Pattern> {
        self.patterns.iter()
    }

    /// Every pattern contained in `line`, as `(position, pattern)` pairs in
    /// table order, each at most once. Case-sensitive, no anchoring.
    ///
    /// Overlapping search so that `root:` and `root:x` both hit on a
    /// passwd line.
    pub fn matches(self, line: &[u8]) -> impl Iterator<Item = (usize, &'static Pattern)> {
        let found: BTreeSet<usize> = self
            .matcher
            .find_overlapping_iter(line)
            .map(|m| m.pattern().as_usize())
            .collect();
        let patterns = self.patterns;
        found.into_iter().map(move |position| (position, &patterns[position]))
    }
}
