//! Collects diagnostics from every stage before they are shown.
//!
//! A grammar with one broken element tends to produce a cascade of errors
//! on the same statement, so the queue caps how many errors it keeps and
//! drops repeats of a code on a line it has already reported. `flush`
//! hands the survivors back ordered by source line.

use crate::{Diagnostic, ErrorCode, Severity};

/// Error cap and deduplication switch for a [`DiagnosticQueue`].
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DiagnosticConfig {
    /// Errors kept before later ones are dropped (0 = unlimited).
    pub error_limit: usize,
    pub deduplicate: bool,
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        DiagnosticConfig {
            error_limit: 10,
            deduplicate: true,
        }
    }
}

impl DiagnosticConfig {
    /// Keep everything.
    pub fn unlimited() -> Self {
        DiagnosticConfig {
            error_limit: 0,
            deduplicate: false,
        }
    }
}

/// Running totals of what the queue holds.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
struct Tally {
    errors: usize,
    warnings: usize,
}

impl Tally {
    fn count(&mut self, severity: Severity) {
        match severity {
            Severity::Error => self.errors += 1,
            Severity::Warning => self.warnings += 1,
            Severity::Note | Severity::Help => {}
        }
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct DiagnosticQueue {
    pending: Vec<Diagnostic>,
    tally: Tally,
    config: DiagnosticConfig,
}

impl DiagnosticQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DiagnosticConfig) -> Self {
        DiagnosticQueue {
            pending: Vec::new(),
            tally: Tally::default(),
            config,
        }
    }

    /// Returns `false` when the diagnostic was dropped, either because the
    /// error limit is reached or because it repeats a queued one.
    pub fn add(&mut self, diag: Diagnostic) -> bool {
        if !self.admits(&diag) {
            return false;
        }
        self.tally.count(diag.severity);
        self.pending.push(diag);
        true
    }

    pub fn extend(&mut self, diags: impl IntoIterator<Item = Diagnostic>) {
        diags.into_iter().for_each(|diag| {
            self.add(diag);
        });
    }

    fn admits(&self, diag: &Diagnostic) -> bool {
        if diag.is_error() && self.limit_reached() {
            return false;
        }
        !(self.config.deduplicate && self.already_reported(diag.code, diag.line()))
    }

    /// Unlocated diagnostics (line 0) never count as repeats.
    fn already_reported(&self, code: ErrorCode, line: u32) -> bool {
        line != 0 && self.pending.iter().any(|d| d.code == code && d.line() == line)
    }

    pub fn limit_reached(&self) -> bool {
        match self.config.error_limit {
            0 => false,
            limit => self.tally.errors >= limit,
        }
    }

    pub fn error_count(&self) -> usize {
        self.tally.errors
    }

    pub fn warning_count(&self) -> usize {
        self.tally.warnings
    }

    pub fn has_errors(&self) -> bool {
        self.tally.errors != 0
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Take every queued diagnostic, ordered by line, and reset the counts.
    ///
    /// Diagnostics on the same line keep the order they arrived in.
    pub fn flush(&mut self) -> Vec<Diagnostic> {
        self.tally = Tally::default();
        let mut out = std::mem::take(&mut self.pending);
        out.sort_by_key(Diagnostic::line);
        out
    }
}

#[cfg(test)]
mod tests;
