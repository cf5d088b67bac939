//! Core diagnostic types.
//!
//! Defines [`Diagnostic`], [`Label`], [`Location`] and [`Severity`], the
//! building blocks every compiler stage uses to report errors and warnings.

use std::fmt;

use crate::ErrorCode;

/// Severity level for diagnostics.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Severity {
    Error,
    Warning,
    Note,
    Help,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Note => "note",
            Severity::Help => "help",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a diagnostic points: a source line and the token text found there.
///
/// TEBNF statements span joined physical lines, so the token text is what
/// lets a reader find the exact spot.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct Location {
    /// 1-based source line (0 when unknown).
    pub line: u32,
    pub token: String,
}

impl Location {
    pub fn new(line: u32, token: impl Into<String>) -> Self {
        Location {
            line,
            token: token.into(),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.token.is_empty() {
            write!(f, "line {}", self.line)
        } else {
            write!(f, "line {} at `{}`", self.line, self.token)
        }
    }
}

/// A location with a message.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Label {
    pub location: Location,
    pub message: String,
    /// Whether this is the main error location.
    pub is_primary: bool,
}

impl Label {
    fn new(location: Location, message: impl Into<String>, is_primary: bool) -> Self {
        Label {
            location,
            message: message.into(),
            is_primary,
        }
    }

    pub fn primary(location: Location, message: impl Into<String>) -> Self {
        Self::new(location, message, true)
    }

    pub fn secondary(location: Location, message: impl Into<String>) -> Self {
        Self::new(location, message, false)
    }
}

/// A diagnostic with the context needed to explain it.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[must_use = "diagnostics should be reported or returned, not silently dropped"]
pub struct Diagnostic {
    pub code: ErrorCode,
    pub severity: Severity,
    pub message: String,
    pub labels: Vec<Label>,
    pub notes: Vec<String>,
    pub suggestions: Vec<String>,
}

impl Diagnostic {
    fn new_with_severity(code: ErrorCode, severity: Severity) -> Self {
        Diagnostic {
            code,
            severity,
            message: String::new(),
            labels: Vec::new(),
            notes: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    #[cold]
    pub fn error(code: ErrorCode) -> Self {
        Self::new_with_severity(code, Severity::Error)
    }

    #[cold]
    pub fn warning(code: ErrorCode) -> Self {
        Self::new_with_severity(code, Severity::Warning)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add a primary label at the error location.
    pub fn with_label(mut self, location: Location, message: impl Into<String>) -> Self {
        self.labels.push(Label::primary(location, message));
        self
    }

    /// Add a secondary label for context.
    pub fn with_secondary_label(mut self, location: Location, message: impl Into<String>) -> Self {
        self.labels.push(Label::secondary(location, message));
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// The first primary label's location.
    pub fn primary_location(&self) -> Option<&Location> {
        self.labels
            .iter()
            .find(|l| l.is_primary)
            .map(|l| &l.location)
    }

    /// Line used for ordering; diagnostics without a location sort first.
    pub fn line(&self) -> u32 {
        self.primary_location().map_or(0, |l| l.line)
    }

    pub fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.code, self.message)?;

        for label in &self.labels {
            let marker = if label.is_primary { "-->" } else { "   " };
            write!(f, "\n  {marker} {}: {}", label.location, label.message)?;
        }
        let trailers = self.notes.iter().map(|n| ("note", n));
        for (kind, text) in trailers.chain(self.suggestions.iter().map(|s| ("help", s))) {
            write!(f, "\n  = {kind}: {text}")?;
        }
        Ok(())
    }
}
