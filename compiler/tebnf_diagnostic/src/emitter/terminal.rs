//! Human-readable diagnostics for a terminal.
//!
//! ```text
//! error[E2001]: unable to resolve `@Missing`
//!   --> line 2 at `@Missing`: referenced here
//!    |
//!  2 |     a = @Missing;
//!    |         ^^^^^^^^
//!   = note: no element or member of that name is declared
//! ```
//!
//! The excerpt is printed only when the emitter was given the source text.

use std::io::{self, Write};

use crate::{Diagnostic, Label, Severity};

use super::DiagnosticEmitter;

/// Text styles, as ANSI escape sequences.
#[derive(Copy, Clone, Debug)]
enum Style {
    Error,
    Warning,
    Note,
    Help,
    Strong,
    Secondary,
}

impl Style {
    fn escape(self) -> &'static str {
        match self {
            Style::Error => "\x1b[1;31m",
            Style::Warning => "\x1b[1;33m",
            Style::Note => "\x1b[1;36m",
            Style::Help => "\x1b[1;32m",
            Style::Strong => "\x1b[1m",
            Style::Secondary => "\x1b[1;34m",
        }
    }

    fn of(severity: Severity) -> Self {
        match severity {
            Severity::Error => Style::Error,
            Severity::Warning => Style::Warning,
            Severity::Note => Style::Note,
            Severity::Help => Style::Help,
        }
    }
}

const RESET: &str = "\x1b[0m";

/// When to color output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorMode {
    /// Colors when writing to a terminal.
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    /// Resolve to a boolean; `is_tty` only matters for `Auto`.
    pub fn should_use_colors(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }

    /// Parse the value of a `--color=` flag.
    pub fn from_flag(value: &str) -> Option<Self> {
        match value {
            "auto" => Some(ColorMode::Auto),
            "always" => Some(ColorMode::Always),
            "never" => Some(ColorMode::Never),
            _ => None,
        }
    }
}

/// Writes diagnostics as text, optionally colored and with source excerpts.
pub struct TerminalEmitter<W: Write> {
    writer: W,
    colors: bool,
    /// Source lines, for excerpts under primary labels.
    source: Vec<String>,
}

impl<W: Write> TerminalEmitter<W> {
    pub fn with_color_mode(writer: W, mode: ColorMode, is_tty: bool) -> Self {
        TerminalEmitter {
            writer,
            colors: mode.should_use_colors(is_tty),
            source: Vec::new(),
        }
    }

    /// An emitter writing to stderr.
    pub fn stderr(mode: ColorMode, is_tty: bool) -> TerminalEmitter<io::Stderr> {
        TerminalEmitter::with_color_mode(io::stderr(), mode, is_tty)
    }

    /// Quote the offending line of `source` under each primary label.
    #[must_use]
    pub fn with_source(mut self, source: &str) -> Self {
        self.source = source.lines().map(str::to_owned).collect();
        self
    }

    fn paint(&mut self, text: &str, style: Style) {
        let _ = if self.colors {
            write!(self.writer, "{}{text}{RESET}", style.escape())
        } else {
            write!(self.writer, "{text}")
        };
    }

    fn label(&mut self, label: &Label) {
        let (marker, style) = if label.is_primary {
            ("-->", Style::Error)
        } else {
            ("   ", Style::Secondary)
        };
        let _ = write!(self.writer, "  {marker} {}: ", label.location);
        self.paint(&label.message, style);
        let _ = writeln!(self.writer);
        if label.is_primary {
            self.excerpt(label);
        }
    }

    /// The labelled source line with a caret run under the token.
    fn excerpt(&mut self, label: &Label) {
        let line_no = label.location.line;
        let Some(text) = line_no
            .checked_sub(1)
            .and_then(|i| self.source.get(i as usize))
            .cloned()
        else {
            return;
        };
        let gutter = line_no.to_string().len();
        let pad = " ".repeat(gutter);
        let _ = writeln!(self.writer, " {pad} |");
        let _ = writeln!(self.writer, " {line_no} | {text}");
        let token = label.location.token.as_str();
        if let Some(column) = (!token.is_empty()).then(|| text.find(token)).flatten() {
            let _ = write!(self.writer, " {pad} | {}", " ".repeat(column));
            self.paint(&"^".repeat(token.chars().count()), Style::Error);
            let _ = writeln!(self.writer);
        }
    }

    fn trailer(&mut self, kind: &str, style: Style, text: &str) {
        let _ = write!(self.writer, "  = ");
        self.paint(kind, style);
        let _ = writeln!(self.writer, ": {text}");
    }
}

fn count(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("1 {noun}")
    } else {
        format!("{n} {noun}s")
    }
}

impl<W: Write> DiagnosticEmitter for TerminalEmitter<W> {
    fn emit(&mut self, diagnostic: &Diagnostic) {
        self.paint(diagnostic.severity.as_str(), Style::of(diagnostic.severity));
        self.paint(&format!("[{}]", diagnostic.code.as_str()), Style::Strong);
        let _ = writeln!(self.writer, ": {}", diagnostic.message);

        for label in &diagnostic.labels {
            self.label(label);
        }
        for note in &diagnostic.notes {
            self.trailer("note", Style::Strong, note);
        }
        for suggestion in &diagnostic.suggestions {
            self.trailer("help", Style::Help, suggestion);
        }
        let _ = writeln!(self.writer);
    }

    fn flush(&mut self) {
        let _ = self.writer.flush();
    }

    fn emit_summary(&mut self, error_count: usize, warning_count: usize) {
        let line = match (error_count, warning_count) {
            (0, 0) => return,
            (0, w) => {
                self.paint("warning", Style::Warning);
                format!(": {} emitted", count(w, "warning"))
            }
            (1, w) => {
                self.paint("error", Style::Error);
                aborting("previous error", w)
            }
            (e, w) => {
                self.paint("error", Style::Error);
                aborting(&format!("{e} previous errors"), w)
            }
        };
        let _ = writeln!(self.writer, "{line}");
    }
}

fn aborting(errors: &str, warnings: usize) -> String {
    if warnings == 0 {
        format!(": aborting due to {errors}")
    } else {
        format!(": aborting due to {errors}; {} emitted", count(warnings, "warning"))
    }
}
