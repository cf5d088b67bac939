//! Output sinks for diagnostics.
//!
//! The driver reports through [`TerminalEmitter`] on stderr; tests point the
//! same emitter at a `Vec<u8>`.

mod terminal;

pub use terminal::{ColorMode, TerminalEmitter};

use crate::Diagnostic;

pub trait DiagnosticEmitter {
    fn emit(&mut self, diagnostic: &Diagnostic);

    fn emit_all(&mut self, diagnostics: &[Diagnostic]) {
        diagnostics.iter().for_each(|d| self.emit(d));
    }

    fn flush(&mut self);

    /// The closing "aborting due to ..." or "N warnings emitted" line.
    /// Prints nothing when both counts are zero.
    fn emit_summary(&mut self, error_count: usize, warning_count: usize);

    /// Emit a batch, its summary line, then flush.
    fn report(&mut self, diagnostics: &[Diagnostic]) {
        let errors = diagnostics.iter().filter(|d| d.is_error()).count();
        let warnings = diagnostics
            .iter()
            .filter(|d| d.code.is_warning())
            .count();
        self.emit_all(diagnostics);
        self.emit_summary(errors, warnings);
        self.flush();
    }
}
