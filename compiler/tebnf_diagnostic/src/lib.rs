//! Diagnostic system for the TEBNF compiler.
//!
//! Every stage reports through the same shape:
//! - an error code for searchability
//! - a message saying what went wrong
//! - a primary location (source line plus the offending token text)
//! - optional notes and suggestions
//!
//! Lexical, syntactic and semantic errors are fatal; warnings (`W4xxx`)
//! never block code generation.

mod diagnostic;
pub mod emitter;
mod error_code;
pub mod queue;

pub use diagnostic::{Diagnostic, Label, Location, Severity};
pub use error_code::ErrorCode;
pub use queue::{DiagnosticConfig, DiagnosticQueue};
