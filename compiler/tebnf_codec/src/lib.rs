//! Codec synthesis for resolved TEBNF grammars.
//!
//! A [`CodecPlan`] describes, for one grammar element, the exact byte
//! layout the generated code reads and writes:
//!
//! ```text
//! resolved tree ──synthesize──▶ PlanSet ──render──▶ Rust source
//!                                  │
//!                                  └──exec──▶ bytes ⇄ Record
//! ```
//!
//! The plan is data, not code: the renderer turns it into source text and
//! the [`exec`] interpreter runs it directly, which is how the round-trip
//! property is tested without compiling anything. Both go through the
//! big-endian primitives in [`wire`].

pub mod exec;
mod plan;
pub mod render;
mod synth;
mod synthesis_error;
pub mod wire;

pub use plan::{
    CodecPlan, Count, DynamicTerm, Elem, FieldPlan, MatchExpr, Op, PlanSet, Step, TotalSize,
};
pub use synth::synthesize;
pub use synthesis_error::{SynthesisError, SynthesisErrorKind};
