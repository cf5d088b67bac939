//! Per-compilation parser state.

use tebnf_diagnostic::Diagnostic;
use tebnf_ir::{ElementKind, NodeId, ResolvedType, TokenId};

use crate::{ParseError, PendingTable};

/// A state-table cell whose reference is looked up once every element is
/// declared.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum RowSlot {
    Condition,
    InputMethod,
    Output,
    OutputMethod,
}

/// A reference the parser records for the resolver.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum Deferred {
    /// `GRAMMAR @A AS @B`
    Alias { element: NodeId, target: TokenId },
    /// `INPUT @In = @Other;`
    IoSource { element: NodeId, source: TokenId },
    /// A state-table cell naming an element or `@E.member`. `args` holds the
    /// argument tokens of an actions invocation.
    Row {
        row: NodeId,
        slot: RowSlot,
        token: TokenId,
        args: Vec<TokenId>,
    },
}

/// Everything one run of the parser and resolver shares.
#[derive(Default)]
pub struct CompilationContext {
    /// Kind of the element being parsed.
    pub element_kind: Option<ElementKind>,
    pub pending: PendingTable,
    /// `(TYPE)` cast waiting for the term it applies to.
    pub size_cast: Option<ResolvedType>,
    pub deferred: Vec<Deferred>,
    pub errors: Vec<ParseError>,
    pub warnings: Vec<Diagnostic>,
}

impl CompilationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, err: ParseError) {
        tracing::debug!(%err, "parse error");
        self.errors.push(err);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}
