//! The closed set of TEBNF token kinds.

use std::fmt;

/// Token kinds produced by the lexer.
///
/// A handful of kinds are only ever assigned retroactively (`RangeValue`,
/// `RangeLeft`, `ActionsParam`, `ElementNameAccessed`) or synthesized by the
/// parser (`StateTableState`).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TokenKind {
    // Comments (collected beside the stream, never inside it)
    LineComment,
    BlockComment,

    // Element keywords
    Grammar,
    Input,
    Output,
    States,
    Actions,
    /// `@Name`
    ElementName,
    End,

    // Literals
    Chr,
    Dec,
    Flt,
    Hex,
    Oct,
    Str,
    /// A literal, symbol or static variable used as a range bound.
    RangeValue,

    // Operators
    /// `==`, `!=`
    Comparison,
    /// `<`, `<=`, `>`, `>=`
    LessGreater,
    As,
    Assign,
    AssignAdd,
    AssignSub,
    AssignMul,
    AssignDiv,
    AssignMod,
    /// `+`, `-`, `*`, `/`, `%`
    Math,
    Decrement,
    Increment,
    /// `{` or `}` that is not part of a range.
    Production,
    ArrayLeft,
    ArrayRight,
    MemberAccess,
    Concat,
    Or,
    LeftParen,
    RightParen,
    RangeLeft,
    RangeRight,
    RangeDelim,
    TypeCastLeft,
    TypeCastRight,
    StateTableDelim,
    ActionsParamDelim,
    Termination,

    // Symbols
    /// `$name`
    StaticVar,
    SymbolActions,
    SymbolGrammar,
    /// Grammar symbol naming the element's overall size.
    SymbolGrammarSize,
    SymbolConsole,
    /// `@Name` that was followed by `.`.
    ElementNameAccessed,
    IoType,
    ActionsParam,
    SymbolStateTable,
    StateTableState,
    /// Sized type keyword (`INT_16`, `BYTE`, ...).
    Typed,

    Unknown,
    Eof,
}

impl TokenKind {
    /// One of the five element keywords.
    pub const fn is_element_keyword(self) -> bool {
        matches!(
            self,
            TokenKind::Grammar
                | TokenKind::Input
                | TokenKind::Output
                | TokenKind::States
                | TokenKind::Actions
        )
    }

    pub const fn is_io_element(self) -> bool {
        matches!(self, TokenKind::Input | TokenKind::Output)
    }

    pub const fn is_literal(self) -> bool {
        matches!(
            self,
            TokenKind::Chr
                | TokenKind::Dec
                | TokenKind::Flt
                | TokenKind::Hex
                | TokenKind::Oct
                | TokenKind::Str
        )
    }

    pub const fn is_integer_literal(self) -> bool {
        matches!(
            self,
            TokenKind::Chr | TokenKind::Dec | TokenKind::Hex | TokenKind::Oct
        )
    }

    pub const fn is_comment(self) -> bool {
        matches!(self, TokenKind::LineComment | TokenKind::BlockComment)
    }

    /// Any operator kind, including brackets and delimiters.
    pub const fn is_operator(self) -> bool {
        matches!(
            self,
            TokenKind::Comparison
                | TokenKind::LessGreater
                | TokenKind::As
                | TokenKind::Assign
                | TokenKind::AssignAdd
                | TokenKind::AssignSub
                | TokenKind::AssignMul
                | TokenKind::AssignDiv
                | TokenKind::AssignMod
                | TokenKind::Math
                | TokenKind::Decrement
                | TokenKind::Increment
                | TokenKind::Production
                | TokenKind::ArrayLeft
                | TokenKind::ArrayRight
                | TokenKind::MemberAccess
                | TokenKind::Concat
                | TokenKind::Or
                | TokenKind::LeftParen
                | TokenKind::RightParen
                | TokenKind::RangeLeft
                | TokenKind::RangeRight
                | TokenKind::RangeDelim
                | TokenKind::TypeCastLeft
                | TokenKind::TypeCastRight
                | TokenKind::StateTableDelim
                | TokenKind::ActionsParamDelim
                | TokenKind::Termination
        )
    }

    /// Plain or compound assignment.
    pub const fn is_assignment(self) -> bool {
        matches!(
            self,
            TokenKind::Assign
                | TokenKind::AssignAdd
                | TokenKind::AssignSub
                | TokenKind::AssignMul
                | TokenKind::AssignDiv
                | TokenKind::AssignMod
        )
    }

    /// A literal, grammar symbol or static variable: the kinds that may
    /// stand as a range bound.
    pub const fn is_range_operand(self) -> bool {
        self.is_literal() || matches!(self, TokenKind::SymbolGrammar | TokenKind::StaticVar)
    }

    /// Human-readable name used in diagnostics and token dumps.
    pub const fn display_name(self) -> &'static str {
        match self {
            TokenKind::LineComment => "line comment",
            TokenKind::BlockComment => "block comment",
            TokenKind::Grammar => "GRAMMAR",
            TokenKind::Input => "INPUT",
            TokenKind::Output => "OUTPUT",
            TokenKind::States => "STATES",
            TokenKind::Actions => "ACTIONS",
            TokenKind::ElementName => "element name",
            TokenKind::End => "END",
            TokenKind::Chr => "char literal",
            TokenKind::Dec => "decimal literal",
            TokenKind::Flt => "float literal",
            TokenKind::Hex => "hex literal",
            TokenKind::Oct => "octal literal",
            TokenKind::Str => "string literal",
            TokenKind::RangeValue => "range value",
            TokenKind::Comparison => "comparison operator",
            TokenKind::LessGreater => "relational operator",
            TokenKind::As => "AS",
            TokenKind::Assign => "`=`",
            TokenKind::AssignAdd => "`+=`",
            TokenKind::AssignSub => "`-=`",
            TokenKind::AssignMul => "`*=`",
            TokenKind::AssignDiv => "`/=`",
            TokenKind::AssignMod => "`%=`",
            TokenKind::Math => "arithmetic operator",
            TokenKind::Decrement => "`--`",
            TokenKind::Increment => "`++`",
            TokenKind::Production => "production bracket",
            TokenKind::ArrayLeft => "`[`",
            TokenKind::ArrayRight => "`]`",
            TokenKind::MemberAccess => "`.`",
            TokenKind::Concat => "`,`",
            TokenKind::Or => "`|`",
            TokenKind::LeftParen => "`(`",
            TokenKind::RightParen => "`)`",
            TokenKind::RangeLeft => "range `{`",
            TokenKind::RangeRight => "range `}`",
            TokenKind::RangeDelim => "range `,`",
            TokenKind::TypeCastLeft => "type cast `(`",
            TokenKind::TypeCastRight => "type cast `)`",
            TokenKind::StateTableDelim => "state table `|`",
            TokenKind::ActionsParamDelim => "parameter `,`",
            TokenKind::Termination => "`;`",
            TokenKind::StaticVar => "static variable",
            TokenKind::SymbolActions => "actions symbol",
            TokenKind::SymbolGrammar => "grammar symbol",
            TokenKind::SymbolGrammarSize => "grammar size symbol",
            TokenKind::SymbolConsole => "console symbol",
            TokenKind::ElementNameAccessed => "accessed element name",
            TokenKind::IoType => "IO type",
            TokenKind::ActionsParam => "actions parameter",
            TokenKind::SymbolStateTable => "state table symbol",
            TokenKind::StateTableState => "state",
            TokenKind::Typed => "type",
            TokenKind::Unknown => "unknown token",
            TokenKind::Eof => "end of input",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
