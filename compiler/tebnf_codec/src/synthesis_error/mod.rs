//! Codec synthesis errors (`E3xxx`).

use tebnf_diagnostic::{Diagnostic, ErrorCode, Location};

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum SynthesisErrorKind {
    #[error("`{0}` has no resolved layout")]
    MissingReference(String),
    #[error("{0}")]
    InconsistentSize(String),
    #[error("`{0}` is not a grammar element")]
    NotGrammar(String),
    #[error("element size is too large to represent")]
    SizeOverflow,
}

impl SynthesisErrorKind {
    pub fn code(&self) -> ErrorCode {
        match self {
            SynthesisErrorKind::MissingReference(_) => ErrorCode::E3001,
            SynthesisErrorKind::InconsistentSize(_) => ErrorCode::E3002,
            SynthesisErrorKind::NotGrammar(_) => ErrorCode::E3003,
            SynthesisErrorKind::SizeOverflow => ErrorCode::E2008,
        }
    }
}

/// An element whose layout cannot be turned into a codec.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("{kind} in `{element}` at line {line}")]
pub struct SynthesisError {
    pub kind: SynthesisErrorKind,
    pub element: String,
    pub line: u32,
    pub token: String,
}

impl SynthesisError {
    pub fn new(
        kind: SynthesisErrorKind,
        element: impl Into<String>,
        line: u32,
        token: impl Into<String>,
    ) -> Self {
        SynthesisError {
            kind,
            element: element.into(),
            line,
            token: token.into(),
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(self.kind.code())
            .with_message(self.kind.to_string())
            .with_label(
                Location::new(self.line, self.token.clone()),
                format!("while synthesizing `{}`", self.element),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_codes_and_diagnostic() {
        let err = SynthesisError::new(
            SynthesisErrorKind::InconsistentSize("open-ended field `a` is not last".into()),
            "@Msg",
            3,
            "a",
        );
        assert_eq!(err.kind.code(), ErrorCode::E3002);
        let diag = err.to_diagnostic();
        assert_eq!(diag.line(), 3);
        assert_eq!(diag.message, "open-ended field `a` is not last");
        assert_eq!(
            SynthesisErrorKind::NotGrammar("@In".into()).code(),
            ErrorCode::E3003
        );
    }
}
