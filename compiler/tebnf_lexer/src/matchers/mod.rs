//! The ordered matcher chain.
//!
//! Each matcher looks at the unconsumed rest of a line and either claims a
//! lexeme or passes. Several matchers also rewrite the most recent tokens
//! once later context disambiguates them (range brackets, action
//! parameters, member access, type casts).

use tebnf_ir::{ElementKind, IoChannel, Token, TokenFlags, TokenId, TokenKind, TokenList};

use crate::{Comment, LexError, LexErrorKind};

/// Characters that end an unrecognized token.
const UNKNOWN_STOPS: &str = "|;,(){}[]=";

const TYPE_KEYWORDS: [(&str, bool); 7] = [
    // (keyword, takes a `_width` suffix)
    ("INT_STR", true),
    ("FLOAT_STR", true),
    ("INT", true),
    ("FLOAT", true),
    ("BYTE", false),
    ("BIT", false),
    ("CHAR", false),
];

const ELEMENT_KEYWORDS: [(&str, TokenKind); 5] = [
    ("GRAMMAR", TokenKind::Grammar),
    ("INPUT", TokenKind::Input),
    ("OUTPUT", TokenKind::Output),
    ("STATES", TokenKind::States),
    ("ACTIONS", TokenKind::Actions),
];

#[inline]
pub(crate) fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Length of `kw` if `text` starts with it as a whole word.
pub(crate) fn keyword_len(text: &str, kw: &str) -> Option<usize> {
    let tail = text.strip_prefix(kw)?;
    match tail.chars().next() {
        Some(c) if is_ident_char(c) => None,
        _ => Some(kw.len()),
    }
}

fn ident_len(text: &str) -> usize {
    text.find(|c: char| !is_ident_char(c)).unwrap_or(text.len())
}

/// A claimed prefix of the current line.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub(crate) struct Lexeme {
    pub kind: TokenKind,
    pub len: usize,
    pub flags: TokenFlags,
}

impl Lexeme {
    const fn new(kind: TokenKind, len: usize) -> Self {
        Lexeme {
            kind,
            len,
            flags: TokenFlags::empty(),
        }
    }

    fn with_flags(mut self, flags: TokenFlags) -> Self {
        self.flags |= flags;
        self
    }
}

/// Lexer state carried across lines.
#[derive(Clone, Debug, Default)]
struct LexState {
    element: Option<ElementKind>,
    in_block_comment: bool,
    in_signature: bool,
    /// Stream position of the signature's `(`.
    signature_start: usize,
    in_type_cast: bool,
}

impl LexState {
    fn reset_signature(&mut self) {
        self.in_signature = false;
        self.signature_start = 0;
    }
}

type Matcher = fn(&mut Lexer, &str) -> Option<Lexeme>;

const MATCHERS: [(&str, Matcher); 14] = [
    ("comment", match_comment),
    ("actions_signature", match_actions_signature),
    ("actions_param", match_actions_param),
    ("range_or_concat", match_range_or_concat),
    ("io_type", match_io_type),
    ("operator", match_operator),
    ("element_keyword", match_element_keyword),
    ("element_name", match_element_name),
    ("end", match_end),
    ("typed", match_typed),
    ("static_var", match_static_var),
    ("symbol", match_symbol),
    ("literal", match_literal),
    ("unknown", match_unknown),
];

pub(crate) struct Lexer {
    pub(crate) tokens: TokenList,
    pub(crate) comments: Vec<Comment>,
    pub(crate) errors: Vec<LexError>,
    state: LexState,
    line: u32,
}

impl Lexer {
    pub(crate) fn new() -> Self {
        Lexer {
            tokens: TokenList::new(),
            comments: Vec::new(),
            errors: Vec::new(),
            state: LexState::default(),
            line: 0,
        }
    }

    /// Tokenize one physical line.
    pub(crate) fn lex_line(&mut self, line: u32, text: &str) {
        self.line = line;
        let mut rest = text;
        loop {
            rest = rest.trim_start();
            if rest.is_empty() {
                break;
            }
            let claimed = MATCHERS.iter().find_map(|(name, matcher)| {
                let lexeme = matcher(self, rest)?;
                tracing::trace!(matcher = *name, kind = ?lexeme.kind, len = lexeme.len, "matched");
                Some(lexeme)
            });
            // `match_unknown` always claims at least one character.
            let Some(lexeme) = claimed else { break };
            let len = clamp_to_char_boundary(rest, lexeme.len);
            let (text, tail) = rest.split_at(len);
            self.emit(lexeme, text);
            rest = tail;
        }
    }

    /// Append the end-of-input sentinel.
    pub(crate) fn finish(&mut self) {
        let mut eof = Token::new(TokenKind::Eof, "", self.line);
        eof.flags |= TokenFlags::SYNTHETIC;
        self.tokens.push(eof);
    }

    fn emit(&mut self, lexeme: Lexeme, text: &str) {
        if lexeme.kind.is_comment() {
            self.comments.push(Comment {
                kind: lexeme.kind,
                text: text.trim().to_owned(),
                line: self.line,
            });
            return;
        }
        let mut token = Token::new(lexeme.kind, text, self.line);
        token.flags |= lexeme.flags;
        self.push(token);
    }

    /// Push a token, folding a pending `@A .` into its back-reference.
    fn push(&mut self, mut token: Token) -> TokenId {
        if self
            .tokens
            .last(0)
            .is_some_and(|t| t.kind == TokenKind::MemberAccess)
        {
            self.tokens.pop();
            token.accessed = self.tokens.pop();
        }
        tracing::trace!(kind = ?token.kind, text = %token.text, line = token.line, "token");
        self.tokens.push(token)
    }

    fn error(&mut self, kind: LexErrorKind, text: &str) {
        self.errors.push(LexError::new(kind, self.line, text));
    }

    fn last_kind(&self, back: usize) -> Option<TokenKind> {
        self.tokens.last(back).map(|t| t.kind)
    }

    fn last_text_is(&self, back: usize, text: &str) -> bool {
        self.tokens.last(back).is_some_and(|t| t.text == text)
    }

    fn reclassify_last(&mut self, back: usize, kind: TokenKind) {
        if let Some(token) = self.tokens.last_mut(back) {
            token.reclassify(kind);
        }
    }

    /// Drop a preceding `UNSIGNED` marker, reporting whether there was one.
    fn take_unsigned(&mut self) -> bool {
        if self.last_text_is(0, "UNSIGNED") {
            self.tokens.pop();
            true
        } else {
            false
        }
    }

    /// Retype everything between the signature's parentheses.
    fn reclassify_signature(&mut self) {
        for pos in self.state.signature_start + 1..self.tokens.stream_len() {
            let Some(id) = self.tokens.id_at(pos) else {
                continue;
            };
            if let Some(token) = self.tokens.get_mut(id) {
                let kind = if token.text == "," {
                    TokenKind::ActionsParamDelim
                } else {
                    TokenKind::ActionsParam
                };
                if token.kind != kind {
                    token.reclassify(kind);
                }
            }
        }
        self.state.reset_signature();
    }

    fn in_element(&self, kind: ElementKind) -> bool {
        self.state.element == Some(kind)
    }
}

fn clamp_to_char_boundary(text: &str, len: usize) -> usize {
    let mut len = len.clamp(1, text.len());
    while !text.is_char_boundary(len) {
        len += 1;
    }
    len
}

/// Kinds after which `-` is subtraction rather than a sign.
fn ends_value(kind: TokenKind) -> bool {
    kind.is_literal()
        || matches!(
            kind,
            TokenKind::RangeValue
                | TokenKind::RightParen
                | TokenKind::TypeCastRight
                | TokenKind::ArrayRight
                | TokenKind::StaticVar
                | TokenKind::SymbolActions
                | TokenKind::SymbolGrammar
                | TokenKind::SymbolGrammarSize
                | TokenKind::SymbolConsole
                | TokenKind::SymbolStateTable
                | TokenKind::ActionsParam
                | TokenKind::ElementName
                | TokenKind::Unknown
        )
}

fn match_comment(lx: &mut Lexer, rest: &str) -> Option<Lexeme> {
    if lx.state.in_block_comment {
        return Some(match rest.find("##") {
            Some(end) => {
                lx.state.in_block_comment = false;
                Lexeme::new(TokenKind::BlockComment, end + 2)
            }
            None => Lexeme::new(TokenKind::BlockComment, rest.len()),
        });
    }
    if let Some(body) = rest.strip_prefix("##") {
        return Some(match body.find("##") {
            Some(end) => Lexeme::new(TokenKind::BlockComment, end + 4),
            None => {
                lx.state.in_block_comment = true;
                Lexeme::new(TokenKind::BlockComment, rest.len())
            }
        });
    }
    rest.starts_with('#')
        .then(|| Lexeme::new(TokenKind::LineComment, rest.len()))
}

fn match_actions_signature(lx: &mut Lexer, rest: &str) -> Option<Lexeme> {
    if !lx.in_element(ElementKind::Actions) {
        return None;
    }
    if !lx.state.in_signature {
        let named = lx.last_kind(0) == Some(TokenKind::ElementName)
            && lx.last_kind(1) == Some(TokenKind::Actions);
        if !named {
            return None;
        }
        if rest.starts_with('(') {
            lx.state.in_signature = true;
            lx.state.signature_start = lx.tokens.stream_len();
            return Some(Lexeme::new(TokenKind::LeftParen, 1));
        }
        // no parameter list: the name itself closes the signature
        if let Some(name) = lx.tokens.last_mut(0) {
            name.flags |= TokenFlags::LAST_SIGNATURE;
        }
        return None;
    }
    if rest.starts_with(',') {
        return Some(Lexeme::new(TokenKind::ActionsParamDelim, 1));
    }
    if rest.starts_with(')') {
        lx.reclassify_signature();
        return Some(
            Lexeme::new(TokenKind::RightParen, 1).with_flags(TokenFlags::LAST_SIGNATURE),
        );
    }
    None
}

fn match_actions_param(lx: &mut Lexer, rest: &str) -> Option<Lexeme> {
    if !lx.state.in_signature {
        return None;
    }
    let len = rest
        .find(|c: char| !(is_ident_char(c) || c == '$'))
        .unwrap_or(rest.len());
    (len > 0).then(|| Lexeme::new(TokenKind::ActionsParam, len))
}

fn match_range_or_concat(lx: &mut Lexer, rest: &str) -> Option<Lexeme> {
    let closing = match rest.as_bytes().first() {
        Some(b',') => false,
        Some(b'}') => true,
        _ => return None,
    };
    if !lx.in_element(ElementKind::Grammar) {
        return (!closing).then(|| Lexeme::new(TokenKind::Concat, 1));
    }

    let operand = lx.last_kind(0).is_some_and(TokenKind::is_range_operand);
    if operand && lx.last_text_is(1, "{") {
        // `{5,` or `{10}`
        lx.reclassify_last(1, TokenKind::RangeLeft);
        lx.reclassify_last(0, TokenKind::RangeValue);
    } else if operand && closing && lx.last_kind(1) == Some(TokenKind::RangeDelim) {
        // `,10}`
        lx.reclassify_last(0, TokenKind::RangeValue);
    } else if closing {
        // `{5,}` and `{,}` close here; any other `}` is a production bracket
        return (lx.last_kind(0) == Some(TokenKind::RangeDelim))
            .then(|| Lexeme::new(TokenKind::RangeRight, 1));
    } else if lx.last_text_is(0, "{") {
        // `{,`
        lx.reclassify_last(0, TokenKind::RangeLeft);
    } else {
        return Some(Lexeme::new(TokenKind::Concat, 1));
    }

    Some(if closing {
        Lexeme::new(TokenKind::RangeRight, 1)
    } else {
        Lexeme::new(TokenKind::RangeDelim, 1)
    })
}

fn match_io_type(lx: &mut Lexer, rest: &str) -> Option<Lexeme> {
    if !lx.state.element.is_some_and(ElementKind::is_io) {
        return None;
    }
    IoChannel::ALL
        .iter()
        .find_map(|channel| keyword_len(rest, channel.keyword()))
        .map(|len| Lexeme::new(TokenKind::IoType, len))
}

fn match_operator(lx: &mut Lexer, rest: &str) -> Option<Lexeme> {
    let bytes = rest.as_bytes();
    let first = *bytes.first()?;
    let second = bytes.get(1).copied();

    if first == b'-' && second.is_some_and(|c| c.is_ascii_digit()) {
        let after_value = lx.last_kind(0).is_some_and(ends_value);
        if !after_value {
            // a negative literal
            return None;
        }
    }

    let two = match (first, second) {
        (b'<' | b'>', Some(b'=')) => Some(TokenKind::LessGreater),
        (b'=' | b'!', Some(b'=')) => Some(TokenKind::Comparison),
        (b'+', Some(b'=')) => Some(TokenKind::AssignAdd),
        (b'-', Some(b'=')) => Some(TokenKind::AssignSub),
        (b'*', Some(b'=')) => Some(TokenKind::AssignMul),
        (b'/', Some(b'=')) => Some(TokenKind::AssignDiv),
        (b'%', Some(b'=')) => Some(TokenKind::AssignMod),
        (b'-', Some(b'-')) => Some(TokenKind::Decrement),
        (b'+', Some(b'+')) => Some(TokenKind::Increment),
        _ => None,
    };
    if let Some(kind) = two {
        return Some(Lexeme::new(kind, 2));
    }
    if let Some(len) = keyword_len(rest, "AS") {
        return Some(Lexeme::new(TokenKind::As, len));
    }

    let kind = match first {
        b'|' if lx.in_element(ElementKind::StateTable) => TokenKind::StateTableDelim,
        b'|' => TokenKind::Or,
        b'<' | b'>' => TokenKind::LessGreater,
        b'=' => TokenKind::Assign,
        b'+' | b'-' | b'*' | b'/' | b'%' => TokenKind::Math,
        b'.' => {
            if lx.last_kind(0) == Some(TokenKind::ElementName) {
                lx.reclassify_last(0, TokenKind::ElementNameAccessed);
            }
            TokenKind::MemberAccess
        }
        b'[' => TokenKind::ArrayLeft,
        b']' => TokenKind::ArrayRight,
        b'(' => TokenKind::LeftParen,
        b')' if lx.state.in_type_cast => {
            lx.state.in_type_cast = false;
            TokenKind::TypeCastRight
        }
        b')' => TokenKind::RightParen,
        b'{' | b'}' => TokenKind::Production,
        b',' => TokenKind::Concat,
        b';' => TokenKind::Termination,
        _ => return None,
    };
    Some(Lexeme::new(kind, 1))
}

fn match_element_keyword(lx: &mut Lexer, rest: &str) -> Option<Lexeme> {
    let (len, kind) = ELEMENT_KEYWORDS
        .iter()
        .find_map(|(kw, kind)| keyword_len(rest, kw).map(|len| (len, *kind)))?;
    lx.state.element = ElementKind::from_keyword(kind);
    lx.state.reset_signature();
    lx.state.in_type_cast = false;
    Some(Lexeme::new(kind, len))
}

fn match_element_name(_lx: &mut Lexer, rest: &str) -> Option<Lexeme> {
    let name = rest.strip_prefix('@')?;
    let len = ident_len(name);
    (len > 0).then(|| Lexeme::new(TokenKind::ElementName, len + 1))
}

fn match_end(lx: &mut Lexer, rest: &str) -> Option<Lexeme> {
    let len = keyword_len(rest, "END")?;
    lx.state = LexState {
        in_block_comment: lx.state.in_block_comment,
        ..LexState::default()
    };
    Some(Lexeme::new(TokenKind::End, len))
}

/// Length of a sized type keyword such as `INT_16`, `UNSIGNED` excluded.
fn typed_len(rest: &str) -> Option<usize> {
    TYPE_KEYWORDS.iter().find_map(|(kw, sized)| {
        let mut len = rest.strip_prefix(kw).map(|_| kw.len())?;
        if *sized {
            if let Some(width) = rest[len..].strip_prefix('_') {
                let digits = width.find(|c: char| !c.is_ascii_digit()).unwrap_or(width.len());
                if digits > 0 {
                    len += 1 + digits;
                }
            }
        }
        match rest[len..].chars().next() {
            Some(c) if is_ident_char(c) => None,
            _ => Some(len),
        }
    })
}

fn match_typed(lx: &mut Lexer, rest: &str) -> Option<Lexeme> {
    let len = typed_len(rest)?;
    let mut lexeme = Lexeme::new(TokenKind::Typed, len);
    if lx.take_unsigned() {
        lexeme.flags |= TokenFlags::UNSIGNED;
    }
    let opens_cast = lx.last_kind(0) == Some(TokenKind::LeftParen)
        && lx.last_kind(1).is_some_and(TokenKind::is_assignment);
    if opens_cast {
        lx.reclassify_last(0, TokenKind::TypeCastLeft);
        lx.state.in_type_cast = true;
    }
    Some(lexeme)
}

fn match_static_var(_lx: &mut Lexer, rest: &str) -> Option<Lexeme> {
    let name = rest.strip_prefix('$')?;
    let len = ident_len(name);
    (len > 0).then(|| Lexeme::new(TokenKind::StaticVar, len + 1))
}

fn match_symbol(lx: &mut Lexer, rest: &str) -> Option<Lexeme> {
    let element = lx.state.element?;
    if !rest.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_') {
        return None;
    }
    let len = ident_len(rest);
    let kind = match element {
        ElementKind::Grammar => {
            let declares_size = lx.last_kind(0) == Some(TokenKind::Assign)
                && matches!(
                    lx.last_kind(1),
                    Some(TokenKind::ElementName | TokenKind::Termination)
                );
            if declares_size {
                TokenKind::SymbolGrammarSize
            } else {
                TokenKind::SymbolGrammar
            }
        }
        ElementKind::Input | ElementKind::Output => TokenKind::SymbolConsole,
        ElementKind::Actions => TokenKind::SymbolActions,
        ElementKind::StateTable => TokenKind::SymbolStateTable,
    };
    Some(Lexeme::new(kind, len))
}

fn match_literal(lx: &mut Lexer, rest: &str) -> Option<Lexeme> {
    let lexeme = match rest.as_bytes().first()? {
        b'"' => {
            let len = rest[1..].find('"').map_or(rest.len(), |end| end + 2);
            Lexeme::new(TokenKind::Str, len)
        }
        b'\'' => {
            let body = &rest[1..];
            let skip = usize::from(body.starts_with('\\'));
            let len = body[skip..]
                .char_indices()
                .skip(1)
                .find(|&(_, c)| c == '\'')
                .map_or(rest.len(), |(end, _)| end + skip + 2);
            Lexeme::new(TokenKind::Chr, len)
        }
        _ => match_number(lx, rest)?,
    };
    if lx.take_unsigned() {
        return Some(lexeme.with_flags(TokenFlags::UNSIGNED));
    }
    Some(lexeme)
}

fn match_number(lx: &mut Lexer, rest: &str) -> Option<Lexeme> {
    let sign = usize::from(rest.starts_with('-'));
    let body = &rest[sign..];
    if !body.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }

    if let Some(hex) = body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
        let digits = hex
            .find(|c: char| !c.is_ascii_hexdigit())
            .unwrap_or(hex.len());
        let len = sign + 2 + digits;
        if digits == 0 {
            lx.error(LexErrorKind::MalformedLiteral, &rest[..len]);
        }
        return Some(Lexeme::new(TokenKind::Hex, len).with_flags(TokenFlags::UNSIGNED));
    }

    let digits = body
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(body.len());
    let fraction = body[digits..]
        .strip_prefix('.')
        .map(|frac| frac.find(|c: char| !c.is_ascii_digit()).unwrap_or(frac.len()));
    if let Some(frac) = fraction {
        return Some(Lexeme::new(TokenKind::Flt, sign + digits + 1 + frac));
    }

    let len = sign + digits;
    if digits > 1 && body.starts_with('0') {
        if body[..digits].contains(['8', '9']) {
            lx.error(LexErrorKind::MalformedLiteral, &rest[..len]);
        }
        return Some(Lexeme::new(TokenKind::Oct, len).with_flags(TokenFlags::UNSIGNED));
    }
    Some(Lexeme::new(TokenKind::Dec, len))
}

fn match_unknown(lx: &mut Lexer, rest: &str) -> Option<Lexeme> {
    let len = rest
        .find(|c: char| c.is_whitespace() || UNKNOWN_STOPS.contains(c))
        .unwrap_or(rest.len());
    let kind = match lx.state.element {
        Some(ElementKind::Grammar) => TokenKind::SymbolGrammar,
        Some(ElementKind::Actions) => TokenKind::SymbolActions,
        _ => TokenKind::Unknown,
    };
    Some(Lexeme::new(kind, len))
}
