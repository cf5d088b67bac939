#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use pretty_assertions::assert_eq;
use tebnf_ir::Token;
use tebnf_ir::TokenKind::*;

fn kinds(source: &str) -> Vec<TokenKind> {
    lex(source).tokens.iter().map(|t| t.kind).collect()
}

fn find<'a>(output: &'a LexOutput, text: &str) -> &'a Token {
    output.tokens.iter().find(|t| t.text == text).unwrap()
}

#[test]
fn test_empty_source_has_eof() {
    let output = lex("");
    assert_eq!(output.tokens.iter().map(|t| t.kind).collect::<Vec<_>>(), vec![Eof]);
    assert!(!output.has_errors());
}

#[test]
fn test_comma_inside_range_is_delimiter() {
    assert_eq!(
        kinds("GRAMMAR @A\nlen = INT_8{0,10};\nEND"),
        vec![
            Grammar, ElementName, SymbolGrammar, Assign, Typed, RangeLeft, RangeValue, RangeDelim,
            RangeValue, RangeRight, Termination, End, Eof,
        ]
    );
}

#[test]
fn test_comma_between_terms_is_concatenation() {
    assert_eq!(
        kinds("GRAMMAR @A\na = INT_8, b = INT_8;\nEND"),
        vec![
            Grammar, ElementName, SymbolGrammar, Assign, Typed, Concat, SymbolGrammar, Assign,
            Typed, Termination, End, Eof,
        ]
    );
}

#[test]
fn test_range_value_keeps_original_kind() {
    let output = lex("GRAMMAR @A\npayload = BYTE{0, len};\nEND");
    let zero = find(&output, "0");
    assert_eq!(zero.kind, RangeValue);
    assert_eq!(zero.effective_kind(), Dec);
    let len = find(&output, "len");
    assert_eq!(len.kind, RangeValue);
    assert_eq!(len.effective_kind(), SymbolGrammar);
}

#[test]
fn test_open_range_shapes() {
    assert_eq!(
        kinds("GRAMMAR @A\nx = BYTE{,};\nEND")[4..8],
        [Typed, RangeLeft, RangeDelim, RangeRight]
    );
    assert_eq!(
        kinds("GRAMMAR @A\nx = BYTE{5,};\nEND")[4..9],
        [Typed, RangeLeft, RangeValue, RangeDelim, RangeRight]
    );
    assert_eq!(
        kinds("GRAMMAR @A\nx = BYTE{,10};\nEND")[4..9],
        [Typed, RangeLeft, RangeDelim, RangeValue, RangeRight]
    );
    let output = lex("GRAMMAR @A\nx = BYTE{$n,};\nEND");
    assert_eq!(find(&output, "$n").effective_kind(), StaticVar);
}

#[test]
fn test_comma_outside_grammar_is_concat() {
    assert_eq!(
        kinds("STATES @S\na, b\nEND")[2..5],
        [SymbolStateTable, Concat, SymbolStateTable]
    );
}

#[test]
fn test_member_access_folds_into_back_reference() {
    let output = lex("ACTIONS @Do\n$x = @Msg.len + 1;\nEND");
    let stream: Vec<_> = output.tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        stream,
        vec![
            Actions, ElementName, StaticVar, Assign, SymbolActions, Math, Dec, Termination, End,
            Eof,
        ]
    );
    let field = find(&output, "len");
    let owner = &output.tokens[field.accessed.unwrap()];
    assert_eq!(owner.text, "@Msg");
    assert_eq!(owner.kind, ElementNameAccessed);
}

#[test]
fn test_unsigned_prefix_is_consumed() {
    let output = lex("GRAMMAR @A\nx = UNSIGNED INT_16;\nEND");
    assert!(output.tokens.iter().all(|t| t.text != "UNSIGNED"));
    assert!(find(&output, "INT_16").is_unsigned());
    assert!(!lex("GRAMMAR @A\nx = INT_16;\nEND")
        .tokens
        .iter()
        .any(Token::is_unsigned));
}

#[test]
fn test_sized_type_keywords() {
    let output = lex("GRAMMAR @A\na = INT_STR_4, b = FLOAT_64, c = BIT, d = INTEGER;\nEND");
    assert_eq!(find(&output, "INT_STR_4").kind, Typed);
    assert_eq!(find(&output, "FLOAT_64").kind, Typed);
    assert_eq!(find(&output, "BIT").kind, Typed);
    assert_eq!(find(&output, "INTEGER").kind, SymbolGrammar);
}

#[test]
fn test_actions_signature_parameters() {
    let output = lex("ACTIONS @Do($a, $b)\n$a = $b;\nEND");
    let stream: Vec<_> = output.tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        stream,
        vec![
            Actions, ElementName, LeftParen, ActionsParam, ActionsParamDelim, ActionsParam,
            RightParen, StaticVar, Assign, StaticVar, Termination, End, Eof,
        ]
    );
    assert!(output.tokens.at(6).unwrap().is_last_signature());
}

#[test]
fn test_actions_without_parameters_marks_name() {
    let output = lex("ACTIONS @Do\n$a = 1;\nEND");
    assert!(find(&output, "@Do").is_last_signature());
}

#[test]
fn test_grammar_size_symbol() {
    assert_eq!(
        kinds("GRAMMAR @A = total;\nhead = INT_8;\nEND"),
        vec![
            Grammar, ElementName, Assign, SymbolGrammarSize, Termination, SymbolGrammar, Assign,
            Typed, Termination, End, Eof,
        ]
    );
}

#[test]
fn test_size_cast_parentheses() {
    let output = lex("GRAMMAR @A\nx = (INT_16);\nEND");
    let stream: Vec<_> = output.tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        stream,
        vec![
            Grammar, ElementName, SymbolGrammar, Assign, TypeCastLeft, Typed, TypeCastRight,
            Termination, End, Eof,
        ]
    );
    assert_eq!(find(&output, "(").effective_kind(), LeftParen);
}

#[test]
fn test_comments_are_collected_not_streamed() {
    let source = "# header\nGRAMMAR @A ## inline ##\n## opens\nstill comment\ncloses ##\nx = INT_8;\nEND";
    let output = lex(source);
    assert_eq!(
        output.tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
        vec![Grammar, ElementName, SymbolGrammar, Assign, Typed, Termination, End, Eof]
    );
    let comments: Vec<_> = output
        .comments
        .iter()
        .map(|c| (c.kind, c.text.as_str(), c.line))
        .collect();
    assert_eq!(
        comments,
        vec![
            (LineComment, "# header", 1),
            (BlockComment, "## inline ##", 2),
            (BlockComment, "## opens", 3),
            (BlockComment, "still comment", 4),
            (BlockComment, "closes ##", 5),
        ]
    );
}

#[test]
fn test_state_table_bar_is_delimiter() {
    assert_eq!(
        kinds("STATES @S\nidle | go | @In | busy | @Out | @In;\nEND")[3],
        StateTableDelim
    );
    assert_eq!(kinds("GRAMMAR @A\nx = 1 | 2;\nEND")[5], Or);
}

#[test]
fn test_io_type_only_in_io_elements() {
    assert_eq!(
        kinds("INPUT @In = CONSOLE\nname = INT_8 = \"Name?\";\nEND"),
        vec![
            Input, ElementName, Assign, IoType, SymbolConsole, Assign, Typed, Assign, Str,
            Termination, End, Eof,
        ]
    );
    assert_eq!(kinds("GRAMMAR @A = CONSOLE;\nEND")[3], SymbolGrammarSize);
}

#[test]
fn test_literal_kinds() {
    let output = lex("ACTIONS @Do\n$a = 0x1F + 017 + 1.5 + 'a' + \"hi\" + 42;\nEND");
    assert_eq!(find(&output, "0x1F").kind, Hex);
    assert!(find(&output, "0x1F").is_unsigned());
    assert_eq!(find(&output, "017").kind, Oct);
    assert!(find(&output, "017").is_unsigned());
    assert_eq!(find(&output, "1.5").kind, Flt);
    assert_eq!(find(&output, "'a'").kind, Chr);
    assert_eq!(find(&output, "\"hi\"").kind, Str);
    assert_eq!(find(&output, "42").kind, Dec);
    assert!(!output.has_errors());
}

#[test]
fn test_negative_literal_versus_subtraction() {
    let output = lex("ACTIONS @Do\n$x = -5;\n$y = $x -1;\nEND");
    assert_eq!(find(&output, "-5").kind, Dec);
    let texts: Vec<_> = output.tokens.iter().map(|t| t.text.as_str()).collect();
    assert!(texts.windows(3).any(|w| w == ["$x", "-", "1"]));
}

#[test]
fn test_malformed_literals_are_errors() {
    let output = lex("ACTIONS @Do\n$a = 0x;\n$b = 019;\nEND");
    let errors: Vec<_> = output
        .errors
        .iter()
        .map(|e| (e.kind, e.line, e.token.as_str()))
        .collect();
    assert_eq!(
        errors,
        vec![
            (LexErrorKind::MalformedLiteral, 2, "0x"),
            (LexErrorKind::MalformedLiteral, 3, "019"),
        ]
    );
}

#[test]
fn test_unbalanced_range_bracket() {
    let output = lex("GRAMMAR @A\nx = INT_8{0,10;\nEND");
    assert_eq!(
        output.errors,
        vec![LexError::new(LexErrorKind::MismatchedBrackets, 2, "{")]
    );
}

#[test]
fn test_stray_parenthesis() {
    let output = lex("ACTIONS @Do\n$x = 1);\nEND");
    assert_eq!(output.errors.len(), 1);
    assert_eq!(output.errors[0].kind, LexErrorKind::MismatchedParenthesis);
}

#[test]
fn test_line_numbers_follow_physical_lines() {
    let output = lex("GRAMMAR @A\n\npayload =\n  BYTE;\nEND");
    assert_eq!(find(&output, "payload").line, 3);
    assert_eq!(find(&output, "BYTE").line, 4);
    assert_eq!(find(&output, "END").line, 5);
}

#[test]
fn test_end_resets_context() {
    // after END, `x` is no longer a grammar symbol
    assert_eq!(kinds("GRAMMAR @A\nEND\nx")[3], Unknown);
}
