use super::*;
use crate::Location;
use pretty_assertions::assert_eq;

fn error_at(code: ErrorCode, line: u32, msg: &str) -> Diagnostic {
    Diagnostic::error(code)
        .with_message(msg)
        .with_label(Location::new(line, "x"), "here")
}

#[test]
fn test_flush_sorts_by_line() {
    let mut queue = DiagnosticQueue::new();
    queue.add(error_at(ErrorCode::E2001, 9, "third"));
    queue.add(error_at(ErrorCode::E1001, 2, "first"));
    queue.add(error_at(ErrorCode::E2004, 5, "second"));

    let messages: Vec<_> = queue.flush().into_iter().map(|d| d.message).collect();
    assert_eq!(messages, vec!["first", "second", "third"]);
    assert!(queue.is_empty());
    assert_eq!(queue.error_count(), 0);
}

#[test]
fn test_same_code_same_line_deduplicated() {
    let mut queue = DiagnosticQueue::new();
    assert!(queue.add(error_at(ErrorCode::E0001, 4, "Mismatched brackets")));
    assert!(!queue.add(error_at(ErrorCode::E0001, 4, "Mismatched brackets")));
    assert!(queue.add(error_at(ErrorCode::E0002, 4, "Mismatched parenthesis")));
    assert_eq!(queue.error_count(), 2);
}

#[test]
fn test_unlocated_diagnostics_not_deduplicated() {
    let mut queue = DiagnosticQueue::new();
    assert!(queue.add(Diagnostic::error(ErrorCode::E2001).with_message("unable to resolve `a`")));
    assert!(queue.add(Diagnostic::error(ErrorCode::E2001).with_message("unable to resolve `b`")));
    assert_eq!(queue.error_count(), 2);
}

#[test]
fn test_error_limit() {
    let mut queue = DiagnosticQueue::with_config(DiagnosticConfig {
        error_limit: 2,
        deduplicate: false,
    });
    queue.add(error_at(ErrorCode::E1001, 1, "a"));
    queue.add(error_at(ErrorCode::E1001, 2, "b"));
    assert!(queue.limit_reached());
    assert!(!queue.add(error_at(ErrorCode::E1001, 3, "c")));

    // warnings are still accepted past the limit
    assert!(queue.add(Diagnostic::warning(ErrorCode::W4001).with_message("w")));
    assert_eq!(queue.warning_count(), 1);
}

#[test]
fn test_unlimited_config() {
    let mut queue = DiagnosticQueue::with_config(DiagnosticConfig::unlimited());
    for line in 0..50 {
        queue.add(error_at(ErrorCode::E1001, line, "same"));
    }
    assert_eq!(queue.error_count(), 50);
    assert!(!queue.limit_reached());
}
