use super::*;
use subhuti_ir::Position;

fn span(start: usize, end: usize) -> Span {
    Span::new(Position::new(start, 1, 0), Position::new(end, 1, 0))
}

#[test]
fn builder_collects_everything() {
    let diag = Diagnostic::error(ErrorCode::E1001)
        .with_message("expected `Semicolon`")
        .with_label(span(3, 4), "here")
        .with_secondary_label(span(0, 1), "statement starts here")
        .with_note("while parsing `Statement`")
        .with_suggestion(Suggestion::text("add a `;`", 1));

    assert_eq!(diag.severity, Severity::Error);
    assert_eq!(diag.labels.len(), 2);
    assert_eq!(diag.primary_span(), Some(span(3, 4)));
    assert_eq!(diag.notes.len(), 1);
    assert_eq!(diag.suggestions.len(), 1);
    assert_eq!(diag.to_string(), "error[E1001]: expected `Semicolon`");
}

#[test]
fn suggestions_are_ordered_by_priority() {
    let diag = Diagnostic::error(ErrorCode::E1001).with_suggestions([
        Suggestion::text("long shot", 3),
        Suggestion::did_you_mean("return", span(0, 6)),
        Suggestion::text("plausible", 1),
    ]);
    let order: Vec<u8> = diag.suggestions.iter().map(|s| s.priority).collect();
    assert_eq!(order, vec![0, 1, 3]);
}

#[test]
fn insert_suggestion_is_empty_span() {
    let s = Suggestion::insert("add `)`", span(5, 9), ")");
    let replacement = s.replacement.as_ref().map(|r| (r.span.is_empty(), r.text.as_str()));
    assert_eq!(replacement, Some((true, ")")));
}

#[test]
fn fatal_counts_as_error() {
    assert!(Severity::Fatal.is_error());
    assert!(Severity::Error.is_error());
    assert!(!Severity::Warning.is_error());
    assert!(Diagnostic::fatal(ErrorCode::E2001).is_error());
    assert!(Severity::Fatal < Severity::Warning);
}
