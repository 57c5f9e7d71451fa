#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;

use super::*;
use crate::{ErrorCode, Suggestion};
use subhuti_ir::{Position, Span};

fn sample_diagnostic() -> Diagnostic {
    let start = Position::new(10, 1, 10);
    let end = Position::new(11, 1, 11);
    Diagnostic::error(ErrorCode::E1001)
        .with_message("expected `Semicolon`, found `Identifier`")
        .with_label(Span::new(start, end), "expected `Semicolon`")
        .with_note("while parsing Program > Statement")
        .with_suggestion(Suggestion::text("add a `;` before `y`", 1))
}

#[test]
fn render_without_source() {
    let text = render(&sample_diagnostic(), None);
    assert!(text.starts_with("error[E1001]: expected `Semicolon`"));
    assert!(text.contains("--> 1:11"));
    assert!(text.contains("= note: while parsing Program > Statement"));
    assert!(text.contains("= help: add a `;` before `y`"));
    assert!(!text.contains('\x1b'));
}

#[test]
fn render_with_snippet_places_caret() {
    let text = render(&sample_diagnostic(), Some("let x = 1 y\n"));
    let lines: Vec<&str> = text.lines().collect();
    let code_line = lines.iter().position(|l| l.contains("let x = 1 y")).unwrap();
    let caret_line = lines[code_line + 1];
    let bar = caret_line.find('|').unwrap();
    // "| " then ten spaces of indent then the caret
    assert_eq!(caret_line[bar + 2..].find('^'), Some(10));
}

#[test]
fn colored_output_uses_ansi() {
    let mut emitter = TerminalEmitter::with_color_mode(Vec::new(), ColorMode::Always, false);
    emitter.emit(&sample_diagnostic());
    let text = String::from_utf8(emitter.into_inner()).unwrap();
    assert!(text.contains("\x1b["));
    assert!(text.contains("E1001"));
}

#[test]
fn auto_mode_follows_tty() {
    assert!(ColorMode::Auto.should_use_colors(true));
    assert!(!ColorMode::Auto.should_use_colors(false));
    assert!(ColorMode::Always.should_use_colors(false));
    assert!(!ColorMode::Never.should_use_colors(true));
}

#[test]
fn summary_counts() {
    let mut emitter = TerminalEmitter::with_color_mode(Vec::new(), ColorMode::Never, false);
    emitter.emit_summary(2, 1);
    emitter.emit_summary(0, 1);
    emitter.emit_summary(0, 0);
    let text = String::from_utf8(emitter.into_inner()).unwrap();
    assert_eq!(
        text,
        "error: 2 errors; 1 warning emitted\nwarning: 1 warning emitted\n"
    );
}

#[test]
fn snippet_lines_follow_every_line_terminator() {
    let source = "first\rsecond\u{2028}third\r\nfourth";
    assert_eq!(source_line(source, 1), Some("first"));
    assert_eq!(source_line(source, 2), Some("second"));
    assert_eq!(source_line(source, 3), Some("third"));
    assert_eq!(source_line(source, 4), Some("fourth"));
    assert_eq!(source_line(source, 5), None);
    assert_eq!(source_line("one\n", 2), None);
}

#[test]
fn snippet_after_a_lone_carriage_return() {
    let source = "first\rsecond\u{2028}third\r\nfourth";
    let diag = Diagnostic::error(ErrorCode::E1001)
        .with_message("unexpected word")
        .with_label(
            Span::new(Position::new(15, 3, 0), Position::new(20, 3, 5)),
            "here",
        );
    assert_eq!(
        render(&diag, Some(source)),
        "error[E1001]: unexpected word\n  --> 3:1: here\n   |\n 3 | third\n   | ^^^^^ here\n"
    );
}
