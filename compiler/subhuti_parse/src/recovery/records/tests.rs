use subhuti_ir::{Position, Span, Token};

use super::*;

fn leaf(name: &'static str, value: &str, at: u32) -> CstNode {
    let end = at + value.len() as u32;
    let span = Span::new(
        Position::new(at as usize, 1, at),
        Position::new(end as usize, 1, end),
    );
    CstNode::leaf(&Token::new(name, value, span))
}

#[test]
fn failed_rule_spans_matched_children() {
    let mut records = RecordTree::default();
    let stmt = records.open("Statement", 0);
    let let_stmt = records.open("LetStmt", 0);
    records.leaf(leaf("Let", "let", 0), 0);
    records.leaf(leaf("Identifier", "b", 4), 1);
    let expr = records.open("Expression", 2);
    records.close(expr, 2, false);
    records.close(let_stmt, 0, false);
    records.close(stmt, 0, false);

    let (nodes, covered) = records.rebuild(0, None, 0, 3);
    assert_eq!(covered, 2);
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].name, "Statement");
    let inner = nodes[0].child(0).map(|n| n.name);
    assert_eq!(inner, Some("LetStmt"));
    assert_eq!(nodes[0].child(0).map(CstNode::child_count), Some(2));
}

#[test]
fn rebuild_picks_widest_attempt() {
    let mut records = RecordTree::default();
    let short = records.open("Short", 0);
    records.leaf(leaf("A", "a", 0), 0);
    records.close(short, 0, false);
    let long = records.open("Long", 0);
    records.leaf(leaf("A", "a", 0), 0);
    records.leaf(leaf("B", "b", 2), 1);
    records.close(long, 0, false);

    let (nodes, covered) = records.rebuild(0, None, 0, 5);
    assert_eq!(covered, 2);
    assert_eq!(nodes[0].name, "Long");
}

#[test]
fn rebuild_respects_bound_and_mark() {
    let mut records = RecordTree::default();
    records.leaf(leaf("A", "a", 0), 0);
    let mark = records.len();
    let rule = records.open("R", 1);
    records.leaf(leaf("B", "b", 2), 1);
    records.leaf(leaf("C", "c", 4), 2);
    records.close(rule, 1, false);

    let (nodes, covered) = records.rebuild(mark, None, 1, 2);
    assert_eq!(covered, 2);
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].child_count(), 1);

    let (nodes, covered) = records.rebuild(mark, None, 0, 5);
    assert!(nodes.is_empty());
    assert_eq!(covered, 0);
}
