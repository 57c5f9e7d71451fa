use pretty_assertions::assert_eq;
use subhuti_ir::Position;

use super::*;

fn token(name: &'static str, value: &str, start: usize) -> Token {
    let start = Position::new(start, 1, u32::try_from(start).unwrap());
    Token::new(name, value, Span::new(start, start.advance(value)))
}

fn sample() -> CstNode {
    let a = token("Identifier", "a", 0);
    let plus = token("Plus", "+", 2);
    let b = token("Identifier", "b", 4);
    CstNode::with_children(
        "Expr",
        vec![
            CstNode::with_children("Term", vec![CstNode::leaf(&a)]),
            CstNode::leaf(&plus),
            CstNode::with_children("Term", vec![CstNode::leaf(&b)]),
        ],
    )
}

#[test]
fn empty_children_are_absent() {
    let node = CstNode::new("Empty");
    assert!(node.children().is_none());
    assert_eq!(node.child_count(), 0);
    assert!(!node.is_leaf());
    assert_eq!(sample().children().map(<[CstNode]>::len), Some(3));
}

#[test]
fn location_spans_first_to_last_child() {
    let expr = sample();
    let loc = expr.loc.unwrap();
    assert_eq!(loc.range(), 0..5);
    assert_eq!(expr.child(0).unwrap().loc.unwrap().range(), 0..1);
    assert!(CstNode::with_children("Nothing", vec![]).loc.is_none());
}

#[test]
fn queries() {
    let expr = sample();
    assert_eq!(expr.find_child("Plus").unwrap().value.as_deref(), Some("+"));
    assert!(expr.find_child("Missing").is_none());
    assert_eq!(expr.find_children("Term").count(), 2);
    assert_eq!(expr.tokens().len(), 3);
    assert_eq!(expr.text(), "a + b");
    assert_eq!(expr.size(), 6);
}

#[test]
fn error_nodes() {
    let skipped = [token("Semicolon", ";", 6)];
    let err = CstNode::error(vec![sample()], &skipped);
    assert!(err.is_error());
    assert_eq!(err.name, ERROR_NODE);
    assert_eq!(err.loc.unwrap().range(), 0..7);
    assert_eq!(err.text(), "a + b ;");

    let wrapper = CstNode::with_children("Program", vec![err]);
    assert!(wrapper.has_errors());
    assert!(!sample().has_errors());
}

#[test]
fn display_is_an_indented_tree() {
    let expected = "\
Expr
  Term
    Identifier \"a\"
  Plus \"+\"
  Term
    Identifier \"b\"
";
    assert_eq!(sample().to_string(), expected);
}
