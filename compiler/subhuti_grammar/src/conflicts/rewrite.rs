//! Fix suggestions for left recursion.

use subhuti_parse::GrammarNode;

use crate::LeftRecursion;

/// `R -> β (α)*` for a direct left recursion `R -> R α | β`.
pub(crate) fn left_recursion_rewrite(rule: &str, body: &GrammarNode) -> Option<String> {
    let alternatives = match body {
        GrammarNode::Or(alternatives) => alternatives.as_slice(),
        other => std::slice::from_ref(other),
    };

    let mut bases = Vec::new();
    let mut tails = Vec::new();
    for alternative in alternatives {
        match self_prefixed_tail(rule, alternative) {
            Some(tail) if tail.is_empty() => {}
            Some(tail) => tails.push(tail),
            None => bases.push(alternative.clone()),
        }
    }
    if bases.is_empty() || tails.is_empty() {
        return None;
    }

    let base = one_or_choice(bases);
    let tail = one_or_choice(tails);
    let rewritten = GrammarNode::sequence(vec![base, GrammarNode::Many(Box::new(tail))]);
    Some(format!("{rule} -> {rewritten}"))
}

/// Generic advice when no mechanical rewrite applies.
pub(crate) fn cycle_advice(cycle: &LeftRecursion) -> String {
    format!(
        "break the cycle {} by making one of these rules consume a token before it recurses",
        cycle.chain.join(" -> ")
    )
}

/// What follows `rule` in an alternative that starts with it.
fn self_prefixed_tail(rule: &str, alternative: &GrammarNode) -> Option<GrammarNode> {
    match alternative {
        GrammarNode::Subrule(name) if *name == rule => Some(GrammarNode::empty()),
        GrammarNode::Sequence(nodes) => match nodes.split_first() {
            Some((GrammarNode::Subrule(name), rest)) if *name == rule => {
                Some(GrammarNode::sequence(rest.to_vec()))
            }
            _ => None,
        },
        _ => None,
    }
}

fn one_or_choice(mut nodes: Vec<GrammarNode>) -> GrammarNode {
    if nodes.len() == 1 {
        if let Some(node) = nodes.pop() {
            return node;
        }
    }
    GrammarNode::Or(nodes)
}
