//! Fix-it heuristics for syntax errors.
//!
//! Each heuristic looks at the farthest failure (what was expected, what was
//! found) and proposes at most one suggestion:
//! - a missing closing bracket or `;`, inserted after the last consumed token
//! - a misspelled keyword, by edit distance against expected keyword texts
//! - a reserved word used where an identifier was expected

use subhuti_diagnostic::Suggestion;
use subhuti_lexer::Lexer;

use super::Failure;

/// Largest edit distance still reported as a typo.
const MAX_TYPO_DISTANCE: usize = 2;

/// Levenshtein distance, counted in chars.
pub(crate) fn edit_distance(a: &str, b: &str) -> usize {
    let b_len = b.chars().count();
    if a.is_empty() {
        return b_len;
    }
    if b.is_empty() {
        return a.chars().count();
    }

    let mut prev: Vec<usize> = (0..=b_len).collect();
    let mut curr = vec![0; b_len + 1];
    for (i, ac) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, bc) in b.chars().enumerate() {
            let cost = usize::from(ac != bc);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b_len]
}

/// Source text of a token kind: the lexer's keyword text, else a guess from
/// conventional names.
fn token_text(name: &'static str, lexer: Option<&Lexer>) -> Option<&'static str> {
    if let Some(text) = lexer.and_then(|l| l.keyword_text(name)) {
        return Some(text);
    }
    match name {
        ")" | "]" | "}" | ";" => Some(name),
        "RParen" | "RightParen" | "CloseParen" => Some(")"),
        "RBracket" | "RightBracket" | "CloseBracket" => Some("]"),
        "RBrace" | "RightBrace" | "CloseBrace" => Some("}"),
        "Semicolon" => Some(";"),
        _ => None,
    }
}

fn is_word(text: &str) -> bool {
    text.chars().next().is_some_and(char::is_alphabetic)
        && text.chars().all(|c| c.is_alphanumeric() || c == '_')
}

pub(crate) fn suggestions(failure: &Failure, lexer: Option<&Lexer>) -> Vec<Suggestion> {
    let mut out = Vec::new();
    let texts: Vec<&'static str> = failure
        .expected
        .iter()
        .filter_map(|name| token_text(*name, lexer))
        .collect();

    if let Some(closer) = texts.iter().find(|t| matches!(**t, ")" | "]" | "}")) {
        out.push(Suggestion::insert(
            format!("missing closing `{closer}`"),
            failure.span,
            *closer,
        ));
    }
    if texts.contains(&";") {
        out.push(Suggestion::insert("missing `;`", failure.span, ";"));
    }

    if let Some(found) = &failure.found {
        if is_word(&found.value) {
            let typo = texts
                .iter()
                .filter(|t| is_word(t) && **t != found.value)
                .map(|t| (edit_distance(&found.value, t), *t))
                .filter(|(d, _)| *d <= MAX_TYPO_DISTANCE)
                .min();
            if let Some((_, keyword)) = typo {
                out.push(Suggestion::did_you_mean(keyword, found.span));
            }
        }

        let wants_identifier = failure.expected.iter().any(|n| n.contains("Identifier"));
        if wants_identifier && lexer.is_some_and(|l| l.is_reserved_word(found.name)) {
            out.push(Suggestion::text(
                format!(
                    "`{}` is a reserved word and cannot be used as an identifier",
                    found.value
                ),
                0,
            ));
        }
    }

    out.sort_by_key(|s| s.priority);
    out
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "tests use unwrap for brevity"
)]
mod tests;
