//! Parsing of parameter-tree text back into the tree data model.
//!
//! Parsing runs in two stages: a `nom` grammar produces a raw S-expression,
//! and a conversion pass enforces tree structure (named nodes, unique names,
//! one value per leaf). Malformed input never yields a partial tree.

use crate::error::DecodeError;
use lib_types::params::{ParamBranch, ParamNode, ParamTree, ParamValue};
use nom::{
    branch::alt,
    bytes::complete::{take_while, take_while1},
    character::complete::{char, multispace0},
    combinator::map,
    multi::many0,
    sequence::{delimited, preceded},
    IResult,
};

/// Raw S-expression node produced by the grammar.
#[derive(Clone, Debug)]
enum SExpr {
    /// Bare token (name or unquoted value).
    Atom(String),
    /// Double-quoted string.
    Quoted(String),
    /// Parenthesized list.
    List(Vec<SExpr>),
}

/// Parse parameter-tree text into a tree.
pub fn decode(text: &str) -> Result<ParamTree, DecodeError> {
    if text.trim().is_empty() {
        return Err(DecodeError::Empty);
    }
    check_delimiters(text)?;

    let (rest, expr) = preceded(multispace0, sexpr)(text)
        .map_err(|_| DecodeError::Malformed("unrecognized syntax at start of input".into()))?;

    let rest = rest.trim_start();
    if !rest.is_empty() {
        return Err(DecodeError::TrailingInput(snip(rest)));
    }

    build_tree(&expr)
}

/// Cheap pre-scan so paren and quote imbalances get a precise error instead
/// of a generic parse failure.
fn check_delimiters(text: &str) -> Result<(), DecodeError> {
    let mut depth: i64 = 0;
    let mut in_quote = false;

    for c in text.chars() {
        match c {
            '"' => in_quote = !in_quote,
            '(' if !in_quote => depth += 1,
            ')' if !in_quote => {
                depth -= 1;
                if depth < 0 {
                    return Err(DecodeError::Unbalanced);
                }
            }
            _ => {}
        }
    }

    if in_quote {
        return Err(DecodeError::UnterminatedString);
    }
    if depth != 0 {
        return Err(DecodeError::Unbalanced);
    }
    Ok(())
}

fn sexpr(input: &str) -> IResult<&str, SExpr> {
    alt((list, quoted, atom))(input)
}

fn list(input: &str) -> IResult<&str, SExpr> {
    map(
        delimited(
            char('('),
            many0(preceded(multispace0, sexpr)),
            preceded(multispace0, char(')')),
        ),
        SExpr::List,
    )(input)
}

fn quoted(input: &str) -> IResult<&str, SExpr> {
    map(
        delimited(char('"'), take_while(|c| c != '"'), char('"')),
        |s: &str| SExpr::Quoted(s.to_string()),
    )(input)
}

fn atom(input: &str) -> IResult<&str, SExpr> {
    map(
        take_while1(|c: char| !c.is_whitespace() && !matches!(c, '(' | ')' | '"')),
        |s: &str| SExpr::Atom(s.to_string()),
    )(input)
}

fn build_tree(expr: &SExpr) -> Result<ParamTree, DecodeError> {
    let items = match expr {
        SExpr::List(items) => items,
        _ => return Err(DecodeError::RootNotTree),
    };
    let (name, tail) = split_named(items)?;

    match build_node(tail)? {
        ParamNode::Branch(params) => Ok(ParamTree { name, params }),
        ParamNode::Leaf(_) => Err(DecodeError::RootNotTree),
    }
}

/// Split a list into its leading name atom and the remaining items.
fn split_named(items: &[SExpr]) -> Result<(String, &[SExpr]), DecodeError> {
    match items.split_first() {
        Some((SExpr::Atom(name), tail)) => Ok((name.clone(), tail)),
        Some(_) => Err(DecodeError::Malformed(
            "every parenthesized node must start with a name".into(),
        )),
        None => Err(DecodeError::Malformed("empty parenthesized node".into())),
    }
}

fn build_node(tail: &[SExpr]) -> Result<ParamNode, DecodeError> {
    match tail {
        [] => Ok(ParamNode::Branch(ParamBranch::new())),
        [SExpr::Atom(a)] => Ok(ParamNode::Leaf(classify_atom(a))),
        [SExpr::Quoted(q)] => Ok(ParamNode::Leaf(ParamValue::String(q.clone()))),
        _ if tail.iter().all(|e| matches!(e, SExpr::List(_))) => {
            let mut branch = ParamBranch::new();
            for item in tail {
                let items = match item {
                    SExpr::List(items) => items,
                    _ => unreachable!(),
                };
                let (name, sub) = split_named(items)?;
                if branch.get(&name).is_some() {
                    return Err(DecodeError::Malformed(format!(
                        "duplicate parameter name '{name}'"
                    )));
                }
                branch.set(name, build_node(sub)?);
            }
            Ok(ParamNode::Branch(branch))
        }
        _ => Err(DecodeError::Malformed(
            "a parameter holds either a single value or named subtrees".into(),
        )),
    }
}

/// Value classification for bare tokens: integer, then float, then string.
fn classify_atom(token: &str) -> ParamValue {
    if let Ok(i) = token.parse::<i64>() {
        ParamValue::Integer(i)
    } else if let Ok(f) = token.parse::<f64>() {
        ParamValue::Float(f)
    } else {
        ParamValue::String(token.to_string())
    }
}

fn snip(s: &str) -> String {
    s.chars().take(24).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_whitespace_tolerant() {
        let tree = decode("  ( example_tx\n  (tx_tap_units   27)\n\t(tx_tap_np1 4) )\n").unwrap();
        assert_eq!(tree.name, "example_tx");
        assert_eq!(
            tree.params.get("tx_tap_units").and_then(|n| n.as_value()),
            Some(&ParamValue::Integer(27))
        );
        assert_eq!(tree.params.len(), 2);
    }

    #[test]
    fn test_decode_quoted_string_with_spaces() {
        let tree = decode("(m (mode \"adaptive fast\"))").unwrap();
        assert_eq!(
            tree.params.get("mode").and_then(|n| n.as_value()),
            Some(&ParamValue::String("adaptive fast".to_string()))
        );
    }

    #[test]
    fn test_decode_bare_word_is_string() {
        let tree = decode("(m (enable True))").unwrap();
        assert_eq!(
            tree.params.get("enable").and_then(|n| n.as_value()),
            Some(&ParamValue::String("True".to_string()))
        );
    }

    #[test]
    fn test_empty_input_fails() {
        assert_eq!(decode(""), Err(DecodeError::Empty));
        assert_eq!(decode("  \n\t "), Err(DecodeError::Empty));
    }

    #[test]
    fn test_unbalanced_fails() {
        assert_eq!(decode("(m (a 1)"), Err(DecodeError::Unbalanced));
        assert_eq!(decode("(m (a 1)))"), Err(DecodeError::Unbalanced));
        assert_eq!(decode(")m("), Err(DecodeError::Unbalanced));
    }

    #[test]
    fn test_unterminated_string_fails() {
        assert_eq!(
            decode("(m (s \"oops))"),
            Err(DecodeError::UnterminatedString)
        );
    }

    #[test]
    fn test_trailing_input_fails() {
        assert!(matches!(
            decode("(m (a 1)) extra"),
            Err(DecodeError::TrailingInput(_))
        ));
    }

    #[test]
    fn test_root_must_be_tree() {
        assert_eq!(decode("foo"), Err(DecodeError::RootNotTree));
        assert_eq!(decode("(root 5)"), Err(DecodeError::RootNotTree));
    }

    #[test]
    fn test_mixed_children_fail() {
        assert!(matches!(
            decode("(m (a 1 (b 2)))"),
            Err(DecodeError::Malformed(_))
        ));
        assert!(matches!(
            decode("(m (a 1 2))"),
            Err(DecodeError::Malformed(_))
        ));
    }

    #[test]
    fn test_duplicate_names_fail() {
        assert!(matches!(
            decode("(m (a 1) (a 2))"),
            Err(DecodeError::Malformed(_))
        ));
    }

    #[test]
    fn test_atom_classification() {
        assert_eq!(classify_atom("27"), ParamValue::Integer(27));
        assert_eq!(classify_atom("-3"), ParamValue::Integer(-3));
        assert_eq!(classify_atom("0.5"), ParamValue::Float(0.5));
        assert_eq!(classify_atom("3.125e-12"), ParamValue::Float(3.125e-12));
        assert_eq!(
            classify_atom("example_tx"),
            ParamValue::String("example_tx".to_string())
        );
    }
}
