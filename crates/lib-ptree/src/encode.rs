//! Serialization of parameter trees to the wire text format.

use crate::error::EncodeError;
use lib_types::params::{ParamBranch, ParamNode, ParamTree, ParamValue};
use std::fmt::Write;

/// Serialize a parameter tree to its parenthesized text form.
///
/// Names and string values are validated up front: the grammar has no escape
/// sequences, so a value containing a delimiter is rejected rather than
/// silently corrupting the stream.
pub fn encode(tree: &ParamTree) -> Result<String, EncodeError> {
    check_name(&tree.name)?;

    let mut out = String::new();
    out.push('(');
    out.push_str(&tree.name);
    encode_children(&mut out, &tree.params)?;
    out.push(')');
    Ok(out)
}

fn encode_children(out: &mut String, branch: &ParamBranch) -> Result<(), EncodeError> {
    for (name, node) in branch.iter() {
        out.push(' ');
        encode_node(out, name, node)?;
    }
    Ok(())
}

fn encode_node(out: &mut String, name: &str, node: &ParamNode) -> Result<(), EncodeError> {
    check_name(name)?;

    out.push('(');
    out.push_str(name);
    match node {
        ParamNode::Leaf(value) => {
            out.push(' ');
            push_value(out, value)?;
        }
        ParamNode::Branch(branch) => encode_children(out, branch)?,
    }
    out.push(')');
    Ok(())
}

fn push_value(out: &mut String, value: &ParamValue) -> Result<(), EncodeError> {
    match value {
        ParamValue::Integer(i) => {
            let _ = write!(out, "{i}");
        }
        ParamValue::Float(f) => out.push_str(&format_float(*f)),
        ParamValue::String(s) => {
            if !string_representable(s) {
                return Err(EncodeError::UnencodableString(s.clone()));
            }
            let _ = write!(out, "\"{s}\"");
        }
    }
    Ok(())
}

/// Format a float so it always reads back as a float.
///
/// A whole-valued f64 renders without a fraction ("4"), which would decode as
/// an integer; a trailing ".0" keeps the value kind stable across a
/// round trip.
fn format_float(v: f64) -> String {
    let s = format!("{v}");
    if !v.is_finite() || s.contains(|c| matches!(c, '.' | 'e' | 'E')) {
        s
    } else {
        format!("{s}.0")
    }
}

fn check_name(name: &str) -> Result<(), EncodeError> {
    let ok = !name.is_empty()
        && name
            .chars()
            .all(|c| !c.is_whitespace() && !matches!(c, '(' | ')' | '"' | '\0'));
    if ok {
        Ok(())
    } else {
        Err(EncodeError::InvalidName(name.to_string()))
    }
}

/// Quoted strings may contain whitespace but no grammar delimiters.
fn string_representable(s: &str) -> bool {
    s.chars().all(|c| !matches!(c, '(' | ')' | '"' | '\0'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lib_types::params::ParamNode;

    #[test]
    fn test_encode_shapes() {
        let mut tree = ParamTree::new("m");
        tree.params.set("i", ParamNode::leaf(3));
        tree.params.set("f", ParamNode::leaf(0.25));
        tree.params.set("s", ParamNode::leaf("hello world"));
        tree.params.set("empty", ParamNode::branch());

        assert_eq!(
            encode(&tree).unwrap(),
            "(m (i 3) (f 0.25) (s \"hello world\") (empty))"
        );
    }

    #[test]
    fn test_whole_float_keeps_fraction() {
        assert_eq!(format_float(4.0), "4.0");
        assert_eq!(format_float(-1.0), "-1.0");
        assert_eq!(format_float(1e-12), "1e-12");
        assert_eq!(format_float(0.5), "0.5");
    }

    #[test]
    fn test_rejects_delimiters_in_strings() {
        let mut tree = ParamTree::new("m");
        tree.params.set("bad", ParamNode::leaf("a(b)c"));
        assert!(matches!(
            encode(&tree),
            Err(EncodeError::UnencodableString(_))
        ));

        let mut tree = ParamTree::new("m");
        tree.params.set("bad", ParamNode::leaf("say \"hi\""));
        assert!(matches!(
            encode(&tree),
            Err(EncodeError::UnencodableString(_))
        ));
    }

    #[test]
    fn test_rejects_bad_names() {
        assert!(matches!(
            encode(&ParamTree::new("two words")),
            Err(EncodeError::InvalidName(_))
        ));
        assert!(matches!(
            encode(&ParamTree::new("")),
            Err(EncodeError::InvalidName(_))
        ));

        let mut tree = ParamTree::new("m");
        tree.params.set("a)b", ParamNode::leaf(1));
        assert!(matches!(encode(&tree), Err(EncodeError::InvalidName(_))));
    }
}
