//! Evaluation of Python literal expressions from tree-sitter nodes
//!
//! Anything outside the supported literal forms evaluates to `None`, which
//! makes the enclosing assignment invisible to extraction.

use crate::parameter::ParamValue;
use tree_sitter::Node;

/// Named children, minus comments
pub(super) fn operands(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    let children = node
        .named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect();
    children
}

pub(super) fn evaluate(node: Node<'_>, source: &str) -> Option<ParamValue> {
    match node.kind() {
        "integer" => parse_integer(text(node, source)?).map(ParamValue::Int),
        "float" => parse_float(text(node, source)?).map(ParamValue::Float),
        "true" => Some(ParamValue::Bool(true)),
        "false" => Some(ParamValue::Bool(false)),
        "none" => Some(ParamValue::None),
        "string" => parse_string(node, source).map(ParamValue::Str),
        "concatenated_string" => {
            let mut joined = String::new();
            for part in operands(node) {
                if part.kind() != "string" {
                    return None;
                }
                joined.push_str(&parse_string(part, source)?);
            }
            Some(ParamValue::Str(joined))
        }
        "unary_operator" => {
            let operator = node.child_by_field_name("operator")?;
            let argument = node.child_by_field_name("argument")?;
            // `-9223372036854775808` only fits once the sign is applied
            if operator.kind() == "-" && argument.kind() == "integer" {
                return parse_negative_integer(text(argument, source)?).map(ParamValue::Int);
            }
            let argument = evaluate(argument, source)?;
            match (operator.kind(), argument) {
                ("-", ParamValue::Int(i)) => i.checked_neg().map(ParamValue::Int),
                ("-", ParamValue::Float(f)) => Some(ParamValue::Float(-f)),
                ("+", v @ (ParamValue::Int(_) | ParamValue::Float(_))) => Some(v),
                _ => None,
            }
        }
        "parenthesized_expression" => match operands(node).as_slice() {
            [inner] => evaluate(*inner, source),
            _ => None,
        },
        "list" => elements(node, source).map(ParamValue::List),
        // `x = 1, 2` parses as a bare expression list
        "tuple" | "expression_list" => elements(node, source).map(ParamValue::Tuple),
        "dictionary" => {
            let mut pairs = Vec::new();
            for pair in operands(node) {
                if pair.kind() != "pair" {
                    return None;
                }
                let key = evaluate(pair.child_by_field_name("key")?, source)?;
                if !is_hashable(&key) {
                    return None;
                }
                let value = evaluate(pair.child_by_field_name("value")?, source)?;
                pairs.push((key, value));
            }
            Some(ParamValue::Dict(pairs))
        }
        _ => None,
    }
}

fn text<'a>(node: Node<'_>, source: &'a str) -> Option<&'a str> {
    node.utf8_text(source.as_bytes()).ok()
}

fn elements(node: Node<'_>, source: &str) -> Option<Vec<ParamValue>> {
    operands(node)
        .into_iter()
        .map(|child| evaluate(child, source))
        .collect()
}

fn is_hashable(value: &ParamValue) -> bool {
    match value {
        ParamValue::List(_) | ParamValue::Dict(_) => false,
        ParamValue::Tuple(items) => items.iter().all(is_hashable),
        _ => true,
    }
}

pub(super) fn parse_integer(literal: &str) -> Option<i64> {
    i64::try_from(parse_magnitude(literal)?).ok()
}

pub(super) fn parse_negative_integer(literal: &str) -> Option<i64> {
    i64::try_from(-i128::from(parse_magnitude(literal)?)).ok()
}

fn parse_magnitude(literal: &str) -> Option<u64> {
    if literal.ends_with(['j', 'J']) {
        return None;
    }
    let literal = literal.strip_suffix(['l', 'L']).unwrap_or(literal);
    let cleaned: String = literal.chars().filter(|c| *c != '_').collect();

    let (digits, radix) = match cleaned.get(..2) {
        Some("0x" | "0X") => (&cleaned[2..], 16),
        Some("0o" | "0O") => (&cleaned[2..], 8),
        Some("0b" | "0B") => (&cleaned[2..], 2),
        _ => {
            // Leading zeros are only legal for zero itself
            if cleaned.len() > 1 && cleaned.starts_with('0') && cleaned.bytes().any(|b| b != b'0') {
                return None;
            }
            (cleaned.as_str(), 10)
        }
    };

    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return None;
    }
    u64::from_str_radix(digits, radix).ok()
}

pub(super) fn parse_float(literal: &str) -> Option<f64> {
    if literal.ends_with(['j', 'J']) {
        return None;
    }
    let cleaned: String = literal.chars().filter(|c| *c != '_').collect();
    cleaned.parse::<f64>().ok()
}

/// Plain `str` literals only; bytes and f-strings are rejected
fn parse_string(node: Node<'_>, source: &str) -> Option<String> {
    let mut start = None;
    let mut end = None;
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "string_start" => start = Some(child),
            "string_end" => end = Some(child),
            "interpolation" => return None,
            _ => {}
        }
    }
    let (start, end) = (start?, end?);

    let opener = text(start, source)?;
    let prefix = opener
        .trim_end_matches(['\'', '"'])
        .to_ascii_lowercase();
    if prefix.contains(['f', 'b', 't']) {
        return None;
    }

    let body = source.get(start.end_byte()..end.start_byte())?;
    if prefix.contains('r') {
        Some(body.to_string())
    } else {
        unescape(body)
    }
}

/// Decodes Python string escapes. `None` for escapes Python would reject
/// and for named `\N{...}` escapes, which are not supported.
pub(super) fn unescape(body: &str) -> Option<String> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(next) = chars.next() else {
            out.push('\\');
            break;
        };
        match next {
            '\n' => {}
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'a' => out.push('\x07'),
            'b' => out.push('\x08'),
            'f' => out.push('\x0c'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'v' => out.push('\x0b'),
            '0'..='7' => {
                let mut code = next.to_digit(8)?;
                for _ in 0..2 {
                    match chars.peek().and_then(|c| c.to_digit(8)) {
                        Some(d) => {
                            code = code * 8 + d;
                            chars.next();
                        }
                        None => break,
                    }
                }
                out.push(char::from_u32(code)?);
            }
            'x' => out.push(hex_escape(&mut chars, 2)?),
            'u' => out.push(hex_escape(&mut chars, 4)?),
            'U' => out.push(hex_escape(&mut chars, 8)?),
            'N' => return None,
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }

    Some(out)
}

fn hex_escape(chars: &mut impl Iterator<Item = char>, len: usize) -> Option<char> {
    let mut code = 0u32;
    for _ in 0..len {
        code = code * 16 + chars.next()?.to_digit(16)?;
    }
    char::from_u32(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_integer() {
        assert_eq!(parse_integer("42"), Some(42));
        assert_eq!(parse_integer("0"), Some(0));
        assert_eq!(parse_integer("000"), Some(0));
        assert_eq!(parse_integer("1_000_000"), Some(1_000_000));
        assert_eq!(parse_integer("0xFF"), Some(255));
        assert_eq!(parse_integer("0o17"), Some(15));
        assert_eq!(parse_integer("0b1010"), Some(10));
        assert_eq!(parse_integer("10L"), Some(10));
        assert_eq!(parse_integer("0777"), None);
        assert_eq!(parse_integer("3j"), None);
        assert_eq!(parse_integer("99999999999999999999"), None);
        assert_eq!(parse_integer("9223372036854775808"), None);
    }

    #[test]
    fn test_parse_negative_integer() {
        assert_eq!(parse_negative_integer("7"), Some(-7));
        assert_eq!(parse_negative_integer("0"), Some(0));
        assert_eq!(parse_negative_integer("9223372036854775808"), Some(i64::MIN));
        assert_eq!(parse_negative_integer("0x8000000000000000"), Some(i64::MIN));
        assert_eq!(parse_negative_integer("9223372036854775809"), None);
        assert_eq!(parse_negative_integer("4j"), None);
    }

    #[test]
    fn test_parse_float() {
        assert_eq!(parse_float("1.5"), Some(1.5));
        assert_eq!(parse_float("1."), Some(1.0));
        assert_eq!(parse_float(".5"), Some(0.5));
        assert_eq!(parse_float("1e3"), Some(1000.0));
        assert_eq!(parse_float("1_0.2_5"), Some(10.25));
        assert_eq!(parse_float("2.5j"), None);
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape(r"a\nb").as_deref(), Some("a\nb"));
        assert_eq!(unescape(r"tab\there").as_deref(), Some("tab\there"));
        assert_eq!(unescape(r#"q\'\"\\"#).as_deref(), Some("q'\"\\"));
        assert_eq!(unescape(r"\x41é\U0001F600").as_deref(), Some("Aé😀"));
        assert_eq!(unescape(r"\101\0").as_deref(), Some("A\0"));
        assert_eq!(unescape("line\\\ncontinued").as_deref(), Some("linecontinued"));
        assert_eq!(unescape(r"\d").as_deref(), Some("\\d"));
        assert_eq!(unescape(r"\x4"), None);
        assert_eq!(unescape(r"\N{BULLET}"), None);
        assert_eq!(unescape(r"\ud800"), None);
    }
}
