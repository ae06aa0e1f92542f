//! Python driver
//!
//! Cells are parsed with the tree-sitter Python grammar. Only direct children
//! of the module are inspected, and only `name = <literal>` statements become
//! parameters. The grammar recovers from syntax it does not understand (IPython
//! magics, shell escapes), so a cell mixing parameters with other code still
//! yields its parameters.

mod literal;
mod repr;

pub use repr::python_repr;

use super::LanguageDriver;
use crate::parameter::{ParamValue, Parameter};
use std::collections::HashMap;
use tree_sitter::{Node, Parser, Tree};
use tracing::{trace, warn};

pub struct PythonDriver;

impl LanguageDriver for PythonDriver {
    fn name(&self) -> &str {
        "python"
    }

    fn aliases(&self) -> &[&str] {
        &["python3", "python2"]
    }

    fn extract_definitions(&self, source: &str) -> Vec<Parameter> {
        let Some(tree) = parse(source) else {
            return Vec::new();
        };

        let root = tree.root_node();
        let comments = line_comments(root, source);

        let statements: Vec<Node<'_>> = literal::operands(root);

        let mut params = Vec::new();
        for (idx, stmt) in statements.iter().copied().enumerate() {
            let Some((name, value)) = definition(stmt, source) else {
                trace!(
                    line = stmt.start_position().row + 1,
                    kind = stmt.kind(),
                    "Skipping statement that is not a literal assignment"
                );
                continue;
            };

            let row = stmt.start_position().row;
            // `a = 1; b = 2  # c` belongs to `b` only
            let shares_row = statements[idx + 1..]
                .iter()
                .any(|next| next.start_position().row == row);

            let mut param = Parameter::new(name, value);
            if !shares_row {
                param.comment = comments.get(&row).cloned();
            }
            params.push(param);
        }

        params
    }

    fn build_definitions(&self, params: &[Parameter], comments: bool) -> String {
        params
            .iter()
            .map(|p| {
                let value = p
                    .value
                    .as_ref()
                    .map(python_repr)
                    .unwrap_or_else(|| "None".to_string());
                let mut line = format!("{} = {}", p.name, value);

                if comments {
                    if let Some(comment) = p.comment.as_deref().and_then(single_line) {
                        line.push_str("  # ");
                        line.push_str(&comment);
                    }
                }
                line
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn parse(source: &str) -> Option<Tree> {
    let mut parser = Parser::new();
    if let Err(e) = parser.set_language(&tree_sitter_python::LANGUAGE.into()) {
        warn!("Failed to load Python grammar: {}", e);
        return None;
    }
    parser.parse(source, None)
}

/// `name = <literal>` with a bare identifier target and no annotation
fn definition(stmt: Node<'_>, source: &str) -> Option<(String, ParamValue)> {
    if stmt.kind() != "expression_statement" || stmt.has_error() {
        return None;
    }

    let mut operands = literal::operands(stmt).into_iter();
    let assignment = operands.next()?;
    if operands.next().is_some() || assignment.kind() != "assignment" {
        return None;
    }
    if assignment.child_by_field_name("type").is_some() {
        return None;
    }

    let target = assignment.child_by_field_name("left")?;
    if target.kind() != "identifier" {
        return None;
    }
    let name = target.utf8_text(source.as_bytes()).ok()?.to_string();
    let value = literal::evaluate(assignment.child_by_field_name("right")?, source)?;

    Some((name, value))
}

/// First comment on each line, keyed by zero-based row
fn line_comments(root: Node<'_>, source: &str) -> HashMap<usize, String> {
    let mut comments = HashMap::new();
    collect_comments(root, source, &mut comments);
    comments
}

fn collect_comments(node: Node<'_>, source: &str, comments: &mut HashMap<usize, String>) {
    if node.kind() == "comment" {
        if let Ok(text) = node.utf8_text(source.as_bytes()) {
            let body = text.strip_prefix('#').unwrap_or(text).trim();
            if !body.is_empty() {
                comments
                    .entry(node.start_position().row)
                    .or_insert_with(|| body.to_string());
            }
        }
        return;
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_comments(child, source, comments);
    }
}

/// Collapses a comment onto one line; `None` when nothing is left
fn single_line(comment: &str) -> Option<String> {
    let parts: Vec<&str> = comment
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameter::ParamType;

    fn extract(source: &str) -> Vec<Parameter> {
        PythonDriver.extract_definitions(source)
    }

    #[test]
    fn test_extract_scenario() {
        let params = extract("n = 50  # count\nname = 'abc'");

        assert_eq!(params.len(), 2);
        assert_eq!(params[0].name, "n");
        assert_eq!(params[0].ty, ParamType::Int);
        assert_eq!(params[0].value, Some(ParamValue::Int(50)));
        assert_eq!(params[0].comment.as_deref(), Some("count"));
        assert!(params[0].metadata.is_empty());

        assert_eq!(params[1].name, "name");
        assert_eq!(params[1].ty, ParamType::Str);
        assert_eq!(params[1].value, Some(ParamValue::Str("abc".into())));
        assert_eq!(params[1].comment, None);
    }

    #[test]
    fn test_skips_non_literal_statements() {
        let source = "\
import numpy as np
a = 1
b = np.zeros(3)
c = d = 2
e, f = 3, 4
g += 1
h: int = 5
def fn():
    inner = 6
i = f'{a}'
j = b'raw'
k = 2j
l = 'ok'
";
        let names: Vec<String> = extract(source).into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["a", "l"]);
    }

    #[test]
    fn test_duplicates_are_kept_in_order() {
        let params = extract("x = 1\ny = 2\nx = 3");
        let pairs: Vec<(&str, Option<&ParamValue>)> =
            params.iter().map(|p| (p.name.as_str(), p.value.as_ref())).collect();
        assert_eq!(
            pairs,
            vec![
                ("x", Some(&ParamValue::Int(1))),
                ("y", Some(&ParamValue::Int(2))),
                ("x", Some(&ParamValue::Int(3))),
            ]
        );
    }

    #[test]
    fn test_comment_handling() {
        let params = extract(
            "# heading comment\na = 1 #tight\nb = 2  #   padded   \nc = 3  #\nd = [\n  1,  # inner\n]\n",
        );

        assert_eq!(params.len(), 4);
        assert_eq!(params[0].comment.as_deref(), Some("tight"));
        assert_eq!(params[1].comment.as_deref(), Some("padded"));
        assert_eq!(params[2].comment, None);
        assert_eq!(params[3].comment, None);
    }

    #[test]
    fn test_comment_goes_to_last_statement_on_line() {
        let params = extract("a = 1; b = 2  # c
x = 3; print(x)  # trailing call");

        let comments: Vec<(&str, Option<&str>)> = params
            .iter()
            .map(|p| (p.name.as_str(), p.comment.as_deref()))
            .collect();
        assert_eq!(comments, vec![("a", None), ("b", Some("c")), ("x", None)]);

        let rebuilt = PythonDriver.build_definitions(&params, true);
        assert_eq!(rebuilt, "a = 1\nb = 2  # c\nx = 3");
    }

    #[test]
    fn test_comment_only_strips_first_marker() {
        let params = extract("a = 1  # #hash");
        assert_eq!(params[0].comment.as_deref(), Some("#hash"));
    }

    #[test]
    fn test_hash_inside_string_is_not_a_comment() {
        let params = extract("colour = '#ff0000'");
        assert_eq!(params[0].value, Some(ParamValue::Str("#ff0000".into())));
        assert_eq!(params[0].comment, None);
    }

    #[test]
    fn test_empty_source() {
        assert!(extract("").is_empty());
        assert!(extract("# only a comment\n").is_empty());
    }

    #[test]
    fn test_build_scenario() {
        let params = vec![
            Parameter::new("n", 75.into()).with_comment("count"),
            Parameter::new("name", "abc".into()),
        ];

        assert_eq!(
            PythonDriver.build_definitions(&params, true),
            "n = 75  # count\nname = 'abc'"
        );
        assert_eq!(
            PythonDriver.build_definitions(&params, false),
            "n = 75\nname = 'abc'"
        );
    }

    #[test]
    fn test_build_missing_value_and_multiline_comment() {
        let params = vec![
            Parameter::typed("x", ParamType::Int, None).with_comment("first\n  second"),
            Parameter::new("y", 1.into()).with_comment("   "),
        ];

        assert_eq!(
            PythonDriver.build_definitions(&params, true),
            "x = None  # first second\ny = 1"
        );
    }

    #[test]
    fn test_build_empty() {
        assert_eq!(PythonDriver.build_definitions(&[], true), "");
    }

    #[test]
    fn test_round_trip() {
        let params = vec![
            Parameter::new("count", 3.into()).with_comment("how many"),
            Parameter::new("ratio", (-0.25).into()),
            Parameter::new("big", 1e20.into()).with_comment("#tagged"),
            Parameter::new("label", "it's \"quoted\"\n\ttab \\ slash".into()),
            Parameter::new("flag", false.into()),
            Parameter::new("nothing", ParamValue::None),
            Parameter::new(
                "nested",
                ParamValue::List(vec![
                    1.into(),
                    ParamValue::Tuple(vec!["a".into()]),
                    ParamValue::Dict(vec![(ParamValue::Int(1), "é ☃".into())]),
                ]),
            ),
            Parameter::new("empty", ParamValue::Tuple(Vec::new())),
            Parameter::new("lowest", ParamValue::Int(i64::MIN)),
            Parameter::new("highest", ParamValue::Int(i64::MAX)),
        ];

        let source = PythonDriver.build_definitions(&params, true);
        let extracted = extract(&source);

        assert_eq!(extracted, params);
        let comments: Vec<Option<&str>> = extracted.iter().map(|p| p.comment.as_deref()).collect();
        let expected: Vec<Option<&str>> = params.iter().map(|p| p.comment.as_deref()).collect();
        assert_eq!(comments, expected);
    }

    #[test]
    fn test_aliases() {
        assert_eq!(PythonDriver.name(), "python");
        assert!(PythonDriver.aliases().contains(&"python3"));
    }
}
