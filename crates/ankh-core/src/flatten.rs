//! Collapse nested mappings into dotted `key=value` settings
//!
//! Used to inject values as individual `--set` overrides instead of files.

use crate::value::Value;

/// Flatten a value into `a.b.c=value` pairs
///
/// Scalars render canonically: booleans as `true`/`false`, numbers in their
/// shortest round-trippable decimal form, strings verbatim. Nulls and
/// sequences have no single-setting form and are dropped.
pub fn flatten(value: &Value) -> Vec<String> {
    flatten_under(value, "")
}

/// Flatten with every emitted path rooted under `root` (e.g. `global`)
pub fn flatten_under<'a>(value: &'a Value, root: &'a str) -> Vec<String> {
    let mut path: Vec<&str> = if root.is_empty() {
        Vec::new()
    } else {
        root.split('.').collect()
    };
    let mut acc = Vec::new();
    collapse(value, &mut path, &mut acc);
    acc
}

fn collapse<'a>(value: &'a Value, path: &mut Vec<&'a str>, acc: &mut Vec<String>) {
    match value {
        Value::Mapping(map) => {
            for (key, child) in map {
                path.push(key);
                collapse(child, path, acc);
                path.pop();
            }
        }
        Value::Bool(b) => acc.push(format!("{}={}", path.join("."), b)),
        Value::Number(n) => acc.push(format!("{}={}", path.join("."), n)),
        Value::String(s) => acc.push(format!("{}={}", path.join("."), s)),
        Value::Null | Value::Sequence(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_flatten_nested() {
        let value = Value::from_yaml("a:\n  b: 1\n  c: true\n").unwrap();

        let pairs: HashSet<String> = flatten(&value).into_iter().collect();
        let expected: HashSet<String> = ["a.b=1", "a.c=true"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        assert_eq!(pairs, expected);
    }

    #[test]
    fn test_flatten_under_root() {
        let value = Value::from_yaml(
            r#"
region: us-east-1
cluster:
  name: prod-1
  nodes: 12
  ratio: 0.75
"#,
        )
        .unwrap();

        insta::assert_snapshot!(
            flatten_under(&value, "global").join(" "),
            @"global.region=us-east-1 global.cluster.name=prod-1 global.cluster.nodes=12 global.cluster.ratio=0.75"
        );
    }

    #[test]
    fn test_unsupported_leaves_are_dropped() {
        let value = Value::from_yaml(
            r#"
keep: yes
list: [1, 2]
empty: ~
nested:
  also_list: [a]
  flag: false
"#,
        )
        .unwrap();

        assert_eq!(flatten(&value), vec!["keep=yes", "nested.flag=false"]);
    }

    #[test]
    fn test_strings_are_verbatim() {
        let value = Value::from_yaml("dsn: \"user=a password=b\"\nversion: \"1.10\"\n").unwrap();

        assert_eq!(
            flatten(&value),
            vec!["dsn=user=a password=b", "version=1.10"]
        );
    }

    #[test]
    fn test_scalar_at_top_level() {
        assert_eq!(flatten(&Value::from("solo")), vec!["=solo"]);
        assert_eq!(flatten_under(&Value::from(2), "global"), vec!["global=2"]);
    }

    #[test]
    fn test_empty_mapping_yields_nothing() {
        assert!(flatten(&Value::mapping()).is_empty());
        assert!(flatten(&Value::Null).is_empty());
    }
}
