//! Compare command implementation.

use crate::Source;
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use std::process::Command;
use tracing::info;

/// Maximum number of differences listed in a report.
const MAX_DIFFERENCES: usize = 50;

/// Comparison result.
#[derive(Debug, Serialize)]
pub struct CompareReport {
    /// Command that produced the reference document.
    pub command: String,
    /// Whether both documents are equal as JSON values.
    pub equal: bool,
    /// JSON paths that differ.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub differences: Vec<String>,
}

/// Runs the compare command.
pub fn run(source: &Source, npc: &Path, args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let command = format!("{} {}", npc.display(), args.join(" "));
    info!("Comparing net state against {command}");

    let output = Command::new(npc).args(args).output()?;
    if !output.status.success() {
        return Err(format!(
            "{command} failed with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )
        .into());
    }
    let expected: Value = serde_json::from_slice(&output.stdout)?;
    let actual: Value = serde_json::from_str(&source.retrieve()?)?;

    let report = compare(command, &expected, &actual);
    println!("{}", serde_json::to_string_pretty(&report)?);

    if !report.equal {
        return Err("net state differs from npc output".into());
    }
    Ok(())
}

/// Compares two documents as JSON values.
pub fn compare(command: String, expected: &Value, actual: &Value) -> CompareReport {
    let mut differences = Vec::new();
    diff("$", expected, actual, &mut differences);
    CompareReport {
        command,
        equal: expected == actual,
        differences,
    }
}

fn diff(path: &str, expected: &Value, actual: &Value, out: &mut Vec<String>) {
    if out.len() >= MAX_DIFFERENCES || expected == actual {
        return;
    }
    match (expected, actual) {
        (Value::Object(expected), Value::Object(actual)) => {
            for (key, value) in expected {
                let child = format!("{path}.{key}");
                match actual.get(key) {
                    Some(other) => diff(&child, value, other, out),
                    None if out.len() < MAX_DIFFERENCES => out.push(format!("{child}: missing")),
                    None => return,
                }
            }
            for key in actual.keys().filter(|key| !expected.contains_key(*key)) {
                if out.len() >= MAX_DIFFERENCES {
                    return;
                }
                out.push(format!("{path}.{key}: unexpected"));
            }
        }
        (Value::Array(expected), Value::Array(actual)) if expected.len() == actual.len() => {
            for (index, (value, other)) in expected.iter().zip(actual).enumerate() {
                diff(&format!("{path}[{index}]"), value, other, out);
            }
        }
        (Value::Array(expected), Value::Array(actual)) => {
            out.push(format!(
                "{path}: length {} != {}",
                expected.len(),
                actual.len()
            ));
        }
        _ => out.push(format!("{path}: {expected} != {actual}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn formatting_is_ignored() {
        let expected: Value = serde_json::from_str("{ \"a\" : [1, 2] ,\"b\":{}}").unwrap();
        let actual: Value = serde_json::from_str(r#"{"b":{},"a":[1,2]}"#).unwrap();
        let report = compare("npc iface -j".into(), &expected, &actual);
        assert!(report.equal);
        assert!(report.differences.is_empty());
    }

    #[test]
    fn differences_are_listed() {
        let expected = json!({"lo": {"mtu": 65536, "state": "up"}, "routes": [1, 2]});
        let actual = json!({"lo": {"mtu": 1500}, "routes": [1], "extra": true});
        let report = compare("npc".into(), &expected, &actual);

        assert!(!report.equal);
        assert_eq!(
            report.differences,
            vec![
                "$.lo.mtu: 65536 != 1500",
                "$.lo.state: missing",
                "$.routes: length 2 != 1",
                "$.extra: unexpected",
            ]
        );
    }

    #[test]
    fn difference_list_is_bounded() {
        let expected = Value::Array((0..200).map(Value::from).collect());
        let actual = Value::Array((1..201).map(Value::from).collect());
        let report = compare("npc".into(), &expected, &actual);
        assert_eq!(report.differences.len(), MAX_DIFFERENCES);
    }
}
