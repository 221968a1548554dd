//! Flattened tabular projection of the nested report.
//!
//! Produces a single-row table: one column per leaf, named by the dotted
//! path down the object tree. List values stay in one cell as compact JSON.

use serde_json::Value;

/// Flattens a JSON value into `(dotted path, cell text)` pairs in document
/// order.
pub fn flatten(value: &Value) -> Vec<(String, String)> {
    let mut columns = Vec::new();
    walk(value, String::new(), &mut columns);
    columns
}

fn walk(value: &Value, path: String, out: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let child_path = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}.{key}")
                };
                walk(child, child_path, out);
            }
        }
        Value::String(s) => out.push((path, s.clone())),
        Value::Null => out.push((path, String::new())),
        // Arrays stay as one JSON cell; numbers and bools print plainly.
        other => out.push((path, other.to_string())),
    }
}

/// Renders the flattened columns as a two-line CSV: header then the single
/// row. Fields containing commas, quotes, or newlines are quoted with
/// internal quotes doubled.
pub fn to_csv(columns: &[(String, String)]) -> String {
    let header: Vec<String> = columns.iter().map(|(k, _)| escape(k)).collect();
    let row: Vec<String> = columns.iter().map(|(_, v)| escape(v)).collect();
    format!("{}\n{}\n", header.join(","), row.join(","))
}

fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_objects_flatten_to_dotted_paths() {
        let value = json!({
            "candidate_answer_evaluation": {
                "score": 4.0,
                "detailed_metrics": {"faithfulness": 0.8}
            }
        });
        let columns = flatten(&value);
        assert!(columns.contains(&(
            "candidate_answer_evaluation.score".to_string(),
            "4.0".to_string()
        )));
        assert!(columns.contains(&(
            "candidate_answer_evaluation.detailed_metrics.faithfulness".to_string(),
            "0.8".to_string()
        )));
    }

    #[test]
    fn test_lists_stay_in_one_cell_as_json() {
        let value = json!({"strengths": ["a", "b"]});
        let columns = flatten(&value);
        assert_eq!(columns[0].1, r#"["a","b"]"#);
    }

    #[test]
    fn test_null_becomes_empty_cell() {
        let value = json!({"summary": null});
        assert_eq!(flatten(&value)[0].1, "");
    }

    #[test]
    fn test_csv_is_header_plus_one_row() {
        let value = json!({"a": {"b": 1}, "c": "text"});
        let csv = to_csv(&flatten(&value));
        let lines: Vec<&str> = csv.trim_end().lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "a.b,c");
        assert_eq!(lines[1], "1,text");
    }

    #[test]
    fn test_columns_follow_document_order_not_alphabetical() {
        // Needs serde_json's preserve_order feature; without it the map
        // would iterate sorted and the projection would reorder columns.
        let value = json!({"zeta": 1, "alpha": {"m": 2, "b": 3}});
        let flattened = flatten(&value);
        let paths: Vec<&str> = flattened.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(paths, vec!["zeta", "alpha.m", "alpha.b"]);
    }

    #[test]
    fn test_csv_quotes_commas_and_doubles_quotes() {
        let value = json!({"justification": "good, but \"unproven\""});
        let csv = to_csv(&flatten(&value));
        assert!(csv.contains("\"good, but \"\"unproven\"\"\""));
    }
}
