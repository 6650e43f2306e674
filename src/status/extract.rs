//! Pulls a line status report out of a raw observation.

use serde_json::Value;

use crate::fetch::RawObservation;
use crate::status::normalize;

const SITUATION_KEYS: &[&str] = &["situacao", "situacaoAtual", "status"];
const LINE_KEYS: &[&str] = &["linha", "codigo", "line", "idLinha"];
const DESCRIPTION_KEYS: &[&str] = &["descricao", "mensagem", "detail"];

// Upper bound on visited JSON nodes; the payload shape is not under our
// control and the scan must terminate on pathological nesting.
const NODE_BUDGET: usize = 5000;

// Status phrases the public page is known to render, in normalized form.
const KNOWN_PHRASES: &[&str] = &[
    "operacao normal",
    "velocidade reduzida",
    "operacao parcial",
    "circulacao suspensa",
    "paralisada",
    "operacao encerrada",
];

/// Extracted status record for the monitored line at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub line: String,
    pub situation: String,
    pub description: String,
}

/// Searches a raw observation for the monitored line's status.
///
/// Returns `None` when no recognizable record is present; the caller treats
/// that as an unknown status, never as an error.
pub fn extract(raw: &RawObservation, line_code: &str) -> Option<StatusReport> {
    match raw {
        RawObservation::Json(value) => extract_from_json(value, line_code),
        RawObservation::Text(text) => extract_from_text(text, line_code),
    }
}

/// Iterative depth-first search for an object carrying a situation field,
/// optionally paired with a line identifier matching `line_code`.
///
/// serde_json keeps object keys sorted, so traversal order is deterministic
/// for a given payload.
fn extract_from_json(root: &Value, line_code: &str) -> Option<StatusReport> {
    let mut stack = vec![root];
    let mut visited = 0usize;

    while let Some(current) = stack.pop() {
        visited += 1;
        if visited > NODE_BUDGET {
            break;
        }
        match current {
            Value::Object(map) => {
                if let Some(report) = candidate_report(map, line_code) {
                    return Some(report);
                }
                for value in map.values() {
                    if value.is_object() || value.is_array() {
                        stack.push(value);
                    }
                }
            }
            Value::Array(items) => {
                for item in items {
                    if item.is_object() || item.is_array() {
                        stack.push(item);
                    }
                }
            }
            _ => {}
        }
    }
    None
}

fn candidate_report(
    map: &serde_json::Map<String, Value>,
    line_code: &str,
) -> Option<StatusReport> {
    let situation = SITUATION_KEYS
        .iter()
        .find_map(|key| map.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .filter(|s| !s.is_empty())?;

    // A line identifier, when present, must match. Without one the record
    // is accepted: line-scoped endpoints omit it.
    let line = LINE_KEYS
        .iter()
        .find_map(|key| map.get(*key))
        .map(scalar_to_string);
    if let Some(line) = &line {
        if line.trim() != line_code {
            return None;
        }
    }

    let description = DESCRIPTION_KEYS
        .iter()
        .find_map(|key| map.get(*key).and_then(Value::as_str))
        .unwrap_or("")
        .trim()
        .to_string();

    Some(StatusReport {
        line: line.unwrap_or_else(|| line_code.to_string()),
        situation: situation.to_string(),
        description,
    })
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Scans normalized page text for any known status phrase. No match means
/// the page changed shape; reporting nothing beats a false alert.
fn extract_from_text(text: &str, line_code: &str) -> Option<StatusReport> {
    let haystack = normalize(text);
    let phrase = KNOWN_PHRASES
        .iter()
        .find(|phrase| haystack.contains(*phrase))?;

    Some(StatusReport {
        line: line_code.to_string(),
        situation: (*phrase).to_string(),
        description: String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn json_obs(value: Value) -> RawObservation {
        RawObservation::Json(value)
    }

    #[test]
    fn finds_record_nested_in_lists_and_objects() {
        let payload = json!({
            "meta": {"generated": "2024-01-01"},
            "data": [
                {"linha": "8", "situacao": "Operação Normal"},
                {"linha": "11", "situacao": "Velocidade Reduzida", "descricao": "Trens circulam com maior intervalo"}
            ]
        });
        let report = extract(&json_obs(payload), "11").unwrap();
        assert_eq!(report.line, "11");
        assert_eq!(report.situation, "Velocidade Reduzida");
        assert_eq!(report.description, "Trens circulam com maior intervalo");
    }

    #[test]
    fn rejects_records_for_other_lines() {
        let payload = json!([{"linha": "8", "situacao": "Circulação Suspensa"}]);
        assert!(extract(&json_obs(payload), "11").is_none());
    }

    #[test]
    fn accepts_numeric_line_identifiers() {
        let payload = json!({"codigo": 11, "status": "Operação Parcial"});
        let report = extract(&json_obs(payload), "11").unwrap();
        assert_eq!(report.line, "11");
        assert_eq!(report.situation, "Operação Parcial");
    }

    #[test]
    fn accepts_line_implicit_records() {
        let payload = json!({"situacaoAtual": "Operação Normal", "mensagem": "sem ocorrências"});
        let report = extract(&json_obs(payload), "11").unwrap();
        assert_eq!(report.line, "11");
        assert_eq!(report.situation, "Operação Normal");
        assert_eq!(report.description, "sem ocorrências");
    }

    #[test]
    fn empty_situation_is_not_a_candidate() {
        let payload = json!({"linha": "11", "situacao": "  "});
        assert!(extract(&json_obs(payload), "11").is_none());
    }

    #[test]
    fn payload_without_status_yields_none() {
        let payload = json!({"data": [1, 2, 3], "info": {"x": true}});
        assert!(extract(&json_obs(payload), "11").is_none());
    }

    #[test]
    fn traversal_stops_at_the_node_budget() {
        let mut value = json!({"linha": "11", "situacao": "Velocidade Reduzida"});
        for _ in 0..(NODE_BUDGET + 100) {
            value = json!([value]);
        }
        assert!(extract(&json_obs(value), "11").is_none());
    }

    #[test]
    fn page_text_scan_matches_accented_phrases() {
        let text = "ServiceStatus  Linha 11 Coral: Operação Normal em toda a extensão.";
        let report = extract(&RawObservation::Text(text.to_string()), "11").unwrap();
        assert_eq!(report.situation, "operacao normal");
        assert_eq!(report.line, "11");
        assert!(report.description.is_empty());
    }

    #[test]
    fn page_text_without_known_phrase_yields_none() {
        let text = "Página em manutenção. Volte mais tarde.";
        assert!(extract(&RawObservation::Text(text.to_string()), "11").is_none());
    }
}
