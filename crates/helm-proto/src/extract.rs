//! Trigger-flag extraction from the remote poll response.
//!
//! The deployed producers never agreed on a key for the boolean, so the
//! consumer side carries an explicit, ordered fallback chain. The order is a
//! contract; do not reorder or collapse it without confirming which producer
//! is canonical:
//!
//! 1. `triggered` as a JSON bool — authoritative when present, including
//!    `false`.
//! 2. `value` — truthy: a bool, or a number other than zero.
//! 3. the caller-supplied variable name, same truthiness rule.
//! 4. any boolean `true` anywhere among the object's values.
//! 5. otherwise `false`. An unrecognized shape is never an error.

use serde_json::Value;

/// Apply the fallback chain to one poll response object.
pub fn extract_triggered(obj: &Value, variable_name: &str) -> bool {
    if let Some(b) = obj.get("triggered").and_then(Value::as_bool) {
        return b;
    }
    if let Some(v) = obj.get("value") {
        if let Some(b) = truthy(v) {
            return b;
        }
    }
    if let Some(v) = obj.get(variable_name) {
        if let Some(b) = truthy(v) {
            return b;
        }
    }
    if let Some(map) = obj.as_object() {
        if map.values().any(|v| v.as_bool() == Some(true)) {
            return true;
        }
    }
    false
}

fn truthy(v: &Value) -> Option<bool> {
    match v {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => Some(n.as_f64().map(|f| f != 0.0).unwrap_or(false)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn triggered_key_wins() {
        assert!(extract_triggered(&json!({"triggered": true}), "x"));
        // An explicit false stops the chain even when later keys say true.
        assert!(!extract_triggered(
            &json!({"triggered": false, "value": 1, "x": true}),
            "x"
        ));
    }

    #[test]
    fn value_key_nonzero_is_truthy() {
        assert!(extract_triggered(&json!({"value": 1}), "x"));
        assert!(extract_triggered(&json!({"value": true}), "x"));
        assert!(!extract_triggered(&json!({"value": 0}), "x"));
        assert!(!extract_triggered(&json!({"value": 0.0}), "x"));
    }

    #[test]
    fn named_variable_key() {
        assert!(extract_triggered(
            &json!({"start_navigation": 1}),
            "start_navigation"
        ));
        assert!(!extract_triggered(
            &json!({"start_navigation": false}),
            "start_navigation"
        ));
    }

    #[test]
    fn any_true_boolean_fallback() {
        assert!(extract_triggered(
            &json!({"status": "ok", "armed": true}),
            "start_navigation"
        ));
    }

    #[test]
    fn nothing_recognized_means_false_not_error() {
        assert!(!extract_triggered(&json!({"status": "ok"}), "x"));
        assert!(!extract_triggered(&json!([1, 2, 3]), "x"));
        assert!(!extract_triggered(&json!(null), "x"));
    }

    #[test]
    fn non_bool_triggered_falls_through() {
        // "triggered" must be a bool to be authoritative.
        assert!(extract_triggered(&json!({"triggered": "yes", "value": 1}), "x"));
    }
}
