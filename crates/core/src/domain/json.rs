// JSON helpers for read-modify-write updates

use serde_json::Value;

/// Deep-merge `right` into `left`
///
/// Objects merge key by key, arrays concatenate, anything else takes `right`.
pub fn combine_objects(left: Value, right: Value) -> Value {
    match (left, right) {
        (Value::Object(mut left), Value::Object(right)) => {
            for (key, value) in right {
                let merged = match left.remove(&key) {
                    Some(existing) => combine_objects(existing, value),
                    None => value,
                };
                left.insert(key, merged);
            }
            Value::Object(left)
        }
        (Value::Array(mut left), Value::Array(right)) => {
            left.extend(right);
            Value::Array(left)
        }
        (_, right) => right,
    }
}

/// Drop the entry with `log_id` from `logset.logs_info`
///
/// Returns whether an entry was removed.
pub fn remove_log_from_logset(logset: &mut Value, log_id: &str) -> bool {
    let Some(inner) = logset.get_mut("logset").and_then(Value::as_object_mut) else {
        return false;
    };

    let logs = match inner.get("logs_info").and_then(Value::as_array) {
        Some(logs) => logs.clone(),
        None => return false,
    };

    let before = logs.len();
    let kept: Vec<Value> = logs
        .into_iter()
        .filter(|log| log.get("id").and_then(Value::as_str) != Some(log_id))
        .collect();
    let removed = kept.len() != before;

    inner.insert("logs_info".to_string(), Value::Array(kept));
    removed
}
