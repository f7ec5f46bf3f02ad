//! Recursive merge of YAML mappings.

use serde_yaml::Value;

/// Merge `overlay` into a copy of `base`.
///
/// Mappings are merged key by key, recursively. Any other overlay value
/// replaces the base value. A mapping merged onto a non-mapping starts from
/// an empty mapping.
pub fn deep_merge(base: &Value, overlay: &Value) -> Value {
    let Some(overlay_map) = overlay.as_mapping() else {
        return overlay.clone();
    };

    let mut result = match base {
        Value::Mapping(map) => map.clone(),
        _ => serde_yaml::Mapping::new(),
    };

    for (key, value) in overlay_map {
        let merged = if value.is_mapping() {
            let existing = result.get(key).cloned().unwrap_or(Value::Null);
            deep_merge(&existing, value)
        } else {
            value.clone()
        };
        result.insert(key.clone(), merged);
    }

    Value::Mapping(result)
}
