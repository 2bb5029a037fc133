//! Layer merge
//!
//! Objects merge by key, arrays replace, scalars override. A `null` in an
//! overlay means "not set" and leaves the lower layer untouched, so CLI flags
//! that were not given can be passed through as `null`.

use serde_json::Value;

/// Merge `overlay` into `base` in place
pub fn deep_merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (_, Value::Null) => {}
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => {
                        if !overlay_value.is_null() {
                            base_map.insert(key, overlay_value);
                        }
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

/// Merge layers in precedence order (first is base, last wins)
pub fn merge_layers(layers: Vec<Value>) -> Value {
    let mut merged = Value::Object(serde_json::Map::new());
    for layer in layers {
        deep_merge(&mut merged, layer);
    }
    merged
}
