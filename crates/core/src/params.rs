//! Pure helper functions for extracting typed parameters from a `serde_json::Value` object.
//!
//! Each helper takes a JSON value, a key name, and a default. If the key is
//! missing or the value is not the expected type, the default is returned.
//! These never fail, they always produce a usable value.

use serde_json::Value;

/// Extracts an `f32` from `params[name]`, returning `default` if missing or wrong type.
pub fn param_f32(params: &Value, name: &str, default: f32) -> f32 {
    params
        .get(name)
        .and_then(Value::as_f64)
        .map(|v| v as f32)
        .unwrap_or(default)
}

/// Extracts a `bool` from `params[name]`, returning `default` if missing or wrong type.
pub fn param_bool(params: &Value, name: &str, default: bool) -> bool {
    params.get(name).and_then(Value::as_bool).unwrap_or(default)
}

/// Extracts a `String` from `params[name]`, returning `default` if missing or wrong type.
pub fn param_string(params: &Value, name: &str, default: &str) -> String {
    params
        .get(name)
        .and_then(Value::as_str)
        .map(String::from)
        .unwrap_or_else(|| default.to_owned())
}

/// Extracts an array of numbers from `params[name]`.
///
/// Returns `None` if the key is missing, is not an array, or contains a
/// non-numeric element. The length is not checked.
pub fn param_f32_vec(params: &Value, name: &str) -> Option<Vec<f32>> {
    params
        .get(name)?
        .as_array()?
        .iter()
        .map(|v| v.as_f64().map(|f| f as f32))
        .collect()
}
