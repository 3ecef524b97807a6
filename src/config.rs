//! Typed key-value tuning blackboard
//!
//! Every gameplay constant (speeds, cooldowns, health, map roster) is looked
//! up by string key with a caller-supplied default, so a missing key is never
//! an error. Values are loaded from a JSON object.

use std::collections::HashMap;

use serde_json::Value;

/// String-keyed configuration blackboard
#[derive(Debug, Clone, Default)]
pub struct GameConfig {
    values: HashMap<String, Value>,
}

impl GameConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a JSON object document; non-object documents are rejected
    pub fn from_json_str(json: &str) -> Option<Self> {
        match serde_json::from_str::<Value>(json) {
            Ok(Value::Object(map)) => {
                let values = map.into_iter().collect();
                Some(Self { values })
            }
            Ok(_) => {
                log::warn!("Config document is not a JSON object, ignoring");
                None
            }
            Err(e) => {
                log::warn!("Failed to parse config JSON: {e}");
                None
            }
        }
    }

    /// Set a value directly (tests, debug overrides)
    pub fn set(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
    }

    pub fn get_f32(&self, key: &str, default: f32) -> f32 {
        match self.values.get(key) {
            Some(v) => v.as_f64().map(|f| f as f32).unwrap_or(default),
            None => default,
        }
    }

    pub fn get_i32(&self, key: &str, default: i32) -> i32 {
        match self.values.get(key) {
            Some(v) => v.as_i64().map(|i| i as i32).unwrap_or(default),
            None => default,
        }
    }

    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.values.get(key) {
            Some(v) => v.as_bool().unwrap_or(default),
            None => default,
        }
    }

    pub fn get_string(&self, key: &str, default: &str) -> String {
        match self.values.get(key) {
            Some(v) => v
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| default.to_string()),
            None => default.to_string(),
        }
    }

    /// List of strings; a missing or malformed key yields the default list
    pub fn get_string_list(&self, key: &str, default: &[&str]) -> Vec<String> {
        match self.values.get(key) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            _ => default.iter().map(|s| s.to_string()).collect(),
        }
    }
}
