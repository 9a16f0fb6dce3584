//! Harness parameters — the string-keyed map a module invocation receives

use std::collections::HashMap;
use tracing::warn;

use crate::error::{ParamsError, ValidationError};

/// Raw parameters, keyed by name. A key mapped to `None` was passed as null.
#[derive(Debug, Clone, Default)]
pub struct Params {
    values: HashMap<String, Option<String>>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON object. Scalars are stringified, `null` stays absent.
    pub fn from_json(input: &[u8]) -> Result<Self, ParamsError> {
        if input.iter().all(|b| b.is_ascii_whitespace()) {
            return Ok(Self::new());
        }

        let value: serde_json::Value = serde_json::from_slice(input)?;
        let object = match value {
            serde_json::Value::Object(map) => map,
            _ => return Err(ParamsError::NotAnObject),
        };

        let values = object
            .into_iter()
            .map(|(key, value)| {
                let value = match value {
                    serde_json::Value::Null => None,
                    serde_json::Value::String(s) => Some(s),
                    other => Some(other.to_string()),
                };
                (key, value)
            })
            .collect();

        Ok(Self { values })
    }

    /// Parse `key=value` items, as given on a command line
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self, ParamsError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut params = Self::new();
        for pair in pairs {
            let pair = pair.as_ref();
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| ParamsError::BadPair(pair.to_string()))?;
            params.set(key, value);
        }
        Ok(params)
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), Some(value.to_string()));
    }

    pub fn get_required(&self, key: &str) -> Result<&str, ValidationError> {
        self.get_optional(key)
            .ok_or_else(|| ValidationError::MissingParameter(key.to_string()))
    }

    pub fn get_optional(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(|v| v.as_deref())
    }

    /// Read a boolean flag. Anything unparseable falls back to `default`.
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        let Some(raw) = self.get_optional(key) else {
            return default;
        };

        match parse_bool(raw) {
            Some(value) => value,
            None => {
                warn!("Ignoring malformed boolean {key}={raw:?}, using {default}");
                default
            }
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    let raw = raw.trim().to_ascii_lowercase();
    match raw.as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}
