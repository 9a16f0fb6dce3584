//! Structured outcome of one reconciliation

use serde::Serialize;
use serde_json::{Map, Value};

use crate::request::SelectorKind;
use crate::runner::CommandOutcome;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciliationResult {
    pub success: bool,
    pub message: String,
    pub changed: bool,
    pub facts: Map<String, Value>,
}

impl ReconciliationResult {
    pub fn ok(message: impl Into<String>, changed: bool) -> Self {
        Self {
            success: true,
            message: message.into(),
            changed,
            facts: Map::new(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            changed: false,
            facts: Map::new(),
        }
    }

    pub fn with_selector(mut self, selector: &SelectorKind) -> Self {
        self.facts
            .insert(selector.key().to_string(), Value::from(selector.value()));
        self
    }

    /// Record the captured output of an external command
    pub fn with_outcome(mut self, outcome: &CommandOutcome) -> Self {
        self.facts
            .insert("stdout".to_string(), Value::from(outcome.stdout.as_str()));
        self.facts
            .insert("stderr".to_string(), Value::from(outcome.stderr.as_str()));
        self.facts
            .insert("exit_code".to_string(), Value::from(outcome.exit_code));
        self
    }

    pub fn fact(&self, key: &str) -> Option<&Value> {
        self.facts.get(key)
    }
}
