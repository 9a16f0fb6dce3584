//! Request validation — raw parameters to a typed `ReconciliationRequest`

use std::fmt;

use crate::error::ValidationError;
use crate::params::Params;

/// The single firewall object a request manages
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorKind {
    /// `<num>/<proto>`, e.g. `8080/tcp`
    Port(String),
    /// firewalld service name, e.g. `ssh`
    Service(String),
    /// Full rich-rule text, compared verbatim against the daemon's listing
    RichRule(String),
}

impl SelectorKind {
    /// Parameter (and fact) key for this selector
    pub fn key(&self) -> &'static str {
        match self {
            SelectorKind::Port(_) => "port",
            SelectorKind::Service(_) => "service",
            SelectorKind::RichRule(_) => "rich_rule",
        }
    }

    pub fn value(&self) -> &str {
        match self {
            SelectorKind::Port(v) | SelectorKind::Service(v) | SelectorKind::RichRule(v) => v,
        }
    }
}

impl fmt::Display for SelectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectorKind::Port(p) => write!(f, "port {p}"),
            SelectorKind::Service(s) => write!(f, "service {s}"),
            SelectorKind::RichRule(r) => write!(f, "rich rule '{r}'"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DesiredState {
    Present,
    Absent,
}

impl DesiredState {
    /// `enabled`/`present` map to `Present`; every other value is `Absent`
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("present") || raw.eq_ignore_ascii_case("enabled") {
            DesiredState::Present
        } else {
            DesiredState::Absent
        }
    }
}

/// A validated request. Only `validate` constructs one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationRequest {
    selector: SelectorKind,
    desired_state: DesiredState,
    permanent: bool,
    immediate: bool,
    zone: Option<String>,
}

impl ReconciliationRequest {
    pub fn selector(&self) -> &SelectorKind {
        &self.selector
    }

    pub fn desired_state(&self) -> DesiredState {
        self.desired_state
    }

    pub fn permanent(&self) -> bool {
        self.permanent
    }

    pub fn immediate(&self) -> bool {
        self.immediate
    }

    pub fn zone(&self) -> Option<&str> {
        self.zone.as_deref()
    }
}

/// Validate raw parameters. Pure: no external interaction.
pub fn validate(params: &Params) -> Result<ReconciliationRequest, ValidationError> {
    let desired_state = DesiredState::parse(params.get_required("state")?);

    let candidates = [
        params.get_optional("port").map(|v| SelectorKind::Port(v.to_string())),
        params
            .get_optional("service")
            .map(|v| SelectorKind::Service(v.to_string())),
        params
            .get_optional("rich_rule")
            .map(|v| SelectorKind::RichRule(v.to_string())),
    ];

    let mut provided = candidates.into_iter().flatten();
    let selector = match (provided.next(), provided.next()) {
        (Some(selector), None) => selector,
        (Some(_), Some(_)) => return Err(ValidationError::AmbiguousSelector),
        (None, _) => return Err(ValidationError::MissingSelector),
    };

    Ok(ReconciliationRequest {
        selector,
        desired_state,
        permanent: params.get_bool("permanent", false),
        immediate: params.get_bool("immediate", false),
        zone: params.get_optional("zone").map(str::to_string),
    })
}
