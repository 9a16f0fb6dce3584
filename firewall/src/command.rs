//! firewall-cmd invocations
//!
//! A `FirewallCommand` is one call to the control executable: a verb flag
//! (`--list-ports`, `--add-rich-rule=...`, ...) followed by the optional
//! `--permanent`, `--immediate` and `--zone=<zone>` modifiers, in that order.

use std::fmt;

use crate::request::{ReconciliationRequest, SelectorKind};

/// Which object class a listing covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listing {
    Ports,
    Services,
    RichRules,
}

impl Listing {
    pub fn for_selector(selector: &SelectorKind) -> Self {
        match selector {
            SelectorKind::Port(_) => Listing::Ports,
            SelectorKind::Service(_) => Listing::Services,
            SelectorKind::RichRule(_) => Listing::RichRules,
        }
    }

    fn flag(self) -> &'static str {
        match self {
            Listing::Ports => "--list-ports",
            Listing::Services => "--list-services",
            Listing::RichRules => "--list-rich-rules",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verb {
    List(Listing),
    Add(SelectorKind),
    Remove(SelectorKind),
}

impl Verb {
    /// The verb token. `quote_rules` wraps rich-rule text in single quotes,
    /// as it appears in the rendered argument string.
    fn token(&self, quote_rules: bool) -> String {
        let (op, selector) = match self {
            Verb::List(listing) => return listing.flag().to_string(),
            Verb::Add(selector) => ("add", selector),
            Verb::Remove(selector) => ("remove", selector),
        };

        match selector {
            SelectorKind::Port(p) => format!("--{op}-port={p}"),
            SelectorKind::Service(s) => format!("--{op}-service={s}"),
            SelectorKind::RichRule(r) if quote_rules => format!("--{op}-rich-rule='{r}'"),
            SelectorKind::RichRule(r) => format!("--{op}-rich-rule={r}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirewallCommand {
    verb: Verb,
    permanent: bool,
    immediate: bool,
    zone: Option<String>,
}

impl FirewallCommand {
    /// Read-only listing for the request's selector kind. Only the zone is forwarded.
    pub fn list(request: &ReconciliationRequest) -> Self {
        Self {
            verb: Verb::List(Listing::for_selector(request.selector())),
            permanent: false,
            immediate: false,
            zone: request.zone().map(str::to_string),
        }
    }

    pub fn add(request: &ReconciliationRequest) -> Self {
        Self::mutating(Verb::Add(request.selector().clone()), request)
    }

    pub fn remove(request: &ReconciliationRequest) -> Self {
        Self::mutating(Verb::Remove(request.selector().clone()), request)
    }

    fn mutating(verb: Verb, request: &ReconciliationRequest) -> Self {
        Self {
            verb,
            permanent: request.permanent(),
            immediate: request.immediate(),
            zone: request.zone().map(str::to_string),
        }
    }

    pub fn verb(&self) -> &Verb {
        &self.verb
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

    pub fn is_mutating(&self) -> bool {
        !matches!(self.verb, Verb::List(_))
    }

    /// Argument vector handed to the executable. Rule text is passed
    /// unquoted, the way a shell would deliver the rendered string.
    pub fn args(&self) -> Vec<String> {
        self.tokens(false)
    }

    fn tokens(&self, quote_rules: bool) -> Vec<String> {
        let mut tokens = vec![self.verb.token(quote_rules)];
        if self.permanent {
            tokens.push("--permanent".to_string());
        }
        if self.immediate {
            tokens.push("--immediate".to_string());
        }
        if let Some(ref zone) = self.zone {
            tokens.push(format!("--zone={zone}"));
        }
        tokens
    }
}

impl fmt::Display for FirewallCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tokens(true).join(" "))
    }
}
