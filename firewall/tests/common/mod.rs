//! In-memory stand-in for firewalld, driven through `CommandRunner`

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

use aios_firewall::command::{Listing, Verb};
use aios_firewall::{
    CommandOutcome, CommandRunner, EngineError, FirewallCommand, Params, Reconciler,
    ReconciliationResult, SelectorKind,
};

const DEFAULT_ZONE: &str = "public";

#[derive(Default)]
struct Zone {
    ports: Vec<String>,
    services: Vec<String>,
    rich_rules: Vec<String>,
}

#[derive(Default)]
struct State {
    zones: HashMap<String, Zone>,
    known_zones: HashSet<String>,
    commands: Vec<String>,
    listing_failure: Option<(i32, String)>,
    mutation_failure: Option<(i32, String)>,
}

#[derive(Clone, Default)]
pub struct FakeFirewall {
    state: Arc<Mutex<State>>,
}

impl FakeFirewall {
    pub fn new() -> Self {
        let fw = Self::default();
        fw.add_zone(DEFAULT_ZONE);
        fw
    }

    pub fn add_zone(&self, zone: &str) {
        self.state.lock().unwrap().known_zones.insert(zone.to_string());
    }

    pub fn seed(&self, zone: &str, selector: SelectorKind) {
        let mut state = self.state.lock().unwrap();
        state.known_zones.insert(zone.to_string());
        let entry = state.zones.entry(zone.to_string()).or_default();
        let (list, value) = bucket(entry, &selector);
        list.push(value);
    }

    pub fn contains(&self, zone: &str, selector: &SelectorKind) -> bool {
        let mut state = self.state.lock().unwrap();
        let entry = state.zones.entry(zone.to_string()).or_default();
        let (list, value) = bucket(entry, selector);
        list.contains(&value)
    }

    pub fn fail_listings(&self, exit_code: i32, stderr: &str) {
        self.state.lock().unwrap().listing_failure = Some((exit_code, stderr.to_string()));
    }

    pub fn fail_mutations(&self, exit_code: i32, stderr: &str) {
        self.state.lock().unwrap().mutation_failure = Some((exit_code, stderr.to_string()));
    }

    pub fn commands(&self) -> Vec<String> {
        self.state.lock().unwrap().commands.clone()
    }

    pub fn mutating_commands(&self) -> Vec<String> {
        self.commands()
            .into_iter()
            .filter(|c| !c.starts_with("--list-"))
            .collect()
    }

    pub fn reconciler(&self) -> Reconciler {
        Reconciler::new(Arc::new(self.clone()))
    }

    pub async fn apply(&self, pairs: &[&str]) -> ReconciliationResult {
        let params = Params::from_pairs(pairs).unwrap();
        self.reconciler()
            .run(&params, &CancellationToken::new())
            .await
            .unwrap()
    }
}

fn bucket<'a>(zone: &'a mut Zone, selector: &SelectorKind) -> (&'a mut Vec<String>, String) {
    match selector {
        SelectorKind::Port(p) => (&mut zone.ports, p.clone()),
        SelectorKind::Service(s) => (&mut zone.services, s.clone()),
        SelectorKind::RichRule(r) => (&mut zone.rich_rules, r.clone()),
    }
}

fn reply(exit_code: i32, stdout: String, stderr: String) -> CommandOutcome {
    CommandOutcome {
        exit_code,
        stdout,
        stderr,
    }
}

#[async_trait]
impl CommandRunner for FakeFirewall {
    async fn run(
        &self,
        command: &FirewallCommand,
        cancel: &CancellationToken,
    ) -> Result<CommandOutcome, EngineError> {
        if cancel.is_cancelled() {
            return Err(EngineError::Cancelled);
        }

        let mut state = self.state.lock().unwrap();
        state.commands.push(command.to_string());

        let zone_name = command.zone().unwrap_or(DEFAULT_ZONE).to_string();
        if !state.known_zones.contains(&zone_name) {
            return Ok(reply(112, String::new(), format!("INVALID_ZONE: {zone_name}")));
        }

        match command.verb() {
            Verb::List(listing) => {
                if let Some((code, stderr)) = state.listing_failure.clone() {
                    return Ok(reply(code, String::new(), stderr));
                }
                let zone = state.zones.entry(zone_name).or_default();
                let stdout = match listing {
                    Listing::Ports => format!("{}\n", zone.ports.join(" ")),
                    Listing::Services => format!("{}\n", zone.services.join(" ")),
                    Listing::RichRules => zone
                        .rich_rules
                        .iter()
                        .map(|r| format!("{r}\n"))
                        .collect(),
                };
                Ok(reply(0, stdout, String::new()))
            }
            Verb::Add(selector) => {
                if let Some((code, stderr)) = state.mutation_failure.clone() {
                    return Ok(reply(code, String::new(), stderr));
                }
                let zone = state.zones.entry(zone_name).or_default();
                let (list, value) = bucket(zone, selector);
                if list.contains(&value) {
                    return Ok(reply(0, "Warning: ALREADY_ENABLED\nsuccess\n".into(), String::new()));
                }
                list.push(value);
                Ok(reply(0, "success\n".into(), String::new()))
            }
            Verb::Remove(selector) => {
                if let Some((code, stderr)) = state.mutation_failure.clone() {
                    return Ok(reply(code, String::new(), stderr));
                }
                let zone = state.zones.entry(zone_name).or_default();
                let (list, value) = bucket(zone, selector);
                list.retain(|v| v != &value);
                Ok(reply(0, "success\n".into(), String::new()))
            }
        }
    }
}
