//! Reconciler — converge one port, service or rich rule to the desired state
//!
//! Every call queries the live configuration first, then issues at most one
//! mutating command. Nothing is cached between calls.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::command::FirewallCommand;
use crate::config::QueryFailurePolicy;
use crate::error::EngineError;
use crate::params::Params;
use crate::query::{self, Existence};
use crate::request::{validate, DesiredState, ReconciliationRequest};
use crate::result::ReconciliationResult;
use crate::runner::CommandRunner;

pub struct Reconciler {
    runner: Arc<dyn CommandRunner>,
    query_failure: QueryFailurePolicy,
}

impl Reconciler {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            runner,
            query_failure: QueryFailurePolicy::default(),
        }
    }

    pub fn with_query_failure(mut self, policy: QueryFailurePolicy) -> Self {
        self.query_failure = policy;
        self
    }

    /// Validate raw parameters and reconcile. Invalid input becomes a failed
    /// result without touching the firewall.
    pub async fn run(
        &self,
        params: &Params,
        cancel: &CancellationToken,
    ) -> Result<ReconciliationResult, EngineError> {
        match validate(params) {
            Ok(request) => self.reconcile(&request, cancel).await,
            Err(e) => {
                warn!("Rejected request: {e}");
                Ok(ReconciliationResult::failed(e.to_string()))
            }
        }
    }

    pub async fn reconcile(
        &self,
        request: &ReconciliationRequest,
        cancel: &CancellationToken,
    ) -> Result<ReconciliationResult, EngineError> {
        let selector = request.selector();

        if cancel.is_cancelled() {
            return Err(EngineError::Cancelled);
        }

        let present = match query::check(self.runner.as_ref(), request, cancel).await? {
            Existence::Present => true,
            Existence::Absent => false,
            Existence::Unknown(outcome) => match self.query_failure {
                QueryFailurePolicy::AssumeAbsent => {
                    warn!(
                        "Could not read current state of {selector} (exit {}): {}; assuming absent",
                        outcome.exit_code,
                        outcome.stderr.trim()
                    );
                    false
                }
                QueryFailurePolicy::Fail => {
                    error!(
                        "Could not read current state of {selector} (exit {})",
                        outcome.exit_code
                    );
                    return Ok(ReconciliationResult::failed(format!(
                        "Failed to query current state of {selector}: {}",
                        outcome.stderr.trim()
                    ))
                    .with_selector(selector)
                    .with_outcome(&outcome));
                }
            },
        };

        let (command, action, done) = match request.desired_state() {
            DesiredState::Present => (FirewallCommand::add(request), "enable", "enabled"),
            DesiredState::Absent => (FirewallCommand::remove(request), "disable", "disabled"),
        };

        let converged = match request.desired_state() {
            DesiredState::Present => present,
            DesiredState::Absent => !present,
        };

        if converged {
            info!("{selector} already {done}, nothing to do");
            return Ok(
                ReconciliationResult::ok(format!("{selector} already {done}"), false)
                    .with_selector(selector),
            );
        }

        if cancel.is_cancelled() {
            return Err(EngineError::Cancelled);
        }

        let outcome = self.runner.run(&command, cancel).await?;

        if outcome.success() {
            info!("{selector} {done}");
            Ok(ReconciliationResult::ok(format!("{selector} {done}"), true)
                .with_selector(selector)
                .with_outcome(&outcome))
        } else {
            error!(
                "Failed to {action} {selector} (exit {}): {}",
                outcome.exit_code,
                outcome.stderr.trim()
            );
            Ok(ReconciliationResult::failed(format!(
                "Failed to {action} {selector}: {}",
                outcome.stderr.trim()
            ))
            .with_selector(selector)
            .with_outcome(&outcome))
        }
    }
}
