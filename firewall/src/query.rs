//! Existence checks against firewall-cmd listing output
//!
//! `--list-ports` and `--list-services` print one line of space-separated
//! tokens; `--list-rich-rules` prints one rule per line. Membership is an
//! exact string match. Rule text is not normalized, so callers must pass
//! rules in the daemon's canonical form.

use tokio_util::sync::CancellationToken;

use crate::command::FirewallCommand;
use crate::error::EngineError;
use crate::request::{ReconciliationRequest, SelectorKind};
use crate::runner::{CommandOutcome, CommandRunner};

/// What a listing told us about the selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Existence {
    Present,
    Absent,
    /// The listing exited non-zero or wrote to stderr
    Unknown(CommandOutcome),
}

/// Run the listing for the request's selector kind and test membership
pub async fn check(
    runner: &dyn CommandRunner,
    request: &ReconciliationRequest,
    cancel: &CancellationToken,
) -> Result<Existence, EngineError> {
    let outcome = runner.run(&FirewallCommand::list(request), cancel).await?;
    Ok(interpret(request.selector(), outcome))
}

/// Interpret a listing outcome for `selector`
pub fn interpret(selector: &SelectorKind, outcome: CommandOutcome) -> Existence {
    if !outcome.success() || !outcome.stderr.is_empty() {
        return Existence::Unknown(outcome);
    }

    let found = match selector {
        SelectorKind::Port(token) | SelectorKind::Service(token) => {
            outcome.stdout.split_whitespace().any(|t| t == token)
        }
        SelectorKind::RichRule(rule) => outcome
            .stdout
            .lines()
            .any(|line| line.trim_end_matches('\r') == rule),
    };

    if found {
        Existence::Present
    } else {
        Existence::Absent
    }
}
