//! aiOS firewall reconciler
//!
//! Converges a single firewalld object (port, service or rich rule) to a
//! desired state through `firewall-cmd`. Pipeline: raw params → validate →
//! existence check → at most one add/remove → structured result.

pub mod command;
pub mod config;
pub mod error;
pub mod params;
pub mod query;
pub mod reconcile;
pub mod request;
pub mod result;
pub mod runner;

pub use command::FirewallCommand;
pub use config::{FirewallConfig, QueryFailurePolicy};
pub use error::{EngineError, ParamsError, ValidationError};
pub use params::Params;
pub use reconcile::Reconciler;
pub use request::{validate, DesiredState, ReconciliationRequest, SelectorKind};
pub use result::ReconciliationResult;
pub use runner::{CommandOutcome, CommandRunner, FirewallCmd};
