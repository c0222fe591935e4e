//! Usecases Layer - Acquisition Orchestration
//!
//! Wires the domain logic to the ports:
//! - `crumb`: the acquisition orchestrator with its singleflight guard
//! - `consent_flow`: the four-stage cookie-consent pipeline

pub mod consent_flow;
pub mod crumb;

pub use crumb::{CrumbService, CrumbServiceBuilder};
