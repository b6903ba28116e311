pub mod accounts;
pub mod orchestrator;
pub mod plan_change;
pub mod plans;
pub mod usage;
pub mod verifier;

pub use crate::domain::ports::{DependentCall, KeySetSource, Prompter};
pub use crate::utils::error::Result;
