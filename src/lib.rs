pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::{Cli, Command};

pub use adapters::{HttpKeySetSource, OutsetaClient};
pub use config::OutsetaConfig;
pub use core::orchestrator::Orchestrator;
pub use core::plan_change::{change_plan, preview_plan_change, PlanChangeRequest};
pub use core::usage::{record_usage, UsageRequest};
pub use core::verifier::{TokenVerifier, VerificationMethod, VerificationResult};
pub use utils::error::{OutsetaError, Result};
