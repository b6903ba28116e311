use crate::app::change_plan::ChangePlanArgs;
use crate::app::create_plan::CreatePlanArgs;
use crate::app::generate_jwt::GenerateJwtArgs;
use crate::app::register_account::RegisterAccountArgs;
use crate::app::track_usage::TrackUsageArgs;
use crate::app::verify_jwt::VerifyJwtArgs;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "outseta-demos")]
#[command(about = "Interactive demos for the Outseta REST API")]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Path to a TOML configuration file
    #[arg(short, long, global = true, env = super::ENV_CONFIG_PATH)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Verify a JWT access token against the JWK Set and/or the profile endpoint
    VerifyJwt(VerifyJwtArgs),

    /// Generate an access token for a person (server side only)
    #[command(alias = "auth-token")]
    GenerateJwt(GenerateJwtArgs),

    /// Register a new account with a primary contact on a plan
    RegisterAccount(RegisterAccountArgs),

    /// Change (or preview changing) an account's subscription plan
    ChangePlan(ChangePlanArgs),

    /// Record usage against a usage-billed add-on
    TrackUsage(TrackUsageArgs),

    /// Create a plan in a plan family
    CreatePlan(CreatePlanArgs),
}

impl Command {
    /// Prefix printed in front of the error when the command fails.
    pub fn failure_label(&self) -> &'static str {
        match self {
            Self::VerifyJwt(_) => "JWT verification failed",
            Self::GenerateJwt(_) => "Failed to generate token",
            Self::RegisterAccount(_) => "Registration failed",
            Self::ChangePlan(args) if args.preview => "Failed to preview plan change",
            Self::ChangePlan(_) => "Failed to change plan",
            Self::TrackUsage(_) => "Failed to record usage",
            Self::CreatePlan(_) => "Failed to create plan",
        }
    }
}
