use crate::adapters::http::OutsetaClient;
use crate::app::{choose, millis_suffix, show};
use crate::core::plans::{self, PlanDraft};
use crate::domain::model::Plan;
use crate::domain::ports::Prompter;
use crate::utils::error::{OutsetaError, Result};
use crate::utils::prompt::input_validated;
use std::fmt;

const DEFAULT_MONTHLY_RATE: &str = "9.99";
const DEFAULT_TRIAL_DAYS: &str = "14";

#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "cli", derive(clap::Args))]
pub struct CreatePlanArgs {
    /// Plan family UID
    #[cfg_attr(feature = "cli", arg(long))]
    pub family: Option<String>,

    #[cfg_attr(feature = "cli", arg(long))]
    pub name: Option<String>,

    #[cfg_attr(feature = "cli", arg(long))]
    pub monthly_rate: Option<f64>,

    #[cfg_attr(feature = "cli", arg(long))]
    pub trial_days: Option<i64>,

    /// Create the plan inactive
    #[cfg_attr(feature = "cli", arg(long))]
    pub inactive: bool,
}

#[derive(Debug, Clone)]
pub struct CreatePlanOutcome {
    pub plan: Plan,
}

fn parse_rate(answer: &str) -> std::result::Result<f64, String> {
    match answer.trim().parse::<f64>() {
        Ok(rate) if rate.is_finite() && rate >= 0.0 => Ok(rate),
        _ => Err("Please enter a valid positive number".to_string()),
    }
}

fn parse_days(answer: &str) -> std::result::Result<i64, String> {
    match answer.trim().parse::<i64>() {
        Ok(days) if days >= 0 => Ok(days),
        _ => Err("Please enter a valid number of days".to_string()),
    }
}

pub async fn run<P>(client: &OutsetaClient, prompter: &mut P, args: CreatePlanArgs) -> Result<CreatePlanOutcome>
where
    P: Prompter + ?Sized,
{
    let plan_family_uid = match args.family {
        Some(uid) => uid,
        None => {
            prompter.notify("📦 Fetching plan families...");
            let families = plans::list_plan_families(client).await?;
            let family = choose(
                prompter,
                "Select a plan family:",
                &families,
                "No plan families found.",
                |family| format!("{} (UID: {})", show(&family.name), family.uid),
            )?;
            family.uid.clone()
        }
    };

    let name = match args.name {
        Some(name) => name,
        None => {
            let default_name = format!("Test Plan {}", millis_suffix());
            input_validated(prompter, "Plan Name:", Some(&default_name), |answer| {
                if answer.trim().is_empty() {
                    Err("Plan Name is required".to_string())
                } else {
                    Ok(())
                }
            })?
        }
    };

    let monthly_rate = match args.monthly_rate {
        Some(rate) => rate,
        None => {
            let answer = input_validated(prompter, "Monthly Rate:", Some(DEFAULT_MONTHLY_RATE), |answer| {
                parse_rate(answer).map(|_| ())
            })?;
            parse_rate(&answer).map_err(OutsetaError::validation)?
        }
    };

    let trial_period_days = match args.trial_days {
        Some(days) => days,
        None => {
            let answer = input_validated(prompter, "Trial Period Days:", Some(DEFAULT_TRIAL_DAYS), |answer| {
                parse_days(answer).map(|_| ())
            })?;
            parse_days(&answer).map_err(OutsetaError::validation)?
        }
    };

    let is_active = if args.inactive {
        false
    } else {
        prompter.confirm("Is Active?", true)?
    };

    let draft = PlanDraft {
        name,
        plan_family_uid,
        monthly_rate,
        trial_period_days,
        is_active,
    };

    tracing::info!("Creating plan...");
    let plan = plans::create_plan(client, &draft).await?;
    Ok(CreatePlanOutcome { plan })
}

impl fmt::Display for CreatePlanOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "🎉 Success! Plan created.")?;
        writeln!(f)?;
        writeln!(f, "   • Uid: {}", self.plan.uid)?;
        writeln!(f, "   • Name: {}", show(&self.plan.name))?;
        writeln!(f, "   • Monthly Rate: ${}", show(&self.plan.monthly_rate))?;
        writeln!(f, "   • Trial Period Days: {}", show(&self.plan.trial_period_days))?;
        write!(f, "   • Is Active: {}", show(&self.plan.is_active))
    }
}
