use crate::adapters::http::OutsetaClient;
use crate::app::show;
use crate::core::usage::{record_usage, UsageRequest};
use crate::domain::model::UsageRecord;
use crate::domain::ports::Prompter;
use crate::utils::error::{OutsetaError, Result};
use crate::utils::prompt::{input_required, input_validated};
use std::fmt;

#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "cli", derive(clap::Args))]
pub struct TrackUsageArgs {
    /// Account UID
    #[cfg_attr(feature = "cli", arg(long))]
    pub account: Option<String>,

    /// Usage-billed add-on UID
    #[cfg_attr(feature = "cli", arg(long))]
    pub add_on: Option<String>,

    /// Usage amount (positive integer)
    #[cfg_attr(feature = "cli", arg(long))]
    pub amount: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct TrackUsageOutcome {
    pub record: UsageRecord,
}

pub fn parse_amount(answer: &str) -> std::result::Result<i64, String> {
    match answer.trim().parse::<i64>() {
        Ok(amount) if amount > 0 => Ok(amount),
        _ => Err("Please enter a valid positive number".to_string()),
    }
}

pub async fn run<P>(client: &OutsetaClient, prompter: &mut P, args: TrackUsageArgs) -> Result<TrackUsageOutcome>
where
    P: Prompter + ?Sized,
{
    let account_uid = match args.account {
        Some(uid) => uid,
        None => input_required(prompter, "Enter the Account UID:", "Account UID")?,
    };
    let add_on_uid = match args.add_on {
        Some(uid) => uid,
        None => input_required(prompter, "Enter the Add-on UID:", "Add-on UID")?,
    };
    let amount = match args.amount {
        Some(amount) => amount,
        None => {
            let answer = input_validated(prompter, "Enter the usage amount:", None, |answer| {
                parse_amount(answer).map(|_| ())
            })?;
            parse_amount(&answer).map_err(OutsetaError::validation)?
        }
    };

    tracing::info!("Recording usage...");
    let request = UsageRequest::new(account_uid, add_on_uid, amount);
    let record = record_usage(client, &request).await?;
    Ok(TrackUsageOutcome { record })
}

impl fmt::Display for TrackUsageOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "🎉 Success! Usage recorded.")?;
        writeln!(f)?;
        writeln!(f, "   • Uid: {}", show(&self.record.uid))?;
        writeln!(f, "   • Usage Date: {}", show(&self.record.usage_date))?;
        writeln!(f, "   • Amount: {}", show(&self.record.amount))?;
        writeln!(f, "   • Created: {}", show(&self.record.created))?;
        write!(f, "   • Updated: {}", show(&self.record.updated))
    }
}
