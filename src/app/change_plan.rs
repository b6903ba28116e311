use crate::adapters::http::OutsetaClient;
use crate::app::{choose, show};
use crate::core::accounts::{self, ACCOUNT_SEARCH_FIELDS};
use crate::core::plan_change::{change_plan, preview_plan_change, PlanChangeRequest};
use crate::core::plans::{self, strip_html};
use crate::domain::model::{Account, InvoicePreview, Plan, Subscription};
use crate::domain::ports::Prompter;
use crate::utils::error::{OutsetaError, Result};
use crate::utils::prompt::input_required;
use std::fmt;

#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "cli", derive(clap::Args))]
pub struct ChangePlanArgs {
    /// Look the account up by a person's email
    #[cfg_attr(feature = "cli", arg(long, conflicts_with = "account"))]
    pub email: Option<String>,

    /// Account UID (skips the email lookup)
    #[cfg_attr(feature = "cli", arg(long))]
    pub account: Option<String>,

    /// UID of the plan to move to
    #[cfg_attr(feature = "cli", arg(long))]
    pub plan: Option<String>,

    /// Only show the financial effect of the change
    #[cfg_attr(feature = "cli", arg(long))]
    pub preview: bool,

    #[cfg_attr(feature = "cli", arg(long))]
    pub start_immediately: bool,
}

#[derive(Debug, Clone)]
pub enum ChangePlanOutcome {
    Changed {
        account: Account,
        plan: Plan,
        subscription: Subscription,
    },
    Previewed {
        account: Account,
        plan: Plan,
        preview: InvoicePreview,
    },
}

fn account_label(account: &Account) -> String {
    let plan = match account.current_plan().and_then(|plan| plan.name.as_deref()) {
        Some(name) => format!(" - Current plan: {}", name),
        None => " - No active subscription".to_string(),
    };
    format!("{} (UID: {}){}", show(&account.name), account.uid, plan)
}

async fn select_account<P>(client: &OutsetaClient, prompter: &mut P, args: &ChangePlanArgs) -> Result<Account>
where
    P: Prompter + ?Sized,
{
    if let Some(account_uid) = &args.account {
        return accounts::fetch_account(client, account_uid, ACCOUNT_SEARCH_FIELDS).await;
    }

    let email = match &args.email {
        Some(email) => email.clone(),
        None => input_required(prompter, "Enter the user's email address:", "Email")?,
    };

    prompter.notify("🔍 Searching for accounts...");
    let mut found = accounts::find_accounts_by_email(client, &email).await?;

    match found.len() {
        0 => Err(OutsetaError::precondition(format!(
            "No accounts found for email: {}",
            email
        ))),
        1 => {
            let account = found.remove(0);
            prompter.notify(&format!("✅ Found account: {}", account_label(&account)));
            Ok(account)
        }
        count => {
            prompter.notify(&format!("📋 Found {} accounts for {}:", count, email));
            let account = choose(prompter, "Select an account:", &found, "", account_label)?;
            Ok(account.clone())
        }
    }
}

/// Plans the account can move to: every plan except the current one.
pub fn available_plans(plans: Vec<Plan>, account: &Account) -> Vec<Plan> {
    match account.current_plan() {
        Some(current) => plans.into_iter().filter(|plan| plan.uid != current.uid).collect(),
        None => plans,
    }
}

async fn select_plan<P>(
    client: &OutsetaClient,
    prompter: &mut P,
    account: &Account,
    plan_uid: Option<&str>,
) -> Result<Plan>
where
    P: Prompter + ?Sized,
{
    prompter.notify("📦 Fetching available plans...");
    let plans = plans::list_plans(client).await?;
    if plans.is_empty() {
        return Err(OutsetaError::precondition("No plans found."));
    }

    let available = available_plans(plans, account);
    if let Some(plan_uid) = plan_uid {
        return available
            .into_iter()
            .find(|plan| plan.uid == plan_uid)
            .ok_or_else(|| {
                OutsetaError::precondition(format!(
                    "Plan {} is not available for this account",
                    plan_uid
                ))
            });
    }

    let plan = choose(
        prompter,
        "Select a new plan:",
        &available,
        "No other plans available for upgrade/downgrade.",
        |plan| {
            let description = plan
                .description
                .as_deref()
                .map(|text| format!(" - {}", strip_html(text)))
                .unwrap_or_default();
            format!(
                "{} (UID: {}) - ${}/month{}",
                show(&plan.name),
                plan.uid,
                show(&plan.monthly_rate),
                description
            )
        },
    )?;
    Ok(plan.clone())
}

pub async fn run<P>(client: &OutsetaClient, prompter: &mut P, args: ChangePlanArgs) -> Result<ChangePlanOutcome>
where
    P: Prompter + ?Sized,
{
    let account = select_account(client, prompter, &args).await?;

    if account.current_subscription.is_none() {
        return Err(OutsetaError::precondition(format!(
            "Account \"{}\" does not have an active subscription to change.",
            account.name.as_deref().unwrap_or(&account.uid)
        )));
    }

    let plan = select_plan(client, prompter, &account, args.plan.as_deref()).await?;
    let request = PlanChangeRequest::new(account.uid.clone(), plan.uid.clone())
        .start_immediately(args.start_immediately);

    if args.preview {
        tracing::info!("Previewing subscription plan change...");
        let preview = preview_plan_change(client, &request).await?;
        return Ok(ChangePlanOutcome::Previewed {
            account,
            plan,
            preview,
        });
    }

    tracing::info!("Changing subscription plan...");
    let subscription = change_plan(client, &request).await?;
    Ok(ChangePlanOutcome::Changed {
        account,
        plan,
        subscription,
    })
}

impl fmt::Display for ChangePlanOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Changed {
                account,
                plan,
                subscription,
            } => {
                writeln!(f, "🎉 Success! Subscription plan changed.")?;
                writeln!(f)?;
                writeln!(f, "   Account: {}", show(&account.name))?;
                writeln!(f, "   Subscription UID: {}", subscription.uid)?;
                writeln!(f, "   New Plan: {}", show(&plan.name))?;
                write!(f, "   Monthly Rate: ${}", show(&plan.monthly_rate))
            }
            Self::Previewed {
                account,
                plan,
                preview,
            } => {
                writeln!(f, "🔎 Plan change preview (nothing was changed)")?;
                writeln!(f)?;
                writeln!(f, "   Account: {}", show(&account.name))?;
                writeln!(f, "   New Plan: {}", show(&plan.name))?;
                writeln!(f, "   Subtotal: {}", show(&preview.subtotal))?;
                writeln!(f, "   Tax: {}", show(&preview.tax))?;
                writeln!(f, "   Total: {}", show(&preview.total))?;
                writeln!(f, "   Balance: {}", show(&preview.balance))?;
                write!(f, "   Refunded: {}", show(&preview.refunded_amount))?;
                for item in &preview.invoice_line_items {
                    write!(
                        f,
                        "\n     - {}: {}",
                        show(&item.description),
                        show(&item.amount)
                    )?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_available_plans_excludes_current() {
        let account: Account = serde_json::from_value(json!({
            "Uid": "A1",
            "CurrentSubscription": {"Uid": "S1", "Plan": {"Uid": "P1", "Name": "Basic"}}
        }))
        .unwrap();
        let plans: Vec<Plan> = serde_json::from_value(json!([
            {"Uid": "P1", "Name": "Basic"},
            {"Uid": "P2", "Name": "Pro"}
        ]))
        .unwrap();

        let available = available_plans(plans, &account);
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].uid, "P2");
    }

    #[test]
    fn test_account_label() {
        let account: Account =
            serde_json::from_value(json!({"Uid": "A1", "Name": "Acme"})).unwrap();
        assert_eq!(account_label(&account), "Acme (UID: A1) - No active subscription");
    }
}
