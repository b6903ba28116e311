use crate::adapters::http::OutsetaClient;
use crate::app::{choose, millis_suffix, show};
use crate::core::accounts::{self, RegistrationRequest};
use crate::core::plans::{self, strip_html};
use crate::domain::model::Registration;
use crate::domain::ports::Prompter;
use crate::utils::error::Result;
use std::fmt;

#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "cli", derive(clap::Args))]
pub struct RegisterAccountArgs {
    /// Plan UID to subscribe the new account to
    #[cfg_attr(feature = "cli", arg(long))]
    pub plan: Option<String>,

    #[cfg_attr(feature = "cli", arg(long))]
    pub email: Option<String>,

    #[cfg_attr(feature = "cli", arg(long))]
    pub first_name: Option<String>,

    #[cfg_attr(feature = "cli", arg(long))]
    pub last_name: Option<String>,

    #[cfg_attr(feature = "cli", arg(long))]
    pub coffee_preference: Option<String>,

    #[cfg_attr(feature = "cli", arg(long))]
    pub account_name: Option<String>,

    #[cfg_attr(feature = "cli", arg(long))]
    pub account_mascot: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RegisterAccountOutcome {
    pub registration: Registration,
}

fn ask<P: Prompter + ?Sized>(
    prompter: &mut P,
    given: Option<String>,
    message: &str,
    default: &str,
) -> Result<String> {
    match given {
        Some(value) => Ok(value),
        None => prompter.input(message, Some(default)),
    }
}

pub async fn run<P>(
    client: &OutsetaClient,
    prompter: &mut P,
    args: RegisterAccountArgs,
) -> Result<RegisterAccountOutcome>
where
    P: Prompter + ?Sized,
{
    let plan_uid = match args.plan {
        Some(plan_uid) => plan_uid,
        None => {
            let plans = plans::list_plans(client).await?;
            let plan = choose(prompter, "Select a plan:", &plans, "No plans found.", |plan| {
                format!(
                    "{} (UID: {}) - {}",
                    show(&plan.name),
                    plan.uid,
                    plan.description.as_deref().map(strip_html).unwrap_or_default()
                )
            })?;
            plan.uid.clone()
        }
    };

    prompter.notify("👤 Enter Person details:");
    let default_email = format!("jane+{}@example.com", millis_suffix());
    let email = ask(prompter, args.email, "Email:", &default_email)?;
    let first_name = ask(prompter, args.first_name, "First Name:", "Jane")?;
    let last_name = ask(prompter, args.last_name, "Last Name:", "Doe")?;
    let coffee_preference = ask(prompter, args.coffee_preference, "Coffee Preference:", "Latte")?;

    prompter.notify("🏢 Enter Account details:");
    let account_name = ask(prompter, args.account_name, "Name:", "Acme Inc")?;
    let account_mascot = ask(prompter, args.account_mascot, "Mascot:", "Roadrunner")?;

    let request = RegistrationRequest {
        plan_uid,
        email,
        first_name,
        last_name,
        coffee_preference,
        account_name,
        account_mascot,
    };

    tracing::info!("Registering user...");
    let registration = accounts::register_account(client, &request).await?;
    Ok(RegisterAccountOutcome { registration })
}

impl fmt::Display for RegisterAccountOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let contact = self.registration.primary_contact.clone().unwrap_or_default();

        writeln!(
            f,
            "📮 A confirmation email has been sent to the user. They must follow the link in the email to set their password and activate their account before logging in."
        )?;
        writeln!(f)?;
        writeln!(f, "   • Email: {}", show(&contact.email))?;
        writeln!(f, "   • First Name: {}", show(&contact.first_name))?;
        writeln!(f, "   • Last Name: {}", show(&contact.last_name))?;
        writeln!(f, "   • Coffee Preference: {}", show(&contact.coffee_preference))?;
        writeln!(f, "   • Company Name: {}", show(&self.registration.name))?;
        writeln!(f, "   • Company Mascot: {}", show(&self.registration.mascot))?;
        writeln!(f)?;
        write!(
            f,
            "ℹ️ You may generate a token on their behalf in a server side environment (even before they have set their password), see the generate-jwt command."
        )
    }
}
