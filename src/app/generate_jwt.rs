use crate::adapters::http::OutsetaClient;
use crate::app::show;
use crate::core::accounts;
use crate::domain::model::TokenResponse;
use crate::domain::ports::Prompter;
use crate::utils::error::Result;
use crate::utils::prompt::input_required;
use std::fmt;

const TOKEN_PREVIEW_CHARS: usize = 40;

#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "cli", derive(clap::Args))]
pub struct GenerateJwtArgs {
    /// Email of the person to log in
    #[cfg_attr(feature = "cli", arg(long))]
    pub email: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GenerateJwtOutcome {
    pub token: TokenResponse,
}

pub async fn run<P>(client: &OutsetaClient, prompter: &mut P, args: GenerateJwtArgs) -> Result<GenerateJwtOutcome>
where
    P: Prompter + ?Sized,
{
    let email = match args.email {
        Some(email) => email,
        None => input_required(prompter, "Email:", "Email")?,
    };

    tracing::info!("Generating token for user...");
    let token = accounts::login(client, &email).await?;
    Ok(GenerateJwtOutcome { token })
}

impl fmt::Display for GenerateJwtOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let preview: String = self
            .token
            .access_token
            .chars()
            .take(TOKEN_PREVIEW_CHARS)
            .collect();

        writeln!(f, "🎉 Success! Token generated.")?;
        writeln!(f)?;
        writeln!(f, "   • Token type: {}", show(&self.token.token_type))?;
        writeln!(f, "   • JWT: {}...", preview)?;
        write!(f, "   • Expires in: {} seconds", show(&self.token.expires_in))
    }
}
