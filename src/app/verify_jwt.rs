use crate::app::{local_time, show};
use crate::core::verifier::{check_structure, TokenVerifier, VerificationMethod, VerificationResult};
use crate::domain::ports::{KeySetSource, Prompter};
use crate::utils::error::{OutsetaError, Result};
use crate::utils::prompt::input_validated;
use std::fmt;

#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "cli", derive(clap::Args))]
pub struct VerifyJwtArgs {
    /// JWT access token to verify
    #[cfg_attr(feature = "cli", arg(long))]
    pub token: Option<String>,

    /// keyset (alias jwks), profile or both
    #[cfg_attr(feature = "cli", arg(long))]
    pub method: Option<VerificationMethod>,
}

#[derive(Debug, Clone)]
pub struct VerifyJwtOutcome {
    pub method: VerificationMethod,
    pub result: VerificationResult,
}

const METHOD_CHOICES: [(VerificationMethod, &str); 3] = [
    (
        VerificationMethod::Both,
        "Both methods (JWK Set + Profile Endpoint)",
    ),
    (VerificationMethod::KeySet, "JWK Set verification only"),
    (
        VerificationMethod::Profile,
        "Profile Endpoint verification only",
    ),
];

pub async fn run<K, P>(
    verifier: &TokenVerifier<K>,
    prompter: &mut P,
    args: VerifyJwtArgs,
) -> Result<VerifyJwtOutcome>
where
    K: KeySetSource,
    P: Prompter + ?Sized,
{
    let token = match args.token {
        Some(token) => token,
        None => input_validated(prompter, "JWT Token to verify:", None, |answer| {
            check_structure(answer).map(|_| ()).map_err(|e| match e {
                OutsetaError::ValidationError { message } => message,
                other => other.to_string(),
            })
        })?,
    };

    let method = match args.method {
        Some(method) => method,
        None => {
            let labels: Vec<String> = METHOD_CHOICES
                .iter()
                .map(|(_, label)| label.to_string())
                .collect();
            let index = prompter.select("Verification method:", &labels, 0)?;
            METHOD_CHOICES
                .get(index)
                .map(|(method, _)| *method)
                .unwrap_or_default()
        }
    };

    tracing::info!("Verifying JWT token ({})", method);
    let result = verifier.verify(&token, method).await?;
    Ok(VerifyJwtOutcome { method, result })
}

impl fmt::Display for VerifyJwtOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "🎉 JWT Verification Complete!")?;

        if let Some(claims) = &self.result.key_set_claims {
            writeln!(f)?;
            writeln!(f, "📋 User Information (from JWK Set verification):")?;
            writeln!(f, "   • Person UID: {}", show(&claims.sub))?;
            writeln!(f, "   • Email: {}", show(&claims.email))?;
            writeln!(f, "   • Name: {}", show(&claims.name))?;
            writeln!(f, "   • Account UID: {}", show(&claims.account_uid))?;
            writeln!(f, "   • Is Primary: {}", show(&claims.is_primary))?;
            writeln!(f, "   • Issued At: {}", local_time(claims.iat))?;
            writeln!(f, "   • Expires At: {}", local_time(claims.exp))?;
        }

        if let Some(profile) = &self.result.profile {
            writeln!(f)?;
            writeln!(f, "👤 Extended Profile Information (from Profile Endpoint):")?;
            writeln!(f, "   • Person UID: {}", profile.uid)?;
            writeln!(f, "   • Email: {}", show(&profile.email))?;
            writeln!(f, "   • First Name: {}", show(&profile.first_name))?;
            writeln!(f, "   • Last Name: {}", show(&profile.last_name))?;
            if let Some(url) = &profile.profile_image_s3_url {
                writeln!(f, "   • Profile Image: {}", url)?;
            }
            if let Some(account) = &profile.account {
                writeln!(f, "   • Account Name: {}", show(&account.name))?;
                writeln!(f, "   • Account UID: {}", account.uid)?;
            }
        }

        writeln!(f)?;
        write!(f, "✅ Token is valid and verified!")
    }
}
