use crate::utils::error::{OutsetaError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(OutsetaError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(OutsetaError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(OutsetaError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

/// 子網域只允許英數字與 `-`
pub fn validate_subdomain(field_name: &str, subdomain: &str) -> Result<()> {
    validate_non_empty_string(field_name, subdomain)?;

    let trimmed = subdomain.trim();
    let valid = trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-')
        && !trimmed.starts_with('-')
        && !trimmed.ends_with('-');

    if !valid {
        return Err(OutsetaError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: subdomain.to_string(),
            reason: "Subdomain may only contain letters, digits and inner hyphens".to_string(),
        });
    }
    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(OutsetaError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| OutsetaError::MissingConfigError {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(OutsetaError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

/// 請求參數的本地檢查；失敗時回傳 `ValidationError`
pub fn require_input<'a>(field_name: &str, value: &'a str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(OutsetaError::validation(format!("{} is required", field_name)));
    }
    Ok(trimmed)
}
