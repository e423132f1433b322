//! Provider credentials from the environment.

use crate::domain::CredentialError;

/// Environment variable holding the DigitalOcean API token.
pub const TOKEN_VAR: &str = "DO_TOKEN";

/// Read the API token. Unset and empty are both missing.
///
/// # Errors
///
/// Returns `CredentialError::Missing` if the variable is unset or empty.
pub fn api_token() -> Result<String, CredentialError> {
    token_from(std::env::var(TOKEN_VAR).ok())
}

fn token_from(value: Option<String>) -> Result<String, CredentialError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(CredentialError::Missing(TOKEN_VAR))
}
