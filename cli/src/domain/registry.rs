//! Container registry credentials.
//!
//! Pure functions only. The registry authorization token is
//! `base64("<user>:<password>")`; only the password is handed to the
//! image tool, which logs in as [`REGISTRY_USERNAME`].

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::domain::error::RegistryError;

pub const REGISTRY_USERNAME: &str = "AWS";

/// Short-lived credentials for one `docker login`.
#[derive(Clone, PartialEq, Eq)]
pub struct RegistryCredentials {
    pub username: String,
    pub password: String,
    pub registry: String,
}

impl std::fmt::Debug for RegistryCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("registry", &self.registry)
            .finish()
    }
}

impl RegistryCredentials {
    /// Build credentials from the first authorization token the registry
    /// returned.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NoAuthorizationData`] when `tokens` is empty,
    /// or a decoding error if the token is malformed.
    pub fn from_tokens(
        tokens: &[String],
        account_id: &str,
        region: &str,
    ) -> Result<Self, RegistryError> {
        let token = tokens.first().ok_or(RegistryError::NoAuthorizationData)?;
        Ok(Self {
            username: REGISTRY_USERNAME.to_owned(),
            password: decode_authorization_token(token)?,
            registry: registry_host(account_id, region),
        })
    }
}

/// `<account>.dkr.ecr.<region>.amazonaws.com`
#[must_use]
pub fn registry_host(account_id: &str, region: &str) -> String {
    format!("{account_id}.dkr.ecr.{region}.amazonaws.com")
}

/// Decode an authorization token and return the password part.
///
/// The password is everything after the first `:`.
///
/// # Errors
///
/// Returns an error if the token is not base64 or has no `:` separator.
pub fn decode_authorization_token(token: &str) -> Result<String, RegistryError> {
    let raw = STANDARD
        .decode(token.trim())
        .map_err(|_| RegistryError::InvalidEncoding)?;
    let text = String::from_utf8(raw).map_err(|_| RegistryError::InvalidEncoding)?;
    text.split_once(':')
        .map(|(_, password)| password.to_owned())
        .ok_or(RegistryError::MalformedToken)
}
