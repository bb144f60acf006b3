//! Secure credential handling for LLM providers.
//!
//! API keys are wrapped in [`ApiCredential`] as soon as they leave
//! [`Settings`](crate::config::Settings):
//!
//! - `Debug`/`Display` show `[REDACTED]`
//! - Memory is zeroed on drop via `secrecy`
//! - The raw value is only reachable through [`ApiCredential::expose`]

use secrecy::{ExposeSecret, SecretString};
use std::fmt;

use super::ProviderError;

/// A securely-stored API credential.
pub struct ApiCredential {
    value: SecretString,
    name: &'static str,
}

impl ApiCredential {
    /// Wrap a credential value.
    pub fn new(value: impl Into<String>, name: &'static str) -> Self {
        Self {
            value: SecretString::from(value.into()),
            name,
        }
    }

    /// Wrap an optional settings value, treating blank values as missing.
    ///
    /// `setting` is the configuration key named in the error message.
    pub fn from_setting(
        value: Option<&str>,
        setting: &str,
        name: &'static str,
    ) -> Result<Self, ProviderError> {
        match value.map(str::trim) {
            Some(v) if !v.is_empty() => Ok(Self::new(v, name)),
            _ => Err(ProviderError::NotConfigured(format!(
                "{} is required: set '{}' in ctxeval.toml or {} in the environment",
                name,
                setting,
                setting.to_uppercase()
            ))),
        }
    }

    /// Expose the credential value at the point of use.
    ///
    /// Never store the returned slice.
    pub fn expose(&self) -> &str {
        self.value.expose_secret()
    }

    pub fn is_empty(&self) -> bool {
        self.value.expose_secret().is_empty()
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredential")
            .field("value", &"[REDACTED]")
            .field("name", &self.name)
            .finish()
    }
}

impl fmt::Display for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [REDACTED]", self.name)
    }
}
