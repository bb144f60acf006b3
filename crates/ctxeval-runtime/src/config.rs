//! Runtime settings.
//!
//! Settings are resolved once at startup and passed into
//! [`ContextEvaluator`](crate::ContextEvaluator) explicitly.
//!
//! Priority (highest to lowest):
//! 1. Environment: `OPENAI_API_KEY`, `GROQ_API_KEY`, `DEFAULT_LLM_PROVIDER`,
//!    `MODEL_NAME`, `LLM_BASE_URL`, `LLM_REQUEST_TIMEOUT`
//! 2. Explicit config file (if provided)
//! 3. Project file: `./ctxeval.toml`
//! 4. Default values

use std::fmt;
use std::path::Path;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::providers::{ApiCredential, ProviderError};
use crate::InitializationError;

/// Default model identifier.
pub const DEFAULT_MODEL_NAME: &str = "mixtral-8x7b-32768";

/// Default per-request timeout, in humantime notation.
pub const DEFAULT_REQUEST_TIMEOUT: &str = "30s";

/// Project-level config file name.
pub const PROJECT_CONFIG_FILE: &str = "ctxeval.toml";

/// Environment variables read into [`Settings`].
pub const SETTINGS_ENV_KEYS: [&str; 6] = [
    "OPENAI_API_KEY",
    "GROQ_API_KEY",
    "DEFAULT_LLM_PROVIDER",
    "MODEL_NAME",
    "LLM_BASE_URL",
    "LLM_REQUEST_TIMEOUT",
];

/// Supported LLM providers.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LlmProviderKind {
    OpenAi,
    #[default]
    Groq,
}

impl LlmProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LlmProviderKind::OpenAi => "openai",
            LlmProviderKind::Groq => "groq",
        }
    }

    /// Base URL of the provider's OpenAI-compatible API.
    pub fn default_base_url(&self) -> &'static str {
        match self {
            LlmProviderKind::OpenAi => "https://api.openai.com/v1",
            LlmProviderKind::Groq => "https://api.groq.com/openai/v1",
        }
    }

    /// Settings key holding this provider's API key.
    pub fn api_key_setting(&self) -> &'static str {
        match self {
            LlmProviderKind::OpenAi => "openai_api_key",
            LlmProviderKind::Groq => "groq_api_key",
        }
    }

    /// Human-readable credential name for error messages.
    pub fn credential_name(&self) -> &'static str {
        match self {
            LlmProviderKind::OpenAi => "OpenAI API key",
            LlmProviderKind::Groq => "Groq API key",
        }
    }
}

impl fmt::Display for LlmProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved runtime settings.
///
/// API keys are skipped on serialization and redacted in `Debug`.
#[derive(Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default, skip_serializing)]
    pub openai_api_key: Option<String>,

    #[serde(default, skip_serializing)]
    pub groq_api_key: Option<String>,

    /// Provider used for evaluations
    #[serde(default)]
    pub default_llm_provider: LlmProviderKind,

    /// Model identifier sent with every request
    #[serde(default = "default_model_name")]
    pub model_name: String,

    /// Override for the provider's base URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_base_url: Option<String>,

    /// Per-request timeout, e.g. "30s" or "1m 30s"
    #[serde(default = "default_request_timeout")]
    pub llm_request_timeout: String,
}

fn default_model_name() -> String {
    DEFAULT_MODEL_NAME.to_string()
}

fn default_request_timeout() -> String {
    DEFAULT_REQUEST_TIMEOUT.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            groq_api_key: None,
            default_llm_provider: LlmProviderKind::default(),
            model_name: default_model_name(),
            llm_base_url: None,
            llm_request_timeout: default_request_timeout(),
        }
    }
}

impl Settings {
    /// The layered figment backing [`Settings::load`].
    pub fn figment(config_path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(PROJECT_CONFIG_FILE));

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment.merge(Env::raw().only(&SETTINGS_ENV_KEYS))
    }

    /// Load settings from all sources.
    pub fn load(config_path: Option<&Path>) -> Result<Self, Box<figment::Error>> {
        Self::figment(config_path).extract().map_err(Box::new)
    }

    /// Raw API key configured for `kind`, if any.
    pub fn api_key(&self, kind: LlmProviderKind) -> Option<&str> {
        match kind {
            LlmProviderKind::OpenAi => self.openai_api_key.as_deref(),
            LlmProviderKind::Groq => self.groq_api_key.as_deref(),
        }
    }

    /// Wrap the API key for `kind`; blank or missing keys are an error.
    pub fn credential(&self, kind: LlmProviderKind) -> Result<ApiCredential, ProviderError> {
        ApiCredential::from_setting(
            self.api_key(kind),
            kind.api_key_setting(),
            kind.credential_name(),
        )
    }

    /// Base URL for `kind`, honoring the override.
    pub fn base_url(&self, kind: LlmProviderKind) -> &str {
        self.llm_base_url
            .as_deref()
            .unwrap_or_else(|| kind.default_base_url())
    }

    /// Parsed request timeout.
    pub fn request_timeout(&self) -> Result<Duration, InitializationError> {
        humantime::parse_duration(&self.llm_request_timeout).map_err(|e| {
            InitializationError::InvalidSetting {
                setting: "llm_request_timeout",
                message: e.to_string(),
            }
        })
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |key: &Option<String>| key.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("Settings")
            .field("openai_api_key", &redact(&self.openai_api_key))
            .field("groq_api_key", &redact(&self.groq_api_key))
            .field("default_llm_provider", &self.default_llm_provider)
            .field("model_name", &self.model_name)
            .field("llm_base_url", &self.llm_base_url)
            .field("llm_request_timeout", &self.llm_request_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    fn load() -> figment::Result<Settings> {
        Settings::load(None).map_err(|e| *e)
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.default_llm_provider, LlmProviderKind::Groq);
        assert_eq!(settings.model_name, "mixtral-8x7b-32768");
        assert_eq!(settings.request_timeout().unwrap(), Duration::from_secs(30));
        assert_eq!(
            settings.base_url(LlmProviderKind::Groq),
            "https://api.groq.com/openai/v1"
        );
    }

    #[test]
    fn test_provider_kind_wire_names() {
        let kind: LlmProviderKind = serde_json::from_str("\"openai\"").unwrap();
        assert_eq!(kind, LlmProviderKind::OpenAi);
        assert_eq!(kind.to_string(), "openai");
    }

    #[test]
    fn test_env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                PROJECT_CONFIG_FILE,
                r#"
                    model_name = "llama3-70b-8192"
                    default_llm_provider = "openai"
                    llm_request_timeout = "5s"
                "#,
            )?;
            jail.set_env("MODEL_NAME", "llama-3.1-8b-instant");
            jail.set_env("GROQ_API_KEY", "gsk-from-env");

            let settings = load()?;
            assert_eq!(settings.model_name, "llama-3.1-8b-instant");
            assert_eq!(settings.default_llm_provider, LlmProviderKind::OpenAi);
            assert_eq!(settings.api_key(LlmProviderKind::Groq), Some("gsk-from-env"));
            assert_eq!(settings.request_timeout().unwrap(), Duration::from_secs(5));
            Ok(())
        });
    }

    #[test]
    fn test_explicit_config_file() {
        Jail::expect_with(|jail| {
            jail.create_file("custom.toml", r#"llm_base_url = "http://localhost:8080/v1""#)?;

            let settings = Settings::load(Some(Path::new("custom.toml"))).map_err(|e| *e)?;
            assert_eq!(
                settings.base_url(LlmProviderKind::OpenAi),
                "http://localhost:8080/v1"
            );
            Ok(())
        });
    }

    #[test]
    fn test_unknown_provider_rejected() {
        Jail::expect_with(|jail| {
            jail.set_env("DEFAULT_LLM_PROVIDER", "mistral");
            assert!(Settings::load(None).is_err());
            Ok(())
        });
    }

    #[test]
    fn test_credential_for_selected_provider() {
        let settings = Settings {
            openai_api_key: Some("sk-test".to_string()),
            ..Default::default()
        };

        assert_eq!(
            settings.credential(LlmProviderKind::OpenAi).unwrap().expose(),
            "sk-test"
        );
        assert!(settings.credential(LlmProviderKind::Groq).is_err());
    }

    #[test]
    fn test_invalid_timeout() {
        let settings = Settings {
            llm_request_timeout: "soon".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            settings.request_timeout(),
            Err(InitializationError::InvalidSetting {
                setting: "llm_request_timeout",
                ..
            })
        ));
    }

    #[test]
    fn test_api_keys_redacted_in_debug() {
        let settings = Settings {
            groq_api_key: Some("gsk-very-secret".to_string()),
            ..Default::default()
        };
        let debug = format!("{:?}", settings);
        assert!(!debug.contains("gsk-very-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
