//! Provider factory pattern for LLM provider selection.
//!
//! Providers register factories keyed by [`LlmProviderKind`]; the evaluator
//! asks the registry for whichever kind the settings select.
//!
//! ## Usage
//!
//! ```ignore
//! let registry = ProviderRegistry::with_defaults();
//! let provider = registry.create(settings.default_llm_provider, &settings)?;
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use super::{LlmProvider, ProviderError};
use crate::config::{LlmProviderKind, Settings};

/// Factory for creating LLM providers from settings.
pub trait ProviderFactory: Send + Sync {
    /// Provider kind this factory builds.
    fn provider_type(&self) -> LlmProviderKind;

    /// Create a provider instance from settings.
    fn create(&self, settings: &Settings) -> Result<Arc<dyn LlmProvider>, ProviderError>;

    /// Validate settings without creating a provider.
    fn validate_settings(&self, settings: &Settings) -> Result<(), ProviderError>;
}

/// Registry of available provider factories.
#[derive(Default)]
pub struct ProviderRegistry {
    factories: BTreeMap<LlmProviderKind, Arc<dyn ProviderFactory>>,
}

impl ProviderRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider factory, replacing any factory of the same kind.
    pub fn register(&mut self, factory: Arc<dyn ProviderFactory>) {
        self.factories.insert(factory.provider_type(), factory);
    }

    /// Create a provider of `kind` from settings.
    pub fn create(
        &self,
        kind: LlmProviderKind,
        settings: &Settings,
    ) -> Result<Arc<dyn LlmProvider>, ProviderError> {
        self.factory(kind)?.create(settings)
    }

    /// Validate settings for a provider kind.
    pub fn validate(&self, kind: LlmProviderKind, settings: &Settings) -> Result<(), ProviderError> {
        self.factory(kind)?.validate_settings(settings)
    }

    /// List registered provider kinds.
    pub fn available_types(&self) -> Vec<LlmProviderKind> {
        self.factories.keys().copied().collect()
    }

    pub fn has_provider(&self, kind: LlmProviderKind) -> bool {
        self.factories.contains_key(&kind)
    }

    fn factory(&self, kind: LlmProviderKind) -> Result<&Arc<dyn ProviderFactory>, ProviderError> {
        self.factories.get(&kind).ok_or_else(|| {
            ProviderError::NotConfigured(format!(
                "Unknown provider type: '{}'. Available: {:?}",
                kind,
                self.available_types()
            ))
        })
    }

    /// Create a registry with all compiled-in providers registered.
    pub fn with_defaults() -> Self {
        #[allow(unused_mut)]
        let mut registry = Self::new();

        #[cfg(feature = "groq")]
        registry.register(Arc::new(super::ChatCompletionsFactory::groq()));

        #[cfg(feature = "openai")]
        registry.register(Arc::new(super::ChatCompletionsFactory::openai()));

        registry
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.available_types())
            .finish()
    }
}
