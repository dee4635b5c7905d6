//! API key resolution through an ordered chain of providers.

use std::fmt::{self, Debug};

use anyhow::Result;
use tracing::{debug, warn};

use crate::{config::Config, error::CredentialError};

pub const API_KEY_ENV: &str = "OPENWEATHERMAP_API_KEY";

/// A non-empty, trimmed API key.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Returns `None` when the value is blank.
    pub fn new(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(****)")
    }
}

/// One place an API key may come from.
pub trait CredentialProvider: Debug {
    fn name(&self) -> &str;

    /// `Ok(None)` means this provider has no key to offer.
    fn api_key(&self) -> Result<Option<String>>;
}

/// Reads the key from an environment variable.
#[derive(Debug, Clone)]
pub struct EnvCredentials {
    var: String,
}

impl EnvCredentials {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvCredentials {
    fn default() -> Self {
        Self::new(API_KEY_ENV)
    }
}

impl CredentialProvider for EnvCredentials {
    fn name(&self) -> &str {
        &self.var
    }

    fn api_key(&self) -> Result<Option<String>> {
        Ok(std::env::var(&self.var).ok())
    }
}

/// Reads the key stored in the config file.
#[derive(Debug, Clone)]
pub struct ConfigCredentials {
    api_key: Option<String>,
}

impl ConfigCredentials {
    pub fn new(config: &Config) -> Self {
        Self { api_key: config.api_key().map(str::to_owned) }
    }
}

impl CredentialProvider for ConfigCredentials {
    fn name(&self) -> &str {
        "config file"
    }

    fn api_key(&self) -> Result<Option<String>> {
        Ok(self.api_key.clone())
    }
}

/// A fixed key, e.g. from a command-line flag.
#[derive(Clone)]
pub struct StaticCredentials {
    name: String,
    api_key: Option<String>,
}

impl StaticCredentials {
    pub fn new(name: impl Into<String>, api_key: Option<String>) -> Self {
        Self { name: name.into(), api_key }
    }
}

impl Debug for StaticCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticCredentials").field("name", &self.name).finish_non_exhaustive()
    }
}

impl CredentialProvider for StaticCredentials {
    fn name(&self) -> &str {
        &self.name
    }

    fn api_key(&self) -> Result<Option<String>> {
        Ok(self.api_key.clone())
    }
}

/// Tries each provider in order; the first non-blank key wins.
#[derive(Debug, Default)]
pub struct CredentialChain {
    providers: Vec<Box<dyn CredentialProvider>>,
}

impl CredentialChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, provider: impl CredentialProvider + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    pub fn resolve(&self) -> Result<ApiKey, CredentialError> {
        for provider in &self.providers {
            match provider.api_key() {
                Ok(Some(value)) => {
                    if let Some(key) = ApiKey::new(&value) {
                        debug!(provider = provider.name(), "API key resolved");
                        return Ok(key);
                    }
                    debug!(provider = provider.name(), "blank API key ignored");
                }
                Ok(None) => debug!(provider = provider.name(), "no API key"),
                Err(err) => warn!(provider = provider.name(), "credential provider failed: {err:#}"),
            }
        }

        let tried = self.providers.iter().map(|p| p.name()).collect::<Vec<_>>().join(", ");
        Err(CredentialError::Missing { tried })
    }
}
