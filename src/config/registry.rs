//! Registry of content API configurations
//!
//! The registry always holds at least one API and exactly one of them is
//! current. Mutation happens only through the explicit operations below.

use crate::config::types::{ApiConfig, Config};
use crate::config::validation::validate_api;
use crate::ConfigError;

/// Ordered list of API configurations with a selected current entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRegistry {
    apis: Vec<ApiConfig>,
    current: usize,
}

impl ApiRegistry {
    /// Creates a registry holding a single API, which becomes current
    pub fn new(first: ApiConfig) -> Result<Self, ConfigError> {
        validate_api(&first)?;
        Ok(Self {
            apis: vec![first],
            current: 0,
        })
    }

    /// Builds the registry from a loaded configuration
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let mut apis = config.api.iter().cloned();
        let first = apis.next().ok_or_else(|| {
            ConfigError::Validation("at least one [[api]] entry is required".to_string())
        })?;

        let mut registry = Self::new(first)?;
        for api in apis {
            registry.add(api)?;
        }
        registry.select(config.current_api)?;
        Ok(registry)
    }

    /// Returns the current API configuration
    pub fn current(&self) -> &ApiConfig {
        &self.apis[self.current]
    }

    /// Returns the index of the current API configuration
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Returns all API configurations in order
    pub fn apis(&self) -> &[ApiConfig] {
        &self.apis
    }

    pub fn len(&self) -> usize {
        self.apis.len()
    }

    /// Whether the registry holds no APIs
    pub fn is_empty(&self) -> bool {
        self.apis.is_empty()
    }

    /// Appends an API configuration and returns its index
    pub fn add(&mut self, api: ApiConfig) -> Result<usize, ConfigError> {
        validate_api(&api)?;
        self.apis.push(api);
        Ok(self.apis.len() - 1)
    }

    /// Replaces the API configuration at `index`
    pub fn update(&mut self, index: usize, api: ApiConfig) -> Result<(), ConfigError> {
        validate_api(&api)?;
        let slot = self
            .apis
            .get_mut(index)
            .ok_or(ConfigError::UnknownApi(index))?;
        *slot = api;
        Ok(())
    }

    /// Removes the API configuration at `index`
    ///
    /// Deleting the current entry selects the entry that takes its place, or
    /// the previous one when the last entry was removed. The final remaining
    /// entry cannot be deleted.
    pub fn delete(&mut self, index: usize) -> Result<ApiConfig, ConfigError> {
        if index >= self.apis.len() {
            return Err(ConfigError::UnknownApi(index));
        }
        if self.apis.len() == 1 {
            return Err(ConfigError::LastApi);
        }

        let removed = self.apis.remove(index);
        if index < self.current || self.current >= self.apis.len() {
            self.current -= 1;
        }

        tracing::debug!(
            name = %removed.name,
            current = self.current,
            "Deleted API configuration"
        );
        Ok(removed)
    }

    /// Makes the entry at `index` current
    pub fn select(&mut self, index: usize) -> Result<(), ConfigError> {
        if index >= self.apis.len() {
            return Err(ConfigError::UnknownApi(index));
        }
        self.current = index;
        Ok(())
    }
}
