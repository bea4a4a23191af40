//! Configuration management for autoapply
//!
//! This module provides a layered configuration system that loads settings from:
//! 1. Default values (embedded in structs)
//! 2. JSON configuration file (`cfg.json`; TOML also accepted by extension)
//! 3. Environment variables (highest priority)
//!
//! Credentials (`ACCESS_TOKEN`, `RESUME_ID`, `CLIENT_ID`, `CLIENT_SECRET`,
//! `REDIRECT_URI`) are only ever read from the environment or a `.env` file.
//!
//! # Usage
//!
//! ```no_run
//! use autoapply::config::Config;
//!
//! let config = Config::load(None).expect("Failed to load configuration");
//! println!("Searching for: {}", config.keywords.join(" OR "));
//! ```
//!
//! # Environment Variables
//!
//! Configuration can be overridden using environment variables with the pattern:
//! `AUTOAPPLY__<key>` or `AUTOAPPLY__<section>__<key>`
//!
//! Examples:
//! - `AUTOAPPLY__PER_PAGE=50`
//! - `AUTOAPPLY__KEYWORDS=rust,backend`
//! - `AUTOAPPLY__API__BASE_URL=http://localhost:9000`
//!
//! # Configuration File
//!
//! By default, the configuration is loaded from `cfg.json`.
//! This can be overridden with `--config` or the `AUTOAPPLY_CONFIG` environment variable.

mod models;
mod sources;
mod validation;

// Re-export public types
pub use crate::humanize::HumanDuration;
pub use models::{
    ApiConfig, Config, OAuthConfig, ResponseRule, RuleOutcome, Secrets, default_response_rules,
};
pub use sources::secrets_from;
pub use validation::{MAX_PER_PAGE, ValidationError};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),

    #[error("Environment variable {0} is not set")]
    MissingSecret(&'static str),

    #[error("Failed to read cover letter {path}: {source}")]
    CoverLetter {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables (`AUTOAPPLY__*`)
    /// 2. Config file (`path`, else `AUTOAPPLY_CONFIG`, else `cfg.json`)
    /// 3. Default values
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration file is malformed
    /// - Validation fails
    /// - The cover letter file cannot be read
    pub fn load(path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let config = sources::load(path)?;
        config.finish()
    }

    /// Load configuration from a specific path, without reading secrets
    ///
    /// Useful for testing with custom configuration files.
    pub fn load_from_path(path: PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(&path)?;
        config.finish()
    }

    fn finish(mut self) -> Result<Self, ConfigError> {
        validation::validate(&self)?;
        if let Some(path) = self.cover_letter_file.take() {
            let text = std::fs::read_to_string(&path)
                .map_err(|source| ConfigError::CoverLetter { path: path.clone(), source })?;
            tracing::info!(path = %path.display(), chars = text.chars().count(), "Loaded cover letter");
            self.cover_letter = Some(text.trim().to_string()).filter(|t| !t.is_empty());
        }
        Ok(self)
    }

    /// Check the keys the vacancy search needs
    pub fn validate_for_search(&self) -> Result<(), ConfigError> {
        validation::validate_search(self)?;
        Ok(())
    }

    pub fn access_token(&self) -> Result<&str, ConfigError> {
        self.secrets
            .access_token
            .as_deref()
            .ok_or(ConfigError::MissingSecret("ACCESS_TOKEN"))
    }

    pub fn resume_id(&self) -> Result<&str, ConfigError> {
        self.secrets
            .resume_id
            .as_deref()
            .ok_or(ConfigError::MissingSecret("RESUME_ID"))
    }

    /// OAuth client credentials as (client_id, client_secret, redirect_uri)
    pub fn oauth_client(&self) -> Result<(&str, &str, &str), ConfigError> {
        let client_id = self
            .secrets
            .client_id
            .as_deref()
            .ok_or(ConfigError::MissingSecret("CLIENT_ID"))?;
        let client_secret = self
            .secrets
            .client_secret
            .as_deref()
            .ok_or(ConfigError::MissingSecret("CLIENT_SECRET"))?;
        let redirect_uri = self
            .secrets
            .redirect_uri
            .as_deref()
            .ok_or(ConfigError::MissingSecret("REDIRECT_URI"))?;
        Ok((client_id, client_secret, redirect_uri))
    }
}
