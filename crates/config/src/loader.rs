use super::defaults::{DEFAULT_CONFIG_TEMPLATE, PLACEHOLDER_SIGNING_SECRET};
use super::errors::ConfigError;
use super::migration::migrate_config_if_needed;
use super::models::Config;
use std::path::Path;
use std::sync::Arc;

/// Prefix of the environment variables that override file values
pub const ENV_PREFIX: &str = "IMGVAULT_";

impl Config {
    /// Loads configuration from a file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        Self::from_file_with_events(path, None).await
    }

    /// Loads configuration from a file with optional event bus for notifications
    pub async fn from_file_with_events<P: AsRef<Path>>(
        path: P,
        events: Option<&Arc<imgvault_events::EventBus>>,
    ) -> anyhow::Result<Self> {
        let path = path.as_ref();

        // Create default config if it doesn't exist
        if !path.exists() {
            create_default_config(path).await?;
        }

        migrate_config_if_needed(path, events).await?;

        let content = tokio::fs::read_to_string(path).await?;
        let mut config: Config = toml::from_str(&content)?;

        config.apply_env_overrides(|name| std::env::var(name).ok())?;

        for warning in config.validate()? {
            match events {
                Some(bus) => bus.emit(imgvault_events::AppEvent::ConfigWarning { message: warning }),
                None => tracing::warn!("{}", warning),
            }
        }

        Ok(config)
    }

    /// Overrides secrets and runtime defaults from `IMGVAULT_*` variables.
    ///
    /// `lookup` resolves a full variable name; the process environment in
    /// production.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |suffix: &str| lookup(&format!("{}{}", ENV_PREFIX, suffix));

        if let Some(api_key) = var("API_KEY") {
            self.security.api_key = api_key;
        }
        if let Some(secret) = var("SIGNING_SECRET") {
            self.security.signing_secret = secret;
        }
        if let Some(backend) = var("STORAGE_BACKEND") {
            self.storage.backend = backend.parse()?;
        }
        if let Some(expiration) = var("URL_EXPIRATION_SECS") {
            self.storage.url_expiration_secs = expiration.trim().parse().map_err(|_| {
                ConfigError::InvalidConfig(format!(
                    "{}URL_EXPIRATION_SECS must be a positive integer, got '{}'",
                    ENV_PREFIX, expiration
                ))
            })?;
        }
        if let Some(access_key) = var("S3_ACCESS_KEY_ID") {
            self.storage.s3.access_key_id = access_key;
        }
        if let Some(secret_key) = var("S3_SECRET_ACCESS_KEY") {
            self.storage.s3.secret_access_key = secret_key;
        }

        Ok(())
    }

    /// Rejects unusable values and returns warnings for risky ones
    pub fn validate(&self) -> Result<Vec<String>, ConfigError> {
        let mut warnings = Vec::new();

        if self.security.signing_secret.is_empty() {
            return Err(ConfigError::InvalidConfig(
                "security.signing_secret must not be empty".to_string(),
            ));
        }
        if self.security.signing_secret == PLACEHOLDER_SIGNING_SECRET {
            warnings.push(
                "security.signing_secret is the template placeholder; file links can be forged".to_string(),
            );
        }
        if self.security.api_key.is_empty() {
            warnings.push("security.api_key is empty; upload and admin routes will reject every request".to_string());
        }
        if self.storage.url_expiration_secs == 0 {
            return Err(ConfigError::InvalidConfig(
                "storage.url_expiration_secs must be a positive integer".to_string(),
            ));
        }

        Ok(warnings)
    }
}

/// Creates a default configuration file
async fn create_default_config<P: AsRef<Path>>(path: P) -> anyhow::Result<()> {
    tokio::fs::write(path, DEFAULT_CONFIG_TEMPLATE).await?;
    Ok(())
}
