use crate::config::types::{
    AnalysisConfig, Config, HistoryConfig, ProviderConfig, QueueConfig, UserAgentConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_analysis_config(&config.analysis)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_history_config(&config.history)?;
    validate_queue_config(&config.queue)?;
    validate_provider("performance", &config.performance)?;
    validate_provider("off-page", &config.off_page)?;
    validate_provider("ai", &config.ai)?;
    validate_strategy(&config.performance)?;
    Ok(())
}

fn validate_analysis_config(config: &AnalysisConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_scans < 1 || config.max_concurrent_scans > 64 {
        return Err(ConfigError::Validation(format!(
            "max-concurrent-scans must be between 1 and 64, got {}",
            config.max_concurrent_scans
        )));
    }

    if config.fast_timeout_secs == 0 || config.deep_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "fetch timeouts must be at least one second".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.name.is_empty() {
        return Err(ConfigError::Validation(
            "user-agent name cannot be empty".to_string(),
        ));
    }

    if !config.name.chars().all(|c| c.is_alphanumeric() || c == '-') {
        return Err(ConfigError::Validation(format!(
            "user-agent name must contain only alphanumeric characters and hyphens, got '{}'",
            config.name
        )));
    }

    if let Some(contact) = &config.contact_url {
        Url::parse(contact)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact-url: {}", e)))?;
    }

    Ok(())
}

fn validate_history_config(config: &HistoryConfig) -> Result<(), ConfigError> {
    if config.path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "history path cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_queue_config(config: &QueueConfig) -> Result<(), ConfigError> {
    if config.max_pending == Some(0) {
        return Err(ConfigError::Validation(
            "queue max-pending must be >= 1 when set".to_string(),
        ));
    }
    if config.retention_secs == 0 {
        return Err(ConfigError::Validation(
            "queue retention-secs must be at least one second".to_string(),
        ));
    }
    Ok(())
}

/// A provider's base URL must be an absolute http(s) URL when present
fn validate_provider(name: &str, config: &ProviderConfig) -> Result<(), ConfigError> {
    let Some(base) = config.base_url.as_deref().filter(|b| !b.trim().is_empty()) else {
        return Ok(());
    };

    let url = Url::parse(base.trim())
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} base-url '{}': {}", name, base, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} base-url must use http or https, got '{}'",
            name, base
        )));
    }

    Ok(())
}

fn validate_strategy(config: &ProviderConfig) -> Result<(), ConfigError> {
    match config.strategy.as_deref() {
        None | Some("mobile") | Some("desktop") => Ok(()),
        Some(other) => Err(ConfigError::Validation(format!(
            "performance strategy must be 'mobile' or 'desktop', got '{}'",
            other
        ))),
    }
}
