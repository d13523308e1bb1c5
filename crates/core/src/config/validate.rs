use super::{types::Config, ConfigError};

/// Validate configuration beyond what serde enforces.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.slskd.url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "slskd.url must not be empty".to_string(),
        ));
    }
    if !config.slskd.url.starts_with("http://") && !config.slskd.url.starts_with("https://") {
        return Err(ConfigError::ValidationError(
            "slskd.url must be an http(s) URL".to_string(),
        ));
    }
    if config.slskd.api_key.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "slskd.api_key must not be empty".to_string(),
        ));
    }

    if config.acquisition.tiers.is_empty() {
        return Err(ConfigError::ValidationError(
            "acquisition.tiers must not be empty".to_string(),
        ));
    }
    if config
        .acquisition
        .tiers
        .iter()
        .any(|t| t.extension.trim().is_empty())
    {
        return Err(ConfigError::ValidationError(
            "acquisition.tiers entries must name an extension".to_string(),
        ));
    }
    if config.acquisition.poll_interval_secs == 0 {
        return Err(ConfigError::ValidationError(
            "acquisition.poll_interval_secs cannot be 0".to_string(),
        ));
    }
    if config.acquisition.search_timeout_secs < config.acquisition.poll_interval_secs {
        return Err(ConfigError::ValidationError(
            "acquisition.search_timeout_secs must be at least the poll interval".to_string(),
        ));
    }

    if let Some(converter) = &config.converter {
        if converter.bitrate_kbps == 0 {
            return Err(ConfigError::ValidationError(
                "converter.bitrate_kbps cannot be 0".to_string(),
            ));
        }
    }

    Ok(())
}
