use super::{types::Config, ConfigError};

/// Validates invariants the type system cannot express. Run once at startup.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.storage.dir.as_os_str().is_empty() {
        return Err(ConfigError::Invalid(
            "storage.dir must not be empty".to_string(),
        ));
    }

    if config.storage.cleanup_grace_secs >= config.storage.retention_secs {
        return Err(ConfigError::Invalid(format!(
            "storage.cleanup_grace_secs ({}) must be below storage.retention_secs ({})",
            config.storage.cleanup_grace_secs, config.storage.retention_secs
        )));
    }

    if config.storage.sweep_interval_secs == 0 {
        return Err(ConfigError::Invalid(
            "storage.sweep_interval_secs must be positive".to_string(),
        ));
    }

    if config.renderer.timeout_secs == 0 || config.office.timeout_secs == 0 {
        return Err(ConfigError::Invalid(
            "renderer and office timeouts must be positive".to_string(),
        ));
    }

    if let Some(ref url) = config.server.public_url {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ConfigError::Invalid(format!(
                "server.public_url must be an http(s) URL, got '{}'",
                url
            )));
        }
    }

    Ok(())
}
