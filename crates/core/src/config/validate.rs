use super::{types::Config, ConfigError};

/// Validate configuration.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(invalid("server.port cannot be 0"));
    }

    if config.cache.prefix.trim().is_empty() {
        return Err(invalid("cache.prefix cannot be empty"));
    }

    if !config.hitrun.buffer.is_finite() || config.hitrun.buffer < 0.0 {
        return Err(invalid("hitrun.buffer must be a finite, non-negative ratio"));
    }

    if config.announce.connectable_check && config.announce.connectable_check_interval == 0 {
        return Err(invalid(
            "announce.connectable_check_interval must be positive when the check is enabled",
        ));
    }

    if config.announce.max_concurrent_probes == 0 {
        return Err(invalid("announce.max_concurrent_probes cannot be 0"));
    }

    let history = &config.history;
    if history.default_per_page == 0 || history.default_per_page > history.max_per_page {
        return Err(invalid(
            "history.default_per_page must be between 1 and history.max_per_page",
        ));
    }

    if history.query_timeout_secs == 0 {
        return Err(invalid("history.query_timeout_secs cannot be 0"));
    }

    Ok(())
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::ValidationError(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_invalid(config: &Config) {
        let result = validate_config(config);
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let mut config = Config::default();
        config.server.port = 0;
        assert_invalid(&config);
    }

    #[test]
    fn test_validate_empty_prefix_fails() {
        let mut config = Config::default();
        config.cache.prefix = "  ".to_string();
        assert_invalid(&config);
    }

    #[test]
    fn test_validate_negative_buffer_fails() {
        let mut config = Config::default();
        config.hitrun.buffer = -0.1;
        assert_invalid(&config);

        config.hitrun.buffer = f64::NAN;
        assert_invalid(&config);
    }

    #[test]
    fn test_validate_zero_interval_only_matters_when_enabled() {
        let mut config = Config::default();
        config.announce.connectable_check_interval = 0;
        assert_invalid(&config);

        config.announce.connectable_check = false;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_zero_probe_bound_fails() {
        let mut config = Config::default();
        config.announce.max_concurrent_probes = 0;
        assert_invalid(&config);
    }

    #[test]
    fn test_validate_page_size_bounds() {
        let mut config = Config::default();
        config.history.default_per_page = 0;
        assert_invalid(&config);

        config.history.default_per_page = 200;
        config.history.max_per_page = 100;
        assert_invalid(&config);
    }

    #[test]
    fn test_validate_zero_query_timeout_fails() {
        let mut config = Config::default();
        config.history.query_timeout_secs = 0;
        assert_invalid(&config);
    }
}
