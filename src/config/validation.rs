use crate::config::types::{Config, CrawlerConfig, OutputConfig, ProxyConfig, SiteConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_proxy_config(&config.proxy)?;
    validate_output_config(&config.output)?;
    validate_site_config(&config.site)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.batch_size < 1 || config.batch_size > 1000 {
        return Err(ConfigError::Validation(format!(
            "batch_size must be between 1 and 1000, got {}",
            config.batch_size
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_secs must be >= 1, got {}",
            config.request_timeout_secs
        )));
    }

    if config.throttle_max_secs > 3600 {
        return Err(ConfigError::Validation(format!(
            "throttle_max_secs must be <= 3600, got {}",
            config.throttle_max_secs
        )));
    }

    Ok(())
}

/// Validates proxy configuration
///
/// The source URL is only checked when proxies are enabled.
fn validate_proxy_config(config: &ProxyConfig) -> Result<(), ConfigError> {
    if !config.enabled {
        return Ok(());
    }

    let url = Url::parse(&config.source_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid proxy source_url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "Proxy source_url '{}' must use HTTP or HTTPS",
            config.source_url
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    if config.flush_threshold < 1 {
        return Err(ConfigError::Validation(format!(
            "flush_threshold must be >= 1, got {}",
            config.flush_threshold
        )));
    }

    Ok(())
}

/// Validates the site origin
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.origin)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid site origin: {}", e)))?;

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "Site origin '{}' has no host",
            config.origin
        )));
    }

    Ok(())
}
