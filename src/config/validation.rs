use crate::config::types::{
    Config, DelayConfig, ExtractConfig, FetchConfig, HeaderConfig, OutputConfig, SearchConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_search_config(&config.search)?;
    validate_fetch_config(&config.fetch)?;
    validate_header_config(&config.headers)?;
    validate_extract_config(&config.extract)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the search section
fn validate_search_config(config: &SearchConfig) -> Result<(), ConfigError> {
    if config.term.trim().is_empty() {
        return Err(ConfigError::Validation(
            "search term cannot be empty".to_string(),
        ));
    }

    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' must use http or https",
            config.base_url
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' has no host",
            config.base_url
        )));
    }

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max-pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.max_products < 1 {
        return Err(ConfigError::Validation(format!(
            "max-products must be >= 1, got {}",
            config.max_products
        )));
    }

    Ok(())
}

/// Validates retry bounds, delay ranges and challenge markers
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "max-attempts must be >= 1, got {}",
            config.max_attempts
        )));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout-secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    validate_delay("request-delay", &config.request_delay)?;
    validate_delay("retry-delay", &config.retry_delay)?;
    validate_delay("challenge-delay", &config.challenge_delay)?;
    validate_delay("page-delay", &config.page_delay)?;

    if config.page_delay.min_ms < config.request_delay.min_ms {
        return Err(ConfigError::Validation(format!(
            "page-delay min-ms ({}) must not be shorter than request-delay min-ms ({})",
            config.page_delay.min_ms, config.request_delay.min_ms
        )));
    }

    if config.challenge_delay.min_ms < config.retry_delay.min_ms {
        return Err(ConfigError::Validation(format!(
            "challenge-delay min-ms ({}) must not be shorter than retry-delay min-ms ({})",
            config.challenge_delay.min_ms, config.retry_delay.min_ms
        )));
    }

    if config.challenge_markers.is_empty()
        || config.challenge_markers.iter().any(|m| m.trim().is_empty())
    {
        return Err(ConfigError::Validation(
            "challenge-markers must contain at least one non-empty marker".to_string(),
        ));
    }

    Ok(())
}

fn validate_delay(name: &str, delay: &DelayConfig) -> Result<(), ConfigError> {
    if delay.min_ms > delay.max_ms {
        return Err(ConfigError::Validation(format!(
            "{} min-ms ({}) exceeds max-ms ({})",
            name, delay.min_ms, delay.max_ms
        )));
    }
    Ok(())
}

fn validate_header_config(config: &HeaderConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if let Some(referer) = &config.referer {
        Url::parse(referer)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid referer: {}", e)))?;
    }

    Ok(())
}

fn validate_extract_config(config: &ExtractConfig) -> Result<(), ConfigError> {
    if config.currency_symbol.is_empty() {
        return Err(ConfigError::Validation(
            "currency-symbol cannot be empty".to_string(),
        ));
    }

    if config.max_title_len < 1 || config.max_description_len < 1 {
        return Err(ConfigError::Validation(format!(
            "max-title-len and max-description-len must be >= 1, got {} and {}",
            config.max_title_len, config.max_description_len
        )));
    }

    Ok(())
}

fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    if config.file_prefix.is_empty() {
        return Err(ConfigError::Validation(
            "file-prefix cannot be empty".to_string(),
        ));
    }

    Ok(())
}
