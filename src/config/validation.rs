use crate::config::types::{ApiConfig, BookApiConfig, Config, DownloadConfig, OutputConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_download_config(&config.download)?;
    validate_output_config(&config.output)?;
    validate_book_api_config(&config.book_api)?;

    if config.api.is_empty() {
        return Err(ConfigError::Validation(
            "at least one [[api]] entry is required".to_string(),
        ));
    }

    for api in &config.api {
        validate_api(api)?;
    }

    if config.current_api >= config.api.len() {
        return Err(ConfigError::Validation(format!(
            "current-api must be below {}, got {}",
            config.api.len(),
            config.current_api
        )));
    }

    Ok(())
}

/// Validates a single content API configuration
pub fn validate_api(api: &ApiConfig) -> Result<(), ConfigError> {
    if api.name.trim().is_empty() {
        return Err(ConfigError::Validation("api name cannot be empty".to_string()));
    }

    if api.url_template.trim().is_empty() {
        return Err(ConfigError::Validation(format!(
            "api '{}' has an empty url-template",
            api.name
        )));
    }

    validate_http_url(&api.chapter_url("0"), &api.name)?;

    if api.concurrency < 1 {
        return Err(ConfigError::Validation(format!(
            "api '{}' concurrency must be >= 1, got {}",
            api.name, api.concurrency
        )));
    }

    if api.timeout < 1 {
        return Err(ConfigError::Validation(format!(
            "api '{}' timeout must be >= 1ms",
            api.name
        )));
    }

    Ok(())
}

/// Validates retry and pacing configuration
fn validate_download_config(config: &DownloadConfig) -> Result<(), ConfigError> {
    if config.retry_base_delay < 1 {
        return Err(ConfigError::Validation(
            "retry-base-delay must be >= 1ms".to_string(),
        ));
    }

    if config.window_pause_min > config.window_pause_max {
        return Err(ConfigError::Validation(format!(
            "window-pause-min ({}ms) exceeds window-pause-max ({}ms)",
            config.window_pause_min, config.window_pause_max
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
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

    Ok(())
}

/// Validates book metadata endpoints
fn validate_book_api_config(config: &BookApiConfig) -> Result<(), ConfigError> {
    validate_http_url(&config.info_url_for("0"), "book-api info-url")?;
    validate_http_url(
        &config.directory_url_for("0"),
        "book-api directory-url",
    )?;

    if config.timeout < 1 {
        return Err(ConfigError::Validation(
            "book-api timeout must be >= 1ms".to_string(),
        ));
    }

    Ok(())
}

fn validate_http_url(candidate: &str, owner: &str) -> Result<(), ConfigError> {
    let url = Url::parse(candidate)
        .map_err(|e| ConfigError::InvalidUrl(format!("{} ('{}'): {}", owner, candidate, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} must use http or https, got '{}'",
            owner,
            url.scheme()
        )));
    }

    Ok(())
}
