use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("KLANAVO_ENV", "development"))?;

    let bind_addr = or_default("KLANAVO_BIND_ADDR", "0.0.0.0:8000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("KLANAVO_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("KLANAVO_LOG_LEVEL", "info");

    let ors_api_key = lookup("ORS_API_KEY")
        .ok()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty());
    if ors_api_key.is_none() && env == Environment::Production {
        return Err(ConfigError::MissingEnvVar("ORS_API_KEY".to_string()));
    }

    let ors_base_url = or_default("KLANAVO_ORS_BASE_URL", "https://api.openrouteservice.org/");
    let nominatim_base_url = or_default(
        "KLANAVO_NOMINATIM_BASE_URL",
        "https://nominatim.openstreetmap.org/",
    );
    let listings_base_url = or_default("KLANAVO_LISTINGS_BASE_URL", "https://www.kleinanzeigen.de");
    let country_code = or_default("KLANAVO_COUNTRY_CODE", "DE");
    if country_code.len() != 2 || !country_code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(invalid(
            "KLANAVO_COUNTRY_CODE",
            format!("expected a two-letter country code, got \"{country_code}\""),
        ));
    }

    let request_timeout_secs = parse_u64("KLANAVO_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("KLANAVO_USER_AGENT", DEFAULT_USER_AGENT);
    let geocoder_user_agent =
        or_default("KLANAVO_GEOCODER_USER_AGENT", "klanavo/0.1 (route-search)");
    let max_retries = parse_u32("KLANAVO_MAX_RETRIES", "1")?;
    let retry_backoff_base_ms = parse_u64("KLANAVO_RETRY_BACKOFF_BASE_MS", "500")?;
    let max_concurrent_fetches = parse_usize("KLANAVO_MAX_CONCURRENT_FETCHES", "4")?.max(1);
    let admission_interval_ms = parse_u64("KLANAVO_ADMISSION_INTERVAL_MS", "1000")?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        ors_api_key,
        ors_base_url,
        nominatim_base_url,
        listings_base_url,
        country_code: country_code.to_ascii_uppercase(),
        request_timeout_secs,
        user_agent,
        geocoder_user_agent,
        max_retries,
        retry_backoff_base_ms,
        max_concurrent_fetches,
        admission_interval_ms,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] for unrecognized values.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "KLANAVO_ENV".to_string(),
            reason: format!("expected development, test, or production; got \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
