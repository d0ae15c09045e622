use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

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

fn invalid(var: &str, reason: impl ToString) -> ConfigError {
    ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason: reason.to_string(),
    }
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it from a map.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e))
    };

    // Zero is never a meaningful bound for counts, limits, or concurrency.
    let parse_positive = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let value = or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e))?;
        if value == 0 {
            return Err(invalid(var, "must be greater than zero"));
        }
        Ok(value)
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        match or_default(var, default).to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(invalid(var, format!("expected a boolean, got '{other}'"))),
        }
    };

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("YUQING_ENV", "development"))?;

    let bind_addr = or_default("YUQING_BIND_ADDR", "0.0.0.0:3000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("YUQING_BIND_ADDR", e))?;
    let log_level = or_default("YUQING_LOG_LEVEL", "info");
    let tasks_path = PathBuf::from(or_default("YUQING_TASKS_PATH", "./config/tasks.yaml"));

    let db_max_connections = parse_u32("YUQING_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("YUQING_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("YUQING_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let collect_max_results = parse_positive("YUQING_COLLECT_MAX_RESULTS", "50")?;
    let collect_max_concurrent_platforms =
        parse_positive("YUQING_COLLECT_MAX_CONCURRENT_PLATFORMS", "2")?;
    let collect_adapter_timeout_secs = parse_u64("YUQING_COLLECT_ADAPTER_TIMEOUT_SECS", "120")?;
    let collect_schedule = or_default("YUQING_COLLECT_SCHEDULE", "0 */30 * * * *");
    let collect_use_mock = parse_bool("YUQING_COLLECT_USE_MOCK", "false")?;

    let nlp_top_k = parse_positive("YUQING_NLP_TOP_K", "10")?;
    let nlp_remote_url = lookup("YUQING_NLP_REMOTE_URL")
        .ok()
        .map(|url| url.trim().trim_end_matches('/').to_string())
        .filter(|url| !url.is_empty());
    let nlp_request_timeout_secs = parse_u64("YUQING_NLP_REQUEST_TIMEOUT_SECS", "10")?;

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        tasks_path,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        collect_max_results,
        collect_max_concurrent_platforms,
        collect_adapter_timeout_secs,
        collect_schedule,
        collect_use_mock,
        nlp_top_k,
        nlp_remote_url,
        nlp_request_timeout_secs,
    })
}

fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(invalid(
            "YUQING_ENV",
            format!("unknown environment '{other}'; expected development, test, or production"),
        )),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
