use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if any env var carries an unparseable value.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if any env var carries an unparseable value.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup — no `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let env = parse_environment(&or_default("CABFLOW_ENV", "development"));
    let log_level = or_default("CABFLOW_LOG_LEVEL", "info");

    let autocab_base_url = or_default(
        "CABFLOW_AUTOCAB_BASE_URL",
        "https://autocab-api.azure-api.net",
    );
    let autocab_api_key = lookup("CABFLOW_AUTOCAB_API_KEY").ok();

    let geocoder_base_url = or_default("CABFLOW_GEOCODER_BASE_URL", "https://maps.googleapis.com");
    let geocoder_api_key = lookup("CABFLOW_GEOCODER_API_KEY").ok();

    let llm_base_url = or_default("CABFLOW_LLM_BASE_URL", "https://api.openai.com/v1");
    let llm_api_key = lookup("CABFLOW_LLM_API_KEY").ok();
    let llm_model = or_default("CABFLOW_LLM_MODEL", "gpt-4o-mini");

    let http_timeout_secs = parse_u64("CABFLOW_HTTP_TIMEOUT_SECS", "8")?;
    let http_max_retries = parse_u32("CABFLOW_HTTP_MAX_RETRIES", "2")?;
    let http_backoff_base_ms = parse_u64("CABFLOW_HTTP_BACKOFF_BASE_MS", "500")?;

    let landmarks_path = lookup("CABFLOW_LANDMARKS_PATH").ok().map(PathBuf::from);

    Ok(AppConfig {
        env,
        log_level,
        autocab_base_url,
        autocab_api_key,
        geocoder_base_url,
        geocoder_api_key,
        llm_base_url,
        llm_api_key,
        llm_model,
        http_timeout_secs,
        http_max_retries,
        http_backoff_base_ms,
        landmarks_path,
    })
}

fn parse_environment(raw: &str) -> Environment {
    match raw.to_lowercase().as_str() {
        "production" | "prod" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}
