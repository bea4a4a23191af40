use super::models::{Config, Secrets};
use config::{ConfigError, Environment, File, Map};
use std::env;
use std::path::{Path, PathBuf};

const CONFIG_ENV_VAR: &str = "AUTOAPPLY_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "cfg.json";
const ENV_PREFIX: &str = "AUTOAPPLY";
const ENV_SEPARATOR: &str = "__";
const LIST_KEYS: [&str; 3] = ["keywords", "excluded_cities", "excluded_words"];

/// Load configuration from multiple sources with priority:
/// 1. Defaults (embedded in structs)
/// 2. Config file (explicit path, `AUTOAPPLY_CONFIG`, or `cfg.json`)
/// 3. Environment variables from .env file (via dotenvy)
/// 4. System environment variables (highest priority)
pub fn load(path: Option<PathBuf>) -> Result<Config, ConfigError> {
    // Load .env file if it exists (ignore errors if file doesn't exist)
    let _ = dotenvy::dotenv();

    let config_path = path.unwrap_or_else(|| {
        env::var(CONFIG_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
    });

    let mut config = load_from_sources(&config_path)?;
    config.secrets = secrets_from(|key| env::var(key).ok());

    Ok(config)
}

/// Collect secrets through `lookup`, treating blank values as unset
pub fn secrets_from<F>(lookup: F) -> Secrets
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    Secrets {
        access_token: get("ACCESS_TOKEN"),
        resume_id: get("RESUME_ID"),
        client_id: get("CLIENT_ID"),
        client_secret: get("CLIENT_SECRET"),
        redirect_uri: get("REDIRECT_URI"),
    }
}

/// Load configuration from a specific path and environment
/// Useful for testing with custom config files
pub fn load_from_sources(config_path: &Path) -> Result<Config, ConfigError> {
    build(config_path, environment(None))
}

/// `AUTOAPPLY__*` overrides, read from `source` instead of the process
/// environment when given
fn environment(source: Option<Map<String, String>>) -> Environment {
    // AUTOAPPLY__PER_PAGE -> per_page, AUTOAPPLY__API__BASE_URL -> api.base_url
    let mut environment = Environment::with_prefix(ENV_PREFIX)
        .separator(ENV_SEPARATOR)
        .list_separator(",")
        .try_parsing(true)
        .source(source);
    for key in LIST_KEYS {
        environment = environment.with_list_parse_key(key);
    }
    environment
}

fn build(config_path: &Path, environment: Environment) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();

    // Format is inferred from the extension, so cfg.toml works as well
    if config_path.exists() {
        tracing::info!("Loading configuration from: {}", config_path.display());
        builder = builder.add_source(File::from(config_path).required(false));
    } else {
        tracing::warn!(
            "Configuration file not found at {}, using defaults and environment overrides",
            config_path.display()
        );
    }

    let config = builder.add_source(environment).build()?;
    config.try_deserialize()
}
