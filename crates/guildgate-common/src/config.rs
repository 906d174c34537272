//! Application configuration loaded from environment variables and config files.
//!
//! Supports `.env` files for development and environment variables for production.
//! Config precedence: env vars > .env file > config.toml > defaults

use serde::Deserialize;
use validator::Validate;

use crate::guilds::DISCORD_CDN;
use crate::validation::format_validation_errors;

/// Defaults shared by the loader and the `Default` impls.
const DEFAULT_TARGET_RATE: u32 = 20;
const DEFAULT_HISTORY_LENGTH: usize = 60;

/// Built-in defaults, the lowest-precedence layer.
fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
    config::Config::builder()
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8080)?
        .set_default("server.request_timeout_secs", 10)?
        .set_default("sampler.target_rate", i64::from(DEFAULT_TARGET_RATE))?
        .set_default("sampler.history_length", DEFAULT_HISTORY_LENGTH as i64)?
        .set_default("guilds.cdn_base_url", DISCORD_CDN)?
        .set_default("log.filter", "guildgate=info,tower_http=info")?
        .set_default("log.json", false)
}

/// Defaults, then a config file, then the environment.
fn builder(
    file: Option<&str>,
) -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
    let builder = match file {
        Some(path) => defaults()?.add_source(config::File::with_name(path).required(true)),
        // Optional config file
        None => defaults()?.add_source(config::File::with_name("config").required(false)),
    };

    Ok(builder.add_source(environment()))
}

/// Environment variables (GUILDGATE_SERVER__PORT, GUILDGATE_SAMPLER__TARGET_RATE, etc.)
fn environment() -> config::Environment {
    config::Environment::with_prefix("GUILDGATE")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

/// Load configuration from the environment, an optional explicit file path, and defaults.
///
/// Should be called once at application startup; the result is handed to
/// whatever owns the process-wide state.
pub fn load(file: Option<&str>) -> Result<AppConfig, config::ConfigError> {
    // Load .env file if present (development)
    let _ = dotenvy::dotenv();

    let app_config: AppConfig = builder(file)?.build()?.try_deserialize()?;
    app_config
        .sampler
        .validate()
        .map_err(|e| config::ConfigError::Message(format_validation_errors(&e)))?;
    Ok(app_config)
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub sampler: SamplerConfig,
    pub guilds: GuildsConfig,
    pub log: LogConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound on a single API request, in seconds.
    pub request_timeout_secs: u64,
}

/// Liveness sampler settings.
#[derive(Debug, Deserialize, Clone, Validate)]
pub struct SamplerConfig {
    /// Ticks per second the sampler aims for; samples are clamped to this.
    #[validate(range(min = 1, max = 1000, message = "sampler.target_rate must be 1-1000"))]
    pub target_rate: u32,
    /// Ring buffer capacity in samples.
    #[validate(range(min = 1, max = 3600, message = "sampler.history_length must be 1-3600"))]
    pub history_length: usize,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            target_rate: DEFAULT_TARGET_RATE,
            history_length: DEFAULT_HISTORY_LENGTH,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct GuildsConfig {
    /// Base URL for guild icons and the default avatar.
    pub cdn_base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}
