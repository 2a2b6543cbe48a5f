//! Configuration loaded from environment variables.
//!
//! Everything has a default suitable for local development except the
//! registry and provider endpoints; without those the corresponding
//! integration is disabled.

use std::str::FromStr;
use std::time::Duration;

use cast_core::error::CoreError;
use cast_core::prompt::PromptTemplate;
use cast_core::word_limit::WordLimits;
use cast_llm::ProviderConfig;
use cast_pipeline::config::{
    GenerationConfig, DEFAULT_MAX_CHARACTERS_PER_REQUEST, DEFAULT_MAX_TOKENS,
    DEFAULT_RECONCILER_QUEUE_CAPACITY, DEFAULT_TEMPERATURE,
};
use cast_registry::RegistryConfig;

/// Default provider model.
pub const DEFAULT_LLM_MODEL: &str = "gpt-3.5-turbo";

/// Errors raised while loading configuration at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("Failed to read prompt template {path}: {source}")]
    TemplateRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid prompt template: {0}")]
    Template(#[from] CoreError),
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8011`).
    pub port: u16,
    /// HTTP request timeout in seconds (default: `330`).
    pub request_timeout_secs: u64,
    /// Time allowed for draining the reconciler on shutdown (default: `30`).
    pub shutdown_timeout_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default   |
    /// |-------------------------|-----------|
    /// | `HOST`                  | `0.0.0.0` |
    /// | `PORT`                  | `8011`    |
    /// | `REQUEST_TIMEOUT_SECS`  | `330`     |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `30`      |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_var(&lookup, "PORT", 8011, "a valid port")?,
            request_timeout_secs: parse_var(&lookup, "REQUEST_TIMEOUT_SECS", 330, "a whole number")?,
            shutdown_timeout_secs: parse_var(&lookup, "SHUTDOWN_TIMEOUT_SECS", 30, "a whole number")?,
        })
    }
}

// ---------------------------------------------------------------------------
// Integrations
// ---------------------------------------------------------------------------

/// Pipeline tuning plus optional registry and provider connections.
#[derive(Debug, Clone)]
pub struct IntegrationConfig {
    pub generation: GenerationConfig,
    /// `None` when the registry integration is disabled.
    pub registry: Option<RegistryConfig>,
    /// `None` when the provider integration is disabled.
    pub provider: Option<ProviderConfig>,
}

impl IntegrationConfig {
    /// Load integration settings from environment variables.
    ///
    /// | Env Var                       | Default         |
    /// |-------------------------------|-----------------|
    /// | `MAX_CHARACTERS_PER_REQUEST`  | `4`             |
    /// | `PROFILE_GENERATION_TIMEOUT`  | `300` (secs)    |
    /// | `MOTIVATION_WORD_LIMIT`       | `50`            |
    /// | `VISUAL_SIGNATURE_WORD_LIMIT` | `40`            |
    /// | `RECONCILER_QUEUE_CAPACITY`   | `64`            |
    /// | `PROMPT_TEMPLATE_PATH`        | built-in        |
    /// | `ENABLE_PAYLOAD_INTEGRATION`  | `true`          |
    /// | `PAYLOAD_CMS_URL`             | unset           |
    /// | `PAYLOAD_CMS_API_KEY`         | unset           |
    /// | `PAYLOAD_CMS_TIMEOUT`         | `30` (secs)     |
    /// | `ENABLE_LLM_INTEGRATION`      | `true`          |
    /// | `LLM_PROVIDER_URL`            | unset           |
    /// | `LLM_API_KEY`                 | unset           |
    /// | `LLM_MODEL_NAME`              | `gpt-3.5-turbo` |
    /// | `LLM_TIMEOUT`                 | `60` (secs)     |
    /// | `LLM_MAX_TOKENS`              | `200`           |
    /// | `LLM_TEMPERATURE`             | `0.7`           |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let max_characters = parse_var(
            &lookup,
            "MAX_CHARACTERS_PER_REQUEST",
            DEFAULT_MAX_CHARACTERS_PER_REQUEST,
            "a positive integer",
        )?;
        require_positive("MAX_CHARACTERS_PER_REQUEST", max_characters)?;

        let defaults = WordLimits::default();
        let word_limits = WordLimits {
            motivation: parse_var(
                &lookup,
                "MOTIVATION_WORD_LIMIT",
                defaults.motivation,
                "a positive integer",
            )?,
            visual_signature: parse_var(
                &lookup,
                "VISUAL_SIGNATURE_WORD_LIMIT",
                defaults.visual_signature,
                "a positive integer",
            )?,
        };
        require_positive("MOTIVATION_WORD_LIMIT", word_limits.motivation)?;
        require_positive("VISUAL_SIGNATURE_WORD_LIMIT", word_limits.visual_signature)?;

        let temperature: f32 = parse_var(
            &lookup,
            "LLM_TEMPERATURE",
            DEFAULT_TEMPERATURE,
            "a number between 0.0 and 2.0",
        )?;
        if !(0.0..=2.0).contains(&temperature) {
            return Err(ConfigError::Invalid {
                name: "LLM_TEMPERATURE",
                value: temperature.to_string(),
                expected: "a number between 0.0 and 2.0",
            });
        }

        let template = match lookup("PROMPT_TEMPLATE_PATH").filter(|p| !p.trim().is_empty()) {
            Some(path) => {
                let source = std::fs::read_to_string(&path)
                    .map_err(|source| ConfigError::TemplateRead { path, source })?;
                PromptTemplate::new(source)?
            }
            None => PromptTemplate::master_reference(),
        };

        let registry_timeout = secs(&lookup, "PAYLOAD_CMS_TIMEOUT", 30)?;
        let provider_timeout = secs(&lookup, "LLM_TIMEOUT", 60)?;

        let generation = GenerationConfig {
            max_characters,
            phase_timeout: secs(&lookup, "PROFILE_GENERATION_TIMEOUT", 300)?,
            provider_timeout,
            max_tokens: parse_var(&lookup, "LLM_MAX_TOKENS", DEFAULT_MAX_TOKENS, "a whole number")?,
            temperature,
            word_limits,
            registry_timeout,
            reconciler_queue_capacity: parse_var(
                &lookup,
                "RECONCILER_QUEUE_CAPACITY",
                DEFAULT_RECONCILER_QUEUE_CAPACITY,
                "a positive integer",
            )?,
            template,
        };

        let registry = if parse_flag(&lookup, "ENABLE_PAYLOAD_INTEGRATION")? {
            match optional_url(&lookup, "PAYLOAD_CMS_URL")? {
                Some(base_url) => Some(RegistryConfig {
                    base_url,
                    api_key: non_empty(&lookup, "PAYLOAD_CMS_API_KEY"),
                    timeout: registry_timeout,
                }),
                None => {
                    tracing::warn!("PAYLOAD_CMS_URL not set, registry integration disabled");
                    None
                }
            }
        } else {
            tracing::info!("Registry integration disabled by ENABLE_PAYLOAD_INTEGRATION");
            None
        };

        let provider = if parse_flag(&lookup, "ENABLE_LLM_INTEGRATION")? {
            match optional_url(&lookup, "LLM_PROVIDER_URL")? {
                Some(url) => Some(ProviderConfig {
                    url,
                    api_key: non_empty(&lookup, "LLM_API_KEY"),
                    model: non_empty(&lookup, "LLM_MODEL_NAME")
                        .unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
                    timeout: provider_timeout,
                }),
                None => {
                    tracing::warn!("LLM_PROVIDER_URL not set, profile synthesis disabled");
                    None
                }
            }
        } else {
            tracing::info!("Profile synthesis disabled by ENABLE_LLM_INTEGRATION");
            None
        };

        Ok(Self {
            generation,
            registry,
            provider,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn non_empty(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
    expected: &'static str,
) -> Result<T, ConfigError> {
    match non_empty(lookup, name) {
        Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
            name,
            value: raw,
            expected,
        }),
        None => Ok(default),
    }
}

fn secs(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: u64,
) -> Result<Duration, ConfigError> {
    parse_var(lookup, name, default, "a whole number of seconds").map(Duration::from_secs)
}

fn require_positive(name: &'static str, value: usize) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::Invalid {
            name,
            value: value.to_string(),
            expected: "a positive integer",
        });
    }
    Ok(())
}

/// Boolean flags default to enabled.
fn parse_flag(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<bool, ConfigError> {
    match non_empty(lookup, name).map(|v| v.to_ascii_lowercase()) {
        None => Ok(true),
        Some(v) => match v.as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::Invalid {
                name,
                value: v,
                expected: "true or false",
            }),
        },
    }
}

/// An http(s) URL with any trailing slash removed, or `None` when unset.
fn optional_url(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<String>, ConfigError> {
    let Some(raw) = non_empty(lookup, name) else {
        return Ok(None);
    };
    if !(raw.starts_with("http://") || raw.starts_with("https://")) {
        return Err(ConfigError::Invalid {
            name,
            value: raw,
            expected: "an http:// or https:// URL",
        });
    }
    Ok(Some(raw.trim_end_matches('/').to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
