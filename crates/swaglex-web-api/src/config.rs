use crate::rate_limiter::RateLimitConfig;
use std::{env, fmt::Display, path::PathBuf, str::FromStr};

pub const DEFAULT_LOG_LEVEL: &str = "swaglex_web_api=debug,tower_http=debug";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub log_level: String,
    pub log_format: LogFormat,
    pub cors_origins: Vec<String>,
    /// OpenAPI document to serve instead of the generated one.
    pub spec_path: Option<PathBuf>,
    pub docs_path: String,
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3003,
            environment: "development".to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_format: LogFormat::Json,
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:3003".to_string(),
            ],
            spec_path: None,
            docs_path: "/docs".to_string(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(host) = env::var("SWAGLEX_HOST") {
            config.host = host;
        }

        parse_var("SWAGLEX_PORT", &mut config.port);

        if let Ok(environment) = env::var("SWAGLEX_ENV").or_else(|_| env::var("NODE_ENV")) {
            config.environment = environment;
        }

        if let Ok(log_level) = env::var("RUST_LOG") {
            config.log_level = log_level;
        } else if let Ok(log_level) = env::var("SWAGLEX_LOG_LEVEL") {
            config.log_level = log_level;
        }

        if let Ok(log_format) = env::var("SWAGLEX_LOG_FORMAT") {
            config.log_format = match log_format.to_lowercase().as_str() {
                "text" | "plain" => LogFormat::Text,
                "json" => LogFormat::Json,
                _ => {
                    eprintln!(
                        "Warning: Invalid SWAGLEX_LOG_FORMAT value '{}', using default JSON",
                        log_format
                    );
                    LogFormat::Json
                }
            };
        }

        if let Ok(cors_origins) = env::var("SWAGLEX_CORS_ORIGINS") {
            config.cors_origins = cors_origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if let Ok(spec_path) = env::var("SWAGLEX_SPEC_PATH")
            && !spec_path.trim().is_empty()
        {
            config.spec_path = Some(PathBuf::from(spec_path));
        }

        if let Ok(docs_path) = env::var("SWAGLEX_DOCS_PATH") {
            if docs_path.starts_with('/') && docs_path.len() > 1 {
                config.docs_path = docs_path.trim_end_matches('/').to_string();
            } else {
                eprintln!(
                    "Warning: Invalid SWAGLEX_DOCS_PATH value '{}', using default {}",
                    docs_path, config.docs_path
                );
            }
        }

        // Rate limiting configuration
        parse_var(
            "SWAGLEX_RATE_LIMIT_MAX_REQUESTS",
            &mut config.rate_limit.max_requests,
        );
        parse_var(
            "SWAGLEX_RATE_LIMIT_WINDOW_MS",
            &mut config.rate_limit.window_ms,
        );
        parse_var(
            "SWAGLEX_RATE_LIMIT_SWEEP_EVERY",
            &mut config.rate_limit.sweep_every,
        );
        parse_var(
            "SWAGLEX_RATE_LIMIT_CLEANUP_INTERVAL_SECONDS",
            &mut config.rate_limit.cleanup_interval_seconds,
        );

        config
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn server_url(&self) -> String {
        if self.port == 80 {
            format!("http://{}", self.host)
        } else if self.port == 443 {
            format!("https://{}", self.host)
        } else {
            format!("http://{}:{}", self.host, self.port)
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// Overwrites `target` with the parsed value of `name`, warning and keeping
/// the current value when it does not parse.
fn parse_var<T>(name: &str, target: &mut T)
where
    T: FromStr + Display,
{
    let Ok(raw) = env::var(name) else {
        return;
    };

    match raw.trim().parse::<T>() {
        Ok(value) => *target = value,
        Err(_) => eprintln!(
            "Warning: Invalid {} value '{}', using default {}",
            name, raw, target
        ),
    }
}
