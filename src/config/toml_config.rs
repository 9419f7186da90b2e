use crate::utils::error::{BridgeError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_range, validate_secret, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_SURVEYMONKEY_BASE_URL: &str = "https://api.surveymonkey.com";
pub const DEFAULT_ATTIO_BASE_URL: &str = "https://api.attio.com";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub surveymonkey: SurveyMonkeyConfig,
    pub attio: AttioConfig,
    #[serde(default)]
    pub health: HealthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Reported by `GET /health`.
    #[serde(default = "default_environment")]
    pub environment: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyMonkeyConfig {
    #[serde(default = "default_surveymonkey_base_url")]
    pub base_url: String,
    pub access_token: String,
    #[serde(default = "default_outbound_timeout")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttioConfig {
    #[serde(default = "default_attio_base_url")]
    pub base_url: String,
    pub api_key: String,
    #[serde(default = "default_outbound_timeout")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthConfig {
    /// Only host and port are used, for a TCP reachability probe.
    pub database_url: Option<String>,
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_seconds: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            other => Err(BridgeError::InvalidConfigValueError {
                field: "logging.format".to_string(),
                value: other.to_string(),
                reason: "Expected \"compact\" or \"json\"".to_string(),
            }),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_environment() -> String {
    "production".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_outbound_timeout() -> u64 {
    5
}

fn default_probe_timeout() -> u64 {
    2
}

fn default_surveymonkey_base_url() -> String {
    DEFAULT_SURVEYMONKEY_BASE_URL.to_string()
}

fn default_attio_base_url() -> String {
    DEFAULT_ATTIO_BASE_URL.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            environment: default_environment(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            probe_timeout_seconds: default_probe_timeout(),
        }
    }
}

impl ServiceConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(BridgeError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| BridgeError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${ATTIO_API_KEY})，找不到的保留原樣
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        use std::sync::LazyLock;

        static ENV_VAR: LazyLock<Option<Regex>> =
            LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").ok());

        let Some(re) = ENV_VAR.as_ref() else {
            return content.to_string();
        };

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    /// Environment-only configuration for container deployments.
    pub fn from_env() -> Result<Self> {
        let required = |name: &str| {
            env::var(name).map_err(|_| BridgeError::MissingConfigError {
                field: name.to_string(),
            })
        };
        let parsed = |name: &str, default: u64| -> Result<u64> {
            match env::var(name) {
                Ok(raw) => raw.parse().map_err(|_| BridgeError::InvalidConfigValueError {
                    field: name.to_string(),
                    value: raw,
                    reason: "Expected a non-negative integer".to_string(),
                }),
                Err(_) => Ok(default),
            }
        };

        let outbound_timeout = parsed("OUTBOUND_TIMEOUT_SECONDS", default_outbound_timeout())?;
        let port = parsed("PORT", u64::from(default_port()))?;

        Ok(Self {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| default_host()),
                port: u16::try_from(port).map_err(|_| BridgeError::InvalidConfigValueError {
                    field: "PORT".to_string(),
                    value: port.to_string(),
                    reason: "Port must fit in 16 bits".to_string(),
                })?,
                environment: env::var("APP_ENV").unwrap_or_else(|_| default_environment()),
                request_timeout_seconds: parsed(
                    "REQUEST_TIMEOUT_SECONDS",
                    default_request_timeout(),
                )?,
            },
            surveymonkey: SurveyMonkeyConfig {
                base_url: env::var("SURVEYMONKEY_BASE_URL")
                    .unwrap_or_else(|_| default_surveymonkey_base_url()),
                access_token: required("SURVEYMONKEY_ACCESS_TOKEN")?,
                timeout_seconds: outbound_timeout,
            },
            attio: AttioConfig {
                base_url: env::var("ATTIO_BASE_URL").unwrap_or_else(|_| default_attio_base_url()),
                api_key: required("ATTIO_API_KEY")?,
                timeout_seconds: outbound_timeout,
            },
            health: HealthConfig {
                database_url: env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
                probe_timeout_seconds: default_probe_timeout(),
            },
            logging: LoggingConfig {
                format: match env::var("LOG_FORMAT") {
                    Ok(raw) => raw.parse()?,
                    Err(_) => LogFormat::default(),
                },
            },
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_seconds)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Validate for ServiceConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("server.host", &self.server.host)?;
        validate_non_empty_string("server.environment", &self.server.environment)?;
        validate_range(
            "server.request_timeout_seconds",
            self.server.request_timeout_seconds,
            1,
            300,
        )?;

        validate_url("surveymonkey.base_url", &self.surveymonkey.base_url)?;
        validate_secret("surveymonkey.access_token", &self.surveymonkey.access_token)?;
        validate_range(
            "surveymonkey.timeout_seconds",
            self.surveymonkey.timeout_seconds,
            1,
            60,
        )?;

        validate_url("attio.base_url", &self.attio.base_url)?;
        validate_secret("attio.api_key", &self.attio.api_key)?;
        validate_range("attio.timeout_seconds", self.attio.timeout_seconds, 1, 60)?;

        validate_range(
            "health.probe_timeout_seconds",
            self.health.probe_timeout_seconds,
            1,
            30,
        )?;

        // 入站逾時必須涵蓋兩次外部呼叫
        let outbound_total = self.surveymonkey.timeout_seconds + self.attio.timeout_seconds;
        if self.server.request_timeout_seconds <= outbound_total {
            return Err(BridgeError::InvalidConfigValueError {
                field: "server.request_timeout_seconds".to_string(),
                value: self.server.request_timeout_seconds.to_string(),
                reason: format!(
                    "Must exceed surveymonkey.timeout_seconds + attio.timeout_seconds ({})",
                    outbound_total
                ),
            });
        }

        tracing::debug!("Service configuration validation passed");
        Ok(())
    }
}
