use std::fmt;
use std::path::Path;
use std::time::Duration;

use jsonschema::{validator_for, Validator};
use once_cell::sync::Lazy;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::FieldMap;

pub const DEFAULT_BASE_URL: &str = "https://api.notion.com/v1";
pub const DEFAULT_NOTION_VERSION: &str = "2022-06-28";
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 3;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("config does not match schema: {0}")]
    Schema(String),
    #[error("invalid {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Default, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct NotionSection {
    /// API root, e.g. <https://api.notion.com/v1>
    #[serde(default)]
    pub base_url: Option<String>,
    /// Integration secret sent as a bearer token
    #[serde(default)]
    pub secret: Option<String>,
    /// Target database identifier
    #[serde(default)]
    pub database_id: Option<String>,
    /// Value of the Notion-Version header
    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct FieldsSection {
    /// Title-type property holding the phrase text
    #[serde(default)]
    pub title: Option<String>,
    /// Date-type property holding the creation timestamp
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct HttpSection {
    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,
    /// Whole-request timeout; unset means calls wait indefinitely
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// On-disk TOML layout.
#[derive(Debug, Default, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub notion: NotionSection,
    #[serde(default)]
    pub fields: FieldsSection,
    #[serde(default)]
    pub http: HttpSection,
}

static CONFIG_SCHEMA: Lazy<Validator> = Lazy::new(|| {
    let schema_value = config_schema_json();
    validator_for(&schema_value).expect("valid schema")
});

/// JSON schema describing [`FileConfig`].
pub fn config_schema_json() -> serde_json::Value {
    let schema = schemars::schema_for!(FileConfig);
    serde_json::to_value(&schema).expect("schema json")
}

pub fn parse_config(content: &str) -> Result<FileConfig, ConfigError> {
    let raw: toml::Value = toml::from_str(content)?;
    let json_value = serde_json::to_value(&raw).map_err(|e| ConfigError::Schema(e.to_string()))?;
    let validation_errors: Vec<_> = CONFIG_SCHEMA
        .iter_errors(&json_value)
        .map(|e| e.to_string())
        .collect();
    if !validation_errors.is_empty() {
        return Err(ConfigError::Schema(validation_errors.join(", ")));
    }
    Ok(toml::from_str(content)?)
}

pub fn load_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_config(&content)
}

/// Everything the remote adapter needs, resolved once and handed to its
/// constructor.
#[derive(Clone)]
pub struct PhrasesConfig {
    pub base_url: String,
    pub secret: String,
    pub database_id: String,
    pub notion_version: String,
    pub fields: FieldMap,
    pub connect_timeout: Duration,
    pub request_timeout: Option<Duration>,
}

impl Default for PhrasesConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            secret: String::new(),
            database_id: String::new(),
            notion_version: DEFAULT_NOTION_VERSION.to_string(),
            fields: FieldMap::default(),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            request_timeout: None,
        }
    }
}

impl fmt::Debug for PhrasesConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhrasesConfig")
            .field("base_url", &self.base_url)
            .field("secret", &if self.secret.is_empty() { "" } else { "***" })
            .field("database_id", &self.database_id)
            .field("notion_version", &self.notion_version)
            .field("fields", &self.fields)
            .field("connect_timeout", &self.connect_timeout)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_secs(key: &'static str, raw: Option<String>) -> Result<Option<u64>, ConfigError> {
    raw.map(|value| {
        value
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidValue { key, value })
    })
    .transpose()
}

impl PhrasesConfig {
    /// Layer environment-style lookups over an optional file config.
    /// Lookups win over file values; unset keys fall back to defaults.
    pub fn resolve<F>(file: Option<FileConfig>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = file.unwrap_or_default();
        let defaults = PhrasesConfig::default();
        let get = |key: &str| non_empty(lookup(key));

        // Field names keep their exact spelling, whitespace included.
        let field = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let connect_secs = parse_secs(
            "PHRASES_HTTP_CONNECT_TIMEOUT_SECS",
            get("PHRASES_HTTP_CONNECT_TIMEOUT_SECS"),
        )?
        .or(file.http.connect_timeout_secs)
        .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS)
        .max(1);
        let request_secs =
            parse_secs("PHRASES_HTTP_TIMEOUT_SECS", get("PHRASES_HTTP_TIMEOUT_SECS"))?
                .or(file.http.timeout_secs)
                .filter(|secs| *secs > 0);

        Ok(Self {
            base_url: get("NOTION_BASE_URL")
                .or(non_empty(file.notion.base_url))
                .unwrap_or(defaults.base_url)
                .trim_end_matches('/')
                .to_string(),
            secret: get("NOTION_SECRET")
                .or(non_empty(file.notion.secret))
                .unwrap_or_default(),
            database_id: get("DATABASE_ID")
                .or(non_empty(file.notion.database_id))
                .unwrap_or_default(),
            notion_version: get("NOTION_VERSION")
                .or(non_empty(file.notion.version))
                .unwrap_or(defaults.notion_version),
            fields: FieldMap {
                title: field("PHRASES_TITLE_FIELD")
                    .or(file.fields.title.filter(|v| !v.is_empty()))
                    .unwrap_or(defaults.fields.title),
                date: field("PHRASES_DATE_FIELD")
                    .or(file.fields.date.filter(|v| !v.is_empty()))
                    .unwrap_or(defaults.fields.date),
            },
            connect_timeout: Duration::from_secs(connect_secs),
            request_timeout: request_secs.map(Duration::from_secs),
        })
    }

    /// Resolve from the process environment, reading `PHRASES_CONFIG` first
    /// when it names a TOML file.
    pub fn from_env() -> Result<Self, ConfigError> {
        let file = match non_empty(std::env::var("PHRASES_CONFIG").ok()) {
            Some(path) => Some(load_config(Path::new(&path))?),
            None => None,
        };
        let cfg = Self::resolve(file, |key| std::env::var(key).ok())?;
        cfg.warn_if_incomplete();
        Ok(cfg)
    }

    /// Names of the required values that are still empty.
    pub fn missing(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if self.secret.is_empty() {
            out.push("NOTION_SECRET");
        }
        if self.database_id.is_empty() {
            out.push("DATABASE_ID");
        }
        out
    }

    /// Missing credentials are not fatal; remote calls will fail instead.
    pub fn warn_if_incomplete(&self) {
        let missing = self.missing();
        if !missing.is_empty() {
            warn!(
                target: "phrases::config",
                missing = ?missing,
                "notion credentials incomplete; remote calls will be rejected upstream"
            );
        }
    }
}
