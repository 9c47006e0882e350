//! Service configuration.
//!
//! Layering, lowest to highest precedence: built-in defaults, optional YAML
//! file, environment variables, then CLI flags (applied by the binary).
//!
//! | Environment Variable | Description |
//! |---------------------|-------------|
//! | `CAIR_BIND_HOST` | Interface all services bind to (default: `127.0.0.1`) |
//! | `CAIR_JUDGE_PORT` | Judge port (default: 8888) |
//! | `CAIR_JUDGE_WEIGHTS` | Judge weights file (default: `models/judge.json`) |
//! | `CAIR_EMBEDDER_URL` | External encoder URL; hashing embedder when unset |
//! | `CAIR_BRIDGE_PORT` | Bridge port (default: 8001) |
//! | `CAIR_JUDGE_URL` | Judge base URL used by the bridge |
//! | `CAIR_ENHANCE_PORT` | Enhance port (default: 8002) |
//! | `CAIR_BRIDGE_URL` | Bridge base URL used by enhance |
//! | `CAIR_WORKSPACE` | Default workspace root for enhance file operations |
//! | `CAIR_UPSTREAM_TIMEOUT_SECS` | Deadline for bridge→judge and enhance→bridge calls (default: 10) |

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("invalid value for {var}: '{value}'")]
    InvalidEnv { var: String, value: String },

    #[error("invalid {field} '{value}': {reason}")]
    InvalidUrl {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("invalid {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CairConfig {
    #[serde(default = "default_bind_host")]
    pub bind_host: String,

    #[serde(default)]
    pub judge: JudgeConfig,

    #[serde(default)]
    pub bridge: BridgeConfig,

    #[serde(default)]
    pub enhance: EnhanceConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgeConfig {
    #[serde(default = "default_judge_port")]
    pub port: u16,

    /// Weights file in `cair-judge-v1` format.
    #[serde(default = "default_weights")]
    pub weights: PathBuf,

    /// External encoder; the hashing embedder is used when unset.
    #[serde(default)]
    pub embedder_url: Option<String>,

    #[serde(default = "default_embedder_model")]
    pub embedder_model: String,

    #[serde(default = "default_timeout_secs")]
    pub embedder_timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeConfig {
    #[serde(default = "default_bridge_port")]
    pub port: u16,

    #[serde(default = "default_judge_url")]
    pub judge_url: String,

    /// Deadline for the single judge call.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnhanceConfig {
    #[serde(default = "default_enhance_port")]
    pub port: u16,

    #[serde(default = "default_bridge_url")]
    pub bridge_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Root for `/api/file` when a request names none.
    #[serde(default)]
    pub workspace: Option<PathBuf>,

    /// Largest file `/api/file` will return.
    #[serde(default = "default_max_read_bytes")]
    pub max_read_bytes: u64,
}

fn default_bind_host() -> String {
    "127.0.0.1".to_string()
}

fn default_judge_port() -> u16 {
    8888
}

fn default_bridge_port() -> u16 {
    8001
}

fn default_enhance_port() -> u16 {
    8002
}

fn default_weights() -> PathBuf {
    PathBuf::from("models/judge.json")
}

fn default_embedder_model() -> String {
    "minilm-384".to_string()
}

fn default_judge_url() -> String {
    "http://127.0.0.1:8888".to_string()
}

fn default_bridge_url() -> String {
    "http://127.0.0.1:8001".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_max_read_bytes() -> u64 {
    1024 * 1024
}

impl Default for CairConfig {
    fn default() -> Self {
        Self {
            bind_host: default_bind_host(),
            judge: JudgeConfig::default(),
            bridge: BridgeConfig::default(),
            enhance: EnhanceConfig::default(),
        }
    }
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            port: default_judge_port(),
            weights: default_weights(),
            embedder_url: None,
            embedder_model: default_embedder_model(),
            embedder_timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            port: default_bridge_port(),
            judge_url: default_judge_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for EnhanceConfig {
    fn default() -> Self {
        Self {
            port: default_enhance_port(),
            bridge_url: default_bridge_url(),
            timeout_secs: default_timeout_secs(),
            workspace: None,
            max_read_bytes: default_max_read_bytes(),
        }
    }
}

impl BridgeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl EnhanceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl CairConfig {
    /// Defaults (or `path`), then environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut cfg = match path {
            Some(p) => Self::from_yaml_file(p)?,
            None => Self::default(),
        };
        cfg.apply_env(|var| std::env::var(var).ok())?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Peer URLs must be absolute http(s) URLs and peer timeouts non-zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_http_url("bridge.judge_url", &self.bridge.judge_url)?;
        check_http_url("enhance.bridge_url", &self.enhance.bridge_url)?;
        if let Some(url) = &self.judge.embedder_url {
            check_http_url("judge.embedder_url", url)?;
        }
        check_timeout("bridge.timeout_secs", self.bridge.timeout_secs)?;
        check_timeout("enhance.timeout_secs", self.enhance.timeout_secs)?;
        check_timeout("judge.embedder_timeout_secs", self.judge.embedder_timeout_secs)?;
        Ok(())
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&raw).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Apply `CAIR_*` overrides from `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("CAIR_BIND_HOST") {
            self.bind_host = v;
        }

        if let Some(v) = parse_var(&lookup, "CAIR_JUDGE_PORT")? {
            self.judge.port = v;
        }
        if let Some(v) = lookup("CAIR_JUDGE_WEIGHTS") {
            self.judge.weights = PathBuf::from(v);
        }
        if let Some(v) = lookup("CAIR_EMBEDDER_URL") {
            self.judge.embedder_url = Some(v).filter(|s| !s.is_empty());
        }

        if let Some(v) = parse_var(&lookup, "CAIR_BRIDGE_PORT")? {
            self.bridge.port = v;
        }
        if let Some(v) = lookup("CAIR_JUDGE_URL") {
            self.bridge.judge_url = v;
        }

        if let Some(v) = parse_var(&lookup, "CAIR_ENHANCE_PORT")? {
            self.enhance.port = v;
        }
        if let Some(v) = lookup("CAIR_BRIDGE_URL") {
            self.enhance.bridge_url = v;
        }
        if let Some(v) = lookup("CAIR_WORKSPACE") {
            self.enhance.workspace = Some(PathBuf::from(v));
        }

        if let Some(v) = parse_var::<u64, _>(&lookup, "CAIR_UPSTREAM_TIMEOUT_SECS")? {
            self.bridge.timeout_secs = v;
            self.enhance.timeout_secs = v;
        }

        Ok(())
    }
}

fn check_http_url(field: &'static str, value: &str) -> Result<(), ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidUrl {
        field,
        value: value.to_string(),
        reason,
    };
    let url = url::Url::parse(value).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(invalid(format!("unsupported scheme '{}'", other))),
    }
}

fn check_timeout(field: &'static str, secs: u64) -> Result<(), ConfigError> {
    if secs == 0 {
        return Err(ConfigError::InvalidValue {
            field,
            reason: "timeout must be at least 1 second".to_string(),
        });
    }
    Ok(())
}

fn parse_var<T, F>(lookup: &F, var: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv {
                var: var.to_string(),
                value,
            }),
    }
}
