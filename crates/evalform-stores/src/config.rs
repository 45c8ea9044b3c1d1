//! Store configuration and factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use evalform_core::traits::{AnswerStore, EvaluationStore};

use crate::jsonbin::{
    JsonBinAnswerStore, JsonBinClient, JsonBinEvaluationStore, DEFAULT_BASE_URL,
    DEFAULT_TIMEOUT_SECS,
};

/// Top-level evalform configuration.
///
/// Note: Custom Debug impl masks the master key to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
pub struct EvalformConfig {
    /// jsonbin API root.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// jsonbin master key.
    #[serde(default)]
    pub master_key: String,
    /// Bin holding the evaluation list.
    #[serde(default)]
    pub evaluations_bin: String,
    /// Bin holding the answer collection.
    #[serde(default)]
    pub answers_bin: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Local state file holding the logged-in user.
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,
}

impl std::fmt::Debug for EvalformConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvalformConfig")
            .field("base_url", &self.base_url)
            .field("master_key", &"***")
            .field("evaluations_bin", &self.evaluations_bin)
            .field("answers_bin", &self.answers_bin)
            .field("timeout_secs", &self.timeout_secs)
            .field("state_file", &self.state_file)
            .finish()
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
fn default_state_file() -> PathBuf {
    PathBuf::from("./evalform-state.json")
}

impl Default for EvalformConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            master_key: String::new(),
            evaluations_bin: String::new(),
            answers_bin: String::new(),
            timeout_secs: default_timeout(),
            state_file: default_state_file(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are not scanned again.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        let var_name = &rest[start + 2..start + end];
        result.push_str(&rest[..start]);
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `evalform.toml` in the current directory
/// 2. `~/.config/evalform/config.toml`
///
/// Environment variable overrides: `EVALFORM_MASTER_KEY`,
/// `EVALFORM_EVALUATIONS_BIN`, `EVALFORM_ANSWERS_BIN`.
pub fn load_config() -> Result<EvalformConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<EvalformConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("evalform.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<EvalformConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => EvalformConfig::default(),
    };

    config.base_url = resolve_env_vars(&config.base_url);
    config.master_key = resolve_env_vars(&config.master_key);
    config.evaluations_bin = resolve_env_vars(&config.evaluations_bin);
    config.answers_bin = resolve_env_vars(&config.answers_bin);

    // Env overrides are taken literally
    if let Ok(key) = std::env::var("EVALFORM_MASTER_KEY") {
        config.master_key = key;
    }
    if let Ok(bin) = std::env::var("EVALFORM_EVALUATIONS_BIN") {
        config.evaluations_bin = bin;
    }
    if let Ok(bin) = std::env::var("EVALFORM_ANSWERS_BIN") {
        config.answers_bin = bin;
    }

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("evalform"))
}

/// The two remote stores the form talks to.
pub struct Stores {
    pub evaluations: Arc<dyn EvaluationStore>,
    pub answers: Arc<dyn AnswerStore>,
}

/// Create both jsonbin stores from configuration.
pub fn create_stores(config: &EvalformConfig) -> Result<Stores> {
    if config.evaluations_bin.is_empty() {
        anyhow::bail!("no evaluations bin configured (set `evaluations_bin` or EVALFORM_EVALUATIONS_BIN)");
    }
    if config.answers_bin.is_empty() {
        anyhow::bail!("no answers bin configured (set `answers_bin` or EVALFORM_ANSWERS_BIN)");
    }

    let client = JsonBinClient::new(
        &config.master_key,
        Some(config.base_url.clone()),
        config.timeout_secs,
    )?;

    Ok(Stores {
        evaluations: Arc::new(JsonBinEvaluationStore::new(
            client.clone(),
            config.evaluations_bin.clone(),
        )),
        answers: Arc::new(JsonBinAnswerStore::new(client, config.answers_bin.clone())),
    })
}
