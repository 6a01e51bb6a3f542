//! Layered configuration loading.
//!
//! Sources, lowest precedence first:
//! 1. built-in defaults
//! 2. `JQHTTP_*` environment variables
//! 3. the YAML file, when it exists
//!
//! Environment names map onto config keys as follows:
//! - `JQHTTP_LISTEN` sets `listen`
//! - `JQHTTP_<SECTION>_<FIELD>` sets a field of `timeouts`, `limits` or
//!   `observability`; the field keeps its underscores
//!   (`JQHTTP_LIMITS_MAX_BODY_BYTES` is `limits.max_body_bytes`)
//! - anything else fills the `jqhttp` shorthand route, with `_` nesting
//!   (`JQHTTP_SET_RESPONSE_CONTENTTYPE` is `jqhttp.set.response.contenttype`)

use std::path::{Path, PathBuf};

use ::config::{Config, File, FileFormat, Map, Source, Value};

use crate::config::schema::ProxyConfig;

/// Prefix shared by every environment override.
pub const ENV_PREFIX: &str = "JQHTTP";

/// Top-level tables whose fields are set as `JQHTTP_<SECTION>_<FIELD>`.
const SECTIONS: [&str; 3] = ["timeouts", "limits", "observability"];

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config path is not valid UTF-8: {0:?}")]
    InvalidPath(PathBuf),

    #[error("config: {0}")]
    Load(#[from] ::config::ConfigError),
}

/// `JQHTTP_*` variables as a config source.
#[derive(Clone, Debug, Default)]
pub struct EnvOverrides {
    vars: Option<Vec<(String, String)>>,
}

impl EnvOverrides {
    /// Read from the process environment when collected.
    pub fn from_process() -> Self {
        Self::default()
    }

    /// Use a fixed set of variables instead of the process environment.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: Some(
                vars.into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }
}

impl Source for EnvOverrides {
    fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
        Box::new(self.clone())
    }

    fn collect(&self) -> Result<Map<String, Value>, ::config::ConfigError> {
        let origin = String::from("environment");
        let vars = match &self.vars {
            Some(vars) => vars.clone(),
            None => std::env::vars().collect(),
        };

        let mut map = Map::new();
        for (name, value) in vars {
            if let Some(key) = env_key(&name) {
                map.insert(key, Value::new(Some(&origin), value));
            }
        }
        Ok(map)
    }
}

/// Config key for an environment variable name, or `None` when the name
/// does not carry the prefix.
fn env_key(name: &str) -> Option<String> {
    let rest = name
        .strip_prefix(ENV_PREFIX)?
        .strip_prefix('_')?
        .to_ascii_lowercase();
    if rest.is_empty() {
        return None;
    }
    if rest == "listen" {
        return Some(rest);
    }

    for section in SECTIONS {
        let field = rest
            .strip_prefix(section)
            .and_then(|r| r.strip_prefix('_'))
            .filter(|field| !field.is_empty());
        if let Some(field) = field {
            return Some(format!("{section}.{field}"));
        }
    }

    Some(format!("jqhttp.{}", rest.replace('_', ".")))
}

/// Load configuration from the process environment and an optional YAML file.
pub fn load_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    load_config_with_env(path, EnvOverrides::from_process())
}

/// Load configuration with an explicit environment source.
pub fn load_config_with_env(path: &Path, env: EnvOverrides) -> Result<ProxyConfig, ConfigError> {
    let file = path
        .to_str()
        .ok_or_else(|| ConfigError::InvalidPath(path.to_path_buf()))?;

    let defaults = ProxyConfig::default();
    let config = Config::builder()
        .set_default("listen", defaults.listen)?
        .add_source(env)
        .add_source(File::new(file, FileFormat::Yaml).required(false))
        .build()?;

    let config: ProxyConfig = config.try_deserialize()?;

    tracing::debug!(
        path = %path.display(),
        routes = config.all_routes().count(),
        "Configuration loaded"
    );

    Ok(config)
}
