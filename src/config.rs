//! Configuration lookup.
//!
//! Settings are addressed by slash separated keys such as
//! `ai/computerA/max_time`. A [`ConfigChain`] asks its providers in order and
//! takes the first answer, so command line overrides sit in front of a
//! configuration file, which sits in front of the built-in defaults.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::engine::eval::EvalWeights;
use crate::engine::search::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_TIME_MS, SearchConfig};
use crate::engine::tt::DEFAULT_TABLE_BITS;
use crate::rules::RulePreset;

pub const KEY_RULES: &str = "game/rules";
pub const KEY_SHARE_TABLES: &str = "ai/share_transposition_tables";
pub const KEY_TABLE_BITS: &str = "ai/ttable_bits";
pub const KEY_SEED: &str = "ai/seed";

/// Engine slots that can be configured
pub const COMPUTERS: [&str; 2] = ["computerA", "computerB"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing configuration value `{0}`")]
    Missing(String),

    #[error("configuration value `{key}` must be {expected}")]
    Type { key: String, expected: &'static str },

    #[error("invalid setting `{0}`, expected key=value")]
    BadAssignment(String),

    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid configuration file: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Clone, Debug, PartialEq)]
pub enum ConfigValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl ConfigValue {
    /// Interpret command line text: booleans, then integers, then floats
    pub fn parse(text: &str) -> ConfigValue {
        let text = text.trim();
        if let Ok(b) = text.parse::<bool>() {
            ConfigValue::Bool(b)
        } else if let Ok(i) = text.parse::<i64>() {
            ConfigValue::Int(i)
        } else if let Ok(f) = text.parse::<f64>() {
            ConfigValue::Float(f)
        } else {
            ConfigValue::Text(text.to_string())
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(b) => Some(*b),
            ConfigValue::Int(i) => Some(*i != 0),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ConfigValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            ConfigValue::Float(f) => Some(*f),
            ConfigValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ConfigValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// One source of configuration values
pub trait ConfigProvider: Send + Sync {
    fn name(&self) -> &str;

    fn lookup(&self, key: &str) -> Option<ConfigValue>;
}

/// Values held in memory, e.g. `--set key=value` overrides
#[derive(Debug, Default)]
pub struct MapProvider {
    name: String,
    values: HashMap<String, ConfigValue>,
}

impl MapProvider {
    pub fn new(name: impl Into<String>) -> Self {
        MapProvider {
            name: name.into(),
            values: HashMap::new(),
        }
    }

    pub fn set(&mut self, key: impl Into<String>, value: ConfigValue) {
        self.values.insert(key.into(), value);
    }

    /// Build from `key=value` strings
    pub fn from_assignments<S: AsRef<str>>(
        name: impl Into<String>,
        assignments: &[S],
    ) -> Result<Self, ConfigError> {
        let mut provider = MapProvider::new(name);
        for assignment in assignments {
            let assignment = assignment.as_ref();
            let (key, value) = assignment
                .split_once('=')
                .ok_or_else(|| ConfigError::BadAssignment(assignment.to_string()))?;
            provider.set(key.trim(), ConfigValue::parse(value));
        }
        Ok(provider)
    }
}

impl ConfigProvider for MapProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookup(&self, key: &str) -> Option<ConfigValue> {
        self.values.get(key).cloned()
    }
}

/// A JSON file; nested objects form the key path
#[derive(Debug)]
pub struct JsonFileProvider {
    name: String,
    values: HashMap<String, ConfigValue>,
}

impl JsonFileProvider {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut provider = Self::from_json(&text)?;
        provider.name = path.display().to_string();
        Ok(provider)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let root: serde_json::Value = serde_json::from_str(text)?;
        let mut values = HashMap::new();
        flatten("", &root, &mut values);
        Ok(JsonFileProvider {
            name: "json".to_string(),
            values,
        })
    }
}

impl ConfigProvider for JsonFileProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookup(&self, key: &str) -> Option<ConfigValue> {
        self.values.get(key).cloned()
    }
}

fn flatten(prefix: &str, value: &serde_json::Value, out: &mut HashMap<String, ConfigValue>) {
    use serde_json::Value;

    let converted = match value {
        Value::Object(map) => {
            for (k, v) in map {
                let key = if prefix.is_empty() {
                    k.clone()
                } else {
                    format!("{prefix}/{k}")
                };
                flatten(&key, v, out);
            }
            return;
        }
        Value::Bool(b) => ConfigValue::Bool(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => ConfigValue::Int(i),
            None => ConfigValue::Float(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) => ConfigValue::Text(s.clone()),
        Value::Null | Value::Array(_) => return,
    };
    out.insert(prefix.to_string(), converted);
}

/// Built-in defaults
#[derive(Debug, Default)]
pub struct DefaultsProvider;

impl ConfigProvider for DefaultsProvider {
    fn name(&self) -> &str {
        "defaults"
    }

    fn lookup(&self, key: &str) -> Option<ConfigValue> {
        let weights = EvalWeights::default();
        let value = match key {
            KEY_RULES => ConfigValue::Text(RulePreset::Standard.name().to_string()),
            KEY_SHARE_TABLES => ConfigValue::Bool(true),
            KEY_TABLE_BITS => ConfigValue::Int(DEFAULT_TABLE_BITS as i64),
            _ => {
                let (_, setting) = key
                    .strip_prefix("ai/")
                    .and_then(|rest| rest.split_once('/'))
                    .filter(|(computer, _)| COMPUTERS.contains(computer))?;
                match setting {
                    "max_time" => ConfigValue::Int(DEFAULT_MAX_TIME_MS as i64),
                    "max_depth" => ConfigValue::Int(DEFAULT_MAX_DEPTH as i64),
                    "weights/material" => ConfigValue::Float(weights.material as f64),
                    "weights/freedom" => ConfigValue::Float(weights.freedom as f64),
                    "weights/mills" => ConfigValue::Float(weights.mills as f64),
                    "weights/experience" => ConfigValue::Float(weights.experience as f64),
                    _ => return None,
                }
            }
        };
        Some(value)
    }
}

/// Providers asked in order until one knows the key
#[derive(Default)]
pub struct ConfigChain {
    providers: Vec<Box<dyn ConfigProvider>>,
}

impl ConfigChain {
    pub fn new() -> Self {
        ConfigChain::default()
    }

    /// A chain holding only the built-in defaults
    pub fn with_defaults() -> Self {
        let mut chain = ConfigChain::new();
        chain.push(DefaultsProvider);
        chain
    }

    /// Append a provider behind the existing ones
    pub fn push(&mut self, provider: impl ConfigProvider + 'static) {
        self.providers.push(Box::new(provider));
    }

    /// Insert a provider in front of the existing ones
    pub fn push_front(&mut self, provider: impl ConfigProvider + 'static) {
        self.providers.insert(0, Box::new(provider));
    }

    pub fn lookup(&self, key: &str) -> Option<ConfigValue> {
        self.providers.iter().find_map(|p| {
            let value = p.lookup(key);
            if value.is_some() {
                log::trace!("config {} from {}", key, p.name());
            }
            value
        })
    }

    fn require(&self, key: &str) -> Result<ConfigValue, ConfigError> {
        self.lookup(key)
            .ok_or_else(|| ConfigError::Missing(key.to_string()))
    }

    pub fn get_bool(&self, key: &str) -> Result<bool, ConfigError> {
        self.require(key)?.as_bool().ok_or_else(|| type_error(key, "a boolean"))
    }

    pub fn get_int(&self, key: &str) -> Result<i64, ConfigError> {
        self.require(key)?.as_int().ok_or_else(|| type_error(key, "an integer"))
    }

    pub fn get_float(&self, key: &str) -> Result<f64, ConfigError> {
        self.require(key)?.as_float().ok_or_else(|| type_error(key, "a number"))
    }

    pub fn get_text(&self, key: &str) -> Result<String, ConfigError> {
        let value = self.require(key)?;
        value
            .as_text()
            .map(str::to_string)
            .ok_or_else(|| type_error(key, "a string"))
    }
}

fn type_error(key: &str, expected: &'static str) -> ConfigError {
    ConfigError::Type {
        key: key.to_string(),
        expected,
    }
}

/// Resolved application settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub rules: RulePreset,
    /// Engines indexed like [`COMPUTERS`]
    pub computers: [SearchConfig; 2],
    pub share_tables: bool,
    pub table_bits: u32,
}

impl AppConfig {
    pub fn resolve(chain: &ConfigChain) -> Result<Self, ConfigError> {
        let rules_name = chain.get_text(KEY_RULES)?;
        let rules = rules_name
            .parse::<RulePreset>()
            .map_err(|_| type_error(KEY_RULES, "a known rule preset"))?;

        let table_bits = chain.get_int(KEY_TABLE_BITS)?;
        if !(4..=28).contains(&table_bits) {
            return Err(type_error(KEY_TABLE_BITS, "between 4 and 28"));
        }

        let seed = match chain.lookup(KEY_SEED) {
            Some(value) => Some(
                value
                    .as_int()
                    .ok_or_else(|| type_error(KEY_SEED, "an integer"))? as u64,
            ),
            None => None,
        };

        let computers = [
            resolve_computer(chain, COMPUTERS[0], seed)?,
            resolve_computer(chain, COMPUTERS[1], seed.map(|s| s.wrapping_add(1)))?,
        ];

        Ok(AppConfig {
            rules,
            computers,
            share_tables: chain.get_bool(KEY_SHARE_TABLES)?,
            table_bits: table_bits as u32,
        })
    }
}

fn resolve_computer(
    chain: &ConfigChain,
    computer: &str,
    seed: Option<u64>,
) -> Result<SearchConfig, ConfigError> {
    let key = |setting: &str| format!("ai/{computer}/{setting}");

    let max_time = chain.get_int(&key("max_time"))?;
    let max_depth = chain.get_int(&key("max_depth"))?;
    if max_time < 0 {
        return Err(type_error("max_time", "non-negative"));
    }
    if max_depth < 1 {
        return Err(type_error("max_depth", "at least 1"));
    }

    let mut config = SearchConfig {
        seed,
        ..SearchConfig::default()
    };
    config.limits.max_time = Duration::from_millis(max_time as u64);
    config.limits.max_depth = max_depth as u32;
    config.weights = EvalWeights {
        material: chain.get_float(&key("weights/material"))? as f32,
        freedom: chain.get_float(&key("weights/freedom"))? as f32,
        mills: chain.get_float(&key("weights/mills"))? as f32,
        experience: chain.get_float(&key("weights/experience"))? as f32,
    };
    Ok(config)
}
