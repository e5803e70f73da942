//! Host-supplied settings and environment.
//!
//! [`Settings`] is the flat key/value view of a tokenizer definition, as a
//! search host hands it to a tokenizer factory. [`Environment`] locates the
//! directories model data may be read from.

use std::path::{Path, PathBuf};

use ahash::AHashMap;
use serde_json::Value;

use crate::error::{HansegError, Result};

/// Flat, string-valued tokenizer settings.
///
/// # Examples
///
/// ```
/// use hanseg::settings::Settings;
///
/// let settings = Settings::from_pairs([("enable_index_mode", "true")]);
/// assert!(settings.get_bool("enable_index_mode", false).unwrap());
/// assert!(!settings.get_bool("enable_place_recognize", false).unwrap());
/// ```
#[derive(Clone, Debug, Default)]
pub struct Settings {
    values: AHashMap<String, String>,
}

impl Settings {
    /// Create empty settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build settings from key/value pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let values = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Settings { values }
    }

    /// Build settings from a flat JSON object.
    ///
    /// Strings, booleans and numbers are accepted; arrays of strings are
    /// joined with `;` (the path list separator). Anything else is a
    /// configuration error.
    pub fn from_json(value: &Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| HansegError::configuration("settings must be a JSON object"))?;

        let mut values = AHashMap::with_capacity(object.len());
        for (key, value) in object {
            let text = match value {
                Value::String(s) => s.clone(),
                Value::Bool(b) => b.to_string(),
                Value::Number(n) => n.to_string(),
                Value::Array(items) => {
                    let parts = items
                        .iter()
                        .map(|item| {
                            item.as_str().map(str::to_string).ok_or_else(|| {
                                HansegError::configuration(format!(
                                    "setting '{key}' must be a list of strings"
                                ))
                            })
                        })
                        .collect::<Result<Vec<_>>>()?;
                    parts.join(";")
                }
                _ => {
                    return Err(HansegError::configuration(format!(
                        "setting '{key}' has an unsupported value: {value}"
                    )));
                }
            };
            values.insert(key.clone(), text);
        }
        Ok(Settings { values })
    }

    /// Parse settings from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_json(&value)
    }

    /// Set a value, returning the updated settings.
    pub fn with<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Raw string value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Boolean value; only `true`/`false` (any case) are accepted.
    pub fn get_bool(&self, key: &str, default: bool) -> Result<bool> {
        match self.get(key) {
            None => Ok(default),
            Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "true" => Ok(true),
                "false" => Ok(false),
                _ => Err(HansegError::configuration(format!(
                    "setting '{key}' must be true or false, got '{raw}'"
                ))),
            },
        }
    }

    /// Unsigned integer value.
    pub fn get_usize(&self, key: &str, default: usize) -> Result<usize> {
        match self.get(key) {
            None => Ok(default),
            Some(raw) => raw.trim().parse().map_err(|_| {
                HansegError::configuration(format!(
                    "setting '{key}' must be a non-negative integer, got '{raw}'"
                ))
            }),
        }
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no keys are set.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Directories supplied by the host.
///
/// The model root is where relative model paths are resolved; both
/// directories are granted for reading while engines are constructed.
#[derive(Clone, Debug)]
pub struct Environment {
    config_dir: PathBuf,
    model_root: PathBuf,
}

impl Environment {
    /// Create an environment with a config directory and a model root.
    pub fn new<C: Into<PathBuf>, M: Into<PathBuf>>(config_dir: C, model_root: M) -> Self {
        Environment {
            config_dir: config_dir.into(),
            model_root: model_root.into(),
        }
    }

    /// Environment whose config directory is also the model root.
    pub fn with_root<P: Into<PathBuf>>(root: P) -> Self {
        let root = root.into();
        Environment {
            config_dir: root.clone(),
            model_root: root,
        }
    }

    /// The host configuration directory.
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// The default model root.
    pub fn model_root(&self) -> &Path {
        &self.model_root
    }
}
