use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use yaml_rust2::YamlLoader;

/// Where the API key lives between runs.
pub const DEFAULT_KEY_FILE: &str = "steam_api_key.secret";

/// Optional YAML config file. All fields may be omitted.
#[derive(Debug, Default, Clone)]
pub struct Config {
    pub api_key_file: Option<PathBuf>,
    pub group: Option<String>,
    pub proxy: Option<String>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let docs = YamlLoader::load_from_str(&text)
            .with_context(|| format!("config file {} is not valid YAML", path.display()))?;
        let Some(doc) = docs.first() else {
            return Ok(Self::default());
        };

        Ok(Self {
            api_key_file: doc["api_key_file"].as_str().map(PathBuf::from),
            group: doc["group"].as_str().map(str::to_string),
            proxy: doc["proxy"].as_str().map(str::to_string),
        })
    }
}

/// Loads the stored API key, if any. Trims the trailing newline of a
/// hand-written secret file.
pub fn load_api_key(path: &Path) -> Option<String> {
    let key = fs::read_to_string(path).ok()?;
    let key = key.trim();
    if key.is_empty() {
        None
    } else {
        Some(key.to_string())
    }
}

/// Persists the key for the next run.
pub fn store_api_key(path: &Path, key: &str) -> Result<()> {
    fs::write(path, key).with_context(|| format!("failed to write {}", path.display()))
}
