use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use serde::Deserialize;

use crate::ir::DEFAULT_MAX_EXAMPLES;

pub const DEFAULT_CONFIG_FILENAME: &str = "recall-translator.toml";
pub const DEFAULT_DB_PATH: &str = "data/translations.db";
pub const CONFIG_ENV_VAR: &str = "RECALL_TRANSLATOR_CONFIG";

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageSection,
    #[serde(default)]
    pub retrieval: RetrievalSection,
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct StorageSection {
    /// SQLite database path. Relative paths resolve against the working
    /// directory.
    #[serde(default)]
    pub db_path: Option<PathBuf>,
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct RetrievalSection {
    /// Maximum number of examples rendered into a prompt.
    #[serde(default)]
    pub max_examples: Option<usize>,
}

impl AppConfig {
    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.storage
            .db_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH))
    }

    #[must_use]
    pub fn max_examples(&self) -> usize {
        self.retrieval
            .max_examples
            .unwrap_or(DEFAULT_MAX_EXAMPLES)
            .max(1)
    }
}

pub fn load_config(path: &Path) -> anyhow::Result<AppConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read config: {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("parse config: {}", path.display()))
}

/// Resolve the effective config: an explicit path wins, then the env
/// override, then an upward search for `recall-translator.toml`. A missing
/// config file is not an error; defaults apply.
pub fn resolve_config(explicit: Option<PathBuf>) -> anyhow::Result<AppConfig> {
    let cfg_file = explicit
        .or_else(|| std::env::var(CONFIG_ENV_VAR).ok().map(PathBuf::from))
        .or_else(|| {
            let cwd = std::env::current_dir().ok()?;
            find_file_upwards(&cwd, DEFAULT_CONFIG_FILENAME, 6)
        });
    match cfg_file {
        Some(p) if p.exists() => load_config(&p),
        _ => Ok(AppConfig::default()),
    }
}

pub fn find_file_upwards(start_dir: &Path, filename: &str, max_levels: usize) -> Option<PathBuf> {
    let mut dir = start_dir;
    for _ in 0..=max_levels {
        let candidate = dir.join(filename);
        if candidate.exists() {
            return Some(candidate);
        }
        dir = dir.parent()?;
    }
    None
}

/// Write a commented default config into `dir`, refusing to overwrite an
/// existing file unless `force` is set.
pub fn init_default_config(dir: &Path, force: bool) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("create config dir: {}", dir.display()))?;
    let cfg_path = dir.join(DEFAULT_CONFIG_FILENAME);
    if cfg_path.exists() && !force {
        return Err(anyhow!(
            "config exists: {} (use --force to overwrite)",
            cfg_path.display()
        ));
    }
    std::fs::write(&cfg_path, DEFAULT_CONFIG_TEXT)
        .with_context(|| format!("write config: {}", cfg_path.display()))?;
    Ok(cfg_path)
}

pub const DEFAULT_CONFIG_TEXT: &str = r#"# recall-translator configuration

[storage]
# SQLite database holding the translation pairs.
db_path = "data/translations.db"

[retrieval]
# Maximum number of examples rendered into a few-shot prompt.
max_examples = 4
"#;
