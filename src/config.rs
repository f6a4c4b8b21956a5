use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_REFRESH_SECS: u64 = 10;
pub const DEFAULT_MAX_UNREAD: usize = 20;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub refresh_interval_secs: u64,
    pub max_unread: usize,
    pub mailbox: String,
    pub log_file: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            refresh_interval_secs: DEFAULT_REFRESH_SECS,
            max_unread: DEFAULT_MAX_UNREAD,
            mailbox: "inbox".to_string(),
            log_file: None,
        }
    }
}

impl Config {
    pub fn refresh_every(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(1))
    }
}

fn config_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("no config dir available"))?
        .join("rs_unread_mail"))
}

pub fn config_path() -> Result<PathBuf> {
    let mut p = config_dir()?;
    fs::create_dir_all(&p)?;
    p.push("config.toml");
    Ok(p)
}

pub fn default_log_path() -> Result<PathBuf> {
    let mut p = config_dir()?;
    fs::create_dir_all(&p)?;
    p.push("rs_unread_mail.log");
    Ok(p)
}

/// Load the config at `path`, or the default location. A missing default
/// file is written out as a template and the defaults are used.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => {
            let p = config_path()?;
            if write_template_if_missing(&p)? {
                // runs before any logger is set up
                eprintln!("Created template config at {} (using defaults)", p.display());
                return Ok(Config::default());
            }
            p
        }
    };
    let s = fs::read_to_string(&path)
        .with_context(|| format!("reading config {}", path.display()))?;
    parse_config(&s).with_context(|| format!("parsing config {}", path.display()))
}

/// Write the default config to `path` unless a file is already there.
/// Returns true when a template was written.
pub fn write_template_if_missing(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    let tom = toml::to_string_pretty(&Config::default())?;
    fs::write(path, tom).with_context(|| format!("writing template {}", path.display()))?;
    Ok(true)
}

pub fn parse_config(s: &str) -> Result<Config> {
    Ok(toml::from_str(s)?)
}

pub fn resolve_log_path(cfg: &Config) -> Result<PathBuf> {
    if let Some(p) = &cfg.log_file {
        Ok(PathBuf::from(p))
    } else {
        default_log_path()
    }
}
