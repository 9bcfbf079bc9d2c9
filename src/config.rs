use serde::Deserialize;
use std::env;
use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::constants::*;
use crate::error::{CleanerError, Result};

/// Which relational backend holds the products table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Sqlite,
    Mysql,
}

impl FromStr for Backend {
    type Err = CleanerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Backend::Sqlite),
            "mysql" => Ok(Backend::Mysql),
            other => Err(CleanerError::Config(format!(
                "Unknown database backend '{}' (expected 'sqlite' or 'mysql')",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub backend: Backend,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub sqlite_path: PathBuf,
    pub table: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Mysql,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            user: DEFAULT_USER.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
            database: DEFAULT_DATABASE.to_string(),
            sqlite_path: PathBuf::from(DEFAULT_SQLITE_PATH),
            table: DEFAULT_TABLE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub batch_size: usize,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub runner: RunnerConfig,
}

impl Config {
    /// Layers `.env`, the optional TOML file named by `CLEANER_CONFIG`, and
    /// process environment variables, in increasing precedence.
    ///
    /// The result is not validated; apply command-line overrides first, then
    /// call [`Config::validate`].
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::load_from(|key| env::var(key).ok())
    }

    /// [`Config::load`] against an arbitrary variable source.
    pub fn load_from<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup(ENV_CONFIG_FILE) {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(&lookup)?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Overrides fields with whatever `lookup` returns for the known keys.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db = &mut self.database;
        if let Some(v) = lookup(ENV_BACKEND) {
            db.backend = v.parse()?;
        }
        if let Some(v) = lookup(ENV_HOST) {
            db.host = v;
        }
        if let Some(v) = lookup(ENV_PORT) {
            db.port = v.trim().parse().map_err(|_| {
                CleanerError::Config(format!("{} must be a port number, got '{}'", ENV_PORT, v))
            })?;
        }
        if let Some(v) = lookup(ENV_USER) {
            db.user = v;
        }
        if let Some(v) = lookup(ENV_PASSWORD) {
            db.password = v;
        }
        if let Some(v) = lookup(ENV_DATABASE) {
            db.database = v;
        }
        if let Some(v) = lookup(ENV_SQLITE_PATH) {
            db.sqlite_path = PathBuf::from(v);
        }
        if let Some(v) = lookup(ENV_TABLE) {
            db.table = v;
        }
        if let Some(v) = lookup(ENV_BATCH_SIZE) {
            self.runner.batch_size = v.trim().parse().map_err(|_| {
                CleanerError::Config(format!(
                    "{} must be a positive integer, got '{}'",
                    ENV_BATCH_SIZE, v
                ))
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.batch_size()?;
        if !is_plain_identifier(&self.database.table) {
            return Err(CleanerError::Config(format!(
                "Table name '{}' must be a plain SQL identifier",
                self.database.table
            )));
        }
        Ok(())
    }

    pub fn batch_size(&self) -> Result<NonZeroUsize> {
        NonZeroUsize::new(self.runner.batch_size)
            .ok_or_else(|| CleanerError::Config("batch size must be greater than zero".to_string()))
    }
}

/// The table name is spliced into SQL text, so only `[A-Za-z_][A-Za-z0-9_]*` is accepted.
pub fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
