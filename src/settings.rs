use serde::Deserialize;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use backtrace::Backtrace;
use log::error;

pub const DEFAULT_SETTINGS_PATH: &str = "src/resources/settings.yaml";

// Main configuration struct
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub archive: ArchiveConfig,
    #[serde(default = "default_credentials_dir")]
    pub credentials_dir: PathBuf,
    #[serde(default)]
    pub accounts: HashMap<String, Account>,
}

// Output options for mbox archives
#[derive(Debug, Deserialize, Clone)]
pub struct ArchiveConfig {
    #[serde(default = "default_true")]
    pub escape_from_lines: bool,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self { escape_from_lines: true }
    }
}

// One IMAP account; without a password the encrypted store is used
#[derive(Debug, Deserialize, Clone)]
pub struct Account {
    pub account: String,
    pub password: Option<String>,
    pub server: String,
    #[serde(default = "default_imap_port")]
    pub port: u16,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_credentials_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_true() -> bool {
    true
}

fn default_imap_port() -> u16 {
    993
}

#[derive(Debug, thiserror::Error)]
#[error("credentials file did not contain {0}")]
pub struct AccountNotFound(pub String);

fn log_failure(err: &dyn std::fmt::Display) {
    error!("Error: {}", err);

    // Capture and print the backtrace
    let backtrace = Backtrace::new();
    error!("Backtrace:\n{:?}", backtrace);
}

pub fn parse_settings(yaml: &str) -> Result<Config> {
    let config = serde_yaml::from_str(yaml).inspect_err(|err| log_failure(err))?;
    Ok(config)
}

pub fn load_settings(path: &Path) -> Result<Config> {
    // Read the YAML file
    let yaml = fs::read_to_string(path)
        .inspect_err(|err| log_failure(err))
        .with_context(|| format!("cannot open settings {}", path.display()))?;

    // Parse the YAML file into the Config struct
    parse_settings(&yaml).with_context(|| format!("cannot deserialize settings {}", path.display()))
}

pub fn fetch_credentials(config: &Config, account_name: &str) -> Result<Account, AccountNotFound> {
    config
        .accounts
        .get(account_name)
        .cloned()
        .ok_or_else(|| AccountNotFound(account_name.to_string()))
}
