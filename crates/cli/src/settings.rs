// Configuration file loading (TOML + LECLI__ environment overrides)

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use lecli_core::domain::AccountConfig;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const CONFIG_FILE_NAME: &str = "config.toml";

const ENV_PREFIX: &str = "LECLI";
const ENV_SEPARATOR: &str = "__";
const API_KEY_DOCS: &str = "https://docs.logentries.com/docs/api-keys";

/// Result of looking for the configuration file
#[derive(Debug)]
pub enum Loaded {
    Ready(AccountConfig),
    /// No file existed; an empty template was written here
    TemplateWritten(PathBuf),
}

/// `<config dir>/lecli/config.toml` for the current platform
pub fn default_config_path() -> Result<PathBuf> {
    ProjectDirs::from("", "", "lecli")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
        .ok_or_else(|| anyhow!("Could not determine the home directory"))
}

/// Load the configuration, writing a template first if none exists
pub fn load(path: Option<&Path>) -> Result<Loaded> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => default_config_path()?,
    };

    if !path.exists() {
        write_template(&path)?;
        info!(path = %path.display(), "Wrote configuration template");
        return Ok(Loaded::TemplateWritten(path));
    }

    read(&path).map(Loaded::Ready)
}

/// Parse a configuration file, applying environment overrides
pub fn read(path: &Path) -> Result<AccountConfig> {
    debug!(path = %path.display(), "Loading configuration");

    let settings = config::Config::builder()
        .add_source(config::File::from(path).format(config::FileFormat::Toml))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator(ENV_SEPARATOR)
                .separator(ENV_SEPARATOR),
        )
        .build()
        .with_context(|| format!("Failed to read configuration file {}", path.display()))?;

    let account: AccountConfig = settings
        .try_deserialize()
        .with_context(|| format!("Invalid configuration file {}", path.display()))?;

    Ok(account.with_source(path))
}

/// Write the empty configuration template, creating parent directories
pub fn write_template(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let template = toml::to_string_pretty(&AccountConfig::template())
        .context("Failed to serialize configuration template")?;
    fs::write(path, template).with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(())
}

/// Message shown after a template was written
pub fn template_message(path: &Path) -> String {
    format!(
        "No configuration file was found, so an empty one was created at: {}\n\
         Please fill in your account resource id and API keys. \
         See {} for how to obtain them.",
        path.display(),
        API_KEY_DOCS
    )
}
