//! Per-source configuration persisted across runs.

use crate::core::config::AppDirs;
use crate::core::{ConfigOption, ConfigValue, OptionKind, SourceConfig};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Asks the user for configuration values. `None` means the user cancelled.
pub trait Prompter {
    fn request_string(&mut self, title: &str, placeholder: &str, default: &str) -> Option<String>;

    fn request_path(&mut self, title: &str, file_filter: &str, start_path: &Path)
    -> Option<PathBuf>;
}

pub struct ConfigStore<P: Prompter> {
    dirs: AppDirs,
    prompter: P,
}

impl<P: Prompter> ConfigStore<P> {
    pub fn new(dirs: AppDirs, prompter: P) -> Self {
        Self { dirs, prompter }
    }

    pub fn prompter(&self) -> &P {
        &self.prompter
    }

    pub fn prompter_mut(&mut self) -> &mut P {
        &mut self.prompter
    }

    /// Reads the stored configuration of `source`. Nothing stored yet gives an
    /// empty mapping.
    pub fn load(&self, source: &str) -> Result<SourceConfig> {
        let path = self.dirs.source_config_path(source);
        if !path.is_file() {
            debug!("No stored configuration for {}", source);
            return Ok(SourceConfig::new());
        }
        let bytes = fs::read(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        debug!("Loaded configuration for {}", source);
        Ok(config)
    }

    pub fn save(&self, source: &str, config: &SourceConfig) -> Result<()> {
        let path = self.dirs.source_config_path(source);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let bytes = serde_json::to_vec(config)?;
        fs::write(&path, bytes)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        debug!("Saved configuration for {}", source);
        Ok(())
    }

    /// Loads the stored configuration and prompts for every option that is
    /// missing or no longer valid. Cancelled prompts leave the option unset.
    pub fn resolve(&mut self, source: &str, options: &[ConfigOption]) -> SourceConfig {
        let mut config = self.load(source).unwrap_or_else(|e| {
            warn!(error = %e, "Discarding unreadable configuration for {}", source);
            SourceConfig::new()
        });

        for option in options {
            if config
                .get(option.key)
                .is_some_and(|value| is_valid(option, value))
            {
                continue;
            }
            match self.configure(option, option.default) {
                Some(value) => config.insert(option.key.to_string(), value),
                None => config.remove(option.key),
            };
        }
        config
    }

    /// Prompts for a single option, offering `default` as the initial value.
    pub fn configure(&mut self, option: &ConfigOption, default: &str) -> Option<ConfigValue> {
        match option.kind {
            OptionKind::Path => self
                .prompter
                .request_path(option.label, option.hint, Path::new(default))
                .map(ConfigValue::Path),
            OptionKind::String => self
                .prompter
                .request_string(option.label, option.hint, default)
                .map(ConfigValue::String),
        }
    }
}

fn is_valid(option: &ConfigOption, value: &ConfigValue) -> bool {
    match (option.kind, value) {
        (OptionKind::Path, ConfigValue::Path(path)) => path.is_file(),
        (OptionKind::String, ConfigValue::String(_)) => true,
        _ => false,
    }
}
