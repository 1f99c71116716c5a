// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Configuration for bindery.
//!
//! Mirrors a bundler config with one build entry per import shape. Sources,
//! later ones winning:
//! 1. built-in defaults (the three entry points)
//! 2. `bindery.toml` in the working directory
//! 3. an explicit `--config` file
//! 4. `BINDERY_*` environment variables

use crate::error::ConfigError;
use crate::modules;
use bindery_loader::{ImportStyle, LoaderOptions, ModuleId, NamedBindingMode};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Project config file looked up in the working directory
pub const PROJECT_CONFIG_FILE: &str = "bindery.toml";

/// Environment variable overriding `loader.named_binding`
pub const ENV_NAMED_BINDING: &str = "BINDERY_NAMED_BINDING";

/// One build entry as written in the config file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryConfig {
    /// Entry name
    pub name: String,
    /// Module id the entry builds
    pub module: String,
    /// How the entry module imports `utils`: `*`, `default` or `{name}`
    pub style: String,
}

/// A validated entry point
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPoint {
    /// Entry name
    pub name: String,
    /// Module id the entry builds
    pub module: ModuleId,
    /// How the entry module imports `utils`
    pub style: ImportStyle,
}

impl TryFrom<&EntryConfig> for EntryPoint {
    type Error = ConfigError;

    fn try_from(raw: &EntryConfig) -> Result<Self, Self::Error> {
        let style = raw
            .style
            .parse::<ImportStyle>()
            .map_err(|e| ConfigError::InvalidStyle {
                entry: raw.name.clone(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            name: raw.name.clone(),
            module: ModuleId::from(raw.module.as_str()),
            style,
        })
    }
}

/// Configuration for bindery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinderyConfig {
    /// Loader options
    pub loader: LoaderOptions,

    /// Build entries
    pub entries: Vec<EntryConfig>,
}

impl Default for BinderyConfig {
    fn default() -> Self {
        Self {
            loader: LoaderOptions::default(),
            entries: vec![
                EntryConfig {
                    name: "named".to_string(),
                    module: modules::NAMED_ENTRY.to_string(),
                    style: format!("{{{}}}", modules::FETCH_DATA),
                },
                EntryConfig {
                    name: "namespace".to_string(),
                    module: modules::NAMESPACE_ENTRY.to_string(),
                    style: "*".to_string(),
                },
                EntryConfig {
                    name: "default".to_string(),
                    module: modules::DEFAULT_ENTRY.to_string(),
                    style: "default".to_string(),
                },
            ],
        }
    }
}

impl BinderyConfig {
    /// Load configuration from default locations, then `explicit`, then the
    /// environment.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = BinderyConfig::default();

        let project = PathBuf::from(PROJECT_CONFIG_FILE);
        if project.exists() {
            config = Self::from_file(&project)?;
        }

        if let Some(path) = explicit {
            config = Self::from_file(path)?;
        }

        config.apply_env(std::env::vars())?;
        config.validate()?;
        Ok(config)
    }

    /// Read a config file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        debug!(path = %path.display(), "Loading config file");
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse config from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: BinderyConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `BINDERY_*` overrides from `vars`
    pub fn apply_env<I>(&mut self, vars: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            if key == ENV_NAMED_BINDING {
                self.loader.named_binding =
                    value
                        .parse::<NamedBindingMode>()
                        .map_err(|reason| ConfigError::InvalidEnv {
                            var: key.clone(),
                            reason,
                        })?;
            }
        }
        Ok(())
    }

    /// Check entries parse and have unique names
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for raw in &self.entries {
            if !seen.insert(raw.name.as_str()) {
                return Err(ConfigError::DuplicateEntry(raw.name.clone()));
            }
            EntryPoint::try_from(raw)?;
        }
        Ok(())
    }

    /// Validated entry points, in config order
    pub fn entry_points(&self) -> Result<Vec<EntryPoint>, ConfigError> {
        self.entries.iter().map(EntryPoint::try_from).collect()
    }

    /// Find an entry by name
    pub fn entry(&self, name: &str) -> Option<Result<EntryPoint, ConfigError>> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(EntryPoint::try_from)
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
