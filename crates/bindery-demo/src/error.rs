// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Error types for the demo scenario

use std::path::PathBuf;
use thiserror::Error;

/// Result type for demo operations
pub type Result<T> = std::result::Result<T, DemoError>;

/// Errors raised while running entry points
#[derive(Debug, Error)]
pub enum DemoError {
    /// Configuration could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Loading or binding a module failed
    #[error(transparent)]
    Loader(#[from] bindery_loader::LoaderError),

    /// An exported function failed
    #[error(transparent)]
    Module(#[from] bindery_loader::ModuleError),

    /// No entry with the given name is configured
    #[error("Unknown entry point '{0}'")]
    UnknownEntry(String),
}

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File system error
    #[error("Failed to read config {path}: {source}")]
    Io {
        /// Config file path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing error
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// An entry declares an import style that does not parse
    #[error("Entry '{entry}': {reason}")]
    InvalidStyle {
        /// Entry name
        entry: String,
        /// Parser message
        reason: String,
    },

    /// Two entries share a name
    #[error("Duplicate entry point '{0}'")]
    DuplicateEntry(String),

    /// An environment override holds an unusable value
    #[error("Invalid value for {var}: {reason}")]
    InvalidEnv {
        /// Variable name
        var: String,
        /// Why it was rejected
        reason: String,
    },
}
