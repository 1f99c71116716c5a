// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Import binding resolution.
//!
//! Given the shape of an import statement, decides which reference the
//! importer ends up holding:
//! - `import * as utils from './utils'` binds the exports object itself
//! - `import { fetchData } from './utils'` binds one property
//! - `import utils from './utils'` binds the value under `default`
//!
//! Only the first shape keeps a handle on the shared exports object, so only
//! it observes a later substitution of a property on that object.

use crate::error::{LoaderError, Result};
use crate::exports::ExportsObject;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Import statement shape, decided by the build tool
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImportStyle {
    /// `import * as ns from 'module'`
    WholeNamespace,
    /// `import { name } from 'module'`
    NamedProperty(String),
    /// `import value from 'module'`
    DefaultProperty,
}

impl ImportStyle {
    /// Named import of `name`
    pub fn named(name: impl Into<String>) -> Self {
        ImportStyle::NamedProperty(name.into())
    }
}

impl fmt::Display for ImportStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportStyle::WholeNamespace => write!(f, "*"),
            ImportStyle::NamedProperty(name) => write!(f, "{{{}}}", name),
            ImportStyle::DefaultProperty => write!(f, "default"),
        }
    }
}

/// Error parsing an [`ImportStyle`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid import style '{0}': expected '*', 'namespace', 'default' or '{{name}}'")]
pub struct ParseImportStyleError(pub String);

impl FromStr for ImportStyle {
    type Err = ParseImportStyleError;

    /// Accepts `*` / `namespace`, `default`, and `{name}` for named imports.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        match s {
            "*" | "namespace" => Ok(ImportStyle::WholeNamespace),
            "default" => Ok(ImportStyle::DefaultProperty),
            _ => {
                let inner = s
                    .strip_prefix('{')
                    .and_then(|rest| rest.strip_suffix('}'))
                    .map(str::trim)
                    .filter(|name| is_identifier(name))
                    .ok_or_else(|| ParseImportStyleError(s.to_string()))?;
                Ok(ImportStyle::NamedProperty(inner.to_string()))
            }
        }
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {
            chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
        }
        _ => false,
    }
}

/// How named imports are bound
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamedBindingMode {
    /// Read the property once, when the import is resolved
    #[default]
    Capture,
    /// Re-read the property on every access
    Live,
}

impl FromStr for NamedBindingMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "capture" => Ok(NamedBindingMode::Capture),
            "live" => Ok(NamedBindingMode::Live),
            other => Err(format!("Invalid named binding mode '{}'", other)),
        }
    }
}

/// A named import
#[derive(Debug, Clone)]
pub enum NamedBinding {
    /// Value read when the import was resolved
    Captured {
        /// Imported name
        name: String,
        /// The captured value
        value: Value,
    },
    /// Dynamic view of one property
    Live {
        /// Imported name
        name: String,
        /// The exporting module's exports
        exports: ExportsObject,
    },
}

impl NamedBinding {
    /// The imported name
    pub fn name(&self) -> &str {
        match self {
            NamedBinding::Captured { name, .. } | NamedBinding::Live { name, .. } => name,
        }
    }

    /// Current value of the binding
    pub fn get(&self) -> Value {
        match self {
            NamedBinding::Captured { value, .. } => value.clone(),
            NamedBinding::Live { name, exports } => exports.get_or_undefined(name),
        }
    }
}

/// Reference bound into an importing scope
#[derive(Debug, Clone)]
pub enum Binding {
    /// The whole exports object
    Namespace(ExportsObject),
    /// One property
    Named(NamedBinding),
    /// The default export, read once
    Default(Value),
}

impl Binding {
    /// The bound value. A namespace binding yields the shared object itself.
    pub fn value(&self) -> Value {
        match self {
            Binding::Namespace(exports) => exports.to_value(),
            Binding::Named(named) => named.get(),
            Binding::Default(value) => value.clone(),
        }
    }

    /// The exports object, if this is a namespace binding
    pub fn namespace(&self) -> Option<&ExportsObject> {
        match self {
            Binding::Namespace(exports) => Some(exports),
            _ => None,
        }
    }

    /// Consume into the exports object, if this is a namespace binding
    pub fn into_namespace(self) -> Option<ExportsObject> {
        match self {
            Binding::Namespace(exports) => Some(exports),
            _ => None,
        }
    }
}

/// Turns an import style into a [`Binding`]
#[derive(Debug, Clone, Copy, Default)]
pub struct BindingResolver {
    mode: NamedBindingMode,
}

impl BindingResolver {
    /// Create a resolver using `mode` for named imports
    pub fn new(mode: NamedBindingMode) -> Self {
        Self { mode }
    }

    /// The named binding mode in use
    pub fn mode(&self) -> NamedBindingMode {
        self.mode
    }

    /// Resolve `style` against a module's exports
    pub fn resolve(&self, exports: &ExportsObject, style: &ImportStyle) -> Result<Binding> {
        debug!(module = %exports.module(), style = %style, "Resolving import binding");

        match style {
            ImportStyle::WholeNamespace => Ok(Binding::Namespace(exports.clone())),
            ImportStyle::NamedProperty(name) => {
                let binding = match self.mode {
                    NamedBindingMode::Capture => NamedBinding::Captured {
                        name: name.clone(),
                        value: exports.get_or_undefined(name),
                    },
                    NamedBindingMode::Live => NamedBinding::Live {
                        name: name.clone(),
                        exports: exports.clone(),
                    },
                };
                Ok(Binding::Named(binding))
            }
            ImportStyle::DefaultProperty => exports
                .get_default()
                .map(Binding::Default)
                .ok_or_else(|| LoaderError::MissingDefaultExport(exports.module().clone())),
        }
    }
}
