// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Error types for module loading and binding resolution

use crate::id::ModuleId;
use thiserror::Error;

/// Result type for loader operations
pub type Result<T> = std::result::Result<T, LoaderError>;

/// Errors surfaced by the loader and the binding resolver
#[derive(Debug, Error)]
pub enum LoaderError {
    /// A module body failed while it was being evaluated.
    ///
    /// The partially populated exports object stays in the registry.
    #[error("Error initializing module '{id}': {source}")]
    ModuleInitialization {
        /// The module whose body failed
        id: ModuleId,
        /// What the body reported
        #[source]
        source: ModuleError,
    },

    /// A default import was requested from a module without a default export
    #[error("Module '{0}' has no default export")]
    MissingDefaultExport(ModuleId),

    /// The id was never registered in the module table
    #[error("Cannot find module '{0}'")]
    ModuleNotFound(ModuleId),

    /// A property expected to exist on an object is absent
    #[error("Property '{name}' does not exist on the target object")]
    MissingExport {
        /// Property name
        name: String,
    },
}

impl LoaderError {
    /// Create a module not found error
    pub fn module_not_found(id: impl Into<ModuleId>) -> Self {
        Self::ModuleNotFound(id.into())
    }

    /// The innermost module whose body failed, following nested
    /// initialization failures through `require` chains.
    pub fn failing_module(&self) -> Option<&ModuleId> {
        match self {
            Self::ModuleInitialization { id, source } => match source {
                ModuleError::Loader(inner) => inner.failing_module().or(Some(id)),
                _ => Some(id),
            },
            _ => None,
        }
    }
}

/// Errors raised by module bodies and native functions
#[derive(Debug, Error)]
pub enum ModuleError {
    /// User code signalled a failure
    #[error("{0}")]
    Thrown(String),

    /// A non-function value was called
    #[error("TypeError: {name} is not a function (found {type_of})")]
    NotCallable {
        /// Name used at the call site
        name: String,
        /// `typeof` of the value that was called
        type_of: &'static str,
    },

    /// A nested require or import failed
    #[error(transparent)]
    Loader(Box<LoaderError>),
}

impl ModuleError {
    /// Create a thrown error from a message
    pub fn thrown(msg: impl Into<String>) -> Self {
        Self::Thrown(msg.into())
    }
}

impl From<LoaderError> for ModuleError {
    fn from(err: LoaderError) -> Self {
        Self::Loader(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failing_module_walks_nested_errors() {
        let inner = LoaderError::ModuleInitialization {
            id: ModuleId::from("b"),
            source: ModuleError::thrown("boom"),
        };
        let outer = LoaderError::ModuleInitialization {
            id: ModuleId::from("a"),
            source: ModuleError::from(inner),
        };

        assert_eq!(outer.failing_module(), Some(&ModuleId::from("b")));
        assert!(outer.to_string().contains("'a'"));
    }

    #[test]
    fn test_failing_module_for_other_errors() {
        assert!(LoaderError::module_not_found(3).failing_module().is_none());
        assert_eq!(
            LoaderError::MissingDefaultExport(ModuleId::from("utils")).to_string(),
            "Module 'utils' has no default export"
        );
    }
}
