// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Scoped property substitution for tests.
//!
//! [`spy_on`] swaps a property on a shared object for a counting wrapper and
//! hands back a [`MockGuard`] that puts the original back when dropped.

use crate::error::{LoaderError, Result};
use crate::object::ObjectRef;
use crate::value::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

/// Restores a substituted property when dropped
#[derive(Debug)]
pub struct MockGuard {
    target: ObjectRef,
    name: String,
    original: Value,
    calls: Arc<AtomicUsize>,
    restored: bool,
}

impl MockGuard {
    /// The substituted property name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of calls that went through the substitute
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The value that was replaced
    pub fn original(&self) -> &Value {
        &self.original
    }

    /// Put the original value back. Calling this twice is a no-op.
    pub fn restore(&mut self) {
        if self.restored {
            return;
        }
        self.target.set(self.name.clone(), self.original.clone());
        self.restored = true;
        debug!(property = %self.name, calls = self.calls(), "Restored mocked property");
    }
}

impl Drop for MockGuard {
    fn drop(&mut self) {
        self.restore();
    }
}

/// Replace `target[name]` with `replacement`.
///
/// Function replacements are wrapped so calls are counted. The property must
/// already exist.
pub fn spy_on(
    target: &impl AsRef<ObjectRef>,
    name: &str,
    replacement: Value,
) -> Result<MockGuard> {
    let target = target.as_ref().clone();
    let original = target.get(name).ok_or_else(|| LoaderError::MissingExport {
        name: name.to_string(),
    })?;

    let calls = Arc::new(AtomicUsize::new(0));
    let installed = match replacement {
        Value::Function(func) => {
            let counter = Arc::clone(&calls);
            Value::function(func.name().to_string(), move |args| {
                counter.fetch_add(1, Ordering::SeqCst);
                func.call(args)
            })
        }
        other => other,
    };

    target.set(name, installed);
    debug!(property = %name, "Installed mock");

    Ok(MockGuard {
        target,
        name: name.to_string(),
        original,
        calls,
        restored: false,
    })
}
