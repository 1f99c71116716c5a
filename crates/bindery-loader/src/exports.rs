// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module exports objects.
//!
//! One [`ExportsObject`] exists per module id. The loader hands out clones of
//! the handle, and every importer reads through the same property map, which
//! is what lets a test substitute an export for everybody at once.

use crate::error::ModuleError;
use crate::id::ModuleId;
use crate::object::ObjectRef;
use crate::value::Value;
use std::collections::BTreeMap;

/// Reserved export name holding the default export
pub const DEFAULT_EXPORT: &str = "default";

/// Shared handle to a module's exports
#[derive(Debug, Clone)]
pub struct ExportsObject {
    module: ModuleId,
    object: ObjectRef,
}

impl ExportsObject {
    /// Create an empty exports object for `module`
    pub fn new(module: impl Into<ModuleId>) -> Self {
        Self {
            module: module.into(),
            object: ObjectRef::new(),
        }
    }

    /// The module these exports belong to
    pub fn module(&self) -> &ModuleId {
        &self.module
    }

    /// Read an export
    pub fn get(&self, name: &str) -> Option<Value> {
        self.object.get(name)
    }

    /// Read an export, yielding `undefined` when absent
    pub fn get_or_undefined(&self, name: &str) -> Value {
        self.object.get_or_undefined(name)
    }

    /// Replace an export in place. Every holder of this object sees the new
    /// value on its next read.
    pub fn set(&self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.object.set(name, value)
    }

    /// Set the default export
    pub fn set_default(&self, value: Value) -> Option<Value> {
        self.object.set(DEFAULT_EXPORT, value)
    }

    /// Read the default export
    pub fn get_default(&self) -> Option<Value> {
        self.object.get(DEFAULT_EXPORT)
    }

    /// Check if an export exists
    pub fn has(&self, name: &str) -> bool {
        self.object.has(name)
    }

    /// Remove an export
    pub fn remove(&self, name: &str) -> Option<Value> {
        self.object.remove(name)
    }

    /// Export names in sorted order
    pub fn keys(&self) -> Vec<String> {
        self.object.keys()
    }

    /// Number of exports
    pub fn len(&self) -> usize {
        self.object.len()
    }

    /// Check if nothing has been exported yet
    pub fn is_empty(&self) -> bool {
        self.object.is_empty()
    }

    /// Copy of the current export map
    pub fn snapshot(&self) -> BTreeMap<String, Value> {
        self.object.snapshot()
    }

    /// Call an exported function, reading it at call time
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value, ModuleError> {
        self.object.call_method(name, args)
    }

    /// Identity comparison
    pub fn ptr_eq(&self, other: &ExportsObject) -> bool {
        self.object.ptr_eq(&other.object)
    }

    /// The underlying object handle
    pub fn as_object(&self) -> &ObjectRef {
        &self.object
    }

    /// The namespace as a value, for storing in other objects
    pub fn to_value(&self) -> Value {
        Value::Object(self.object.clone())
    }
}

impl AsRef<ObjectRef> for ExportsObject {
    fn as_ref(&self) -> &ObjectRef {
        &self.object
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_an_ordinary_key() {
        let exports = ExportsObject::new("m");
        assert!(exports.get_default().is_none());

        exports.set_default(Value::Number(1.0));
        assert!(exports.has(DEFAULT_EXPORT));
        assert_eq!(exports.keys(), vec!["default".to_string()]);
    }

    #[test]
    fn test_clones_share_state() {
        let exports = ExportsObject::new(1);
        let other = exports.clone();
        other.set("f", Value::Null);

        assert!(exports.ptr_eq(&other));
        assert_eq!(exports.len(), 1);
        assert_eq!(exports.module(), &ModuleId::Index(1));
    }

    #[test]
    fn test_to_value_keeps_identity() {
        let exports = ExportsObject::new("m");
        let value = exports.to_value();
        assert!(value.as_object().unwrap().ptr_eq(exports.as_object()));
    }
}
