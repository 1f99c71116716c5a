// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Shared mutable objects.
//!
//! An [`ObjectRef`] is a handle: cloning it yields another handle to the same
//! property map, never a copy. Every mutation through one handle is visible
//! through all the others.

use crate::error::ModuleError;
use crate::value::Value;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Handle to a shared, mutable property map
#[derive(Clone, Default)]
pub struct ObjectRef {
    properties: Arc<RwLock<BTreeMap<String, Value>>>,
}

impl ObjectRef {
    /// Create a new empty object
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an object from name/value pairs
    pub fn from_entries<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let map = entries.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Self {
            properties: Arc::new(RwLock::new(map)),
        }
    }

    /// Read a property. The value is cloned out so no lock outlives the call.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.properties.read().get(name).cloned()
    }

    /// Read a property, yielding `undefined` when absent
    pub fn get_or_undefined(&self, name: &str) -> Value {
        self.get(name).unwrap_or_default()
    }

    /// Write a property in place, returning the previous value
    pub fn set(&self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.properties.write().insert(name.into(), value)
    }

    /// Check if a property exists
    pub fn has(&self, name: &str) -> bool {
        self.properties.read().contains_key(name)
    }

    /// Remove a property, returning its value
    pub fn remove(&self, name: &str) -> Option<Value> {
        self.properties.write().remove(name)
    }

    /// Property names in sorted order
    pub fn keys(&self) -> Vec<String> {
        self.properties.read().keys().cloned().collect()
    }

    /// Number of properties
    pub fn len(&self) -> usize {
        self.properties.read().len()
    }

    /// Check if the object has no properties
    pub fn is_empty(&self) -> bool {
        self.properties.read().is_empty()
    }

    /// Copy of the current properties.
    ///
    /// Values inside are still handles, so nested objects stay shared.
    pub fn snapshot(&self) -> BTreeMap<String, Value> {
        self.properties.read().clone()
    }

    /// Read a property and call it with `args`.
    ///
    /// The property is read at call time, so a substituted value is picked up.
    pub fn call_method(&self, name: &str, args: &[Value]) -> Result<Value, ModuleError> {
        match self.get(name) {
            Some(Value::Function(f)) => f.call(args),
            other => Err(ModuleError::NotCallable {
                name: name.to_string(),
                type_of: other.unwrap_or_default().type_of(),
            }),
        }
    }

    /// Identity comparison
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Arc::ptr_eq(&self.properties, &other.properties)
    }

    /// Stable address used for identity and cycle detection
    pub fn addr(&self) -> usize {
        Arc::as_ptr(&self.properties) as *const () as usize
    }
}

impl std::fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectRef")
            .field("addr", &format_args!("{:#x}", self.addr()))
            .field("keys", &self.keys())
            .finish()
    }
}

impl AsRef<ObjectRef> for ObjectRef {
    fn as_ref(&self) -> &ObjectRef {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clone_shares_properties() {
        let a = ObjectRef::new();
        let b = a.clone();
        b.set("x", Value::Number(1.0));

        assert!(a.ptr_eq(&b));
        assert_eq!(a.get("x"), Some(Value::Number(1.0)));
    }

    #[test]
    fn test_distinct_objects_are_not_identical() {
        let a = ObjectRef::from_entries([("x", Value::Null)]);
        let b = ObjectRef::from_entries([("x", Value::Null)]);
        assert!(!a.ptr_eq(&b));
        assert_ne!(a.addr(), b.addr());
    }

    #[test]
    fn test_set_returns_previous() {
        let obj = ObjectRef::new();
        assert_eq!(obj.set("k", Value::Boolean(true)), None);
        assert_eq!(obj.set("k", Value::Boolean(false)), Some(Value::Boolean(true)));
        assert_eq!(obj.remove("k"), Some(Value::Boolean(false)));
        assert!(obj.is_empty());
        assert!(obj.get_or_undefined("k").is_undefined());
    }

    #[test]
    fn test_call_method_reads_at_call_time() {
        let obj = ObjectRef::new();
        obj.set("f", Value::function("f", |_| Ok(Value::Number(1.0))));
        assert_eq!(obj.call_method("f", &[]).unwrap(), Value::Number(1.0));

        obj.set("f", Value::function("f", |_| Ok(Value::Number(2.0))));
        assert_eq!(obj.call_method("f", &[]).unwrap(), Value::Number(2.0));
    }

    #[test]
    fn test_call_method_on_missing_property() {
        let obj = ObjectRef::new();
        let err = obj.call_method("nope", &[]).unwrap_err();
        assert!(matches!(
            err,
            ModuleError::NotCallable { ref name, type_of: "undefined" } if name == "nope"
        ));
    }
}
