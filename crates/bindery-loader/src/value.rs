// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Values stored in exports objects.

use crate::error::ModuleError;
use crate::object::ObjectRef;
use std::fmt;
use std::sync::Arc;

/// Signature of a native function body
pub type NativeFn = dyn Fn(&[Value]) -> Result<Value, ModuleError> + Send + Sync;

/// A callable function value.
///
/// Functions are compared by identity: two callables with the same body are
/// still different functions.
pub struct Callable {
    name: String,
    func: Box<NativeFn>,
}

impl Callable {
    /// Create a new callable
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, ModuleError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Box::new(func),
        }
    }

    /// The function name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invoke the function
    pub fn call(&self, args: &[Value]) -> Result<Value, ModuleError> {
        (self.func)(args)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeFunction({})", self.name)
    }
}

/// A dynamic value.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// undefined
    #[default]
    Undefined,
    /// null
    Null,
    /// Boolean value
    Boolean(bool),
    /// Number (IEEE 754 double)
    Number(f64),
    /// String
    String(String),
    /// Array (value semantics)
    Array(Vec<Value>),
    /// Shared mutable object
    Object(ObjectRef),
    /// Function reference
    Function(Arc<Callable>),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            (Value::Function(a), Value::Function(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Value {
    /// Wrap a closure as a function value
    pub fn function<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, ModuleError> + Send + Sync + 'static,
    {
        Value::Function(Arc::new(Callable::new(name, func)))
    }

    /// A function that ignores its arguments and returns a clone of `value`
    pub fn returning(name: impl Into<String>, value: Value) -> Self {
        Value::function(name, move |_| Ok(value.clone()))
    }

    /// Build a plain object from name/value pairs
    pub fn object<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Object(ObjectRef::from_entries(entries))
    }

    /// Returns true if this value is undefined.
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Returns true if this value is a function.
    pub fn is_function(&self) -> bool {
        matches!(self, Value::Function(_))
    }

    /// Borrow the object handle, if this is an object
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Borrow the elements, if this is an array
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Call this value as a function
    pub fn call(&self, args: &[Value]) -> Result<Value, ModuleError> {
        match self {
            Value::Function(f) => f.call(args),
            other => Err(ModuleError::NotCallable {
                name: other.to_string(),
                type_of: other.type_of(),
            }),
        }
    }

    /// Returns the type of this value as a string.
    pub fn type_of(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "object",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) | Value::Object(_) => "object",
            Value::Function(_) => "function",
        }
    }

    /// Convert to JSON. Functions become `"[Function: name]"`, `undefined`
    /// becomes `null` and self-referencing objects become `"[Circular]"`.
    pub fn to_json(&self) -> serde_json::Value {
        self.to_json_inner(&mut Vec::new())
    }

    fn to_json_inner(&self, seen: &mut Vec<usize>) -> serde_json::Value {
        match self {
            Value::Undefined | Value::Null => serde_json::Value::Null,
            Value::Boolean(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(|v| v.to_json_inner(seen)).collect())
            }
            Value::Object(obj) => {
                if seen.contains(&obj.addr()) {
                    return serde_json::Value::String("[Circular]".to_string());
                }
                seen.push(obj.addr());
                let map = obj
                    .snapshot()
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json_inner(seen)))
                    .collect();
                seen.pop();
                serde_json::Value::Object(map)
            }
            Value::Function(f) => serde_json::Value::String(format!("[Function: {}]", f.name())),
        }
    }

    fn inspect(&self, seen: &mut Vec<usize>, nested: bool, out: &mut String) {
        match self {
            Value::String(s) if nested => {
                out.push('\'');
                out.push_str(s);
                out.push('\'');
            }
            Value::Array(items) => {
                if items.is_empty() {
                    out.push_str("[]");
                    return;
                }
                out.push_str("[ ");
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    item.inspect(seen, true, out);
                }
                out.push_str(" ]");
            }
            Value::Object(obj) => {
                if seen.contains(&obj.addr()) {
                    out.push_str("[Circular]");
                    return;
                }
                let props = obj.snapshot();
                if props.is_empty() {
                    out.push_str("{}");
                    return;
                }
                seen.push(obj.addr());
                out.push_str("{ ");
                for (i, (k, v)) in props.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    out.push_str(k);
                    out.push_str(": ");
                    v.inspect(seen, true, out);
                }
                out.push_str(" }");
                seen.pop();
            }
            Value::Function(f) => {
                out.push_str("[Function: ");
                out.push_str(f.name());
                out.push(']');
            }
            Value::Undefined => out.push_str("undefined"),
            Value::Null => out.push_str("null"),
            Value::Boolean(b) => out.push_str(&b.to_string()),
            Value::Number(n) => out.push_str(&n.to_string()),
            Value::String(s) => out.push_str(s),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.inspect(&mut Vec::new(), false, &mut out);
        f.write_str(&out)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<ObjectRef> for Value {
    fn from(obj: ObjectRef) -> Self {
        Value::Object(obj)
    }
}

impl From<&serde_json::Value> for Value {
    fn from(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(*b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(arr) => Value::Array(arr.iter().map(Value::from).collect()),
            serde_json::Value::Object(obj) => {
                Value::object(obj.iter().map(|(k, v)| (k.clone(), Value::from(v))))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users() -> Value {
        Value::Array(vec![
            Value::object([("name", Value::from("Tom"))]),
            Value::object([("name", Value::from("Mary"))]),
        ])
    }

    #[test]
    fn test_display() {
        assert_eq!(users().to_string(), "[ { name: 'Tom' }, { name: 'Mary' } ]");
        assert_eq!(Value::Array(vec![]).to_string(), "[]");
        assert_eq!(Value::Number(3.0).to_string(), "3");
        assert_eq!(Value::from("plain").to_string(), "plain");
        assert_eq!(
            Value::returning("fetchData", Value::Null).to_string(),
            "[Function: fetchData]"
        );
    }

    #[test]
    fn test_display_circular() {
        let obj = ObjectRef::new();
        obj.set("self", Value::Object(obj.clone()));
        assert_eq!(Value::Object(obj).to_string(), "{ self: [Circular] }");
    }

    #[test]
    fn test_function_identity() {
        let f = Value::returning("f", Value::Null);
        let g = Value::returning("f", Value::Null);
        assert_eq!(f, f.clone());
        assert_ne!(f, g);
    }

    #[test]
    fn test_objects_compare_by_identity() {
        assert_ne!(users(), users());
        let obj = Value::object([("a", Value::Null)]);
        assert_eq!(obj, obj.clone());
    }

    #[test]
    fn test_default_is_undefined() {
        assert!(Value::default().is_undefined());
        assert_eq!(Value::default().type_of(), "undefined");
    }

    #[test]
    fn test_call_non_function() {
        let err = Value::Number(1.0).call(&[]).unwrap_err();
        assert!(matches!(err, ModuleError::NotCallable { type_of: "number", .. }));
    }

    #[test]
    fn test_json_conversion() {
        let json = serde_json::json!([{ "name": "Tom" }, { "name": "Mary" }]);
        let value = Value::from(&json);
        assert_eq!(value.to_json(), json);
        assert_eq!(value.to_string(), users().to_string());
        assert_eq!(Value::Undefined.to_json(), serde_json::Value::Null);
    }
}
