// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Literal helpers for building values.

/// Creates an object value from name/value pairs.
///
/// # Example
///
/// ```
/// use bindery_loader::{object, Value};
///
/// let user = object! { "name" => Value::from("Tom") };
/// assert_eq!(user.to_string(), "{ name: 'Tom' }");
/// ```
#[macro_export]
macro_rules! object {
    () => {
        $crate::Value::Object($crate::ObjectRef::new())
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let obj = $crate::ObjectRef::new();
        $(obj.set($key, $value);)+
        $crate::Value::Object(obj)
    }};
}

/// Creates an array value.
///
/// # Example
///
/// ```
/// use bindery_loader::{array, Value};
///
/// let items = array![Value::Number(1.0), Value::Null];
/// assert_eq!(items.to_string(), "[ 1, null ]");
/// ```
#[macro_export]
macro_rules! array {
    () => {
        $crate::Value::Array(::std::vec::Vec::new())
    };
    ($($item:expr),+ $(,)?) => {
        $crate::Value::Array(vec![$($item),+])
    };
}

#[cfg(test)]
mod tests {
    use crate::Value;

    #[test]
    fn test_empty_literals() {
        assert_eq!(object!().to_string(), "{}");
        assert_eq!(array![].to_string(), "[]");
    }

    #[test]
    fn test_nested_literals() {
        let users = array![
            object! { "name" => Value::from("Tom") },
            object! { "name" => Value::from("Mary") },
        ];
        assert_eq!(users.to_string(), "[ { name: 'Tom' }, { name: 'Mary' } ]");
    }
}
