// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! The scenario modules.
//!
//! `utils` exports `fetchData`, and its default export is the exports object
//! itself, so `utils.fetchData` reads the same slot whichever way `utils` was
//! imported. Each entry module imports `utils` in one shape and exports
//! `loadUsers`, which calls `fetchData` through whatever it imported.

use crate::config::EntryPoint;
use bindery_loader::{
    Binding, ImportStyle, ModuleContext, ModuleError, ModuleTable, Value, array, object,
};

/// Module id of the shared utilities module
pub const UTILS: &str = "./src/utils.js";

/// Module id of the named-import entry
pub const NAMED_ENTRY: &str = "./src/named.js";

/// Module id of the namespace-import entry
pub const NAMESPACE_ENTRY: &str = "./src/namespace.js";

/// Module id of the default-import entry
pub const DEFAULT_ENTRY: &str = "./src/default.js";

/// Name of the function every test wants to mock
pub const FETCH_DATA: &str = "fetchData";

/// Name of the function each entry exposes
pub const LOAD_USERS: &str = "loadUsers";

/// What the real `fetchData` returns
pub fn sample_users() -> Value {
    array![
        object! { "name" => Value::from("Tom") },
        object! { "name" => Value::from("Mary") },
    ]
}

fn utils_module(ctx: &mut ModuleContext<'_>) -> Result<(), ModuleError> {
    ctx.export(FETCH_DATA, Value::function(FETCH_DATA, |_| Ok(sample_users())));
    ctx.exports().set_default(ctx.exports().to_value());
    Ok(())
}

/// Body of an entry module importing `utils` with `style`
fn entry_module(
    style: ImportStyle,
) -> impl Fn(&mut ModuleContext<'_>) -> Result<(), ModuleError> + Send + Sync + 'static {
    move |ctx| {
        let load_users = match ctx.import(UTILS, &style)? {
            // `utils.fetchData()` reads the shared exports object at call time
            Binding::Namespace(utils) => {
                Value::function(LOAD_USERS, move |_| utils.call(FETCH_DATA, &[]))
            }
            // `fetchData()` calls whatever the binding holds
            Binding::Named(fetch_data) => {
                Value::function(LOAD_USERS, move |_| fetch_data.get().call(&[]))
            }
            // `utils.fetchData()` through the default export, read at call time
            Binding::Default(utils) => Value::function(LOAD_USERS, move |_| match &utils {
                Value::Object(obj) => obj.call_method(FETCH_DATA, &[]),
                other => other.call(&[]),
            }),
        };
        ctx.export(LOAD_USERS, load_users);
        Ok(())
    }
}

/// Build the module table for `entries`, as the bundler would emit it
pub fn build_table(entries: &[EntryPoint]) -> ModuleTable {
    let mut table = ModuleTable::new();
    table.define(UTILS, utils_module);
    for entry in entries {
        table.define(entry.module.clone(), entry_module(entry.style.clone()));
    }
    table
}
