// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # bindery-loader
//!
//! The module-loading core that bundlers emit into their output, rebuilt as a
//! library so its caching behaviour can be tested directly.
//!
//! - [`ModuleTable`] holds the defining code of each module, keyed by
//!   [`ModuleId`]
//! - [`ModuleLoader::require`] runs a body once and caches its
//!   [`ExportsObject`] in the [`ModuleRegistry`]
//! - [`BindingResolver`] narrows the exports object to what an import
//!   statement binds
//! - [`spy_on`] substitutes an export for the duration of a test
//!
//! ## Quick Start
//!
//! ```
//! use bindery_loader::{ModuleLoader, ModuleTable, Value, spy_on};
//!
//! let mut table = ModuleTable::new();
//! table.define("utils", |ctx| {
//!     ctx.export("fetchData", Value::returning("fetchData", Value::from("real")));
//!     Ok(())
//! });
//! table.define("app", |ctx| {
//!     let utils = ctx.require("utils")?;
//!     ctx.export("run", Value::function("run", move |_| utils.call("fetchData", &[])));
//!     Ok(())
//! });
//!
//! let loader = ModuleLoader::new(table);
//! let app = loader.require("app").unwrap();
//! let utils = loader.require("utils").unwrap();
//!
//! let _guard = spy_on(&utils, "fetchData", Value::returning("stub", Value::from("mocked"))).unwrap();
//! assert_eq!(app.call("run", &[]).unwrap(), Value::from("mocked"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod macros;

pub mod binding;
pub mod error;
pub mod exports;
pub mod id;
pub mod loader;
pub mod mock;
pub mod object;
pub mod registry;
pub mod table;
pub mod value;

// Re-exports
pub use binding::{Binding, BindingResolver, ImportStyle, NamedBinding, NamedBindingMode};
pub use error::{LoaderError, ModuleError, Result};
pub use exports::{DEFAULT_EXPORT, ExportsObject};
pub use id::ModuleId;
pub use loader::{LoaderOptions, ModuleContext, ModuleLoader};
pub use mock::{MockGuard, spy_on};
pub use object::ObjectRef;
pub use registry::{ModuleRecord, ModuleRegistry, ModuleState};
pub use table::{ModuleBody, ModuleTable};
pub use value::{Callable, Value};

/// Version of the bindery-loader crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
