// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module loader - runs module bodies and caches their exports

use crate::binding::{Binding, BindingResolver, ImportStyle, NamedBindingMode};
use crate::error::{LoaderError, ModuleError, Result};
use crate::exports::ExportsObject;
use crate::id::ModuleId;
use crate::registry::{ModuleRecord, ModuleRegistry};
use crate::table::ModuleTable;
use crate::value::Value;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

/// Loader options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderOptions {
    /// How named imports are bound
    pub named_binding: NamedBindingMode,
}

/// Module loader
pub struct ModuleLoader {
    /// Module bodies
    table: ModuleTable,
    /// Module registry
    registry: ModuleRegistry,
    /// Binding resolver for `import`
    resolver: BindingResolver,
    /// Stack of modules whose bodies are running
    loading_stack: Mutex<Vec<ModuleId>>,
    /// Modules in the order their bodies completed
    evaluation_order: Mutex<Vec<ModuleId>>,
}

impl ModuleLoader {
    /// Create a loader over `table` with a fresh registry
    pub fn new(table: ModuleTable) -> Self {
        Self::with_registry(table, ModuleRegistry::new())
    }

    /// Create a loader over `table` using an existing registry
    pub fn with_registry(table: ModuleTable, registry: ModuleRegistry) -> Self {
        Self {
            table,
            registry,
            resolver: BindingResolver::default(),
            loading_stack: Mutex::new(Vec::new()),
            evaluation_order: Mutex::new(Vec::new()),
        }
    }

    /// Apply loader options
    pub fn with_options(mut self, options: LoaderOptions) -> Self {
        self.resolver = BindingResolver::new(options.named_binding);
        self
    }

    /// Load a module and return its exports object.
    ///
    /// The body runs on the first request only; every request for the same id
    /// returns the same handle.
    pub fn require(&self, id: impl Into<ModuleId>) -> Result<ExportsObject> {
        self.require_from(id.into(), None)
    }

    /// Load a module and bind it according to `style`
    pub fn import(&self, id: impl Into<ModuleId>, style: &ImportStyle) -> Result<Binding> {
        let exports = self.require(id)?;
        self.resolver.resolve(&exports, style)
    }

    fn require_from(&self, id: ModuleId, parent: Option<&ModuleId>) -> Result<ExportsObject> {
        if let Some(parent) = parent {
            self.registry.add_child(parent, &id);
        }

        // Check cache
        if let Some(exports) = self.registry.exports_of(&id) {
            if self.is_loading(&id) {
                debug!(module = %id, "Cyclic require, returning partially populated exports");
            } else {
                trace!(module = %id, "Module cache hit");
            }
            return Ok(exports);
        }

        let body = self
            .table
            .get(&id)
            .ok_or_else(|| LoaderError::ModuleNotFound(id.clone()))?;

        // Insert before running the body so cyclic requires find it
        let record = ModuleRecord::new(id.clone(), parent.cloned());
        let exports = record.exports.clone();
        self.registry.put(id.clone(), record);

        debug!(module = %id, "Evaluating module");
        let outcome = {
            let _loading = LoadingGuard::enter(&self.loading_stack, id.clone());
            let mut ctx = ModuleContext {
                id: id.clone(),
                exports: exports.clone(),
                loader: self,
            };
            body.evaluate(&mut ctx)
        };

        if let Err(source) = outcome {
            return Err(match source {
                // A dependency already failed; report it rather than this module
                ModuleError::Loader(inner)
                    if matches!(*inner, LoaderError::ModuleInitialization { .. }) =>
                {
                    debug!(module = %id, "Dependency failed during initialization");
                    *inner
                }
                source => {
                    warn!(module = %id, error = %source, "Module initialization failed");
                    LoaderError::ModuleInitialization { id, source }
                }
            });
        }

        self.registry.mark_initialized(&id);
        self.evaluation_order.lock().push(id);
        Ok(exports)
    }

    /// Check if a module's body is currently running
    pub fn is_loading(&self, id: &ModuleId) -> bool {
        self.loading_stack.lock().contains(id)
    }

    /// Modules whose bodies are currently running, outermost first
    pub fn loading_stack(&self) -> Vec<ModuleId> {
        self.loading_stack.lock().clone()
    }

    /// Modules in the order their bodies completed
    pub fn evaluation_order(&self) -> Vec<ModuleId> {
        self.evaluation_order.lock().clone()
    }

    /// The module registry
    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    /// The module table
    pub fn table(&self) -> &ModuleTable {
        &self.table
    }

    /// The named binding mode used by [`ModuleLoader::import`]
    pub fn named_binding(&self) -> NamedBindingMode {
        self.resolver.mode()
    }
}

/// Keeps a module on the loading stack until dropped, including on unwind
struct LoadingGuard<'a> {
    stack: &'a Mutex<Vec<ModuleId>>,
}

impl<'a> LoadingGuard<'a> {
    fn enter(stack: &'a Mutex<Vec<ModuleId>>, id: ModuleId) -> Self {
        stack.lock().push(id);
        Self { stack }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.stack.lock().pop();
    }
}

/// Handle given to a module body while it runs
pub struct ModuleContext<'a> {
    id: ModuleId,
    exports: ExportsObject,
    loader: &'a ModuleLoader,
}

impl ModuleContext<'_> {
    /// The id of the running module
    pub fn id(&self) -> &ModuleId {
        &self.id
    }

    /// The running module's exports
    pub fn exports(&self) -> &ExportsObject {
        &self.exports
    }

    /// Shorthand for `exports().set(name, value)`
    pub fn export(&self, name: impl Into<String>, value: Value) {
        self.exports.set(name, value);
    }

    /// Require a dependency
    pub fn require(&self, id: impl Into<ModuleId>) -> Result<ExportsObject> {
        self.loader.require_from(id.into(), Some(&self.id))
    }

    /// Require a dependency and bind it according to `style`
    pub fn import(&self, id: impl Into<ModuleId>, style: &ImportStyle) -> Result<Binding> {
        let exports = self.require(id)?;
        self.loader.resolver.resolve(&exports, style)
    }

    /// The loader running this module
    pub fn loader(&self) -> &ModuleLoader {
        self.loader
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ModuleState;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_body_runs_once() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let mut table = ModuleTable::new();
        table.define("m", move |ctx| {
            counter.fetch_add(1, Ordering::SeqCst);
            ctx.export("x", Value::Number(1.0));
            Ok(())
        });
        let loader = ModuleLoader::new(table);

        let first = loader.require("m").unwrap();
        let second = loader.require("m").unwrap();

        assert!(first.ptr_eq(&second));
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(loader.registry().state_of(&"m".into()), Some(ModuleState::Initialized));
    }

    #[test]
    fn test_unknown_module_inserts_nothing() {
        let loader = ModuleLoader::new(ModuleTable::new());
        let err = loader.require("ghost").unwrap_err();
        assert!(matches!(err, LoaderError::ModuleNotFound(_)));
        assert!(loader.registry().is_empty());
    }

    #[test]
    fn test_depth_first_post_order() {
        let mut table = ModuleTable::new();
        table.define("a", |ctx| {
            ctx.require("b")?;
            ctx.require("c")?;
            Ok(())
        });
        table.define("b", |ctx| {
            ctx.require("c")?;
            Ok(())
        });
        table.define("c", |_| Ok(()));
        let loader = ModuleLoader::new(table);
        loader.require("a").unwrap();

        let order: Vec<String> = loader
            .evaluation_order()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(order, vec!["c", "b", "a"]);

        let a = loader.registry().get(&"a".into()).unwrap();
        assert_eq!(a.children, vec![ModuleId::from("b"), ModuleId::from("c")]);
        let c = loader.registry().get(&"c".into()).unwrap();
        assert_eq!(c.parent, Some(ModuleId::from("b")));
    }

    #[test]
    fn test_loading_stack_visible_inside_body() {
        let mut table = ModuleTable::new();
        table.define("outer", |ctx| {
            ctx.require("inner")?;
            Ok(())
        });
        table.define("inner", |ctx| {
            let stack = ctx.loader().loading_stack();
            ctx.export("depth", Value::Number(stack.len() as f64));
            Ok(())
        });
        let loader = ModuleLoader::new(table);
        loader.require("outer").unwrap();

        let inner = loader.require("inner").unwrap();
        assert_eq!(inner.get("depth"), Some(Value::Number(2.0)));
        assert!(loader.loading_stack().is_empty());
    }

    #[test]
    fn test_failed_body_is_not_retried() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let mut table = ModuleTable::new();
        table.define("broken", move |ctx| {
            counter.fetch_add(1, Ordering::SeqCst);
            ctx.export("before", Value::Boolean(true));
            Err(ModuleError::thrown("boom"))
        });
        let loader = ModuleLoader::new(table);

        let err = loader.require("broken").unwrap_err();
        assert!(matches!(err, LoaderError::ModuleInitialization { ref id, .. } if id == &ModuleId::from("broken")));

        let partial = loader.require("broken").unwrap();
        assert!(partial.has("before"));
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(
            loader.registry().state_of(&"broken".into()),
            Some(ModuleState::Uninitialized)
        );
        assert!(loader.evaluation_order().is_empty());
    }

    #[test]
    fn test_nested_failure_reports_innermost_module() {
        let mut table = ModuleTable::new();
        table.define("outer", |ctx| {
            ctx.require("middle")?;
            Ok(())
        });
        table.define("middle", |ctx| {
            ctx.export("ready", Value::Boolean(false));
            ctx.require("inner")?;
            Ok(())
        });
        table.define("inner", |_| Err(ModuleError::thrown("boom")));
        let loader = ModuleLoader::new(table);

        let err = loader.require("outer").unwrap_err();
        assert!(matches!(err, LoaderError::ModuleInitialization { ref id, .. } if id == &ModuleId::from("inner")));
        assert_eq!(err.to_string(), "Error initializing module 'inner': boom");

        for id in ["outer", "middle", "inner"] {
            assert_eq!(loader.registry().state_of(&id.into()), Some(ModuleState::Uninitialized));
        }
        assert!(loader.require("middle").unwrap().has("ready"));
    }

    #[test]
    fn test_panicking_body_leaves_loading_stack_empty() {
        let mut table = ModuleTable::new();
        table.define("explodes", |_| panic!("body panicked"));
        let loader = ModuleLoader::new(table);

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = loader.require("explodes");
        }));
        assert!(result.is_err());
        assert!(loader.loading_stack().is_empty());
        assert!(!loader.is_loading(&"explodes".into()));
    }

    #[test]
    fn test_options_select_named_binding_mode() {
        let loader = ModuleLoader::new(ModuleTable::new()).with_options(LoaderOptions {
            named_binding: NamedBindingMode::Live,
        });
        assert_eq!(loader.named_binding(), NamedBindingMode::Live);
    }
}
