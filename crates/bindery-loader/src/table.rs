// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module table - the defining code for every module in a build

use crate::error::ModuleError;
use crate::id::ModuleId;
use crate::loader::ModuleContext;
use std::collections::HashMap;
use std::sync::Arc;

/// Defining code of a module.
///
/// A body populates `ctx.exports()` and may require other modules through the
/// context. It runs at most once per loader.
pub trait ModuleBody: Send + Sync {
    /// Run the module's top-level code
    fn evaluate(&self, ctx: &mut ModuleContext<'_>) -> Result<(), ModuleError>;
}

impl<F> ModuleBody for F
where
    F: Fn(&mut ModuleContext<'_>) -> Result<(), ModuleError> + Send + Sync,
{
    fn evaluate(&self, ctx: &mut ModuleContext<'_>) -> Result<(), ModuleError> {
        self(ctx)
    }
}

/// Mapping from module id to module body, as a bundler would emit it
#[derive(Clone, Default)]
pub struct ModuleTable {
    modules: HashMap<ModuleId, Arc<dyn ModuleBody>>,
}

impl ModuleTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a closure body under `id`, replacing any previous definition
    pub fn define<F>(&mut self, id: impl Into<ModuleId>, body: F) -> &mut Self
    where
        F: Fn(&mut ModuleContext<'_>) -> Result<(), ModuleError> + Send + Sync + 'static,
    {
        self.define_body(id, body)
    }

    /// Register any [`ModuleBody`] under `id`
    pub fn define_body<B>(&mut self, id: impl Into<ModuleId>, body: B) -> &mut Self
    where
        B: ModuleBody + 'static,
    {
        self.modules.insert(id.into(), Arc::new(body));
        self
    }

    /// Look up a body
    pub fn get(&self, id: &ModuleId) -> Option<Arc<dyn ModuleBody>> {
        self.modules.get(id).cloned()
    }

    /// Check if a module is defined
    pub fn contains(&self, id: &ModuleId) -> bool {
        self.modules.contains_key(id)
    }

    /// All defined ids, sorted
    pub fn ids(&self) -> Vec<ModuleId> {
        let mut ids: Vec<ModuleId> = self.modules.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Number of defined modules
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl std::fmt::Debug for ModuleTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleTable").field("modules", &self.ids()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Empty;

    impl ModuleBody for Empty {
        fn evaluate(&self, _ctx: &mut ModuleContext<'_>) -> Result<(), ModuleError> {
            Ok(())
        }
    }

    #[test]
    fn test_define_and_lookup() {
        let mut table = ModuleTable::new();
        table.define("a", |_| Ok(())).define(2u32, |ctx| {
            ctx.exports().set("n", crate::Value::Number(2.0));
            Ok(())
        });

        assert_eq!(table.len(), 2);
        assert!(table.contains(&ModuleId::from("a")));
        assert!(table.get(&ModuleId::from(2)).is_some());
        assert!(table.get(&ModuleId::from("b")).is_none());
        assert_eq!(table.ids(), vec![ModuleId::from(2), ModuleId::from("a")]);
    }

    #[test]
    fn test_define_body_replaces() {
        let mut table = ModuleTable::new();
        table.define("a", |_| Err(ModuleError::thrown("old")));
        table.define_body("a", Empty);
        assert_eq!(table.len(), 1);
    }
}
