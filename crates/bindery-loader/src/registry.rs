// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module registry.
//!
//! Records are never evicted: once a module id has an entry, every later
//! request for that id is served from it, including requests made while the
//! module's own body is still running.

use crate::exports::ExportsObject;
use crate::id::ModuleId;
use dashmap::DashMap;

/// Lifecycle of a module record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleState {
    /// Inserted, body not finished (or failed)
    Uninitialized,
    /// Body ran to completion
    Initialized,
}

/// Registry entry
#[derive(Debug, Clone)]
pub struct ModuleRecord {
    /// The module id
    pub id: ModuleId,
    /// The module's exports
    pub exports: ExportsObject,
    /// Whether the body has finished
    pub state: ModuleState,
    /// Module whose body first required this one
    pub parent: Option<ModuleId>,
    /// Modules required by this one, in first-request order
    pub children: Vec<ModuleId>,
}

impl ModuleRecord {
    /// Create an uninitialized record with empty exports
    pub fn new(id: ModuleId, parent: Option<ModuleId>) -> Self {
        Self {
            exports: ExportsObject::new(id.clone()),
            id,
            state: ModuleState::Uninitialized,
            parent,
            children: Vec::new(),
        }
    }

    /// Whether the body has finished
    pub fn is_initialized(&self) -> bool {
        self.state == ModuleState::Initialized
    }
}

/// Registry mapping module ids to their records
pub struct ModuleRegistry {
    records: DashMap<ModuleId, ModuleRecord>,
}

impl ModuleRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }

    /// Get a record by id
    pub fn get(&self, id: &ModuleId) -> Option<ModuleRecord> {
        self.records.get(id).map(|entry| entry.clone())
    }

    /// Insert a record
    pub fn put(&self, id: ModuleId, record: ModuleRecord) {
        self.records.insert(id, record);
    }

    /// Check if a module has a record
    pub fn has(&self, id: &ModuleId) -> bool {
        self.records.contains_key(id)
    }

    /// The exports handle for a module, without copying the rest of the record
    pub fn exports_of(&self, id: &ModuleId) -> Option<ExportsObject> {
        self.records.get(id).map(|entry| entry.exports.clone())
    }

    /// The lifecycle state of a module
    pub fn state_of(&self, id: &ModuleId) -> Option<ModuleState> {
        self.records.get(id).map(|entry| entry.state)
    }

    /// Move a record to [`ModuleState::Initialized`]. There is no way back.
    pub fn mark_initialized(&self, id: &ModuleId) {
        if let Some(mut entry) = self.records.get_mut(id) {
            entry.state = ModuleState::Initialized;
        }
    }

    /// Record that `parent` required `child`
    pub fn add_child(&self, parent: &ModuleId, child: &ModuleId) {
        if let Some(mut entry) = self.records.get_mut(parent) {
            if !entry.children.contains(child) {
                entry.children.push(child.clone());
            }
        }
    }

    /// All registered module ids, sorted
    pub fn ids(&self) -> Vec<ModuleId> {
        let mut ids: Vec<ModuleId> = self.records.iter().map(|entry| entry.key().clone()).collect();
        ids.sort();
        ids
    }

    /// Get the number of registered modules
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}
