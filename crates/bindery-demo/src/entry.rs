// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Entry point runner.
//!
//! Replays what a test file does against one built entry: load the entry,
//! substitute `utils.fetchData` with a stub returning `[]`, call
//! `loadUsers`, and report whether the stub was reached.

use crate::config::{BinderyConfig, EntryPoint};
use crate::error::{DemoError, Result};
use crate::modules::{self, FETCH_DATA, LOAD_USERS, UTILS};
use bindery_loader::{MockGuard, ModuleId, ModuleLoader, ModuleState, Value, array, spy_on};
use serde::Serialize;
use tracing::{debug, info};

/// Outcome of running one entry
#[derive(Debug, Clone, Serialize)]
pub struct EntryReport {
    /// Entry name
    pub entry: String,
    /// Entry module id
    pub module: String,
    /// Import style used for `utils`
    pub style: String,
    /// Whether a stub was installed
    pub mocked: bool,
    /// Value returned by `loadUsers`
    pub result: serde_json::Value,
    /// Number of calls that reached the stub
    pub stub_calls: usize,
}

impl EntryReport {
    /// Whether the entry observed the substituted function
    pub fn mock_observed(&self) -> bool {
        self.stub_calls > 0
    }
}

/// The stub installed in place of `fetchData`
pub fn stub_fetch_data() -> Value {
    Value::returning("fetchDataStub", array![])
}

/// Create a loader over every configured entry
pub fn build_loader(config: &BinderyConfig) -> Result<ModuleLoader> {
    let entries = config.entry_points()?;
    Ok(ModuleLoader::new(modules::build_table(&entries)).with_options(config.loader))
}

/// Substitute `fetchData` on the `utils` exports object.
///
/// Namespace and default importers read through that object at call time;
/// a captured named import does not.
pub fn install_mock(loader: &ModuleLoader) -> Result<MockGuard> {
    let utils = loader.require(UTILS)?;
    Ok(spy_on(&utils, FETCH_DATA, stub_fetch_data())?)
}

/// Run one entry on a fresh loader
pub fn run_entry(config: &BinderyConfig, entry: &EntryPoint, mock: bool) -> Result<EntryReport> {
    let loader = build_loader(config)?;
    debug!(entry = %entry.name, module = %entry.module, "Loading entry");
    let app = loader.require(&entry.module)?;

    let guard = if mock {
        Some(install_mock(&loader)?)
    } else {
        None
    };

    let result = app.call(LOAD_USERS, &[])?;
    let stub_calls = guard.as_ref().map(MockGuard::calls).unwrap_or(0);
    info!(entry = %entry.name, mocked = mock, stub_calls, "Entry finished");

    Ok(EntryReport {
        entry: entry.name.clone(),
        module: entry.module.to_string(),
        style: entry.style.to_string(),
        mocked: mock,
        result: result.to_json(),
        stub_calls,
    })
}

/// Run the named entries, or all of them when `names` is empty
pub fn run_entries(config: &BinderyConfig, names: &[String], mock: bool) -> Result<Vec<EntryReport>> {
    let entries = if names.is_empty() {
        config.entry_points()?
    } else {
        names
            .iter()
            .map(|name| {
                config
                    .entry(name)
                    .ok_or_else(|| DemoError::UnknownEntry(name.clone()))?
                    .map_err(DemoError::from)
            })
            .collect::<Result<Vec<_>>>()?
    };

    entries
        .iter()
        .map(|entry| run_entry(config, entry, mock))
        .collect()
}

/// One row of the module graph
#[derive(Debug, Clone, Serialize)]
pub struct ModuleSummary {
    /// Module id
    pub id: String,
    /// Whether the body finished
    pub initialized: bool,
    /// Module that first required this one
    pub parent: Option<String>,
    /// Modules this one required
    pub children: Vec<String>,
    /// Export names
    pub exports: Vec<String>,
}

/// Require every entry and describe the resulting registry
pub fn module_graph(config: &BinderyConfig) -> Result<Vec<ModuleSummary>> {
    let loader = build_loader(config)?;
    for entry in config.entry_points()? {
        loader.require(&entry.module)?;
    }

    let summaries = loader
        .registry()
        .ids()
        .iter()
        .filter_map(|id| loader.registry().get(id))
        .map(|record| ModuleSummary {
            id: record.id.to_string(),
            initialized: record.state == ModuleState::Initialized,
            parent: record.parent.as_ref().map(ModuleId::to_string),
            children: record.children.iter().map(ModuleId::to_string).collect(),
            exports: record.exports.keys(),
        })
        .collect();
    Ok(summaries)
}
