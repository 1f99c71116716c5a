// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module identifiers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque key naming a module within one build.
///
/// Bundlers hand out either numeric ids or path-like strings; both forms are
/// accepted and compare only against the same form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModuleId {
    /// Numeric id, as emitted by production builds
    Index(u32),
    /// Path-like id, as emitted by development builds
    Path(String),
}

impl ModuleId {
    /// Borrow the path form, if this is a path id
    pub fn as_path(&self) -> Option<&str> {
        match self {
            ModuleId::Path(p) => Some(p),
            ModuleId::Index(_) => None,
        }
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleId::Index(n) => write!(f, "{}", n),
            ModuleId::Path(p) => write!(f, "{}", p),
        }
    }
}

impl From<u32> for ModuleId {
    fn from(n: u32) -> Self {
        ModuleId::Index(n)
    }
}

impl From<&str> for ModuleId {
    fn from(s: &str) -> Self {
        ModuleId::Path(s.to_string())
    }
}

impl From<String> for ModuleId {
    fn from(s: String) -> Self {
        ModuleId::Path(s)
    }
}

impl From<&ModuleId> for ModuleId {
    fn from(id: &ModuleId) -> Self {
        id.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(ModuleId::from(7).to_string(), "7");
        assert_eq!(ModuleId::from("./src/utils.js").to_string(), "./src/utils.js");
    }

    #[test]
    fn test_forms_do_not_collide() {
        assert_ne!(ModuleId::from(1), ModuleId::from("1"));
        assert_eq!(ModuleId::from("a").as_path(), Some("a"));
        assert_eq!(ModuleId::from(1).as_path(), None);
    }

    #[test]
    fn test_deserialize_untagged() {
        let ids: Vec<ModuleId> = serde_json::from_str(r#"[3, "utils"]"#).unwrap();
        assert_eq!(ids, vec![ModuleId::Index(3), ModuleId::Path("utils".into())]);
    }
}
