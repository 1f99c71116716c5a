// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # bindery-demo
//!
//! A `utils` module exporting `fetchData`, and three entry modules that import
//! it as a named import, a namespace import and a default import. Running an
//! entry with a mock shows which import shapes let a test replace
//! `fetchData`:
//!
//! | entry       | import                                 | mock observed |
//! |-------------|----------------------------------------|---------------|
//! | `named`     | `import { fetchData } from './utils'`  | no            |
//! | `namespace` | `import * as utils from './utils'`     | yes           |
//! | `default`   | `import utils from './utils'`          | yes           |

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod entry;
pub mod error;
pub mod modules;

pub use config::{BinderyConfig, EntryConfig, EntryPoint};
pub use entry::{EntryReport, ModuleSummary, module_graph, run_entries, run_entry};
pub use error::{ConfigError, DemoError, Result};
