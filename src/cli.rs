// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! CLI argument parsing for bindery.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// bindery - replay which import shapes a test can mock
#[derive(Parser, Debug)]
#[command(name = "bindery")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (defaults to ./bindery.toml when present)
    #[arg(short, long, global = true, env = "BINDERY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Bind named imports live instead of capturing them
    #[arg(long, global = true)]
    pub live: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run entry points and report whether the mock was observed
    Run(RunArgs),

    /// List configured entry points
    #[command(alias = "ls")]
    Entries,

    /// Load every entry and print the module registry
    Graph(GraphArgs),

    /// Print the effective configuration as TOML
    Config,

    /// Start an interactive session
    Repl,
}

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Entries to run (all when omitted)
    pub entries: Vec<String>,

    /// Run without installing the stub
    #[arg(long)]
    pub no_mock: bool,

    /// Print reports as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Default)]
pub struct GraphArgs {
    /// Print the graph as JSON
    #[arg(long)]
    pub json: bool,
}
