// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! bindery - replays how bundler-generated module loading decides which
//! imports a test can mock.
//!
//! This is the main entry point for the bindery CLI/REPL.

mod cli;
mod repl;

use anyhow::Context;
use bindery_demo::{BinderyConfig, EntryReport, ModuleSummary, module_graph, run_entries};
use bindery_loader::NamedBindingMode;
use clap::Parser;
use cli::{Cli, Commands, GraphArgs, RunArgs};
use owo_colors::OwoColorize;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "bindery=debug,bindery_loader=debug,bindery_demo=debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<ExitCode> {
    let mut config =
        BinderyConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if cli.live {
        config.loader.named_binding = NamedBindingMode::Live;
    }

    match &cli.command {
        Some(Commands::Run(args)) => run_command(&config, args),
        Some(Commands::Entries) => {
            list_entries(&config)?;
            Ok(ExitCode::SUCCESS)
        }
        Some(Commands::Graph(args)) => {
            graph_command(&config, args)?;
            Ok(ExitCode::SUCCESS)
        }
        Some(Commands::Config) => {
            print!("{}", config.to_toml().context("Failed to render configuration")?);
            Ok(ExitCode::SUCCESS)
        }
        Some(Commands::Repl) => {
            let mut repl = repl::Repl::new(config).context("Failed to initialize REPL")?;
            repl.run().context("REPL error")?;
            Ok(ExitCode::SUCCESS)
        }
        None => run_command(&config, &RunArgs::default()),
    }
}

/// Run entries and print a report per entry
fn run_command(config: &BinderyConfig, args: &RunArgs) -> anyhow::Result<ExitCode> {
    let reports = run_entries(config, &args.entries, !args.no_mock)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(ExitCode::SUCCESS);
    }

    println!(
        "{} named imports: {}",
        "bindery".bright_cyan().bold(),
        format!("{:?}", config.loader.named_binding).to_lowercase().yellow()
    );
    println!();
    for report in &reports {
        print_report(report);
    }
    Ok(ExitCode::SUCCESS)
}

fn print_report(report: &EntryReport) {
    let verdict = if !report.mocked {
        "not mocked".dimmed().to_string()
    } else if report.mock_observed() {
        "mock observed".green().bold().to_string()
    } else {
        "mock ignored".red().bold().to_string()
    };

    println!(
        "  {:12} {:10} {}",
        report.entry.white().bold(),
        report.style.cyan(),
        verdict
    );
    println!("  {:12} {} {}", "", "loadUsers() =>".dimmed(), report.result);
}

fn list_entries(config: &BinderyConfig) -> anyhow::Result<()> {
    for entry in config.entry_points()? {
        println!(
            "  {:12} {:24} {}",
            entry.name.white().bold(),
            entry.module.to_string().dimmed(),
            entry.style.to_string().cyan()
        );
    }
    Ok(())
}

fn graph_command(config: &BinderyConfig, args: &GraphArgs) -> anyhow::Result<()> {
    let graph = module_graph(config)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&graph)?);
        return Ok(());
    }

    for module in &graph {
        print_module(module);
    }
    Ok(())
}

fn print_module(module: &ModuleSummary) {
    let state = if module.initialized {
        "initialized".green().to_string()
    } else {
        "uninitialized".yellow().to_string()
    };
    println!("{} [{}]", module.id.white().bold(), state);
    if let Some(parent) = &module.parent {
        println!("  {} {}", "parent:".dimmed(), parent);
    }
    if !module.children.is_empty() {
        println!("  {} {}", "requires:".dimmed(), module.children.join(", "));
    }
    println!("  {} {}", "exports:".dimmed(), module.exports.join(", "));
}
