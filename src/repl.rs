// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Interactive REPL for poking at a module registry.
//!
//! The session owns one loader over the configured entries. Modules can be
//! required, imported in any shape, mocked and called, and the registry
//! inspected between steps.

use bindery_demo::BinderyConfig;
use bindery_demo::entry::build_loader;
use bindery_loader::{
    Binding, ImportStyle, MockGuard, ModuleId, ModuleLoader, ObjectRef, Value, spy_on,
};
use owo_colors::OwoColorize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Config, Editor, Helper};
use std::path::PathBuf;

/// REPL configuration constants
const HISTORY_FILE: &str = ".bindery_history";
const MAX_HISTORY_SIZE: usize = 1000;

/// REPL commands that can be executed with a dot prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplCommand {
    Help,
    Exit,
    Clear,
    Version,
    Require,
    Import,
    Mock,
    Restore,
    Call,
    Registry,
    Reset,
}

impl ReplCommand {
    /// Parse a REPL command from input string
    pub fn parse(input: &str) -> Option<(Self, Option<&str>)> {
        let input = input.trim();
        let rest = input.strip_prefix('.')?;

        let mut parts = rest.splitn(2, char::is_whitespace);
        let cmd = parts.next()?.to_lowercase();
        let arg = parts.next().map(str::trim).filter(|a| !a.is_empty());

        let command = match cmd.as_str() {
            "help" | "h" | "?" => ReplCommand::Help,
            "exit" | "quit" | "q" => ReplCommand::Exit,
            "clear" | "cls" => ReplCommand::Clear,
            "version" | "v" => ReplCommand::Version,
            "require" | "r" => ReplCommand::Require,
            "import" | "i" => ReplCommand::Import,
            "mock" | "m" => ReplCommand::Mock,
            "restore" => ReplCommand::Restore,
            "call" | "c" => ReplCommand::Call,
            "registry" | "ls" => ReplCommand::Registry,
            "reset" => ReplCommand::Reset,
            _ => return None,
        };
        Some((command, arg))
    }

    /// Get all available commands for help/completion
    pub fn all_commands() -> &'static [(&'static str, &'static str)] {
        &[
            (".help", "Show this help message"),
            (".exit", "Exit the REPL"),
            (".clear", "Clear the screen"),
            (".version", "Show version information"),
            (".require <id>", "Load a module and show its exports"),
            (".import <id> <style>", "Bind a module as *, default or {name}"),
            (".mock <id> <path> <json>", "Stub <path> to return <json>, e.g. default.fetchData []"),
            (".restore", "Undo every mock"),
            (".call <id> <name>", "Call an exported function"),
            (".registry", "List registered modules"),
            (".reset", "Start over with an empty registry"),
        ]
    }
}

/// Split `.mock` arguments into module id, property path and JSON payload
fn parse_mock_args(arg: &str) -> Option<(&str, &str, &str)> {
    let mut parts = arg.trim().splitn(3, char::is_whitespace);
    let id = parts.next()?;
    let path = parts.next()?;
    let json = parts.next()?.trim();
    if json.is_empty() {
        return None;
    }
    Some((id, path, json))
}

/// Split two whitespace-separated arguments
fn parse_pair(arg: &str) -> Option<(&str, &str)> {
    let (first, second) = arg.trim().split_once(char::is_whitespace)?;
    let second = second.trim();
    if second.is_empty() {
        return None;
    }
    Some((first, second))
}

/// Walk `path` ("a.b.c") from `root`, returning the object owning the last
/// segment and that segment's name
fn resolve_path(root: &ObjectRef, path: &str) -> Result<(ObjectRef, String), String> {
    let mut segments: Vec<&str> = path.split('.').collect();
    let last = segments
        .pop()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("invalid property path '{}'", path))?;

    let mut current = root.clone();
    for segment in segments {
        current = match current.get(segment) {
            Some(Value::Object(obj)) => obj,
            _ => return Err(format!("'{}' is not an object", segment)),
        };
    }
    Ok((current, last.to_string()))
}

/// Helper struct for rustyline that provides completion and hints
struct BinderyHelper {
    /// Commands and module ids for completion
    words: Vec<String>,
}

impl BinderyHelper {
    fn new(module_ids: &[ModuleId]) -> Self {
        let mut words: Vec<String> = ReplCommand::all_commands()
            .iter()
            .filter_map(|(cmd, _)| cmd.split_whitespace().next())
            .map(String::from)
            .collect();
        words.extend(module_ids.iter().map(ToString::to_string));
        Self { words }
    }
}

impl Completer for BinderyHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        // Find the start of the current word
        let start = line[..pos]
            .rfind(char::is_whitespace)
            .map(|i| i + 1)
            .unwrap_or(0);

        let word = &line[start..pos];
        if word.is_empty() {
            return Ok((pos, vec![]));
        }

        let matches: Vec<Pair> = self
            .words
            .iter()
            .filter(|w| w.starts_with(word))
            .map(|w| Pair {
                display: w.clone(),
                replacement: w[word.len()..].to_string(),
            })
            .collect();

        Ok((pos, matches))
    }
}

impl Hinter for BinderyHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &rustyline::Context<'_>) -> Option<Self::Hint> {
        if pos < line.len() || !line.starts_with('.') || line.contains(char::is_whitespace) {
            return None;
        }

        ReplCommand::all_commands()
            .iter()
            .map(|(cmd, _)| *cmd)
            .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
            .map(|cmd| cmd[line.len()..].to_string().dimmed().to_string())
    }
}

impl Highlighter for BinderyHelper {}

impl Validator for BinderyHelper {}

impl Helper for BinderyHelper {}

/// The interactive bindery session
pub struct Repl {
    config: BinderyConfig,
    loader: ModuleLoader,
    mocks: Vec<MockGuard>,
    editor: Editor<BinderyHelper, DefaultHistory>,
    history_path: PathBuf,
}

impl Repl {
    /// Create a new REPL instance
    pub fn new(config: BinderyConfig) -> anyhow::Result<Self> {
        let loader = build_loader(&config)?;

        let rl_config = Config::builder()
            .history_ignore_dups(true)?
            .history_ignore_space(true)
            .max_history_size(MAX_HISTORY_SIZE)?
            .auto_add_history(true)
            .build();

        let mut editor = Editor::with_config(rl_config)?;
        editor.set_helper(Some(BinderyHelper::new(&loader.table().ids())));

        // Determine history file path
        let history_path = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("bindery")
            .join(HISTORY_FILE);

        // Create parent directory if it doesn't exist
        if let Some(parent) = history_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }

        // Load history
        let _ = editor.load_history(&history_path);

        Ok(Self {
            config,
            loader,
            mocks: Vec::new(),
            editor,
            history_path,
        })
    }

    /// Run the REPL main loop
    pub fn run(&mut self) -> rustyline::Result<()> {
        self.print_banner();

        loop {
            let prompt = format!("{} ", "bindery>".bright_green().bold());

            match self.editor.readline(&prompt) {
                Ok(line) => {
                    let trimmed = line.trim();

                    if trimmed.is_empty() {
                        continue;
                    }

                    match ReplCommand::parse(trimmed) {
                        Some((cmd, arg)) => match self.execute_command(cmd, arg) {
                            CommandResult::Continue => continue,
                            CommandResult::Exit => break,
                        },
                        None => eprintln!(
                            "{}: unknown input, type {} for commands",
                            "Error".red().bold(),
                            ".help".cyan()
                        ),
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("{}", "^C".dimmed());
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("{}", "^D".dimmed());
                    break;
                }
                Err(err) => {
                    eprintln!("{}: {:?}", "Error".red().bold(), err);
                    break;
                }
            }
        }

        // Save history
        let _ = self.editor.save_history(&self.history_path);

        self.restore_mocks();
        Ok(())
    }

    fn print_banner(&self) {
        let version = env!("CARGO_PKG_VERSION");
        println!();
        println!(
            "  {} {} {}",
            "bindery".bright_cyan().bold(),
            "v".dimmed(),
            version.bright_yellow()
        );
        println!(
            "  {} {}",
            "named imports:".dimmed(),
            format!("{:?}", self.loader.named_binding()).to_lowercase().yellow()
        );
        println!(
            "  {} {} {}",
            "Type".dimmed(),
            ".help".cyan(),
            "for available commands".dimmed()
        );
        println!();
    }

    fn execute_command(&mut self, cmd: ReplCommand, arg: Option<&str>) -> CommandResult {
        let outcome = match cmd {
            ReplCommand::Help => {
                self.print_help();
                Ok(())
            }
            ReplCommand::Exit => return CommandResult::Exit,
            ReplCommand::Clear => {
                print!("\x1B[2J\x1B[H");
                Ok(())
            }
            ReplCommand::Version => {
                println!(
                    "{}: {}",
                    "bindery".bright_cyan().bold(),
                    env!("CARGO_PKG_VERSION").yellow()
                );
                println!("{}: {}", "loader".dimmed(), bindery_loader::VERSION);
                Ok(())
            }
            ReplCommand::Require => self.require(arg),
            ReplCommand::Import => self.import(arg),
            ReplCommand::Mock => self.mock(arg),
            ReplCommand::Restore => {
                let count = self.restore_mocks();
                println!("{} {} mock(s)", "restored".green(), count);
                Ok(())
            }
            ReplCommand::Call => self.call(arg),
            ReplCommand::Registry => {
                self.print_registry();
                Ok(())
            }
            ReplCommand::Reset => self.reset(),
        };

        if let Err(message) = outcome {
            eprintln!("{}: {}", "Error".red().bold(), message);
        }
        CommandResult::Continue
    }

    fn require(&mut self, arg: Option<&str>) -> Result<(), String> {
        let id = arg.ok_or(".require requires a module id")?;
        let exports = self.loader.require(id).map_err(|e| e.to_string())?;
        println!("{}", format_value(&exports.to_value()));
        Ok(())
    }

    fn import(&mut self, arg: Option<&str>) -> Result<(), String> {
        let (id, style) = arg
            .and_then(parse_pair)
            .ok_or(".import requires a module id and a style")?;
        let style = style.parse::<ImportStyle>().map_err(|e| e.to_string())?;
        let binding = self.loader.import(id, &style).map_err(|e| e.to_string())?;

        let kind = match &binding {
            Binding::Namespace(_) => "namespace",
            Binding::Named(_) => "named",
            Binding::Default(_) => "default",
        };
        println!("{} {}", format!("[{}]", kind).dimmed(), format_value(&binding.value()));
        Ok(())
    }

    fn mock(&mut self, arg: Option<&str>) -> Result<(), String> {
        let (id, path, json) = arg
            .and_then(parse_mock_args)
            .ok_or(".mock requires a module id, a property path and a JSON value")?;
        let json: serde_json::Value =
            serde_json::from_str(json).map_err(|e| format!("invalid JSON: {}", e))?;

        let exports = self.loader.require(id).map_err(|e| e.to_string())?;
        let (target, name) = resolve_path(exports.as_object(), path)?;
        let stub = Value::returning(format!("{}Stub", name), Value::from(&json));
        let guard = spy_on(&target, &name, stub).map_err(|e| e.to_string())?;

        println!("{} {}.{} => {}", "mocked".green(), id, path, json);
        self.mocks.push(guard);
        Ok(())
    }

    fn call(&mut self, arg: Option<&str>) -> Result<(), String> {
        let (id, name) = arg
            .and_then(parse_pair)
            .ok_or(".call requires a module id and an export name")?;
        let exports = self.loader.require(id).map_err(|e| e.to_string())?;
        let (target, name) = resolve_path(exports.as_object(), name)?;
        let result = target.call_method(&name, &[]).map_err(|e| e.to_string())?;
        println!("{}", format_value(&result));
        Ok(())
    }

    /// Restore newest first so stacked mocks on one property unwind in order
    fn restore_mocks(&mut self) -> usize {
        let count = self.mocks.len();
        while let Some(mut guard) = self.mocks.pop() {
            guard.restore();
        }
        count
    }

    fn reset(&mut self) -> Result<(), String> {
        self.restore_mocks();
        self.loader = build_loader(&self.config).map_err(|e| e.to_string())?;
        println!("{}", "registry cleared".green());
        Ok(())
    }

    fn print_registry(&self) {
        let registry = self.loader.registry();
        if registry.is_empty() {
            println!("{}", "(empty)".dimmed());
            return;
        }
        for id in registry.ids() {
            if let Some(record) = registry.get(&id) {
                let state = if record.is_initialized() {
                    "initialized".green().to_string()
                } else {
                    "uninitialized".yellow().to_string()
                };
                println!(
                    "  {:24} {:14} {}",
                    id.to_string().white().bold(),
                    state,
                    record.exports.keys().join(", ").dimmed()
                );
            }
        }
    }

    fn print_help(&self) {
        println!();
        println!("{}", "REPL Commands:".white().bold());
        println!();

        for (cmd, desc) in ReplCommand::all_commands() {
            println!("  {:28} {}", cmd.cyan(), desc.dimmed());
        }

        println!();
        println!("{}", "Keyboard Shortcuts:".white().bold());
        println!();
        println!("  {:28} {}", "Ctrl+C".yellow(), "Cancel current input".dimmed());
        println!("  {:28} {}", "Ctrl+D".yellow(), "Exit REPL".dimmed());
        println!("  {:28} {}", "Tab".yellow(), "Autocomplete".dimmed());
        println!();
    }
}

/// Result of executing a REPL command
enum CommandResult {
    Continue,
    Exit,
}

/// Format a value for display with syntax coloring
fn format_value(value: &Value) -> String {
    match value {
        Value::Undefined => "undefined".blue().dimmed().to_string(),
        Value::Null => "null".blue().to_string(),
        Value::Boolean(b) => b.to_string().yellow().to_string(),
        Value::Number(n) => n.to_string().yellow().to_string(),
        Value::String(s) => format!("'{}'", s).green().to_string(),
        Value::Function(_) => value.to_string().magenta().to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string().cyan().to_string(),
    }
}
