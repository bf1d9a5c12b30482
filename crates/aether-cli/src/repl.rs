//! Interactive mode.
//!
//! Free text is sent as a prompt to the active session; lines starting with
//! `/` run a session command (`/undo`, `/pick 3`, ...). An open ```` ``` ````
//! fence continues the input on the next line, so a scoped question is typed
//! as the excerpt followed by the question after the closing fence.

use std::borrow::Cow::{self, Borrowed, Owned};

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::{Context, Editor, Helper};

use crate::app::App;
use crate::commands::{self, Command};
use crate::output;

const COMMANDS: &[&str] = &[
    "/new", "/list", "/recent", "/select", "/delete", "/image", "/undo", "/redo", "/show",
    "/preview", "/edit", "/copy", "/export", "/pick", "/help", "/quit",
];

/// A `/command` line parsed with the same definitions as the CLI.
#[derive(Parser, Debug)]
#[command(no_binary_name = true, disable_help_flag = true)]
struct ReplLine {
    #[command(subcommand)]
    command: Command,
}

/// Rustyline helper providing command completion, highlighting and hints.
#[derive(Clone)]
struct ReplHelper {
    commands: Vec<String>,
}

impl ReplHelper {
    fn new() -> Self {
        Self {
            commands: COMMANDS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl Helper for ReplHelper {}

impl Completer for ReplHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            let candidates: Vec<Pair> = self
                .commands
                .iter()
                .filter(|cmd| cmd.starts_with(line))
                .map(|cmd| Pair {
                    display: cmd.clone(),
                    replacement: cmd.clone(),
                })
                .collect();
            Ok((0, candidates))
        } else {
            Ok((0, vec![]))
        }
    }
}

impl Highlighter for ReplHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for ReplHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            self.commands
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for ReplHelper {
    /// Keeps reading lines while a code fence is open.
    fn validate(&self, ctx: &mut ValidationContext) -> rustyline::Result<ValidationResult> {
        if ctx.input().matches("```").count() % 2 == 1 {
            Ok(ValidationResult::Incomplete)
        } else {
            Ok(ValidationResult::Valid(None))
        }
    }
}

pub async fn run(app: &App) -> Result<()> {
    let mut rl = Editor::new()?;
    rl.set_helper(Some(ReplHelper::new()));

    println!("{}", "=== Aether REPL ===".bright_magenta().bold());
    println!(
        "{}",
        "Describe a component to generate it, '/help' for commands, '/quit' to exit.".bright_black()
    );
    println!();
    output::print_session(&app.sessions.active().await);

    loop {
        let name = app.sessions.active().await.name;
        match rl.readline(&format!("{} >> ", name)) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(&line);

                match trimmed {
                    "/quit" | "/exit" | "quit" | "exit" => {
                        println!("{}", "Goodbye!".bright_green());
                        break;
                    }
                    "/help" => print_help(),
                    _ => {
                        let command = match trimmed.strip_prefix('/') {
                            Some(rest) => match ReplLine::try_parse_from(rest.split_whitespace()) {
                                Ok(parsed) => parsed.command,
                                Err(e) => {
                                    eprintln!("{}", e.to_string().trim_end().yellow());
                                    continue;
                                }
                            },
                            None => Command::Prompt {
                                text: vec![line.clone()],
                                image: None,
                            },
                        };
                        if let Err(e) = commands::execute(app, command).await {
                            output::print_error(&e);
                        }
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type '/quit' to exit.".yellow());
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        }
    }

    Ok(())
}

fn print_help() {
    let rows = [
        ("<text>", "generate or refine the component"),
        ("```jsx|css <code> ``` <question>", "ask about a code excerpt"),
        ("/new, /list, /recent", "manage sessions"),
        ("/select <id>, /delete <id>", "switch or remove a session"),
        ("/image <path>, /image --clear", "attach or drop a reference image"),
        ("/undo, /redo", "move through code versions"),
        ("/show, /preview", "print the session or the preview expression"),
        ("/edit <jsx|css> <file>", "replace code from a file"),
        ("/copy <jsx|css>, /export [--out path]", "take the code out"),
        ("/pick [index] [--clear]", "list preview nodes or select one"),
    ];
    for (usage, help) in rows {
        println!("  {} {}", format!("{:<40}", usage).bright_cyan(), help.bright_black());
    }
}
