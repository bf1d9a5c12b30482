//! Session commands shared by the one-shot CLI and the REPL.

use crate::app::App;
use crate::output;
use aether_application::{CodeKind, CopyOutcome};
use aether_application::export::EXPORT_FILE_NAME;
use aether_infrastructure::image_loader::load_image_data_uri;
use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start a new session and make it active
    New,
    /// List all sessions
    List,
    /// Show the five most recently created sessions
    Recent,
    /// Switch the active session
    Select { id: String },
    /// Delete a session
    Delete { id: String },
    /// Send a prompt to the active session
    Prompt {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
        /// Reference image to attach to this prompt
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Attach a reference image to the next prompt
    Image {
        #[arg(required_unless_present = "clear")]
        path: Option<PathBuf>,
        /// Drop the pending image instead
        #[arg(long, conflicts_with = "path")]
        clear: bool,
    },
    /// Step back one code version
    Undo,
    /// Step forward one code version
    Redo,
    /// Show the active session's transcript and code
    Show,
    /// Print the renderable preview expression
    Preview,
    /// Replace the JSX or CSS with the contents of FILE
    Edit { kind: CodeKind, file: PathBuf },
    /// Copy the JSX or CSS to the clipboard (printed when no clipboard is available)
    Copy { kind: CodeKind },
    /// Write component.jsx and styles.css into a zip archive
    Export {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Select a preview element by node index; without arguments, list nodes
    Pick {
        node: Option<usize>,
        #[arg(long, conflicts_with = "node")]
        clear: bool,
    },
}

pub async fn execute(app: &App, command: Command) -> Result<()> {
    let sessions = &app.sessions;
    match command {
        Command::New => {
            let session = sessions.create_session().await;
            println!("{} {} ({})", "Created".green(), session.name, session.id);
        }
        Command::List => {
            output::print_sessions(&sessions.sessions().await, &sessions.active_id().await);
        }
        Command::Recent => {
            output::print_sessions(&sessions.recent_sessions().await, &sessions.active_id().await);
        }
        Command::Select { id } => {
            sessions.select_session(&id).await?;
            println!("{} {}", "Active:".green(), sessions.active().await.name);
        }
        Command::Delete { id } => {
            let removed = sessions.delete_session(&id).await?;
            println!("{} {}", "Deleted".green(), removed.name);
        }
        Command::Prompt { text, image } => {
            let orchestrator = app.orchestrator()?;
            if let Some(path) = image {
                sessions.set_image(load_image_data_uri(&path).await?).await?;
            }
            let prompt = text.join(" ");
            let session_id = sessions.active_id().await;
            println!("{}", "Thinking...".bright_black());
            let outcome = orchestrator.submit(&prompt).await?;
            output::print_outcome(&outcome, sessions.session(&session_id).await.as_ref());
        }
        Command::Image { path, clear } => {
            if clear {
                if sessions.clear_image().await? {
                    println!("{}", "Image cleared.".green());
                } else {
                    println!("{}", "No image pending.".bright_black());
                }
            } else if let Some(path) = path {
                sessions.set_image(load_image_data_uri(&path).await?).await?;
                println!("{} {}", "Image attached:".green(), path.display());
            }
        }
        Command::Undo => {
            if !sessions.undo().await? {
                println!("{}", "Already at the oldest version.".bright_black());
            }
            print_version(app).await;
        }
        Command::Redo => {
            if !sessions.redo().await? {
                println!("{}", "Already at the newest version.".bright_black());
            }
            print_version(app).await;
        }
        Command::Show => output::print_session(&sessions.active().await),
        Command::Preview => println!("{}", sessions.prepared_preview().await),
        Command::Edit { kind, file } => {
            let code = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            sessions.edit_code(kind, code).await?;
            println!("{} {}", "Updated".green(), kind);
            print_version(app).await;
        }
        Command::Copy { kind } => {
            if let CopyOutcome::Unavailable(code) = sessions.copy_code(kind).await {
                println!("{}", code);
            }
        }
        Command::Export { out } => {
            let path = out.unwrap_or_else(|| PathBuf::from(EXPORT_FILE_NAME));
            sessions.export_zip(&path).await?;
        }
        Command::Pick { node, clear } => {
            if clear {
                sessions.select_element(None).await?;
                println!("{}", "Selection cleared.".green());
            } else if let Some(node) = node {
                match sessions.pick_element(node).await? {
                    Some(id) => println!("{} {}", "Selected".green(), id),
                    None => println!("{}", "No tagged element there; selection cleared.".yellow()),
                }
            } else {
                output::print_dom(&sessions.preview_dom().await);
            }
        }
    }
    Ok(())
}

async fn print_version(app: &App) {
    let session = app.sessions.active().await;
    println!(
        "{}",
        format!(
            "version {}/{}",
            session.current_version + 1,
            session.code_history.len()
        )
        .bright_black()
    );
}
