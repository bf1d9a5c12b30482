//! Terminal rendering.

use aether_application::SubmissionOutcome;
use aether_core::error::AetherError;
use aether_core::notification::{Notification, Notifier};
use aether_core::selection::{PreviewDom, ROOT};
use aether_core::session::{Message, MessageRole, Session};
use colored::Colorize;

/// Prints notifications to stderr, like a toast.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        tracing::debug!("notify: {} - {}", notification.title, notification.description);
        if notification.is_destructive() {
            eprintln!(
                "{} {}",
                notification.title.red().bold(),
                notification.description.red()
            );
        } else {
            eprintln!(
                "{} {}",
                notification.title.bright_green().bold(),
                notification.description.bright_black()
            );
        }
    }
}

/// Guard rejections are notices, everything else is an error.
pub fn print_error(error: &anyhow::Error) {
    match error.downcast_ref::<AetherError>() {
        Some(e) if e.is_guard_rejection() => eprintln!("{}", e.to_string().yellow()),
        _ => eprintln!("{}", format!("Error: {:#}", error).red()),
    }
}

pub fn print_sessions(sessions: &[Session], active_id: &str) {
    for session in sessions {
        let marker = if session.id == active_id { "*" } else { " " };
        let line = format!(
            "{} {}  {}  {}",
            marker,
            session.id,
            session.created_at.format("%Y-%m-%d %H:%M"),
            session.name
        );
        if session.id == active_id {
            println!("{}", line.bright_cyan());
        } else {
            println!("{}", line);
        }
    }
}

pub fn print_message(message: &Message) {
    match message.role {
        MessageRole::User => {
            println!("{}", format!("> {}", message.content).green());
            if message.image_url.is_some() {
                println!("{}", "  [image attached]".bright_black());
            }
        }
        MessageRole::Assistant => {
            for line in message.content.lines() {
                println!("{}", line.bright_blue());
            }
        }
        MessageRole::System => println!("{}", message.content.bright_black()),
    }
}

pub fn print_session(session: &Session) {
    println!("{}", format!("=== {} ===", session.name).bright_magenta().bold());
    println!(
        "{}",
        format!(
            "version {}/{}{}{}",
            session.current_version + 1,
            session.code_history.len(),
            if session.uploaded_image.is_some() {
                "  [image pending]"
            } else {
                ""
            },
            session
                .selected_element_id
                .as_deref()
                .map(|id| format!("  [selected {id}]"))
                .unwrap_or_default()
        )
        .bright_black()
    );
    println!();
    for message in &session.chat_history {
        print_message(message);
    }
    println!();
    println!("{}", "--- JSX ---".yellow());
    println!("{}", session.jsx_code);
    println!("{}", "--- CSS ---".yellow());
    println!("{}", session.css_code);
}

pub fn print_outcome(outcome: &SubmissionOutcome, session: Option<&Session>) {
    match outcome {
        SubmissionOutcome::Discarded => {
            println!("{}", "The session was deleted; response discarded.".yellow())
        }
        SubmissionOutcome::Failed(reason) => {
            println!("{}", format!("Request failed: {reason}").red())
        }
        _ => {
            if let Some(message) = session.and_then(|s| s.chat_history.last()) {
                print_message(message);
            }
        }
    }
}

/// Prints the preview tree with the node indices `pick` accepts.
pub fn print_dom(dom: &PreviewDom) {
    print_node(dom, ROOT, 0);
}

fn print_node(dom: &PreviewDom, id: usize, depth: usize) {
    let Some(node) = dom.node(id) else {
        return;
    };
    let label = match node.aether_id() {
        Some(aether_id) => format!("{:>3} {}<{}> #{}", id, "  ".repeat(depth), node.tag, aether_id),
        None => format!("{:>3} {}<{}>", id, "  ".repeat(depth), node.tag),
    };
    if node.highlighted {
        println!("{}", label.black().on_bright_yellow());
    } else {
        println!("{}", label);
    }
    for child in &node.children {
        print_node(dom, *child, depth + 1);
    }
}
