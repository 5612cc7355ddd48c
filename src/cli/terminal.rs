//! Plain-terminal rendering and approval prompts for the CLI.

use std::io::{self, BufRead, Write};

use crate::agent_loop::{ApprovalRequest, LoopCallbacks};
use crate::types::StreamChunk;

/// Callbacks that print to stdout/stderr and prompt on stdin.
pub fn terminal_callbacks(quiet: bool) -> LoopCallbacks {
    LoopCallbacks::new()
        .with_item_sink(move |chunk| print_chunk(&chunk, quiet))
        .with_blocking_approval(prompt_for_approval)
}

fn print_chunk(chunk: &StreamChunk, quiet: bool) {
    match chunk {
        StreamChunk::TextDelta { text } => {
            print!("{text}");
            let _ = io::stdout().flush();
        }
        _ if quiet => {}
        _ => eprintln!("\n{}", render_line(chunk)),
    }
}

/// How a non-text chunk is echoed outside quiet mode.
fn render_line(chunk: &StreamChunk) -> String {
    match chunk.shell_command() {
        Some(command) => format!("$ {command}"),
        None => render_json(chunk),
    }
}

fn render_json(chunk: &StreamChunk) -> String {
    serde_json::to_string(chunk).unwrap_or_else(|_| format!("{chunk:?}"))
}

/// Ask on stderr, read one line from stdin.
fn prompt_for_approval(request: &ApprovalRequest) -> bool {
    eprintln!("\nRun command: {}", request.command);
    eprint!("[y]es/[n]o ");
    let _ = io::stderr().flush();

    let mut answer = String::new();
    match io::stdin().lock().read_line(&mut answer) {
        Ok(_) => is_affirmative(&answer),
        Err(_) => false,
    }
}

/// `y`/`yes` in any case accepts; anything else declines.
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
