//! Slash command parsing for the chat loop.
//!
//! Commands start with `/` and provide in-chat controls for the session:
//! help, transcript display, starter prompts, and reset.

use console::style;

/// Available slash commands in the chat loop.
#[derive(Debug, PartialEq)]
pub enum ChatCommand {
    /// Show available commands.
    Help,
    /// Show the full conversation transcript.
    History,
    /// Reset the conversation to a fresh welcome turn.
    Reset,
    /// List the starter prompts.
    Prompts,
    /// Send starter prompt number `n` (1-based).
    Prompt(usize),
    /// Exit the chat session.
    Exit,
    /// Unknown command.
    Unknown(String),
}

/// Parse user input as a slash command.
///
/// Returns `None` if the input doesn't start with `/`.
pub fn parse(input: &str) -> Option<ChatCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let parts: Vec<&str> = trimmed.splitn(2, ' ').collect();
    let cmd = parts[0].to_lowercase();
    let arg = parts.get(1).map(|s| s.trim());

    match cmd.as_str() {
        "/help" | "/h" | "/?" => Some(ChatCommand::Help),
        "/history" => Some(ChatCommand::History),
        "/reset" | "/new" => Some(ChatCommand::Reset),
        "/prompts" => Some(ChatCommand::Prompts),
        "/prompt" | "/p" => match arg.and_then(|a| a.parse::<usize>().ok()) {
            Some(n) => Some(ChatCommand::Prompt(n)),
            None => Some(ChatCommand::Unknown(
                "/prompt requires a number (see /prompts)".to_string(),
            )),
        },
        "/exit" | "/quit" | "/q" => Some(ChatCommand::Exit),
        other => Some(ChatCommand::Unknown(other.to_string())),
    }
}

/// Print the help text listing all available commands.
pub fn print_help() {
    println!();
    println!("  {}", style("Available commands:").bold());
    println!();
    println!("  {}    {}", style("/help").cyan(), "Show this help message");
    println!("  {} {}", style("/history").cyan(), "Show the conversation so far");
    println!("  {}   {}", style("/reset").cyan(), "Start over with a fresh conversation");
    println!("  {} {}", style("/prompts").cyan(), "List the starter prompts");
    println!("  {} {}", style("/prompt n").cyan(), "Send starter prompt number n");
    println!("  {}    {}", style("/exit").cyan(), "End the session");
    println!();
    println!("  {}", style("Ctrl+D to exit").dim());
    println!();
}
