//! The interactive chat loop.
//!
//! Renders the restored conversation, offers starter prompts on a fresh
//! one, then alternates between reading input and driving the request
//! controller. A spinner stands in for the widget's typing indicator
//! while a send is in flight.

use std::time::Duration;

use console::style;

use chatlet_core::completion::CompletionProvider;
use chatlet_core::controller::{RequestController, SendOutcome};
use chatlet_core::starter::STARTER_PROMPTS;
use chatlet_types::turn::{Role, Turn};

use crate::commands::{self, ChatCommand};
use crate::input::{ChatInput, InputEvent};

/// Run the chat loop until the user exits.
pub async fn run<P: CompletionProvider>(
    controller: &RequestController<P>,
    endpoint: &str,
) -> anyhow::Result<()> {
    println!();
    println!("  {}", style("Chatlet demo").bold());
    println!("  {}", style(endpoint).dim());
    println!();

    // Render the restored conversation; a fresh one gets starter prompts.
    let is_fresh = {
        let store = controller.store();
        let store = store.lock().await;
        for turn in store.turns() {
            print_turn(turn);
        }
        store.len() <= 1
    };
    println!();
    if is_fresh {
        print_prompts();
    }
    println!("  {}", style("Type a message, or /help for commands.").dim());
    println!();

    let prompt = format!("  {} ", style("You >").green().bold());
    let (mut input, _writer) = ChatInput::new(prompt)
        .map_err(|e| anyhow::anyhow!("failed to initialize input: {e}"))?;

    loop {
        match input.read_line().await {
            InputEvent::Eof => {
                println!("\n  {}", style("Session ended.").dim());
                break;
            }
            InputEvent::Interrupted => {
                println!("\n  {}", style("Press Ctrl+D to exit, or keep chatting.").dim());
                continue;
            }
            InputEvent::Message(text) => {
                let text = text.trim();
                if text.is_empty() {
                    continue;
                }

                if let Some(cmd) = commands::parse(text) {
                    match cmd {
                        ChatCommand::Help => commands::print_help(),
                        ChatCommand::History => {
                            let store = controller.store();
                            let store = store.lock().await;
                            println!();
                            for turn in store.turns() {
                                print_turn(turn);
                            }
                            println!();
                        }
                        ChatCommand::Reset => {
                            controller.reset().await;
                            println!();
                            println!("  {}", style("Conversation reset.").dim());
                            let store = controller.store();
                            let store = store.lock().await;
                            for turn in store.turns() {
                                print_turn(turn);
                            }
                            println!();
                        }
                        ChatCommand::Prompts => print_prompts(),
                        ChatCommand::Prompt(n) => match STARTER_PROMPTS.get(n.wrapping_sub(1)) {
                            Some(prompt) => {
                                println!("  {} {}", style("You >").green().bold(), prompt);
                                send_and_render(controller, prompt).await;
                            }
                            None => {
                                println!(
                                    "\n  {} No such prompt. See /prompts.\n",
                                    style("?").yellow().bold()
                                );
                            }
                        },
                        ChatCommand::Exit => {
                            println!("\n  {}", style("Session ended.").dim());
                            break;
                        }
                        ChatCommand::Unknown(cmd_name) => {
                            println!(
                                "\n  {} Unknown command: {}. Type /help for available commands.\n",
                                style("?").yellow().bold(),
                                style(cmd_name).dim()
                            );
                        }
                    }
                    continue;
                }

                send_and_render(controller, text).await;
            }
        }
    }

    Ok(())
}

/// Submit one message and render the terminal outcome.
async fn send_and_render<P: CompletionProvider>(controller: &RequestController<P>, text: &str) {
    let spinner = indicatif::ProgressBar::new_spinner();
    spinner.set_style(
        indicatif::ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    spinner.set_message("thinking...");
    spinner.enable_steady_tick(Duration::from_millis(80));

    let outcome = controller.submit(text).await;
    spinner.finish_and_clear();

    match outcome {
        SendOutcome::Replied => {
            let store = controller.store();
            let store = store.lock().await;
            if let Some(turn) = store.turns().last() {
                println!();
                print_turn(turn);
                println!();
            }
        }
        SendOutcome::Failed => {
            let store = controller.store();
            let store = store.lock().await;
            if let Some(turn) = store.turns().last() {
                println!();
                print_turn(turn);
            }
            drop(store);
            if let Some(error) = controller.last_error().await {
                println!("  {}", style(error).red().dim());
            }
            println!();
        }
        SendOutcome::Cancelled => {
            println!("\n  {}\n", style("Request superseded.").dim());
        }
        SendOutcome::Ignored => {
            println!(
                "\n  {} Still waiting for a reply.\n",
                style("!").yellow().bold()
            );
        }
    }
}

fn print_turn(turn: &Turn) {
    match turn.role {
        Role::User => {
            println!("  {} {}", style("You >").green().bold(), turn.content);
        }
        Role::Assistant => {
            // A frozen placeholder renders as the ellipsis, never blank.
            let content = if turn.content.is_empty() {
                "…"
            } else {
                turn.content.as_str()
            };
            println!("  {} {}", style("Chatlet >").cyan().bold(), content);
        }
        Role::System => {
            println!("  {} {}", style("System >").dim(), turn.content);
        }
    }
}

fn print_prompts() {
    println!("  {}", style("Try one of these:").bold());
    for (i, prompt) in STARTER_PROMPTS.iter().enumerate() {
        println!(
            "  {} {}",
            style(format!("/prompt {}", i + 1)).cyan(),
            prompt
        );
    }
    println!();
}
