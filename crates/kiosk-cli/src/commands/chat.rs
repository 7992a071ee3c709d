//! Interactive chat REPL.

use std::borrow::Cow::{self, Borrowed, Owned};
use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};

use kiosk_application::ConversationService;

use crate::context::AppContext;
use crate::render::TerminalChatView;

const COMMANDS: &[&str] = &["/reset", "/model", "/quick", "/check", "/help"];

/// A parsed REPL line.
#[derive(Debug, PartialEq)]
enum ReplInput<'a> {
    Empty,
    Quit,
    Help,
    Reset,
    ShowModel,
    SetModel(&'a str),
    ListQuick,
    /// 1-based index as typed.
    Quick(usize),
    Check,
    Unknown(&'a str),
    Message(&'a str),
}

fn parse_input(line: &str) -> ReplInput<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return ReplInput::Empty;
    }
    if trimmed == "quit" || trimmed == "exit" {
        return ReplInput::Quit;
    }
    if !trimmed.starts_with('/') {
        return ReplInput::Message(trimmed);
    }

    let (command, arg) = match trimmed.split_once(char::is_whitespace) {
        Some((command, arg)) => (command, arg.trim()),
        None => (trimmed, ""),
    };
    match (command, arg) {
        ("/help", _) => ReplInput::Help,
        ("/reset", _) => ReplInput::Reset,
        ("/check", _) => ReplInput::Check,
        ("/model", "") => ReplInput::ShowModel,
        ("/model", name) => ReplInput::SetModel(name),
        ("/quick", "") => ReplInput::ListQuick,
        ("/quick", n) => match n.parse::<usize>() {
            Ok(n) if n > 0 => ReplInput::Quick(n),
            _ => ReplInput::Unknown(trimmed),
        },
        _ => ReplInput::Unknown(trimmed),
    }
}

/// Completions for the text left of the cursor.
///
/// Slash commands complete by prefix; after `/quick ` the configured
/// prompt numbers complete. Returns the replacement start and candidates.
fn completions(line: &str, quick_count: usize) -> (usize, Vec<String>) {
    if let Some(typed) = line.strip_prefix("/quick ") {
        let typed = typed.trim_start();
        let start = line.len() - typed.len();
        let numbers: Vec<String> = (1..=quick_count)
            .map(|n| n.to_string())
            .filter(|n| n.starts_with(typed))
            .collect();
        return (start, numbers);
    }
    if line.starts_with('/') && !line.contains(char::is_whitespace) {
        let commands: Vec<String> = COMMANDS
            .iter()
            .filter(|command| command.starts_with(line))
            .map(|command| command.to_string())
            .collect();
        return (0, commands);
    }
    (0, Vec::new())
}

/// Rustyline helper: command and quick-prompt completion, hints, and
/// highlighting of recognised commands.
struct CliHelper {
    quick_count: usize,
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let (start, candidates) = completions(&line[..pos], self.quick_count);
        let pairs = candidates
            .into_iter()
            .map(|candidate| Pair {
                display: candidate.clone(),
                replacement: candidate,
            })
            .collect();
        Ok((start, pairs))
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        let command = line.split_whitespace().next().unwrap_or_default();
        if COMMANDS.contains(&command) {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, line: &str, _pos: usize, _forced: bool) -> bool {
        line.starts_with('/')
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let typed = &line[..pos];
        let (start, candidates) = completions(typed, self.quick_count);
        let prefix = &typed[start..];
        match candidates.as_slice() {
            [only] if only.len() > prefix.len() => Some(only[prefix.len()..].to_string()),
            _ => None,
        }
    }
}

// Required by `Helper`; every line is accepted as typed.
impl Validator for CliHelper {}

fn print_help() {
    println!("{}", "Commands:".bright_black());
    println!("{}", "  /reset         forget the conversation".bright_black());
    println!("{}", "  /model [name]  show or switch the model".bright_black());
    println!("{}", "  /quick [N]     list quick questions or send number N".bright_black());
    println!("{}", "  /check         test the API connection".bright_black());
    println!("{}", "  quit           leave".bright_black());
}

async fn check_connection(service: &ConversationService) {
    if service.check_connection().await {
        println!("{}", "API connection OK".green());
    } else {
        println!(
            "{}",
            "API connection failed. Check the API key and base URL.".yellow()
        );
    }
}

/// Runs the chat REPL until `quit`, Ctrl-D or a terminal error.
pub async fn run(ctx: &AppContext) -> Result<()> {
    let service = ctx.conversation_service()?;
    let view = Arc::new(TerminalChatView::new(service.quick_prompts().to_vec()));
    service.subscribe(view);

    println!("{}", "=== Kiosk Assistant ===".bright_magenta().bold());
    println!(
        "{}",
        format!("Model: {}. Type /help for commands, 'quit' to exit.", service.current_model())
            .bright_black()
    );
    println!();

    service.hydrate();
    check_connection(&service).await;

    let mut rl = Editor::new()?;
    rl.set_helper(Some(CliHelper {
        quick_count: service.quick_prompts().len(),
    }));

    loop {
        let line = match rl.readline(">> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "Goodbye!".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        };

        let input = parse_input(&line);
        if !matches!(input, ReplInput::Empty) {
            let _ = rl.add_history_entry(line.as_str());
        }

        match input {
            ReplInput::Empty => {}
            ReplInput::Quit => {
                println!("{}", "Goodbye!".bright_green());
                break;
            }
            ReplInput::Help => print_help(),
            ReplInput::Reset => service.reset(),
            ReplInput::ShowModel => {
                println!("{}", format!("Model: {}", service.current_model()).bright_black());
            }
            ReplInput::SetModel(name) => {
                service.set_model(name);
                println!("{}", format!("Model: {}", service.current_model()).bright_black());
            }
            ReplInput::ListQuick => {
                if service.quick_prompts().is_empty() {
                    println!("{}", "No quick questions configured.".bright_black());
                }
                for (i, prompt) in service.quick_prompts().iter().enumerate() {
                    println!("  {}", format!("{}. {}", i + 1, prompt).bright_black());
                }
            }
            ReplInput::Quick(n) => {
                service.submit_quick(n - 1).await;
            }
            ReplInput::Check => check_connection(&service).await,
            ReplInput::Unknown(command) => {
                println!("{}", format!("Unknown command: {}", command).bright_black());
            }
            ReplInput::Message(text) => {
                service.submit(text).await;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_a_message() {
        assert_eq!(parse_input("  where is my order? "), ReplInput::Message("where is my order?"));
        assert_eq!(parse_input("   "), ReplInput::Empty);
        assert_eq!(parse_input("exit"), ReplInput::Quit);
    }

    #[test]
    fn test_model_command() {
        assert_eq!(parse_input("/model"), ReplInput::ShowModel);
        assert_eq!(
            parse_input("/model  openai/gpt-4o-mini "),
            ReplInput::SetModel("openai/gpt-4o-mini")
        );
    }

    #[test]
    fn test_quick_command_is_one_based() {
        assert_eq!(parse_input("/quick"), ReplInput::ListQuick);
        assert_eq!(parse_input("/quick 2"), ReplInput::Quick(2));
        assert_eq!(parse_input("/quick 0"), ReplInput::Unknown("/quick 0"));
        assert_eq!(parse_input("/quick two"), ReplInput::Unknown("/quick two"));
    }

    #[test]
    fn test_completes_commands_by_prefix() {
        assert_eq!(completions("/q", 0), (0, vec!["/quick".to_string()]));
        assert_eq!(completions("/", 0).1.len(), COMMANDS.len());
        assert_eq!(completions("hello", 3), (0, Vec::new()));
    }

    #[test]
    fn test_completes_quick_prompt_numbers() {
        let (start, numbers) = completions("/quick ", 3);
        assert_eq!(start, 7);
        assert_eq!(numbers, vec!["1", "2", "3"]);

        let (_, numbers) = completions("/quick 1", 12);
        assert_eq!(numbers, vec!["1", "10", "11", "12"]);
        assert!(completions("/quick ", 0).1.is_empty());
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(parse_input("/dance"), ReplInput::Unknown("/dance"));
        assert_eq!(parse_input("/reset"), ReplInput::Reset);
    }
}
