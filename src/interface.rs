use crate::api::{self, DispatchError};
use crate::config::AppConfig;
use crate::logger::{Logger, SessionMetrics};
use crate::session::{ChatMessage, ChatSession, Role};
use crate::utils::preview;
use colored::*;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::hint::Hinter;
use rustyline::{CompletionType, Config, Context, Editor, Helper, Highlighter, Validator};
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Available slash commands for tab-completion.
const COMMANDS: &[&str] = &[
    "/help", "/quit", "/exit", "/new", "/history", "/stats", "/session",
];

/// Rustyline helper providing slash-command tab-completion and inline hints.
#[derive(Helper, Validator, Highlighter)]
struct CommandCompleter;

impl Hinter for CommandCompleter {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        // Only hint when cursor is at end and line starts with '/'
        if pos != line.len() || !line.starts_with('/') || line.contains(' ') {
            return None;
        }

        COMMANDS
            .iter()
            .find(|cmd| cmd.starts_with(line) && **cmd != line)
            .map(|cmd| cmd[line.len()..].to_string())
    }
}

impl Completer for CommandCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        // Only complete when the cursor is at the first word and it starts with '/'
        let prefix = &line[..pos];
        if !prefix.starts_with('/') || prefix.contains(' ') {
            return Ok((0, vec![]));
        }

        let matches: Vec<Pair> = COMMANDS
            .iter()
            .filter(|cmd| cmd.starts_with(prefix))
            .map(|cmd| Pair {
                display: cmd.to_string(),
                replacement: cmd.to_string(),
            })
            .collect();

        Ok((0, matches))
    }
}

pub fn print_banner() {
    println!("{}", "====================================".bright_cyan());
    println!("{}", "          CHATRELAY v0.1.0          ".bright_cyan().bold());
    println!("{}", "====================================".bright_cyan());
    println!("{}", " Webhook chat client".bright_white());
    println!("{}\n", " Type /help for commands or /quit to exit".dimmed());
}

/// Print an assistant reply as a block, visually separated from the prompt.
fn display_reply(reply: &str) {
    println!("\n{}", "━━━━━━━━━━━━━━ Reply ━━━━━━━━━━━━━━━━".bright_green().bold());
    println!("{}", reply);
    println!("{}\n", "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━".bright_green());
}

/// Start a spinner animation in a background thread.
/// Returns an `Arc<AtomicBool>` — set it to `false` to stop the spinner.
fn start_spinner(message: &str) -> Arc<AtomicBool> {
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = running.clone();
    let msg = message.to_string();

    std::thread::spawn(move || {
        let frames = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
        let mut i = 0;
        while running_clone.load(Ordering::Relaxed) {
            print!("\r{} {} ", frames[i % frames.len()].to_string().cyan(), msg.dimmed());
            let _ = io::stdout().flush();
            std::thread::sleep(std::time::Duration::from_millis(80));
            i += 1;
        }
        // Clear the spinner line
        print!("\r{}\r", " ".repeat(msg.len() + 4));
        let _ = io::stdout().flush();
    });

    running
}

/// Stop a running spinner.
fn stop_spinner(handle: &Arc<AtomicBool>) {
    handle.store(false, Ordering::Relaxed);
    // Give the spinner thread time to clear the line
    std::thread::sleep(std::time::Duration::from_millis(100));
}

// Interactive REPL entry point
pub async fn start_repl(config: &AppConfig) {
    print_banner();

    if config.webhook_url.is_empty() {
        println!(
            "{} set webhook_url in chatrelay.toml",
            "✗ No webhook endpoint configured:".red().bold()
        );
        return;
    }
    println!("{} {}", "✓ Webhook:".green(), config.webhook_url.dimmed());

    let logger = Logger::new(&config.log_dir).expect("Failed to create logger");
    let mut metrics = SessionMetrics::new();
    let mut session = ChatSession::new();
    println!("{} {}\n", "✓ Session:".green(), session.id().as_str().dimmed());

    // Set up rustyline editor with tab-completion
    let rl_config = Config::builder()
        .auto_add_history(true)
        .completion_type(CompletionType::List)
        .completion_prompt_limit(100)
        .build();
    let mut rl = Editor::with_config(rl_config).expect("Failed to create line editor");
    rl.set_helper(Some(CommandCompleter));

    loop {
        let readline = rl.readline(&"> ".bright_cyan().bold().to_string());
        let prompt = match readline {
            Ok(line) => line.trim().to_string(),
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => {
                println!("Goodbye!");
                break;
            }
            Err(e) => {
                println!("{} {}", "✗ Input error:".red(), e);
                continue;
            }
        };

        if prompt.is_empty() {
            continue;
        }

        if prompt == "/quit" || prompt == "/exit" {
            println!("Goodbye!");
            break;
        }

        if prompt == "/help" {
            println!("\n{}", "Available Commands:".bright_cyan().bold());
            println!("  {}  - Exit the program", "/quit, /exit".green());
            println!("  {}         - Show this help", "/help".green());
            println!("  {}          - Start a new session (fresh id, empty history)", "/new".green());
            println!("  {}      - Show conversation history", "/history".green());
            println!("  {}        - Show session statistics", "/stats".green());
            println!("  {}      - Show current session info", "/session".green());
            println!();
            continue;
        }

        if prompt == "/stats" {
            metrics.display();
            continue;
        }

        if prompt == "/session" {
            println!("\n{}", "Session Info:".bright_cyan().bold());
            println!("  {} {}", "Id:".dimmed(), session.id().as_str().bright_white());
            println!(
                "  {} {}",
                "Started:".dimmed(),
                session.started_at().format("%Y-%m-%d %H:%M:%S").to_string().bright_white()
            );
            println!("  {} {}", "Messages:".dimmed(), session.log().len().to_string().bright_white());
            println!();
            continue;
        }

        if prompt == "/new" {
            session.reset();
            let _ = logger.log_session_reset(session.id().as_str());
            println!("{} {}", "✓ New session:".green(), session.id().as_str().bright_white());
            continue;
        }

        if prompt == "/history" {
            if session.log().is_empty() {
                println!("{}", "No conversation history yet.".yellow());
            } else {
                println!("\n{}", "Conversation History:".bright_cyan().bold());
                for (i, msg) in session.log().all().iter().enumerate() {
                    let role = match msg.role {
                        Role::User => msg.role.as_str().bright_blue(),
                        Role::Assistant => msg.role.as_str().bright_green(),
                    };
                    println!("\n{}. [{}]", i + 1, role);
                    println!("{}", preview(&msg.content, 100).dimmed());
                }
                println!();
            }
            continue;
        }

        // Regular message — one turn: append, dispatch, append reply or show
        // a transient error. The REPL blocks on the dispatch, so only one
        // turn is ever in flight.
        session.log_mut().append(ChatMessage::user(prompt.clone()));
        metrics.total_dispatches += 1;
        let _ = logger.log_dispatch(session.id().as_str(), &prompt);

        let spinner = start_spinner("Waiting for reply...");
        let result = api::send_chat(session.id().as_str(), &prompt, config).await;
        stop_spinner(&spinner);

        match result {
            Ok(reply) => {
                metrics.successful_replies += 1;
                let _ = logger.log_reply(&reply);
                session.log_mut().append(ChatMessage::assistant(reply.clone()));
                display_reply(&reply);
            }
            Err(e) => {
                // The failed user message stays in history; no reply is added.
                metrics.failed_dispatches += 1;
                let _ = logger.log_error(&e.to_string());
                print_dispatch_error(&e);
            }
        }
    }

    // Display session statistics on exit
    println!("\n{}", "Session ended.".bright_cyan());
    metrics.display();
}

fn print_dispatch_error(e: &DispatchError) {
    match e {
        DispatchError::Protocol { status, .. } => {
            println!("{} {}", format!("✗ Webhook error ({status}):").red().bold(), e);
        }
        DispatchError::MalformedReply { .. } => {
            println!("{} {}", "✗ Unexpected reply:".red().bold(), e);
        }
        _ => {
            println!("{} {}", "✗ Dispatch failed:".red().bold(), e);
        }
    }
}
