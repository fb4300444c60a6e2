use std::io::Write;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use relaychat_client::{
    ChatSession, MessageRenderer, RelayClient, RenderedMessage, TurnOutcome, send_message,
};
use relaychat_contracts::Role;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser)]
#[command(name = "relaychat")]
#[command(version, about = "RelayChat - streaming chat in the terminal")]
struct Cli {
    /// Relay server base URL
    #[arg(
        long,
        env = "RELAYCHAT_SERVER_URL",
        default_value = "http://127.0.0.1:3000"
    )]
    server_url: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Prints assistant text as it arrives, one line per message.
#[derive(Default)]
struct TerminalRenderer {
    current: Option<String>,
    printed: usize,
}

impl TerminalRenderer {
    fn label(role: Role) -> colored::ColoredString {
        match role {
            Role::User => "you".blue().bold(),
            Role::Assistant => "assistant".green().bold(),
        }
    }

    fn finish_line(&mut self) {
        if self.current.take().is_some() {
            println!();
        }
        self.printed = 0;
    }
}

impl MessageRenderer for TerminalRenderer {
    fn message_appended(&mut self, message: &RenderedMessage) {
        // The user already sees what they typed.
        if message.role == Role::User {
            return;
        }
        self.finish_line();
        print!("{} {}", Self::label(message.role), message.content);
        self.printed = message.content.len();
        self.current = Some(message.id.clone());
        std::io::stdout().flush().ok();
    }

    fn message_updated(&mut self, message: &RenderedMessage) {
        if self.current.as_deref() != Some(message.id.as_str()) {
            self.finish_line();
            print!("{} ", Self::label(message.role));
            self.current = Some(message.id.clone());
        }
        if let Some(fresh) = message.content.get(self.printed..) {
            print!("{}", fresh);
        }
        self.printed = message.content.len();
        std::io::stdout().flush().ok();
    }

    fn loading_changed(&mut self, loading: bool) {
        if !loading {
            self.finish_line();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let client = RelayClient::new(&cli.server_url);
    let mut session = ChatSession::new();
    let mut renderer = TerminalRenderer::default();

    println!(
        "{} {} {}",
        "Connected to".dimmed(),
        client.base_url(),
        "(/clear resets, /exit quits)".dimmed()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{} ", ">".blue().bold());
        std::io::stdout().flush().ok();

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match line.trim() {
            "/exit" | "/quit" => break,
            "/clear" => {
                session.clear();
                println!("{}", "Conversation cleared.".dimmed());
                continue;
            }
            _ => {}
        }

        if let TurnOutcome::Failed { error, .. } =
            send_message(&mut session, &client, &mut renderer, &line).await
        {
            eprintln!("{} {}", "Error:".red().bold(), error);
        }
    }

    Ok(())
}
