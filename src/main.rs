//! Affiliate AI - entry point.
//!
//! `serve` (default) starts the HTTP API; `repl` chats on the console.

use affiliate_ai::{agent::ChatSession, api, config::Config};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "affiliate-ai", version, about = "Persona-routed assistant for affiliate marketing")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP API
    Serve,
    /// Chat interactively on the console
    Repl,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "affiliate_ai=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env()?;
    info!("Loaded configuration: {:?}", config);

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => api::serve(config).await,
        Command::Repl => repl(&config).await,
    }
}

async fn repl(config: &Config) -> anyhow::Result<()> {
    let mut session = ChatSession::from_config(config)?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    stdout
        .write_all(b"Affiliate AI ready. Type 'exit' to quit.\n")
        .await?;
    loop {
        stdout.write_all(b"\nYou: ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let message = line.trim();
        if message.is_empty() {
            continue;
        }
        if message.eq_ignore_ascii_case("exit") || message.eq_ignore_ascii_case("quit") {
            break;
        }

        let out = match session.chat(message).await {
            Ok(reply) => format!("[{}] {}\n", reply.persona, reply.response),
            Err(e) => format!("Error: {}\n", e),
        };
        stdout.write_all(out.as_bytes()).await?;
    }
    Ok(())
}
