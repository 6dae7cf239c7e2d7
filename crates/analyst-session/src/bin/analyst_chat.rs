//! Terminal chat with the metrics analyst.
//!
//! Lines are sent as messages. Commands: `/new`, `/list`, `/open <id>`,
//! `/delete <id>`, `/quit`. Ctrl+C cancels a reply in progress.

use std::io::Write;

use analyst_session::{AnalystClient, ChatSession, SessionConfig, SessionError};
use database::Database;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

enum Command<'a> {
    Say(&'a str),
    New,
    List,
    Open(&'a str),
    Delete(&'a str),
    Quit,
    Unknown(&'a str),
}

fn parse_command(line: &str) -> Command<'_> {
    let line = line.trim();
    let Some(rest) = line.strip_prefix('/') else {
        return Command::Say(line);
    };

    let (name, arg) = rest.split_once(' ').unwrap_or((rest, ""));
    match (name, arg.trim()) {
        ("new", _) => Command::New,
        ("list", _) => Command::List,
        ("quit" | "exit", _) => Command::Quit,
        ("open", id) if !id.is_empty() => Command::Open(id),
        ("delete", id) if !id.is_empty() => Command::Delete(id),
        _ => Command::Unknown(line),
    }
}

async fn list(session: &ChatSession<AnalystClient>) {
    match session.conversations().await {
        Ok(groups) if groups.is_empty() => println!("No saved conversations."),
        Ok(groups) => {
            for (label, items) in groups.labeled() {
                println!("{}", label);
                for conversation in items {
                    println!("  {}  {}", conversation.id, conversation.title);
                }
            }
        }
        Err(e) => println!("Could not list conversations: {}", e),
    }
}

async fn say(session: &mut ChatSession<AnalystClient>, text: &str) {
    let turn = session.send_message(text, |delta| {
        print!("{}", delta);
        let _ = std::io::stdout().flush();
    });

    tokio::select! {
        result = turn => match result {
            Ok(outcome) => {
                match (&outcome.error, outcome.reply.as_deref()) {
                    (Some(e), Some(reply)) if reply == analyst_core::APOLOGY_MESSAGE => {
                        println!("{}\n[{}]", reply, e.user_message());
                    }
                    (Some(e), _) => println!("\n[reply cut short: {}]", e.user_message()),
                    (None, None) => println!("[no reply]"),
                    (None, Some(_)) => println!(),
                }
            }
            Err(SessionError::Validation(e)) => println!("Message not sent: {}", e),
            Err(e) => println!("Error: {}", e),
        },
        _ = tokio::signal::ctrl_c() => {
            println!("\n[cancelled]");
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let config = SessionConfig::from_env()?;
    let database_url = config.database_url.clone();
    let client = AnalystClient::new(config)?;

    let mut session = match database_url {
        Some(url) => {
            let db = Database::connect(&url).await?;
            db.migrate().await?;
            info!("Saving conversations to {}", url);
            ChatSession::with_database(client, db)
        }
        None => ChatSession::new(client),
    };
    session.open();

    println!("Ask the analyst about your metrics. /quit to leave.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse_command(&line) {
            Command::Say("") => {}
            Command::Say(text) => say(&mut session, text).await,
            Command::New => {
                session.close();
                session.open();
                println!("Started a new chat.");
            }
            Command::List => list(&session).await,
            Command::Open(id) => match session.resume(id).await {
                Ok(()) => println!("Resumed with {} messages.", session.messages().len()),
                Err(e) => println!("Could not open {}: {}", id, e),
            },
            Command::Delete(id) => match session.delete_conversation(id).await {
                Ok(()) => println!("Deleted {}.", id),
                Err(e) => println!("Could not delete {}: {}", id, e),
            },
            Command::Quit => break,
            Command::Unknown(line) => {
                warn!("Unknown command: {}", line);
                println!("Commands: /new, /list, /open <id>, /delete <id>, /quit");
            }
        }
    }

    session.close();
    Ok(())
}
