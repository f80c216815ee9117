//! Streamed chat query against a running document-chat server.
//!
//! Run with:
//! ```bash
//! export DOCCHAT_URL="http://localhost:5000"
//! cargo run --example chat -- "What does the document cover?"
//! ```

use futures::StreamExt;

use docchat::chat::ChatClient;
use docchat::options::TransportOptions;
use docchat::session::{ChatSession, StreamUpdate};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let base_url =
        std::env::var("DOCCHAT_URL").unwrap_or_else(|_| "http://localhost:5000".to_string());
    let query = std::env::args().nth(1).unwrap_or_default();

    // Empty queries are a no-op, mirroring the reference UI.
    let query = query.trim();
    if query.is_empty() {
        eprintln!("usage: cargo run --example chat -- \"<query>\"");
        return Ok(());
    }

    let client = ChatClient::new(TransportOptions::new(base_url));
    let mut session = ChatSession::new(query);

    match client.send_query(query).await {
        Ok(updates) => {
            let mut updates = std::pin::pin!(updates);
            while let Some(result) = updates.next().await {
                match result {
                    Ok(update) => {
                        match &update {
                            StreamUpdate::Content(text) => print!("{}", text),
                            StreamUpdate::Error(text) => eprint!("\n{}", text),
                        }

                        // Flush so fragments show as they arrive.
                        use std::io::Write;
                        std::io::stdout().flush()?;

                        session.apply(&update);
                    }
                    Err(e) => {
                        // Fragments already printed stay valid; only this
                        // exchange is affected.
                        eprintln!("\nError: {}", e);
                        break;
                    }
                }
            }
            session.terminate();
            println!("\n\n({} fragments)", session.fragments().len());
        }
        Err(e) => {
            eprintln!("Error sending query: {}", e);
            return Err(e.into());
        }
    }

    Ok(())
}
