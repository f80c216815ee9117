//! Upload a PDF to a running document-chat server.
//!
//! Run with:
//! ```bash
//! export DOCCHAT_URL="http://localhost:5000"
//! cargo run --example upload -- report.pdf
//! ```

use docchat::options::TransportOptions;
use docchat::upload::UploadClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let base_url =
        std::env::var("DOCCHAT_URL").unwrap_or_else(|_| "http://localhost:5000".to_string());
    let path = match std::env::args().nth(1) {
        Some(path) => path,
        None => {
            eprintln!("usage: cargo run --example upload -- <file.pdf>");
            return Ok(());
        }
    };

    let client = UploadClient::new(TransportOptions::new(base_url));

    match client.upload_file(&path).await {
        Ok(response) => {
            println!(
                "{}",
                response
                    .message
                    .unwrap_or_else(|| "Document processed.".to_string())
            );
        }
        Err(e) => {
            eprintln!("Upload failed: {}", e);
            return Err(e.into());
        }
    }

    Ok(())
}
