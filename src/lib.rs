//! # docchat - Document-Chat Streaming Client
//!
//! A small, pragmatic async client for a document-chat server exposing two
//! HTTP endpoints: a multipart PDF upload (`/upload`) and a streaming chat
//! query (`/chat`) whose response arrives as blank-line-delimited
//! `data: <payload>` frames ending with a `[END_OF_STREAM]` sentinel.
//!
//! ## Features
//! - Async-first, tokio compatible
//! - Incremental frame decoding that is chunk-boundary independent and
//!   safe for multi-byte UTF-8 split across network reads
//! - In-band server errors (`[ERROR]` payloads) surfaced as distinct
//!   updates, separate from transport failures
//! - Optional per-exchange cancellation
//!
//! ## Architecture
//!
//! The testable core is a pure decoder ([`frame::FrameDecoder`]) fed by a
//! thin transport adapter ([`chat::decode_updates`]); the HTTP clients on
//! top of it only do request plumbing.
//!
//! ## Example
//! ```no_run
//! use docchat::chat::ChatClient;
//! use docchat::options::TransportOptions;
//! use docchat::upload::UploadClient;
//! use futures::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let options = TransportOptions::new("http://localhost:5000");
//!
//!     // Index a document first; the server answers queries against it.
//!     let upload = UploadClient::new(options.clone());
//!     upload.upload_file("report.pdf").await?;
//!
//!     // Stream an answer, printing fragments as they arrive.
//!     let chat = ChatClient::new(options);
//!     let mut updates = std::pin::pin!(chat.send_query("Summarize the report.").await?);
//!     while let Some(update) = updates.next().await {
//!         print!("{}", update?.text());
//!     }
//!     Ok(())
//! }
//! ```

pub mod chat;
pub mod client;
pub mod frame;
pub mod http;
pub mod options;
pub mod session;
pub mod upload;

// Re-exports for convenience
pub use chat::{cancel_pair, CancelHandle, CancelSignal, ChatClient};
pub use client::ClientError;
pub use frame::{Frame, FrameDecoder};
pub use options::TransportOptions;
pub use session::{ChatSession, StreamUpdate};
pub use upload::{UploadClient, UploadResponse};
