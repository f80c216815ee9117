//! Streaming chat client for the `/chat` endpoint.
//!
//! Sends a query as JSON and exposes the framed response stream as a lazy
//! sequence of [`StreamUpdate`]s. The sequence is single-pass and
//! forward-only; it ends when the server's end-of-stream sentinel arrives
//! or the transport closes.

use std::collections::VecDeque;
use std::pin::Pin;

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::client::ClientError;
use crate::frame::{Frame, FrameDecoder};
use crate::http::{add_extra_headers, build_http_client, endpoint_url};
use crate::options::TransportOptions;
use crate::session::{ChatSession, StreamUpdate};

const CHAT_PATH: &str = "/chat";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    query: &'a str,
}

/// Fires cancellation for one in-flight exchange.
///
/// Dropping the handle without calling [`cancel`](CancelHandle::cancel)
/// never cancels; the exchange simply runs to completion.
#[derive(Debug)]
pub struct CancelHandle(oneshot::Sender<()>);

impl CancelHandle {
    /// Abort the exchange. The update stream yields
    /// [`ClientError::Cancelled`] once and then ends, releasing the
    /// underlying connection.
    pub fn cancel(self) {
        let _ = self.0.send(());
    }
}

/// Receiving side of a cancellation pair, passed to
/// [`ChatClient::send_query_cancellable`].
#[derive(Debug)]
pub struct CancelSignal(oneshot::Receiver<()>);

/// Create a linked cancellation handle/signal pair.
pub fn cancel_pair() -> (CancelHandle, CancelSignal) {
    let (tx, rx) = oneshot::channel();
    (CancelHandle(tx), CancelSignal(rx))
}

/// Client for the chat endpoint.
///
/// # Example
/// ```no_run
/// use docchat::chat::ChatClient;
/// use docchat::options::TransportOptions;
/// use futures::StreamExt;
///
/// # async fn run() -> Result<(), docchat::ClientError> {
/// let client = ChatClient::new(TransportOptions::new("http://localhost:5000"));
/// let mut updates = std::pin::pin!(client.send_query("What does the document cover?").await?);
/// while let Some(update) = updates.next().await {
///     print!("{}", update?.text());
/// }
/// # Ok(())
/// # }
/// ```
pub struct ChatClient {
    transport_options: TransportOptions,
}

impl ChatClient {
    pub fn new(transport_options: TransportOptions) -> Self {
        Self { transport_options }
    }

    pub fn transport_options(&self) -> &TransportOptions {
        &self.transport_options
    }

    /// Send a query with explicit options, returning the update stream.
    ///
    /// Precondition: `query` is non-empty after trimming. Callers trim and
    /// drop empty input before invoking this; an empty query is a no-op at
    /// the call site, not an error of this client.
    ///
    /// A non-success initial status fails with [`ClientError::Transport`]
    /// before any of the stream is read.
    pub async fn request_stream(
        query: &str,
        transport_options: &TransportOptions,
        cancel: Option<CancelSignal>,
    ) -> Result<impl Stream<Item = Result<StreamUpdate, ClientError>> + Send, ClientError> {
        let url = endpoint_url(&transport_options.http.base_url, CHAT_PATH);
        let http_client = build_http_client(transport_options)?;

        let mut req = http_client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .json(&ChatRequest { query });
        req = add_extra_headers(req, &transport_options.http.extra_headers);

        debug!(%url, "sending chat query");
        let response = req.send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(%status, "chat request rejected");
            return Err(ClientError::Transport { status });
        }

        // Mid-stream transport failures surface as Interrupted, not Http:
        // the exchange was already under way.
        let bytes = response
            .bytes_stream()
            .map(|result| result.map_err(|e| ClientError::Interrupted { source: Some(e) }));

        Ok(decode_updates(bytes, cancel))
    }

    /// Send a query using the client's stored options.
    pub async fn send_query(
        &self,
        query: &str,
    ) -> Result<impl Stream<Item = Result<StreamUpdate, ClientError>> + Send, ClientError> {
        Self::request_stream(query, &self.transport_options, None).await
    }

    /// Send a query that can be aborted through a [`CancelHandle`].
    pub async fn send_query_cancellable(
        &self,
        query: &str,
        cancel: CancelSignal,
    ) -> Result<impl Stream<Item = Result<StreamUpdate, ClientError>> + Send, ClientError> {
        Self::request_stream(query, &self.transport_options, Some(cancel)).await
    }

    /// Run a whole exchange to completion and return the finished session.
    ///
    /// Fails on transport errors and on streams cut off before the
    /// sentinel; callers that want the partial response in those cases
    /// should drive [`send_query`](Self::send_query) themselves and keep
    /// their own [`ChatSession`].
    pub async fn collect(&self, query: &str) -> Result<ChatSession, ClientError> {
        let mut session = ChatSession::new(query);
        let mut updates = std::pin::pin!(self.send_query(query).await?);

        while let Some(update) = updates.next().await {
            session.apply(&update?);
        }
        session.terminate();
        Ok(session)
    }
}

enum Phase {
    /// Transport still open, reading chunks.
    Reading,
    /// Transport closed without the sentinel; one Interrupted error is
    /// still owed to the consumer.
    Interrupted,
    /// Sequence over, nothing more will be yielded.
    Done,
}

struct DecodeState<S> {
    bytes: Pin<Box<S>>,
    decoder: FrameDecoder,
    pending: VecDeque<Frame>,
    cancel: Option<oneshot::Receiver<()>>,
    phase: Phase,
}

enum Step {
    Cancelled,
    CancelGone,
    Chunk(Option<Result<Bytes, ClientError>>),
}

/// Turn a raw byte stream into an ordered stream of updates.
///
/// This is the transport-independent half of the client: any stream of
/// byte chunks with the framing described in [`crate::frame`] decodes the
/// same way, whatever carried it. Updates are yielded in frame order,
/// which equals arrival order on the wire.
pub fn decode_updates<S>(
    bytes: S,
    cancel: Option<CancelSignal>,
) -> impl Stream<Item = Result<StreamUpdate, ClientError>> + Send
where
    S: Stream<Item = Result<Bytes, ClientError>> + Send,
{
    let state = DecodeState {
        bytes: Box::pin(bytes),
        decoder: FrameDecoder::new(),
        pending: VecDeque::new(),
        cancel: cancel.map(|signal| signal.0),
        phase: Phase::Reading,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            // Drain frames decoded from earlier chunks first.
            while let Some(frame) = state.pending.pop_front() {
                match Option::<StreamUpdate>::from(frame) {
                    Some(update) => return Some((Ok(update), state)),
                    None => {
                        debug!("end-of-stream marker received");
                        state.phase = Phase::Done;
                        return None;
                    }
                }
            }

            match state.phase {
                Phase::Done => return None,
                Phase::Interrupted => {
                    warn!("stream ended without end-of-stream marker");
                    state.phase = Phase::Done;
                    return Some((Err(ClientError::Interrupted { source: None }), state));
                }
                Phase::Reading => {}
            }

            let step = match state.cancel.take() {
                Some(mut cancel) => {
                    let step = tokio::select! {
                        biased;
                        fired = &mut cancel => {
                            if fired.is_ok() { Step::Cancelled } else { Step::CancelGone }
                        }
                        chunk = state.bytes.next() => Step::Chunk(chunk),
                    };
                    if let Step::Chunk(_) = step {
                        state.cancel = Some(cancel);
                    }
                    step
                }
                None => Step::Chunk(state.bytes.next().await),
            };

            match step {
                Step::Cancelled => {
                    warn!("chat exchange cancelled");
                    state.phase = Phase::Done;
                    return Some((Err(ClientError::Cancelled), state));
                }
                // Handle dropped without firing: no cancellation can
                // arrive any more, keep reading.
                Step::CancelGone => continue,
                Step::Chunk(Some(Ok(chunk))) => match state.decoder.feed(&chunk) {
                    Ok(frames) => state.pending.extend(frames),
                    Err(e) => {
                        state.phase = Phase::Done;
                        return Some((Err(e), state));
                    }
                },
                Step::Chunk(Some(Err(e))) => {
                    state.phase = Phase::Done;
                    return Some((Err(e), state));
                }
                Step::Chunk(None) => {
                    match state.decoder.finish() {
                        Ok(Some(frame)) => state.pending.push_back(frame),
                        Ok(None) => {}
                        Err(e) => {
                            state.phase = Phase::Done;
                            return Some((Err(e), state));
                        }
                    }
                    state.phase = Phase::Interrupted;
                }
            }
        }
    })
}
