//! Per-exchange session state.
//!
//! A [`ChatSession`] tracks one query/response exchange: the query, the
//! fragments received so far, and how the exchange ended. Sessions are
//! transient; nothing persists across exchanges.

use itertools::Itertools;

use crate::frame::Frame;

/// One display-ready update decoded from the response stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamUpdate {
    /// Response text to append in arrival order.
    Content(String),
    /// In-band server error, rendered distinctly from content. The text
    /// is the literal payload, `[ERROR]` prefix included.
    Error(String),
}

impl StreamUpdate {
    /// The update's text, regardless of kind.
    pub fn text(&self) -> &str {
        match self {
            StreamUpdate::Content(text) | StreamUpdate::Error(text) => text,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, StreamUpdate::Error(_))
    }
}

impl From<Frame> for Option<StreamUpdate> {
    fn from(frame: Frame) -> Self {
        match frame {
            Frame::Content(text) => Some(StreamUpdate::Content(text)),
            Frame::Error(text) => Some(StreamUpdate::Error(text)),
            // The sentinel terminates the stream, it is never an update.
            Frame::End => None,
        }
    }
}

/// State of one in-flight query/response exchange.
///
/// The fragment buffer is append-only: fragments are never removed or
/// reordered, and once the session is terminated no further updates are
/// accepted.
#[derive(Debug, Clone)]
pub struct ChatSession {
    query: String,
    fragments: Vec<String>,
    terminated: bool,
    errored: Option<String>,
}

impl ChatSession {
    /// Start a session for the given query. Callers trim and reject empty
    /// queries before opening a session.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            fragments: Vec::new(),
            terminated: false,
            errored: None,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Apply one decoded update. A no-op once the session is terminated.
    pub fn apply(&mut self, update: &StreamUpdate) {
        if self.terminated {
            return;
        }
        match update {
            StreamUpdate::Content(text) => self.fragments.push(text.clone()),
            StreamUpdate::Error(text) => {
                self.fragments.push(text.clone());
                self.errored = Some(text.clone());
            }
        }
    }

    /// Mark the exchange as over. Called when the sentinel is observed or
    /// the transport fails; the buffer is frozen from here on.
    pub fn terminate(&mut self) {
        self.terminated = true;
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// The last in-band error payload, if the server reported one.
    pub fn errored(&self) -> Option<&str> {
        self.errored.as_deref()
    }

    /// Fragments received so far, in arrival order.
    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    /// Full response text: every fragment concatenated in arrival order.
    pub fn text(&self) -> String {
        self.fragments.iter().join("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragments_accumulate_in_order() {
        let mut session = ChatSession::new("what is this about?");
        session.apply(&StreamUpdate::Content("The document ".to_string()));
        session.apply(&StreamUpdate::Content("covers Rust.".to_string()));

        assert_eq!(session.fragments().len(), 2);
        assert_eq!(session.text(), "The document covers Rust.");
        assert!(session.errored().is_none());
    }

    #[test]
    fn test_error_update_recorded_and_kept_inline() {
        let mut session = ChatSession::new("q");
        session.apply(&StreamUpdate::Content("partial".to_string()));
        session.apply(&StreamUpdate::Error("[ERROR] boom".to_string()));

        assert_eq!(session.errored(), Some("[ERROR] boom"));
        // The error text still appears in the assembled response.
        assert_eq!(session.text(), "partial[ERROR] boom");
    }

    #[test]
    fn test_terminated_session_rejects_updates() {
        let mut session = ChatSession::new("q");
        session.apply(&StreamUpdate::Content("kept".to_string()));
        session.terminate();
        session.apply(&StreamUpdate::Content("dropped".to_string()));

        assert!(session.is_terminated());
        assert_eq!(session.text(), "kept");
    }

    #[test]
    fn test_sentinel_frame_is_not_an_update() {
        let update: Option<StreamUpdate> = Frame::End.into();
        assert!(update.is_none());

        let update: Option<StreamUpdate> = Frame::Content("hi".to_string()).into();
        assert_eq!(update, Some(StreamUpdate::Content("hi".to_string())));
    }
}
