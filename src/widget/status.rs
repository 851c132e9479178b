use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Error,
    Info,
}

/// A short-lived message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub kind: StatusKind,
    pub shown_at: Instant,
}

impl StatusMessage {
    pub fn is_error(&self) -> bool {
        self.kind == StatusKind::Error
    }
}

/// Holds at most one status message and hides it once `ttl` has passed.
///
/// Uses tokio's clock so paused-time tests can step past the window.
#[derive(Debug, Clone)]
pub struct StatusBar {
    ttl: Duration,
    current: Option<StatusMessage>,
}

impl StatusBar {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, current: None }
    }

    pub fn show(&mut self, text: impl Into<String>, kind: StatusKind) -> StatusMessage {
        let message = StatusMessage {
            text: text.into(),
            kind,
            shown_at: Instant::now(),
        };
        match kind {
            StatusKind::Error => tracing::warn!(status = %message.text),
            _ => tracing::info!(status = %message.text),
        }
        self.current = Some(message.clone());
        message
    }

    pub fn success(&mut self, text: impl Into<String>) -> StatusMessage {
        self.show(text, StatusKind::Success)
    }

    pub fn error(&mut self, text: impl Into<String>) -> StatusMessage {
        self.show(text, StatusKind::Error)
    }

    pub fn info(&mut self, text: impl Into<String>) -> StatusMessage {
        self.show(text, StatusKind::Info)
    }

    /// The current message, if it is still inside its display window.
    pub fn visible(&self) -> Option<&StatusMessage> {
        self.current
            .as_ref()
            .filter(|m| m.shown_at.elapsed() < self.ttl)
    }
}
