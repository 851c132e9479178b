use std::process::{Command, Stdio};
use std::sync::{Arc, Mutex};

/// Hands a URI to whatever resolves its scheme.
///
/// Nothing is returned: the platform never reports whether the
/// dialer, SMS app or WhatsApp actually sent anything.
pub trait UriDispatcher: Send + Sync {
    fn dispatch(&self, uri: &str);
}

/// Opens URIs with the operating system's default handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemDispatcher;

impl UriDispatcher for SystemDispatcher {
    fn dispatch(&self, uri: &str) {
        let mut cmd = opener(uri);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        match cmd.spawn() {
            Ok(child) => tracing::info!(pid = child.id(), uri, "handed URI to system opener"),
            Err(e) => tracing::warn!(uri, "Failed to launch system opener: {}", e),
        }
    }
}

#[cfg(target_os = "macos")]
fn opener(uri: &str) -> Command {
    let mut cmd = Command::new("open");
    cmd.arg(uri);
    cmd
}

#[cfg(target_os = "windows")]
fn opener(uri: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.args(["/C", "start", ""]).arg(uri);
    cmd
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn opener(uri: &str) -> Command {
    let mut cmd = Command::new("xdg-open");
    cmd.arg(uri);
    cmd
}

/// Keeps every dispatched URI instead of opening it. Clones share the same
/// log.
#[derive(Debug, Clone, Default)]
pub struct RecordingDispatcher {
    uris: Arc<Mutex<Vec<String>>>,
}

impl RecordingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// URIs dispatched so far, oldest first.
    pub fn uris(&self) -> Vec<String> {
        match self.uris.lock() {
            Ok(uris) => uris.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl UriDispatcher for RecordingDispatcher {
    fn dispatch(&self, uri: &str) {
        tracing::debug!(uri, "recorded URI");
        match self.uris.lock() {
            Ok(mut uris) => uris.push(uri.to_string()),
            Err(poisoned) => poisoned.into_inner().push(uri.to_string()),
        }
    }
}
