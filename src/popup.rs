//! Popup-side controller: mic toggle, status badge, transcript views, and
//! the copy/search/insert actions. All state is private and changes only
//! in response to recognizer status updates, so what the controller holds
//! is exactly what the popup renders.

use anyhow::Result;
use tracing::{debug, error, warn};

use crate::clipboard::ClipboardSink;
use crate::config::SearchConfig;
use crate::messages::{PageCommand, RecognizerCommand, StatusUpdate};
use crate::port::RecognizerPort;
use crate::tabs::TabHost;

/// Append-only transcript accumulation plus the latest-fragment view the
/// popup's action buttons operate on. The accumulated output is never
/// trimmed or truncated.
#[derive(Debug, Clone, Default)]
pub struct TranscriptBuffer {
    output: String,
    latest: String,
}

impl TranscriptBuffer {
    /// Append one fragment (followed by a line break) and overwrite the
    /// latest-fragment view.
    pub fn push_fragment(&mut self, fragment: &str) {
        self.output.push_str(fragment);
        self.output.push('\n');
        self.latest.clear();
        self.latest.push_str(fragment);
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn latest(&self) -> &str {
        &self.latest
    }

    pub fn is_empty(&self) -> bool {
        self.output.is_empty()
    }

    /// The last `lines` lines of the accumulated output, for tail-anchored
    /// rendering.
    pub fn tail(&self, lines: usize) -> &str {
        if lines == 0 || self.output.is_empty() {
            return "";
        }
        let body = self.output.strip_suffix('\n').unwrap_or(&self.output);
        match body.rmatch_indices('\n').nth(lines - 1) {
            Some((i, _)) => &self.output[i + 1..],
            None => &self.output,
        }
    }
}

/// The popup's controller. Owns the recognizer connection's command half
/// and the seams to the tab surface and the clipboard.
pub struct PopupController {
    listening: bool,
    mic_active: bool,
    badge: String,
    transcript: TranscriptBuffer,
    search_url_prefix: String,
    port: Box<dyn RecognizerPort>,
    tabs: Box<dyn TabHost>,
    clipboard: Box<dyn ClipboardSink>,
}

impl PopupController {
    pub fn new(
        config: &SearchConfig,
        port: Box<dyn RecognizerPort>,
        tabs: Box<dyn TabHost>,
        clipboard: Box<dyn ClipboardSink>,
    ) -> Self {
        Self {
            listening: false,
            mic_active: false,
            badge: "Idle".to_string(),
            transcript: TranscriptBuffer::default(),
            search_url_prefix: config.url_prefix.clone(),
            port,
            tabs,
            clipboard,
        }
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    pub fn mic_active(&self) -> bool {
        self.mic_active
    }

    pub fn badge(&self) -> &str {
        &self.badge
    }

    pub fn transcript(&self) -> &TranscriptBuffer {
        &self.transcript
    }

    /// Flip the mic: request START when idle, STOP when listening. Local
    /// state stays as-is until the recognizer echoes a status back.
    pub async fn toggle(&mut self) -> Result<()> {
        let command = if self.listening {
            RecognizerCommand::Stop
        } else {
            RecognizerCommand::Start
        };
        self.port.send(command).await
    }

    /// Fold one status update into the popup state. The three fields are
    /// handled independently and may co-occur; an error in the same update
    /// overwrites whatever badge the status field just set.
    pub fn handle_update(&mut self, update: &StatusUpdate) {
        if let Some(status) = non_empty(&update.status) {
            match status {
                "listening" => {
                    self.listening = true;
                    self.mic_active = true;
                    self.badge = "Listening".to_string();
                }
                "stopped" => {
                    self.listening = false;
                    self.mic_active = false;
                    self.badge = "Idle".to_string();
                }
                other => {
                    self.badge = other.to_string();
                }
            }
        }

        if let Some(error) = non_empty(&update.error) {
            warn!("Recognizer reported an error: {}", error);
            self.badge = "Error".to_string();
        }

        if let Some(fragment) = non_empty(&update.transcript) {
            self.transcript.push_fragment(fragment);
        }
    }

    /// Copy the latest fragment to the clipboard. Whitespace-only
    /// transcripts are ignored; a failed write is logged and absorbed.
    pub async fn copy(&self) {
        let text = self.transcript.latest().trim();
        if text.is_empty() {
            debug!("copy: transcript is empty");
            return;
        }
        if let Err(e) = self.clipboard.copy(text).await {
            error!("Clipboard write failed: {}", e);
        }
    }

    /// Search the web for the latest fragment by pointing the active tab
    /// at the configured search URL.
    pub async fn search(&mut self) -> Result<()> {
        let text = self.transcript.latest().trim();
        if text.is_empty() {
            debug!("search: transcript is empty");
            return Ok(());
        }
        let Some(tab) = self.tabs.active_tab() else {
            debug!("search: no active tab");
            return Ok(());
        };
        let url = format!("{}{}", self.search_url_prefix, urlencoding::encode(text));
        self.tabs.navigate(tab, &url).await
    }

    /// Hand the latest fragment to the active tab for insertion at the
    /// caret. No response is awaited.
    pub async fn insert(&mut self) -> Result<()> {
        let text = self.transcript.latest().trim();
        if text.is_empty() {
            debug!("insert: transcript is empty");
            return Ok(());
        }
        let Some(tab) = self.tabs.active_tab() else {
            debug!("insert: no active tab");
            return Ok(());
        };
        let command = PageCommand::InsertAtCursor {
            value: text.to_string(),
        };
        self.tabs.send(tab, &command).await
    }
}

/// Treat empty strings like absent fields, as the recognizer's messages do.
fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}
