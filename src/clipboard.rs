use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::sleep;
use tracing::debug;

use crate::config::ClipboardConfig;
use crate::error::YapYapError;

/// Write-only clipboard seam for the popup's copy action.
#[async_trait]
pub trait ClipboardSink: Send + Sync {
    async fn copy(&self, text: &str) -> Result<()>;
}

/// Wayland clipboard backed by wl-clipboard-rs (wlroots data-control
/// protocol), with a `wl-copy` subprocess fallback for compositors that
/// only speak wl_data_device_manager.
pub struct WaylandClipboard {
    config: ClipboardConfig,
}

impl WaylandClipboard {
    pub fn new(config: &ClipboardConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    async fn copy_with_wl_copy(&self, text: &str) -> Result<()> {
        if which::which("wl-copy").is_err() {
            return Err(YapYapError::Clipboard("wl-copy not found".to_string()).into());
        }

        let mut child = Command::new("wl-copy")
            .stdin(std::process::Stdio::piped())
            .spawn()
            .map_err(|e| YapYapError::Clipboard(format!("Failed to run wl-copy: {}", e)))?;

        if let Some(ref mut stdin) = child.stdin {
            use tokio::io::AsyncWriteExt;
            stdin
                .write_all(text.as_bytes())
                .await
                .map_err(|e| {
                    YapYapError::Clipboard(format!("Failed to write to wl-copy: {}", e))
                })?;
        }
        drop(child.stdin.take());

        let status = child
            .wait()
            .await
            .map_err(|e| YapYapError::Clipboard(format!("wl-copy failed: {}", e)))?;

        if !status.success() {
            return Err(YapYapError::Clipboard("wl-copy exited with error".to_string()).into());
        }

        Ok(())
    }
}

#[async_trait]
impl ClipboardSink for WaylandClipboard {
    async fn copy(&self, text: &str) -> Result<()> {
        // Try the native protocol first.
        let text_for_native = text.to_string();
        let native_result = tokio::task::spawn_blocking(move || {
            use wl_clipboard_rs::copy::{MimeType, Options, Source};
            let opts = Options::new();
            opts.copy(
                Source::Bytes(text_for_native.into_bytes().into()),
                MimeType::Text,
            )
        })
        .await?;

        match native_result {
            Ok(()) => {}
            Err(e) if self.config.wl_copy_fallback => {
                debug!("Native clipboard write unavailable ({}), using wl-copy", e);
                self.copy_with_wl_copy(text).await?;
            }
            Err(e) => {
                return Err(
                    YapYapError::Clipboard(format!("clipboard write failed: {}", e)).into(),
                );
            }
        }

        // Give the compositor a moment to pick up the new selection.
        sleep(Duration::from_millis(self.config.settle_delay_ms)).await;

        Ok(())
    }
}
