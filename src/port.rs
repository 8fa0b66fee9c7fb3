use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::UnixStream;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::config::ConnectionConfig;
use crate::error::YapYapError;
use crate::messages::{RecognizerCommand, StatusUpdate};

/// Maximum allowed inbound frame length (prevents unbounded memory
/// allocation from a misbehaving recognizer).
const MAX_LINE_LENGTH: usize = 64 * 1024;

/// Buffered status updates before the reader applies backpressure.
const UPDATE_CHANNEL_CAPACITY: usize = 64;

/// Command half of the persistent recognizer connection.
#[async_trait]
pub trait RecognizerPort: Send {
    async fn send(&mut self, command: RecognizerCommand) -> Result<()>;
}

/// First frame on a fresh connection, announcing the channel name.
#[derive(Debug, Serialize)]
struct ConnectFrame<'a> {
    channel: &'a str,
}

fn default_socket_path() -> PathBuf {
    let uid = unsafe { libc::getuid() };
    PathBuf::from(format!("/run/user/{}/yapyap.sock", uid))
}

/// Newline-delimited JSON over the recognizer's Unix socket.
pub struct SocketPort {
    writer: OwnedWriteHalf,
}

impl SocketPort {
    /// Connect, announce the channel, and start the inbound reader. Status
    /// updates arrive on the returned receiver until the recognizer closes
    /// the connection.
    pub async fn connect(
        config: &ConnectionConfig,
    ) -> Result<(Self, mpsc::Receiver<StatusUpdate>)> {
        let path = config
            .socket_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(default_socket_path);

        let connect = UnixStream::connect(&path);
        let stream = timeout(Duration::from_millis(config.connect_timeout_ms), connect)
            .await
            .map_err(|_| {
                YapYapError::Connection(format!("timed out connecting to {:?}", path))
            })?
            .with_context(|| format!("Failed to connect to recognizer socket at {:?}", path))?;

        let (read_half, write_half) = stream.into_split();
        let mut port = Self { writer: write_half };

        port.write_frame(&ConnectFrame {
            channel: &config.channel,
        })
        .await?;
        info!(
            "Connected to recognizer at {:?} on channel {:?}",
            path, config.channel
        );

        let (tx, rx) = mpsc::channel(UPDATE_CHANNEL_CAPACITY);
        tokio::spawn(read_updates(read_half, tx));

        Ok((port, rx))
    }

    async fn write_frame<T: Serialize + Sync>(&mut self, frame: &T) -> Result<()> {
        let mut line = serde_json::to_string(frame)?;
        line.push('\n');
        self.writer
            .write_all(line.as_bytes())
            .await
            .map_err(|e| YapYapError::Connection(format!("recognizer write failed: {}", e)))?;
        self.writer.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl RecognizerPort for SocketPort {
    async fn send(&mut self, command: RecognizerCommand) -> Result<()> {
        debug!("Sending {:?} to recognizer", command);
        self.write_frame(&command).await
    }
}

/// Forward inbound status frames until EOF or the popup goes away.
/// Malformed frames are logged and dropped, never fatal. The length cap
/// applies while a line accumulates: once a frame crosses it, the rest
/// of that line is discarded as it streams in.
async fn read_updates(mut read_half: OwnedReadHalf, tx: mpsc::Sender<StatusUpdate>) {
    let mut buf: Vec<u8> = Vec::with_capacity(256);
    let mut discarding = false;
    let mut chunk = [0u8; 4096];
    loop {
        let n = match read_half.read(&mut chunk).await {
            Ok(0) => {
                // A final frame may arrive without its newline.
                if !discarding && !buf.is_empty() {
                    forward_frame(&buf, &tx).await;
                }
                info!("Recognizer closed the connection");
                return;
            }
            Ok(n) => n,
            Err(e) => {
                warn!("Recognizer read error: {}", e);
                return;
            }
        };

        let mut data = &chunk[..n];
        while let Some(pos) = data.iter().position(|&b| b == b'\n') {
            let fragment = &data[..pos];
            data = &data[pos + 1..];
            if discarding {
                // The newline ends the frame being thrown away.
                discarding = false;
                continue;
            }
            buf.extend_from_slice(fragment);
            if buf.len() > MAX_LINE_LENGTH {
                warn!("Dropping oversized status frame ({} bytes)", buf.len());
                buf.clear();
                continue;
            }
            if !forward_frame(&buf, &tx).await {
                // Receiver gone, the popup is shutting down.
                return;
            }
            buf.clear();
        }
        if !discarding {
            buf.extend_from_slice(data);
            if buf.len() > MAX_LINE_LENGTH {
                warn!(
                    "Dropping oversized status frame (over {} bytes)",
                    MAX_LINE_LENGTH
                );
                buf.clear();
                discarding = true;
            }
        }
    }
}

/// Parse one complete frame and hand it to the popup. Returns false once
/// the receiver is gone.
async fn forward_frame(frame: &[u8], tx: &mpsc::Sender<StatusUpdate>) -> bool {
    let line = String::from_utf8_lossy(frame);
    if line.trim().is_empty() {
        return true;
    }
    match StatusUpdate::parse(&line) {
        Ok(update) => tx.send(update).await.is_ok(),
        Err(e) => {
            warn!("Dropping unparseable status frame: {}", e);
            true
        }
    }
}
