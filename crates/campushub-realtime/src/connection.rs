//! Raw WebSocket connection management.
//!
//! [`open`] dials the push service and returns a [`Socket`] command handle
//! plus a stream of parsed inbound frames. Two tasks own the connection:
//! a read task that parses text messages into frames, and a write task
//! that serializes outbound commands. Both end when the connection does.

use campushub_core::{AppError, AppResult};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, warn};

use crate::protocol::Frame;

enum SocketCommand {
    Send(Frame),
    Close,
}

/// Handle for writing to an open connection.
#[derive(Debug, Clone)]
pub(crate) struct Socket {
    commands: mpsc::UnboundedSender<SocketCommand>,
}

impl Socket {
    /// Queues a frame for sending.
    pub(crate) fn send(&self, frame: Frame) -> AppResult<()> {
        self.commands
            .send(SocketCommand::Send(frame))
            .map_err(|_| AppError::transport("Connection task is gone"))
    }

    /// Queues a close handshake. Errors are ignored; a gone connection is
    /// already closed.
    pub(crate) fn close(&self) {
        let _ = self.commands.send(SocketCommand::Close);
    }
}

/// Dials the push service and spawns the read/write tasks.
pub(crate) async fn open(
    url: &str,
) -> AppResult<(Socket, mpsc::UnboundedReceiver<Frame>)> {
    let (stream, _) = connect_async(url)
        .await
        .map_err(|e| AppError::transport(format!("WebSocket connect failed: {e}")))?;
    let (mut write, mut read) = stream.split();

    let (frame_tx, frame_rx) = mpsc::unbounded_channel();
    let (command_tx, mut command_rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        while let Some(message) = read.next().await {
            match message {
                Ok(Message::Text(text)) => match Frame::parse(text.as_str()) {
                    Ok(frame) => {
                        if frame_tx.send(frame).is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!(error = %e, "Dropping unparseable frame"),
                },
                Ok(Message::Close(_)) => {
                    debug!("Push service closed the connection");
                    break;
                }
                // Pong replies are handled inside tungstenite.
                Ok(_) => {}
                Err(e) => {
                    warn!(error = %e, "WebSocket read failed");
                    break;
                }
            }
        }
    });

    tokio::spawn(async move {
        while let Some(command) = command_rx.recv().await {
            match command {
                SocketCommand::Send(frame) => {
                    if let Err(e) = write.send(Message::text(frame.to_text())).await {
                        warn!(error = %e, "WebSocket write failed");
                        break;
                    }
                }
                SocketCommand::Close => {
                    let _ = write.send(Message::Close(None)).await;
                    break;
                }
            }
        }
    });

    Ok((Socket { commands: command_tx }, frame_rx))
}
