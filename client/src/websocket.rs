use futures_util::{SinkExt, StreamExt, stream::SplitSink, stream::SplitStream};
use minefield_common::protocol::{ClientMessage, ServerMessage};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};
use tracing::{debug, info, warn};
use url::Url;

use crate::{ClientError, Result};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// A frame from the server, read in terms of the round.
#[derive(Debug)]
enum Incoming {
    Message(ServerMessage),
    Closed,
    Skip,
}

fn decode(frame: Message) -> Result<Incoming> {
    match frame {
        Message::Text(text) => Ok(Incoming::Message(serde_json::from_str(&text)?)),
        Message::Close(_) => Ok(Incoming::Closed),
        _ => Ok(Incoming::Skip),
    }
}

fn encode(action: &ClientMessage) -> Result<Message> {
    Ok(Message::Text(serde_json::to_string(action)?.into()))
}

/// Writes queued player actions until the queue closes or the socket fails.
async fn forward_actions(
    mut sink: SplitSink<WsStream, Message>,
    mut actions: mpsc::UnboundedReceiver<ClientMessage>,
) {
    while let Some(action) = actions.recv().await {
        let frame = match encode(&action) {
            Ok(frame) => frame,
            Err(e) => {
                warn!("Dropping action {:?}: {}", action, e);
                continue;
            }
        };
        if let Err(e) = sink.send(frame).await {
            warn!("Failed to send {:?}: {}", action, e);
            break;
        }
    }
    let _ = sink.close().await;
}

/// The player's connection to one round.
///
/// Actions are queued and written by a background task, so they can be sent
/// from any task holding [`MinefieldWebSocket::actions`].
pub struct MinefieldWebSocket {
    actions: mpsc::UnboundedSender<ClientMessage>,
    frames: SplitStream<WsStream>,
    writer: JoinHandle<()>,
}

impl MinefieldWebSocket {
    pub async fn connect(url: &Url) -> Result<Self> {
        info!("Joining round at {}", url);
        let (stream, _) = connect_async(url.as_str()).await?;
        let (sink, frames) = stream.split();
        let (actions, queue) = mpsc::unbounded_channel();

        Ok(Self {
            actions,
            frames,
            writer: tokio::spawn(forward_actions(sink, queue)),
        })
    }

    /// Cloneable handle for queueing actions.
    pub fn actions(&self) -> mpsc::UnboundedSender<ClientMessage> {
        self.actions.clone()
    }

    pub fn send(&self, action: ClientMessage) -> Result<()> {
        self.actions.send(action).map_err(|_| ClientError::Closed)
    }

    pub fn reveal(&self, index: usize) -> Result<()> {
        self.send(ClientMessage::Reveal { index })
    }

    pub fn restart(&self, level: u8) -> Result<()> {
        self.send(ClientMessage::Restart { level })
    }

    /// Next message from the server, skipping control and binary frames.
    /// `None` once the server has closed the round's connection.
    pub async fn next_message(&mut self) -> Result<Option<ServerMessage>> {
        while let Some(frame) = self.frames.next().await {
            match decode(frame?)? {
                Incoming::Message(message) => {
                    debug!("Server sent {:?}", message);
                    return Ok(Some(message));
                }
                Incoming::Closed => {
                    info!("Server closed the connection");
                    return Ok(None);
                }
                Incoming::Skip => continue,
            }
        }
        Ok(None)
    }

    /// Flushes queued actions and closes the connection.
    pub async fn close(self) -> Result<()> {
        drop(self.actions);
        let _ = self.writer.await;
        Ok(())
    }
}
