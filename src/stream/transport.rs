use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::debug;
use zeromq::{ReqSocket, Socket, SocketRecv, SocketSend, ZmqMessage};

use crate::{error::TransportError, event::events::TrackId};

/// Acknowledgment sent after every received download chunk.
pub const ACK: &[u8] = b"ok";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub command: String,
    pub args: serde_json::Value,
}

impl Request {
    pub fn download(track: &TrackId) -> Self {
        Self {
            command: "down".to_owned(),
            args: serde_json::Value::String(track.to_string()),
        }
    }

    pub fn search(terms: &[String]) -> Self {
        Self {
            command: "search".to_owned(),
            args: terms.iter().cloned().map(serde_json::Value::String).collect(),
        }
    }
}

/// Strict request-reply link to the remote store: every frame sent gets
/// exactly one reply frame before the next one may be sent.
#[async_trait]
pub trait Transport: Send {
    async fn exchange(&mut self, frame: Bytes) -> Result<Bytes, TransportError>;

    async fn request(
        &mut self,
        request: &Request,
    ) -> Result<Bytes, TransportError> {
        let frame = serde_json::to_vec(request)?;
        self.exchange(Bytes::from(frame)).await
    }

    async fn acknowledge(&mut self) -> Result<Bytes, TransportError> {
        self.exchange(Bytes::from_static(ACK)).await
    }
}

/// ZeroMQ REQ socket. Connects on first use; after a failed exchange the
/// socket is dropped and the next exchange starts on a fresh one, since a REQ
/// socket can't send again until its pending request is answered.
pub struct ZmqTransport {
    endpoint: String,
    socket: Option<ReqSocket>,
}

impl ZmqTransport {
    /// `server` is either a full endpoint (`tcp://host:port`) or `host:port`.
    pub fn new(server: &str) -> Self {
        Self {
            endpoint: endpoint(server),
            socket: None,
        }
    }

    async fn socket(&mut self) -> Result<&mut ReqSocket, TransportError> {
        if self.socket.is_none() {
            let mut socket = ReqSocket::new();
            socket.connect(&self.endpoint).await?;
            debug!("Connected to {}", self.endpoint);
            self.socket = Some(socket);
        }

        self.socket.as_mut().ok_or(TransportError::Closed)
    }
}

fn endpoint(server: &str) -> String {
    if server.contains("://") {
        server.to_owned()
    } else {
        format!("tcp://{server}")
    }
}

#[async_trait]
impl Transport for ZmqTransport {
    async fn exchange(&mut self, frame: Bytes) -> Result<Bytes, TransportError> {
        let socket = self.socket().await?;

        let reply = match socket.send(ZmqMessage::from(frame)).await {
            Ok(()) => socket.recv().await,
            Err(e) => Err(e),
        };

        match reply {
            Ok(reply) => Ok(Bytes::from(reply.into_vec().concat())),
            Err(e) => {
                self.socket = None;
                Err(e.into())
            }
        }
    }
}
