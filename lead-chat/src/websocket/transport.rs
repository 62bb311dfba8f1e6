//! Streaming transport seam
//!
//! The session only sees a sink of outbound text and a stream of inbound
//! text frames; [`TungsteniteConnector`] provides them over a real WebSocket.

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use futures_util::{future, Sink, SinkExt, StreamExt};
use std::pin::Pin;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{protocol::Message, Error as WsError},
};
use tracing::debug;

use crate::error::{ChatError, ChatResult};

pub type FrameSink = Pin<Box<dyn Sink<String, Error = ChatError> + Send>>;
pub type FrameStream = BoxStream<'static, ChatResult<String>>;

/// An open bidirectional connection. The stream ending means the peer closed.
pub struct Connection {
    pub sink: FrameSink,
    pub stream: FrameStream,
}

#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, url: &str) -> ChatResult<Connection>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TungsteniteConnector;

#[async_trait]
impl Connector for TungsteniteConnector {
    async fn connect(&self, url: &str) -> ChatResult<Connection> {
        let (ws, response) = connect_async(url).await?;
        debug!("WebSocket handshake complete, status {}", response.status());

        let (write, read) = ws.split();

        let sink = write
            .with(|text: String| future::ready(Ok::<_, WsError>(Message::text(text))))
            .sink_map_err(ChatError::from);

        // Control frames are answered by tungstenite itself; only text matters here.
        let stream = read.filter_map(|frame| {
            future::ready(match frame {
                Ok(Message::Text(text)) => Some(Ok(text.as_str().to_owned())),
                Ok(Message::Close(reason)) => {
                    debug!("Server sent close frame: {:?}", reason);
                    None
                }
                Ok(_) => None,
                Err(e) => Some(Err(ChatError::from(e))),
            })
        });

        Ok(Connection {
            sink: Box::pin(sink),
            stream: stream.boxed(),
        })
    }
}
