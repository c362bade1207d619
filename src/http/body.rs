//! Response body types
//!
//! Every response uses [`ResponseBody`]. Streamed file bodies are fed through
//! a bounded channel holding at most one chunk; the sending side awaits each
//! send, so the reader can never run ahead of the client.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use http_body_util::{combinators::UnsyncBoxBody, BodyExt, Empty, Full};
use hyper::body::{Body, Bytes, Frame};
use tokio::sync::mpsc;

/// Body type shared by all responses
pub type ResponseBody = UnsyncBoxBody<Bytes, io::Error>;

/// Empty body for status-only responses
pub fn empty() -> ResponseBody {
    Empty::<Bytes>::new()
        .map_err(|never| match never {})
        .boxed_unsync()
}

/// Fixed in-memory body
pub fn full(data: impl Into<Bytes>) -> ResponseBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed_unsync()
}

/// Create a streaming body and the handle that feeds it
pub fn channel() -> (BodySender, ChannelBody) {
    let (tx, rx) = mpsc::channel(1);
    (BodySender { tx }, ChannelBody { rx })
}

/// Receiving half, handed to hyper as the response body
#[derive(Debug)]
pub struct ChannelBody {
    rx: mpsc::Receiver<io::Result<Bytes>>,
}

impl ChannelBody {
    pub fn into_response_body(self) -> ResponseBody {
        self.boxed_unsync()
    }
}

impl Body for ChannelBody {
    type Data = Bytes;
    type Error = io::Error;

    fn poll_frame(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        self.rx
            .poll_recv(cx)
            .map(|item| item.map(|chunk| chunk.map(Frame::data)))
    }
}

/// Sending half
///
/// The body ends when every sender is dropped. An error sent through
/// [`BodySender::abort`] makes hyper tear down the connection instead of
/// finishing the response.
#[derive(Debug, Clone)]
pub struct BodySender {
    tx: mpsc::Sender<io::Result<Bytes>>,
}

impl BodySender {
    /// Queue one chunk, waiting until the previous one has been taken
    pub async fn send_data(&self, chunk: Bytes) -> io::Result<()> {
        self.tx
            .send(Ok(chunk))
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "response body dropped"))
    }

    /// Fail the body; a no-op when the receiver is already gone
    pub async fn abort(&self, err: io::Error) {
        let _ = self.tx.send(Err(err)).await;
    }

    /// Resolves once the receiving body has been dropped
    pub async fn closed(&self) {
        self.tx.closed().await;
    }
}
