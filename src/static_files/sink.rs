//! hyper-backed response sink
//!
//! hyper wants the response head before it polls the body, while the writer
//! sets headers and then streams. [`HyperSink`] buffers status and headers
//! and hands the head over on the first body write, or when the writer
//! finishes without writing anything.

use std::future::Future;
use std::io;

use hyper::body::Bytes;
use hyper::header::{HeaderMap, HeaderName, HeaderValue};
use hyper::{Response, StatusCode};
use tokio::sync::oneshot;
use tokio_util::sync::{CancellationToken, DropGuard};

use super::writer::ResponseSink;
use crate::http::body::{self, BodySender, ChannelBody, ResponseBody};

/// Resolves to the response head; errs if the writer failed before sending it
pub type PendingResponse = oneshot::Receiver<Response<ResponseBody>>;

pub struct HyperSink {
    status: StatusCode,
    headers: HeaderMap,
    head: Option<oneshot::Sender<Response<ResponseBody>>>,
    body: Option<ChannelBody>,
    sender: BodySender,
    _finished: DropGuard,
}

impl HyperSink {
    /// Create a sink whose body drop (client gone) raises `cancel`
    pub fn new(cancel: CancellationToken) -> (Self, PendingResponse) {
        let (sender, body) = body::channel();
        let (head_tx, head_rx) = oneshot::channel();
        let finished = CancellationToken::new();

        let watcher = sender.clone();
        let done = finished.clone();
        tokio::spawn(async move {
            tokio::select! {
                () = watcher.closed() => cancel.cancel(),
                () = done.cancelled() => {}
            }
        });

        let sink = Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            head: Some(head_tx),
            body: Some(body),
            sender,
            _finished: finished.drop_guard(),
        };
        (sink, head_rx)
    }

    /// Whether the head has already gone to hyper
    pub const fn is_committed(&self) -> bool {
        self.head.is_none()
    }

    fn commit(&mut self, streaming: bool) {
        let Some(head) = self.head.take() else {
            return;
        };
        let body = match self.body.take() {
            Some(body) if streaming => body.into_response_body(),
            _ => body::empty(),
        };

        let mut response = Response::new(body);
        *response.status_mut() = self.status;
        *response.headers_mut() = std::mem::take(&mut self.headers);
        // Fails only when the request future is already gone
        let _ = head.send(response);
    }

    /// Close out the response once the writer returned `result`
    ///
    /// On error before the head was sent, the pending response errs and the
    /// caller answers 500. On error mid-body, the body is failed so hyper
    /// aborts the connection rather than end a truncated response cleanly.
    pub async fn finish(mut self, result: io::Result<()>) -> io::Result<()> {
        match result {
            Ok(()) => {
                self.commit(false);
                Ok(())
            }
            Err(err) => {
                if self.is_committed() {
                    self.sender
                        .abort(io::Error::new(err.kind(), err.to_string()))
                        .await;
                }
                Err(err)
            }
        }
    }
}

impl ResponseSink for HyperSink {
    fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    fn write(&mut self, chunk: Bytes) -> impl Future<Output = io::Result<()>> + Send {
        self.commit(true);
        let sender = &self.sender;
        async move { sender.send_data(chunk).await }
    }
}
