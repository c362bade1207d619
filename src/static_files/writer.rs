//! Response writing
//!
//! Turns a precondition outcome into a response on a [`ResponseSink`]:
//! status-only for 304/412, otherwise caching headers plus the file body
//! streamed in `block_size` chunks.

use std::future::Future;
use std::io;

use hyper::body::Bytes;
use hyper::header::{HeaderName, HeaderValue, CONTENT_LENGTH, CONTENT_TYPE, ETAG, LAST_MODIFIED};
use hyper::StatusCode;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_util::sync::CancellationToken;

use super::precondition::PreconditionOutcome;
use super::resource::Resource;
use crate::http::date::format_http_date;
use crate::logger;

/// Destination of one response
///
/// Status and headers may be set until the first [`ResponseSink::write`].
pub trait ResponseSink: Send {
    fn set_status(&mut self, status: StatusCode);

    fn set_header(&mut self, name: HeaderName, value: HeaderValue);

    /// Resolves once the chunk has been accepted
    fn write(&mut self, chunk: Bytes) -> impl Future<Output = io::Result<()>> + Send;
}

/// Per-request streaming settings
#[derive(Debug, Clone, Copy)]
pub struct WriteOptions {
    pub block_size: usize,
    /// `false` for `HEAD`: headers only, the file is not opened
    pub include_body: bool,
}

/// How a body stream ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Streamed {
    Complete { bytes: u64, chunks: u64 },
    Cancelled { bytes: u64 },
}

/// Write the response for `outcome`
///
/// I/O failures are returned unchanged; the caller must not present the
/// response as complete when this errs.
pub async fn respond<S: ResponseSink>(
    outcome: PreconditionOutcome,
    resource: &Resource,
    content_type: &str,
    sink: &mut S,
    options: WriteOptions,
    cancel: &CancellationToken,
) -> io::Result<()> {
    match outcome {
        PreconditionOutcome::Unspecified | PreconditionOutcome::ShouldProcess => {
            sink.set_status(StatusCode::OK);
            sink.set_header(
                LAST_MODIFIED,
                header_value(&format_http_date(&resource.last_modified))?,
            );
            sink.set_header(ETAG, header_value(&resource.quoted_etag())?);
            sink.set_header(CONTENT_TYPE, header_value(content_type)?);
            sink.set_header(CONTENT_LENGTH, HeaderValue::from(resource.length));

            if !options.include_body {
                return Ok(());
            }

            let file = tokio::fs::File::open(&resource.path).await?;
            let streamed =
                stream_body(file, resource.length, options.block_size, sink, cancel).await?;
            match streamed {
                Streamed::Complete { bytes, chunks } => {
                    logger::log_stream_finished(&resource.path, bytes, chunks);
                }
                Streamed::Cancelled { bytes } => {
                    logger::log_stream_cancelled(&resource.path, bytes);
                }
            }
            Ok(())
        }
        PreconditionOutcome::NotModified => {
            sink.set_status(StatusCode::NOT_MODIFIED);
            Ok(())
        }
        PreconditionOutcome::PreconditionFailed => {
            sink.set_status(StatusCode::PRECONDITION_FAILED);
            Ok(())
        }
    }
}

/// Copy exactly `length` bytes of `reader` into `sink` one chunk at a time
///
/// `length` is the `Content-Length` already promised to the client. Bytes
/// past it are never read; hitting EOF before it is an `UnexpectedEof`
/// error, so a file that shrank mid-request aborts the response instead of
/// ending it short. The reader is owned and dropped on every exit path, so
/// the file handle is released on completion, cancellation and error alike.
/// Cancellation is checked after each read; once seen nothing more is
/// written.
pub async fn stream_body<R, S>(
    reader: R,
    length: u64,
    block_size: usize,
    sink: &mut S,
    cancel: &CancellationToken,
) -> io::Result<Streamed>
where
    R: AsyncRead + Unpin,
    S: ResponseSink,
{
    let mut reader = reader.take(length);
    let mut buf = vec![0u8; block_size.max(1)];
    let mut bytes = 0u64;
    let mut chunks = 0u64;

    loop {
        let read = reader.read(&mut buf).await?;
        if cancel.is_cancelled() {
            return Ok(Streamed::Cancelled { bytes });
        }
        if read == 0 {
            if bytes < length {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("file ended after {bytes} of {length} bytes"),
                ));
            }
            return Ok(Streamed::Complete { bytes, chunks });
        }

        sink.write(Bytes::copy_from_slice(&buf[..read])).await?;
        bytes += read as u64;
        chunks += 1;
    }
}

fn header_value(value: &str) -> io::Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::header::HeaderMap;
    use std::path::PathBuf;
    use std::pin::Pin;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::task::{Context, Poll};
    use std::time::SystemTime;
    use tokio::io::ReadBuf;

    /// Records everything written; can raise cancellation after N writes
    #[derive(Default)]
    struct RecordingSink {
        status: Option<StatusCode>,
        headers: HeaderMap,
        writes: Vec<Bytes>,
        cancel_after: Option<(usize, CancellationToken)>,
    }

    impl ResponseSink for RecordingSink {
        fn set_status(&mut self, status: StatusCode) {
            self.status = Some(status);
        }

        fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
            self.headers.insert(name, value);
        }

        fn write(&mut self, chunk: Bytes) -> impl Future<Output = io::Result<()>> + Send {
            self.writes.push(chunk);
            if let Some((limit, token)) = &self.cancel_after {
                if self.writes.len() >= *limit {
                    token.cancel();
                }
            }
            std::future::ready(Ok(()))
        }
    }

    /// In-memory file that reports reads and its own release
    struct FakeFile {
        data: io::Cursor<Vec<u8>>,
        reads: Arc<AtomicUsize>,
        closed: Arc<AtomicBool>,
        fail_after: Option<usize>,
    }

    impl FakeFile {
        fn new(data: Vec<u8>) -> (Self, Arc<AtomicUsize>, Arc<AtomicBool>) {
            let reads = Arc::new(AtomicUsize::new(0));
            let closed = Arc::new(AtomicBool::new(false));
            let file = Self {
                data: io::Cursor::new(data),
                reads: Arc::clone(&reads),
                closed: Arc::clone(&closed),
                fail_after: None,
            };
            (file, reads, closed)
        }
    }

    impl AsyncRead for FakeFile {
        fn poll_read(
            mut self: Pin<&mut Self>,
            cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            let done = self.reads.fetch_add(1, Ordering::SeqCst);
            if self.fail_after.is_some_and(|limit| done >= limit) {
                return Poll::Ready(Err(io::Error::other("disk gone")));
            }
            Pin::new(&mut self.data).poll_read(cx, buf)
        }
    }

    impl Drop for FakeFile {
        fn drop(&mut self) {
            self.closed.store(true, Ordering::SeqCst);
        }
    }

    fn sample(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    fn resource_at(path: PathBuf, length: u64) -> Resource {
        Resource::new(path, length, SystemTime::UNIX_EPOCH)
    }

    #[tokio::test]
    async fn test_empty_file_no_writes() {
        let (file, reads, closed) = FakeFile::new(Vec::new());
        let mut sink = RecordingSink::default();

        let streamed = stream_body(file, 0, 16, &mut sink, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(streamed, Streamed::Complete { bytes: 0, chunks: 0 });
        assert!(sink.writes.is_empty());
        assert!(reads.load(Ordering::SeqCst) <= 1);
        assert!(closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_chunks_concatenate_to_source() {
        let data = sample(100);
        let (file, _, closed) = FakeFile::new(data.clone());
        let mut sink = RecordingSink::default();

        let streamed = stream_body(file, 100, 32, &mut sink, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(streamed, Streamed::Complete { bytes: 100, chunks: 4 });
        let sizes: Vec<usize> = sink.writes.iter().map(Bytes::len).collect();
        assert_eq!(sizes, vec![32, 32, 32, 4]);
        assert_eq!(sink.writes.concat(), data);
        assert!(closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_cancel_stops_writes_and_releases_file() {
        let cancel = CancellationToken::new();
        let (file, reads, closed) = FakeFile::new(sample(100));
        let mut sink = RecordingSink {
            cancel_after: Some((2, cancel.clone())),
            ..Default::default()
        };

        let streamed = stream_body(file, 100, 10, &mut sink, &cancel).await.unwrap();

        assert_eq!(streamed, Streamed::Cancelled { bytes: 20 });
        assert_eq!(sink.writes.len(), 2);
        // One read after the cancel, then nothing
        assert_eq!(reads.load(Ordering::SeqCst), 3);
        assert!(closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_cancel_before_start_writes_nothing() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let (file, _, closed) = FakeFile::new(sample(10));
        let mut sink = RecordingSink::default();

        let streamed = stream_body(file, 10, 4, &mut sink, &cancel).await.unwrap();

        assert_eq!(streamed, Streamed::Cancelled { bytes: 0 });
        assert!(sink.writes.is_empty());
        assert!(closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_read_error_propagates_and_releases_file() {
        let (mut file, _, closed) = FakeFile::new(sample(100));
        file.fail_after = Some(1);
        let mut sink = RecordingSink::default();

        let err = stream_body(file, 100, 10, &mut sink, &CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "disk gone");
        assert_eq!(sink.writes.len(), 1);
        assert!(closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_grown_file_stops_at_promised_length() {
        let data = sample(100);
        let (file, _, closed) = FakeFile::new(data.clone());
        let mut sink = RecordingSink::default();

        let streamed = stream_body(file, 60, 32, &mut sink, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(streamed, Streamed::Complete { bytes: 60, chunks: 2 });
        assert_eq!(sink.writes.concat(), &data[..60]);
        assert!(closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_shrunk_file_is_unexpected_eof() {
        let (file, _, closed) = FakeFile::new(sample(50));
        let mut sink = RecordingSink::default();

        let err = stream_body(file, 80, 32, &mut sink, &CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
        assert_eq!(sink.writes.concat().len(), 50);
        assert!(closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_respond_status_only_outcomes() {
        let resource = resource_at(PathBuf::from("/nonexistent/file.txt"), 3);
        let options = WriteOptions {
            block_size: 8,
            include_body: true,
        };

        for (outcome, status) in [
            (PreconditionOutcome::NotModified, StatusCode::NOT_MODIFIED),
            (PreconditionOutcome::PreconditionFailed, StatusCode::PRECONDITION_FAILED),
        ] {
            let mut sink = RecordingSink::default();
            let cancel = CancellationToken::new();
            respond(outcome, &resource, "text/plain", &mut sink, options, &cancel)
                .await
                .unwrap();
            assert_eq!(sink.status, Some(status));
            assert!(sink.writes.is_empty());
            assert!(sink.headers.get(ETAG).is_none());
            assert!(sink.headers.get(LAST_MODIFIED).is_none());
        }
    }

    #[tokio::test]
    async fn test_respond_streams_file_with_headers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.bin");
        let data = sample(1000);
        std::fs::write(&path, &data).unwrap();
        let resource = resource_at(path, data.len() as u64);

        for outcome in [PreconditionOutcome::Unspecified, PreconditionOutcome::ShouldProcess] {
            let mut sink = RecordingSink::default();
            let options = WriteOptions {
                block_size: 256,
                include_body: true,
            };
            let content_type = "application/octet-stream";
            let cancel = CancellationToken::new();
            respond(outcome, &resource, content_type, &mut sink, options, &cancel)
                .await
                .unwrap();

            assert_eq!(sink.status, Some(StatusCode::OK));
            assert_eq!(sink.headers[ETAG], resource.quoted_etag().as_str());
            assert_eq!(sink.headers[LAST_MODIFIED], "Thu, 01 Jan 1970 00:00:00 GMT");
            assert_eq!(sink.headers[CONTENT_TYPE], "application/octet-stream");
            assert_eq!(sink.headers[CONTENT_LENGTH], "1000");
            assert_eq!(sink.writes.len(), 4);
            assert_eq!(sink.writes.concat(), data);
        }
    }

    #[tokio::test]
    async fn test_respond_head_skips_body() {
        // The file does not exist: a HEAD must not even open it
        let resource = resource_at(PathBuf::from("/nonexistent/file.txt"), 42);
        let mut sink = RecordingSink::default();
        let options = WriteOptions {
            block_size: 8,
            include_body: false,
        };

        let outcome = PreconditionOutcome::ShouldProcess;
        let cancel = CancellationToken::new();
        respond(outcome, &resource, "text/plain", &mut sink, options, &cancel)
            .await
            .unwrap();

        assert_eq!(sink.status, Some(StatusCode::OK));
        assert_eq!(sink.headers[CONTENT_LENGTH], "42");
        assert!(sink.writes.is_empty());
    }

    #[tokio::test]
    async fn test_respond_missing_file_is_error() {
        let resource = resource_at(PathBuf::from("/nonexistent/file.txt"), 42);
        let mut sink = RecordingSink::default();
        let options = WriteOptions {
            block_size: 8,
            include_body: true,
        };

        let outcome = PreconditionOutcome::ShouldProcess;
        let cancel = CancellationToken::new();
        let err = respond(outcome, &resource, "text/plain", &mut sink, options, &cancel)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(sink.writes.is_empty());
    }
}
