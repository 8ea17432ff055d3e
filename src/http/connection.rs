use std::io;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, trace, warn};

use crate::http::mime::MimeType;
use crate::http::parser::parse_request_line;
use crate::http::reader::{self, LineError, TransferError};
use crate::http::request::{HeaderStore, Method, RequestContext};
use crate::http::response::StatusCode;
use crate::http::router::Router;
use crate::http::writer;
use crate::net::{Connection, LocalAddress};
use crate::time::Clock;

/// Default size of the line/transfer buffer.
pub const BUFFER_SIZE: usize = 255;
/// Default wait for request data, per line and per body chunk.
pub const TIME_OUT: Duration = Duration::from_secs(30);

const MIN_BUFFER_SIZE: usize = 16;

type Stream = BufReader<Box<dyn Connection>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Idle,
    ReadingRequestLine,
    ReadingHeaders,
    Routing,
    Handling,
    Closing,
}

/// Runs one request per accepted connection, start to finish.
///
/// The dispatcher owns a single scratch buffer that line reads, body
/// transfers and file sends go through, so it is not reentrant: one
/// connection at a time. Each connection is additionally read through a
/// `BufReader` of the same size, allocated per connection and dropped on
/// close.
pub struct Dispatcher<V> {
    router: Router<V>,
    headers: HeaderStore,
    volume: V,
    local: Arc<dyn LocalAddress>,
    clock: Option<Arc<Clock>>,
    scratch: Box<[u8]>,
    timeout: Duration,
    stream: Option<Stream>,
    request: Option<RequestContext>,
    state: ConnectionState,
}

fn not_connected() -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, "no client connected")
}

impl<V> Dispatcher<V> {
    pub fn new(router: Router<V>, volume: V, headers: HeaderStore, local: Arc<dyn LocalAddress>) -> Self {
        Self {
            router,
            headers,
            volume,
            local,
            clock: None,
            scratch: vec![0; BUFFER_SIZE].into_boxed_slice(),
            timeout: TIME_OUT,
            stream: None,
            request: None,
            state: ConnectionState::Idle,
        }
    }

    /// Clock used to stamp stored files.
    pub fn with_clock(mut self, clock: Arc<Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.scratch = vec![0; size.max(MIN_BUFFER_SIZE)].into_boxed_slice();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Decoded path of the current request, empty between requests.
    pub fn path(&self) -> &str {
        self.request.as_ref().map(|r| r.path.as_str()).unwrap_or("")
    }

    pub fn method(&self) -> Method {
        self.request
            .as_ref()
            .map(|r| r.method)
            .unwrap_or(Method::UNKNOWN)
    }

    /// Value the current request sent for a registered header.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    pub fn content_length(&self) -> u64 {
        self.headers.content_length()
    }

    pub fn volume(&self) -> &V {
        &self.volume
    }

    pub fn local_ip(&self) -> Ipv4Addr {
        self.local.local_ip()
    }

    pub fn clock(&self) -> Option<&Clock> {
        self.clock.as_deref()
    }

    fn enter(&mut self, state: ConnectionState) {
        trace!(from = ?self.state, to = ?state, "dispatcher state");
        self.state = state;
    }

    /// Handles the request on `conn` and closes it.
    ///
    /// Returns `true` if a request line was read and routed, `false` if the
    /// client was answered with 408 instead. Header values and the request
    /// path are released on every path out.
    pub async fn serve<C: Connection + 'static>(&mut self, conn: C) -> bool {
        let boxed: Box<dyn Connection> = Box::new(conn);
        self.stream = Some(BufReader::with_capacity(self.scratch.len(), boxed));

        let processed = match self.dispatch().await {
            Ok(processed) => processed,
            Err(e) => {
                warn!(path = %self.path(), error = %e, "request failed");
                self.request.is_some()
            }
        };

        self.close().await;
        processed
    }

    async fn dispatch(&mut self) -> anyhow::Result<bool> {
        self.enter(ConnectionState::ReadingRequestLine);
        let len = match self.read_line().await {
            Ok(len) if len > 0 => len,
            Ok(_) => {
                debug!("empty request line");
                return self.reject_timeout().await;
            }
            Err(e) => {
                debug!(error = %e, "request line not received");
                return self.reject_timeout().await;
            }
        };

        let request = parse_request_line(&mut self.scratch[..len]);
        debug!(method = ?request.method, path = %request.path, "new request");
        self.request = Some(request);

        self.enter(ConnectionState::ReadingHeaders);
        match self.read_headers().await {
            Ok(captured) => trace!(captured, "headers complete"),
            Err(e) => {
                debug!(error = %e, "headers not received");
                return self.reject_timeout().await;
            }
        }

        self.enter(ConnectionState::Routing);
        let handler = self
            .router
            .find(self.path(), self.method())
            .map(|route| route.handler);

        match handler {
            Some(handler) => {
                self.enter(ConnectionState::Handling);
                handler(self).await?;
            }
            None => {
                debug!(method = ?self.method(), path = %self.path(), "no route");
                self.send_http_result(StatusCode::NotFound, None, None).await?;
            }
        }

        Ok(true)
    }

    async fn reject_timeout(&mut self) -> anyhow::Result<bool> {
        self.send_http_result(StatusCode::RequestTimeout, None, None)
            .await?;
        Ok(false)
    }

    async fn read_line(&mut self) -> Result<usize, LineError> {
        let stream = self.stream.as_mut().ok_or(LineError::Closed)?;
        reader::read_line(stream, &mut self.scratch, self.timeout).await
    }

    /// Reads header lines up to the blank one. A line that does not fit the
    /// buffer is skipped, its tail included.
    async fn read_headers(&mut self) -> Result<usize, LineError> {
        let mut captured = 0;
        let mut continuation = false;
        loop {
            match self.read_line().await {
                Ok(0) if !continuation => return Ok(captured),
                Ok(len) => {
                    if !continuation && self.headers.capture(&self.scratch[..len]) {
                        captured += 1;
                    }
                    continuation = false;
                }
                Err(LineError::Overflow(size)) => {
                    debug!(size, "skipping oversized header line");
                    continuation = true;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn close(&mut self) {
        self.enter(ConnectionState::Closing);
        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = stream.shutdown().await {
                debug!(error = %e, "shutdown failed");
            }
        }
        self.headers.clear();
        self.request = None;
        self.enter(ConnectionState::Idle);
    }

    /// Writes the response head. Pass `mime` to add a Content-Type line;
    /// `extra` is sent verbatim, each line terminated with CRLF.
    pub async fn send_http_result(
        &mut self,
        code: StatusCode,
        mime: Option<MimeType>,
        extra: Option<&str>,
    ) -> io::Result<()> {
        debug!(status = code.as_u16(), "returning {}", code);
        let stream = self.stream.as_mut().ok_or_else(not_connected)?;
        writer::write_head(stream, code, mime, extra).await
    }

    /// Writes raw body bytes to the client.
    pub async fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        let stream = self.stream.as_mut().ok_or_else(not_connected)?;
        stream.write_all(bytes).await
    }

    /// Streams an open file to the client through the scratch buffer.
    pub async fn send_file<R: AsyncRead + Unpin>(&mut self, file: &mut R) -> io::Result<u64> {
        let stream = self.stream.as_mut().ok_or_else(not_connected)?;
        writer::send_file(file, stream, &mut self.scratch).await
    }

    /// Moves `expected` request body bytes into `sink`.
    pub async fn receive_into<W: AsyncWrite + Unpin>(
        &mut self,
        sink: &mut W,
        expected: u64,
    ) -> Result<u64, TransferError> {
        let stream = self.stream.as_mut().ok_or_else(not_connected)?;
        reader::copy_body(stream, sink, &mut self.scratch, expected, self.timeout).await
    }

    /// Reads a short body of exactly `len` bytes, e.g. a new file name.
    pub async fn receive_text(&mut self, len: u64) -> Result<String, TransferError> {
        let capacity = self.scratch.len();
        let size = usize::try_from(len)
            .ok()
            .filter(|&size| size <= capacity)
            .ok_or(TransferError::TooLarge {
                declared: len,
                capacity,
            })?;

        let stream = self.stream.as_mut().ok_or_else(not_connected)?;
        reader::fill(stream, &mut self.scratch[..size], self.timeout).await?;
        Ok(String::from_utf8_lossy(&self.scratch[..size]).into_owned())
    }
}
