use std::io;
use std::net::SocketAddr;

use bytes::BytesMut;
use futures::{SinkExt, StreamExt};
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpStream, lookup_host};
use tokio::runtime::Handle;
use tokio::select;
use tokio::task::JoinHandle;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, error, info, warn};

use crate::codec::{RequestEncoder, ResponseDecoder};
use crate::ensure;
use crate::handler::Callback;
use crate::protocol::{ExchangeError, ExchangeRequest, ExchangeResult, ResponsePart};

/// A single request/response exchange over its own TCP connection.
///
/// `HttpExchange` owns every per-exchange resource: the socket halves once
/// connected, the framed read and write buffers, and the deadline racing the
/// whole sequence. Stages run strictly in order (resolve, connect, write,
/// read status line, read headers, read body) and whichever terminal
/// outcome is reached first (natural completion, stage failure, or the
/// deadline firing) produces the one and only [`ExchangeResult`].
///
/// Nothing is shared between exchanges; concurrent exchanges on the same
/// runtime each own an independent connection and deadline.
pub struct HttpExchange {
    handle: Handle,
    request: ExchangeRequest,
}

/// Stage of an in-flight exchange, advanced by one resume function each.
enum ExchangeState {
    Resolving,
    Connecting(Vec<SocketAddr>),
    Writing(TcpStream),
    Reading(FramedRead<OwnedReadHalf, ResponseDecoder>, OwnedWriteHalf),
    Done(String, String, OwnedWriteHalf),
}

impl HttpExchange {
    /// Binds an exchange to the runtime handle that will drive it.
    ///
    /// The handle is an explicit constructor argument: the exchange never
    /// reaches for ambient runtime state, so an embedding host decides which
    /// loop carries the work.
    pub fn new(handle: Handle, request: ExchangeRequest) -> Self {
        Self { handle, request }
    }

    /// Spawns the exchange on its runtime handle and fires `callback` with
    /// the result, exactly once, from the spawned task.
    pub fn spawn<C>(self, callback: C) -> JoinHandle<()>
    where
        C: Callback + Send + 'static,
    {
        let handle = self.handle.clone();
        handle.spawn(async move {
            let result = self.run().await;
            debug!(error = result.error_text(), "dispatching result to callback");
            callback.on_complete(result);
        })
    }

    /// Drives the exchange to its terminal outcome on the awaiting runtime.
    ///
    /// The staged sequence races a single deadline armed for the whole
    /// exchange. When the deadline wins, the in-flight stage future is
    /// dropped, which cancels its pending I/O and closes the socket, and the
    /// result reports a timeout. When the sequence wins, the deadline is
    /// dropped and cannot fire afterwards; the two arms are exclusive, which
    /// is what guarantees at most one terminal outcome.
    pub async fn run(self) -> ExchangeResult {
        let timeout = self.request.timeout();
        tokio::pin! {
            let deadline = tokio::time::sleep(timeout);
            let drive = drive(&self.request);
        }

        select! {
            biased;

            outcome = &mut drive => match outcome {
                Ok((headers_text, body_text, mut write_half)) => {
                    // graceful shutdown only; an error here cannot change a
                    // result that is already decided
                    if let Err(e) = write_half.shutdown().await {
                        debug!(cause = %e, "shutdown after completion failed");
                    }
                    info!(headers = headers_text.len(), body = body_text.len(), "exchange completed");
                    ExchangeResult::success(headers_text, body_text)
                }
                Err(e) => {
                    error!(cause = %e, "exchange failed");
                    ExchangeResult::failure(&e)
                }
            },

            _ = &mut deadline => {
                warn!(?timeout, "deadline elapsed, aborting exchange");
                ExchangeResult::failure(&ExchangeError::timeout(timeout))
            }
        }
    }
}

impl std::fmt::Debug for HttpExchange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpExchange").field("request", &self.request).finish_non_exhaustive()
    }
}

/// Runs the staged sequence to natural completion or the first failure.
///
/// Returns the header and body text plus the write half kept around for the
/// dispatcher's graceful shutdown.
async fn drive(request: &ExchangeRequest) -> Result<(String, String, OwnedWriteHalf), ExchangeError> {
    let mut state = ExchangeState::Resolving;
    loop {
        state = match state {
            ExchangeState::Resolving => ExchangeState::Connecting(resolve(request).await?),

            ExchangeState::Connecting(endpoints) => ExchangeState::Writing(connect(endpoints).await?),

            ExchangeState::Writing(stream) => {
                let (framed_read, write_half) = write_request(stream, request).await?;
                ExchangeState::Reading(framed_read, write_half)
            }

            ExchangeState::Reading(framed_read, write_half) => {
                let (headers_text, body_text) = read_response(framed_read).await?;
                ExchangeState::Done(headers_text, body_text, write_half)
            }

            ExchangeState::Done(headers_text, body_text, write_half) => {
                return Ok((headers_text, body_text, write_half));
            }
        };
    }
}

/// Turns the host string into the ordered endpoint candidates.
async fn resolve(request: &ExchangeRequest) -> Result<Vec<SocketAddr>, ExchangeError> {
    let authority = request.authority();
    debug!(%authority, "resolving");

    let endpoints: Vec<SocketAddr> = lookup_host(authority.as_str()).await.map_err(ExchangeError::resolve)?.collect();
    ensure!(
        !endpoints.is_empty(),
        ExchangeError::resolve(io::Error::new(io::ErrorKind::NotFound, "resolver returned no endpoints"))
    );

    debug!(count = endpoints.len(), "resolved endpoint candidates");
    Ok(endpoints)
}

/// Attempts each candidate in resolution order until one connects.
async fn connect(endpoints: Vec<SocketAddr>) -> Result<TcpStream, ExchangeError> {
    let attempts = endpoints.len();
    let mut last_error = None;

    for endpoint in endpoints {
        match TcpStream::connect(endpoint).await {
            Ok(stream) => {
                info!(%endpoint, "connected");
                return Ok(stream);
            }
            Err(e) => {
                debug!(%endpoint, cause = %e, "endpoint failed, trying next");
                last_error = Some(e);
            }
        }
    }

    Err(ExchangeError::connect(attempts, last_error))
}

/// Serializes and writes the full request, continuing partial writes until
/// the buffer is drained.
async fn write_request(
    stream: TcpStream,
    request: &ExchangeRequest,
) -> Result<(FramedRead<OwnedReadHalf, ResponseDecoder>, OwnedWriteHalf), ExchangeError> {
    let (read_half, write_half) = stream.into_split();

    let mut framed_write = FramedWrite::new(write_half, RequestEncoder);
    framed_write.send(request).await?;
    debug!("request written");

    let framed_read = FramedRead::with_capacity(read_half, ResponseDecoder::new(), 8 * 1024);
    Ok((framed_read, framed_write.into_inner()))
}

/// Consumes the decoded part stream through body end-of-stream.
async fn read_response(
    mut framed_read: FramedRead<OwnedReadHalf, ResponseDecoder>,
) -> Result<(String, String), ExchangeError> {
    let mut headers_text = String::new();
    let mut body = BytesMut::new();

    while let Some(part) = framed_read.next().await {
        match part? {
            ResponsePart::Status(status_line) => {
                debug!(code = status_line.status().as_u16(), "read status line");
            }
            ResponsePart::Headers(text) => {
                debug!(bytes = text.len(), "read header block");
                headers_text = text;
            }
            ResponsePart::Chunk(chunk) => body.extend_from_slice(&chunk),
            ResponsePart::Eof => break,
        }
    }

    Ok((headers_text, String::from_utf8_lossy(&body).into_owned()))
}
