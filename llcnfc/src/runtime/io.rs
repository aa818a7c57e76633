// llcnfc-rs/llcnfc/src/runtime/io.rs

use super::Internal;
use crate::error::TransportError;
use crate::link::Event;
use crate::transport::{Transport, TransportResult};
use log::{debug, trace};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::{mpsc, watch};

struct Request<T> {
    epoch: u64,
    body: T,
}

/// [`Transport`] over a tokio byte stream.
///
/// `write` and `read` queue the request for the writer and reader tasks;
/// `abort` bumps the epoch, cancelling in-flight requests and skipping
/// queued ones.
pub struct StreamTransport {
    writes: mpsc::UnboundedSender<Request<Vec<u8>>>,
    reads: mpsc::UnboundedSender<Request<usize>>,
    abort: watch::Sender<u64>,
    epoch: u64,
}

impl StreamTransport {
    /// Split `stream` and spawn its reader and writer tasks. Completions
    /// are posted to `events`. Must be called inside a tokio runtime.
    pub(crate) fn spawn<S>(stream: S, events: mpsc::UnboundedSender<Internal>) -> Self
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let (rd, wr) = tokio::io::split(stream);
        let (writes, write_rx) = mpsc::unbounded_channel();
        let (reads, read_rx) = mpsc::unbounded_channel();
        let (abort, abort_rx) = watch::channel(0u64);
        tokio::spawn(writer(wr, write_rx, abort_rx.clone(), events.clone()));
        tokio::spawn(reader(rd, read_rx, abort_rx, events));
        Self {
            writes,
            reads,
            abort,
            epoch: 0,
        }
    }

    /// Epoch of requests issued since the last abort.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

fn stopped() -> TransportError {
    TransportError::Io("stream task stopped".into())
}

fn io_error(e: std::io::Error) -> TransportError {
    TransportError::Io(e.to_string())
}

impl Transport for StreamTransport {
    fn write(&mut self, data: &[u8]) -> TransportResult<()> {
        let request = Request {
            epoch: self.epoch,
            body: data.to_vec(),
        };
        self.writes.send(request).map_err(|_| stopped())
    }

    fn read(&mut self, len: usize) -> TransportResult<()> {
        let request = Request {
            epoch: self.epoch,
            body: len,
        };
        self.reads.send(request).map_err(|_| stopped())
    }

    fn abort(&mut self) {
        self.epoch += 1;
        // nobody listening means both tasks are already gone
        let _ = self.abort.send(self.epoch);
    }
}

async fn write_flushed<W: AsyncWrite + Unpin>(wr: &mut W, data: &[u8]) -> TransportResult<()> {
    wr.write_all(data).await.map_err(io_error)?;
    wr.flush().await.map_err(io_error)
}

async fn writer<W: AsyncWrite + Unpin>(
    mut wr: W,
    mut requests: mpsc::UnboundedReceiver<Request<Vec<u8>>>,
    mut aborted: watch::Receiver<u64>,
    events: mpsc::UnboundedSender<Internal>,
) {
    while let Some(req) = requests.recv().await {
        if req.epoch != *aborted.borrow_and_update() {
            continue;
        }
        // the rest of a cancelled frame never reaches the stream
        let result = tokio::select! {
            r = write_flushed(&mut wr, &req.body) => r,
            _ = aborted.changed() => Err(TransportError::Aborted),
        };
        trace!("stream write of {} byte(s): {:?}", req.body.len(), result);
        let event = Event::WriteComplete(result);
        if events.send(Internal::Io { epoch: req.epoch, event }).is_err() {
            break;
        }
    }
    debug!("stream writer stopped");
}

async fn reader<R: AsyncRead + Unpin>(
    mut rd: R,
    mut requests: mpsc::UnboundedReceiver<Request<usize>>,
    mut aborted: watch::Receiver<u64>,
    events: mpsc::UnboundedSender<Internal>,
) {
    while let Some(req) = requests.recv().await {
        if req.epoch != *aborted.borrow_and_update() {
            continue;
        }
        let mut buf = vec![0u8; req.body];
        let outcome = tokio::select! {
            r = rd.read_exact(&mut buf) => Some(r),
            _ = aborted.changed() => None,
        };
        let result = match outcome {
            Some(Ok(_)) => Ok(buf),
            Some(Err(e)) => Err(io_error(e)),
            None => Err(TransportError::Aborted),
        };
        let event = Event::ReadComplete(result);
        if events.send(Internal::Io { epoch: req.epoch, event }).is_err() {
            break;
        }
    }
    debug!("stream reader stopped");
}
