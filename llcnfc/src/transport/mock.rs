// llcnfc-rs/llcnfc/src/transport/mock.rs

use crate::error::TransportError;
use crate::transport::traits::{Transport, TransportResult};
use std::collections::VecDeque;

/// Mock transport for tests. It records every write and read request and
/// never completes anything on its own; the test delivers completions.
#[derive(Debug, Default)]
pub struct MockTransport {
    /// Every buffer handed to `write`, in order.
    pub written: Vec<Vec<u8>>,
    /// Every length handed to `read`, in order.
    pub reads: Vec<usize>,
    /// Length of the read currently outstanding.
    pub pending_read: Option<usize>,
    /// A write was started and its completion has not been delivered.
    pub write_outstanding: bool,
    /// Testing hook: `write` calls made while another write was outstanding.
    pub overlapping_writes: usize,
    /// Testing hook: `read` calls made while another read was outstanding.
    pub overlapping_reads: usize,
    pub aborts: usize,
    /// Results for upcoming `write` calls; `Ok` once drained.
    pub write_results: VecDeque<TransportResult<()>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `write` call fail synchronously with `err`.
    pub fn fail_next_write(&mut self, err: TransportError) {
        self.write_results.push_back(Err(err));
    }

    pub fn last_written(&self) -> Option<&[u8]> {
        self.written.last().map(Vec::as_slice)
    }

    pub fn take_written(&mut self) -> Vec<Vec<u8>> {
        std::mem::take(&mut self.written)
    }

    /// Mark the outstanding write as finished (the caller then feeds the
    /// completion event to the link).
    pub fn finish_write(&mut self) -> bool {
        std::mem::replace(&mut self.write_outstanding, false)
    }

    /// Take the outstanding read request, if any.
    pub fn take_read(&mut self) -> Option<usize> {
        self.pending_read.take()
    }
}

impl Transport for MockTransport {
    fn write(&mut self, data: &[u8]) -> TransportResult<()> {
        if let Some(result) = self.write_results.pop_front() {
            result?;
        }
        if self.write_outstanding {
            self.overlapping_writes += 1;
        }
        self.write_outstanding = true;
        self.written.push(data.to_vec());
        Ok(())
    }

    fn read(&mut self, len: usize) -> TransportResult<()> {
        if self.pending_read.is_some() {
            self.overlapping_reads += 1;
        }
        self.pending_read = Some(len);
        self.reads.push(len);
        Ok(())
    }

    fn abort(&mut self) {
        self.aborts += 1;
        self.write_outstanding = false;
        self.pending_read = None;
    }
}
