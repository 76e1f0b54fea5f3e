//! Per-tool handle to the tessellation worker.

use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError};
use tracing::{debug, warn};
use vektor_ipc::{TessRequest, TessResponse};

use super::worker::{TessJob, WorkerCommand};
use super::TessError;

struct Pending {
    sequence: u64,
    reply: Receiver<TessResponse>,
}

/// Single-flight client: at most one request is outstanding at a time.
///
/// Each request gets its own reply channel, so a worker that dies or drops
/// the job shows up as a disconnect instead of a hang.
pub struct TessClient {
    tx_cmd: Sender<WorkerCommand>,
    pending: Option<Pending>,
}

impl std::fmt::Debug for TessClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TessClient")
            .field("in_flight", &self.in_flight())
            .finish()
    }
}

impl TessClient {
    pub(crate) fn new(tx_cmd: Sender<WorkerCommand>) -> Self {
        Self {
            tx_cmd,
            pending: None,
        }
    }

    /// Sequence number of the outstanding request, if any
    pub fn in_flight(&self) -> Option<u64> {
        self.pending.as_ref().map(|p| p.sequence)
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// Send a request. Fails if one is already in flight or the worker is
    /// gone.
    pub fn submit(&mut self, request: TessRequest) -> Result<(), TessError> {
        if let Some(in_flight) = self.in_flight() {
            return Err(TessError::Busy { in_flight });
        }
        let sequence = request.sequence;
        let (reply_tx, reply_rx) = crossbeam_channel::bounded(1);
        self.tx_cmd
            .send(WorkerCommand::Tessellate(TessJob {
                request,
                reply: reply_tx,
            }))
            .map_err(|_| TessError::Disconnected)?;
        debug!("TessClient::submit: sequence {}", sequence);
        self.pending = Some(Pending {
            sequence,
            reply: reply_rx,
        });
        Ok(())
    }

    /// Non-blocking check for the outstanding response.
    ///
    /// A lost worker turns into a failed response for the pending sequence.
    pub fn poll(&mut self) -> Option<TessResponse> {
        let pending = self.pending.as_ref()?;
        let response = match pending.reply.try_recv() {
            Ok(response) => response,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => {
                warn!("TessClient::poll: worker dropped sequence {}", pending.sequence);
                TessResponse::failed(pending.sequence, TessError::Disconnected.to_string())
            }
        };
        self.pending = None;
        Some(response)
    }

    /// Block until the response for `sequence` arrives or `timeout` passes.
    ///
    /// On timeout the request is abandoned; its late answer is never seen.
    pub fn wait_for(&mut self, sequence: u64, timeout: Duration) -> Result<TessResponse, TessError> {
        let Some(pending) = self.pending.take() else {
            return Err(TessError::NotPending(sequence));
        };
        if pending.sequence != sequence {
            // Not the one the caller wants: drop it
            debug!(
                "TessClient::wait_for: discarding sequence {} while waiting for {}",
                pending.sequence, sequence
            );
            return Err(TessError::NotPending(sequence));
        }
        match pending.reply.recv_timeout(timeout) {
            Ok(response) => Ok(response),
            Err(RecvTimeoutError::Timeout) => Err(TessError::Timeout { sequence }),
            Err(RecvTimeoutError::Disconnected) => Err(TessError::Disconnected),
        }
    }

    /// Wait for whatever is in flight and throw it away
    pub fn drain(&mut self, timeout: Duration) {
        if let Some(sequence) = self.in_flight() {
            match self.wait_for(sequence, timeout) {
                Ok(_) => debug!("TessClient::drain: discarded sequence {}", sequence),
                Err(e) => warn!("TessClient::drain: {}", e),
            }
        }
    }

    /// Forget the outstanding request without waiting
    pub fn abandon(&mut self) {
        self.pending = None;
    }
}
