//! Off-thread polygon tessellation
//!
//! - [`fill`] - lyon sweep-line fill of closed contours
//! - [`worker`] - background thread answering [`vektor_ipc::TessRequest`]s
//! - [`client`] - single-flight per-tool handle with its own reply channel
//! - [`sequence`] - newest-wins gate discarding stale responses
//!
//! Failures never reach the interactive thread as errors: they are logged
//! and the stroke shows no fill for that frame.

pub mod client;
pub mod fill;
pub mod sequence;
pub mod worker;

use thiserror::Error;
use tracing::warn;
use vektor_ipc::{IpcError, TessResponse};

use crate::types::Triangulation;

pub use client::TessClient;
pub use fill::{tessellate, triangulate};
pub use sequence::SequenceGate;
pub use worker::{TessJob, TessWorker, WorkerCommand};

#[derive(Debug, Error)]
pub enum TessError {
    #[error("Contour contains a non-finite coordinate")]
    NonFinite,
    #[error("Fill tessellation failed: {0}")]
    Fill(String),
    #[error("Failed to start tessellation worker: {0}")]
    Spawn(String),
    #[error("Tessellation worker disconnected")]
    Disconnected,
    #[error("Request {in_flight} is still in flight")]
    Busy { in_flight: u64 },
    #[error("Timed out waiting for sequence {sequence}")]
    Timeout { sequence: u64 },
    #[error("Sequence {0} is not pending")]
    NotPending(u64),
    #[error(transparent)]
    Invalid(#[from] IpcError),
}

/// Validate a worker response into a triangulation. Anything malformed
/// degrades to `None` with a warning.
pub fn accept_response(response: TessResponse) -> Option<Triangulation> {
    if let Err(e) = response.validate() {
        let e = TessError::from(e);
        warn!("Dropping tessellation result {}: {}", response.sequence, e);
        return None;
    }
    if response.is_empty() {
        return None;
    }
    Some(Triangulation {
        positions: response.positions,
        indices: response.indices,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use vektor_ipc::{ContourPoint, TessRequest, WindingRule};

    fn square(sequence: u64) -> TessRequest {
        TessRequest::new(
            sequence,
            vec![vec![
                ContourPoint::new(0.0, 0.0),
                ContourPoint::new(4.0, 0.0),
                ContourPoint::new(4.0, 4.0),
                ContourPoint::new(0.0, 4.0),
            ]],
            WindingRule::NonZero,
        )
    }

    #[test]
    fn test_worker_round_trip() {
        let worker = TessWorker::spawn().unwrap();
        let mut client = worker.client();
        client.submit(square(1)).unwrap();
        assert!(client.is_busy());

        let response = client.wait_for(1, Duration::from_secs(5)).unwrap();
        assert_eq!(response.sequence, 1);
        let tri = accept_response(response).unwrap();
        assert_eq!(tri.indices.len(), 6);
        assert!(!client.is_busy());
    }

    #[test]
    fn test_single_flight() {
        let worker = TessWorker::spawn().unwrap();
        let mut client = worker.client();
        client.submit(square(1)).unwrap();
        assert!(matches!(
            client.submit(square(2)),
            Err(TessError::Busy { in_flight: 1 })
        ));
        client.drain(Duration::from_secs(5));
        assert!(client.submit(square(2)).is_ok());
    }

    #[test]
    fn test_clients_have_separate_replies() {
        let worker = TessWorker::spawn().unwrap();
        let mut a = worker.client();
        let mut b = worker.client();
        a.submit(square(1)).unwrap();
        b.submit(square(7)).unwrap();
        assert_eq!(b.wait_for(7, Duration::from_secs(5)).unwrap().sequence, 7);
        assert_eq!(a.wait_for(1, Duration::from_secs(5)).unwrap().sequence, 1);
    }

    #[test]
    fn test_shutdown_disconnects_clients() {
        let mut worker = TessWorker::spawn().unwrap();
        let mut client = worker.client();
        worker.shutdown();
        assert!(!worker.is_running());
        assert!(matches!(client.submit(square(1)), Err(TessError::Disconnected)));
    }

    #[test]
    fn test_malformed_response_is_dropped() {
        let response = TessResponse {
            sequence: 3,
            positions: vec![0.0, 0.0, 1.0, 0.0],
            indices: vec![0, 1, 5],
            error: None,
        };
        assert!(accept_response(response).is_none());
        assert!(accept_response(TessResponse::failed(4, "boom")).is_none());
        assert!(accept_response(TessResponse::empty(5)).is_none());
    }
}
