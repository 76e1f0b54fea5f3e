//! Background tessellation thread.

use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};
use tracing::{debug, info, warn};
use vektor_ipc::{TessRequest, TessResponse};

use super::client::TessClient;
use super::fill::tessellate;
use super::TessError;

/// One request plus the channel its answer goes back on
pub struct TessJob {
    pub request: TessRequest,
    pub reply: Sender<TessResponse>,
}

pub enum WorkerCommand {
    Tessellate(TessJob),
    Shutdown,
}

/// Owns the tessellation thread. Clients talk to it only through messages;
/// requests and responses carry owned buffers.
pub struct TessWorker {
    tx_cmd: Sender<WorkerCommand>,
    thread: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for TessWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TessWorker")
            .field("running", &self.is_running())
            .finish()
    }
}

impl TessWorker {
    pub fn spawn() -> Result<Self, TessError> {
        let (tx_cmd, rx_cmd) = crossbeam_channel::unbounded::<WorkerCommand>();

        let thread = thread::Builder::new()
            .name("vektor-tess".to_string())
            .spawn(move || worker_loop(rx_cmd))
            .map_err(|e| TessError::Spawn(e.to_string()))?;

        info!("TessWorker: started");
        Ok(Self {
            tx_cmd,
            thread: Some(thread),
        })
    }

    /// A new client with its own reply channel
    pub fn client(&self) -> TessClient {
        TessClient::new(self.tx_cmd.clone())
    }

    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Stop the thread and wait for it. Clients created earlier get
    /// disconnect errors afterwards.
    pub fn shutdown(&mut self) {
        let _ = self.tx_cmd.send(WorkerCommand::Shutdown);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("TessWorker: thread panicked during shutdown");
            }
            info!("TessWorker: stopped");
        }
    }
}

impl Drop for TessWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(rx_cmd: Receiver<WorkerCommand>) {
    while let Ok(cmd) = rx_cmd.recv() {
        match cmd {
            WorkerCommand::Tessellate(job) => {
                let sequence = job.request.sequence;
                let response = panic::catch_unwind(AssertUnwindSafe(|| tessellate(&job.request)))
                    .unwrap_or_else(|_| {
                        warn!("TessWorker: tessellation panicked for sequence {}", sequence);
                        TessResponse::failed(sequence, "tessellation panicked")
                    });
                debug!(
                    "TessWorker: sequence {} -> {} indices",
                    sequence,
                    response.indices.len()
                );
                // The client may have gone away; nothing to do then
                let _ = job.reply.send(response);
            }
            WorkerCommand::Shutdown => break,
        }
    }
}
