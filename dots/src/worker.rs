use std::io;
use std::sync::Arc;
use std::thread;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;

use crate::sync::{Completion, GameAuthority, SyncError, Ticket, execute};

/// Runs sync tickets on a dedicated thread with its own tokio runtime, one task per ticket.
pub struct SyncWorker {
    tickets: mpsc::UnboundedSender<Ticket>,
    completions: mpsc::UnboundedReceiver<Completion>,
}

impl SyncWorker {
    /// The worker thread exits once this handle is dropped; in-flight requests are abandoned.
    pub fn start<A>(authority: A) -> io::Result<Self>
    where
        A: GameAuthority + Send + Sync + 'static,
    {
        let (ticket_tx, mut ticket_rx) = mpsc::unbounded_channel::<Ticket>();
        let (done_tx, done_rx) = mpsc::unbounded_channel::<Completion>();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let authority = Arc::new(authority);

        thread::Builder::new()
            .name("dots-sync".to_string())
            .spawn(move || {
                runtime.block_on(async move {
                    while let Some(ticket) = ticket_rx.recv().await {
                        tracing::debug!(?ticket, "sync request started");
                        let authority = Arc::clone(&authority);
                        let done_tx = done_tx.clone();
                        tokio::spawn(async move {
                            let completion = execute(authority.as_ref(), ticket).await;
                            let _ = done_tx.send(completion);
                        });
                    }
                });
            })?;

        Ok(Self {
            tickets: ticket_tx,
            completions: done_rx,
        })
    }

    pub fn submit(&self, ticket: Ticket) -> Result<(), SyncError> {
        self.tickets.send(ticket).map_err(|_| SyncError::WorkerGone)
    }

    /// Next finished request, if any. Never blocks. Fails once the worker thread is gone and
    /// every completion it sent has been drained.
    pub fn try_completion(&mut self) -> Result<Option<Completion>, SyncError> {
        match self.completions.try_recv() {
            Ok(completion) => Ok(Some(completion)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(SyncError::WorkerGone),
        }
    }
}
