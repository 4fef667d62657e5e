use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

use super::{CaseId, FactsRepository, RepositoryError, SaveContext};
use crate::wizard::facts::CaseFacts;

/// Save state shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SaveStatus {
    #[default]
    Idle,
    Pending,
    Saving,
    Saved,
    Failed {
        message: String,
    },
}

impl SaveStatus {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SaveError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("save queue has shut down")]
    Closed,
}

type Reply = oneshot::Sender<Result<(), SaveError>>;

enum Command {
    Schedule(CaseFacts),
    Flush(Reply),
    Retry(Reply),
    Shutdown(Reply),
}

/// Handle to the save actor for one case.
///
/// Every scheduled snapshot lands in a single pending slot, so a flush always
/// writes the latest facts. The quiet-period timer restarts on each schedule.
#[derive(Debug, Clone)]
pub struct SaveQueue {
    commands: mpsc::UnboundedSender<Command>,
    status: watch::Receiver<SaveStatus>,
}

impl SaveQueue {
    pub fn spawn<R>(
        repository: Arc<R>,
        case_id: CaseId,
        context: SaveContext,
        debounce: Duration,
    ) -> Self
    where
        R: FactsRepository + ?Sized + 'static,
    {
        let (commands, receiver) = mpsc::unbounded_channel();
        let (status_tx, status) = watch::channel(SaveStatus::Idle);
        let worker = SaveWorker {
            repository,
            case_id,
            context,
            debounce,
            pending: None,
            failed: None,
            deadline: None,
            status: status_tx,
        };
        tokio::spawn(worker.run(receiver));
        Self { commands, status }
    }

    /// Replace the pending snapshot and restart the quiet period.
    pub fn schedule(&self, facts: CaseFacts) -> Result<(), SaveError> {
        self.commands
            .send(Command::Schedule(facts))
            .map_err(|_| SaveError::Closed)
    }

    /// Save the pending snapshot now, if there is one.
    pub async fn flush(&self) -> Result<(), SaveError> {
        self.request(Command::Flush).await
    }

    /// Re-send the payload of the last failed save.
    pub async fn retry(&self) -> Result<(), SaveError> {
        self.request(Command::Retry).await
    }

    /// Flush and stop the actor.
    pub async fn shutdown(&self) -> Result<(), SaveError> {
        self.request(Command::Shutdown).await
    }

    pub fn status(&self) -> SaveStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SaveStatus> {
        self.status.clone()
    }

    async fn request(&self, command: fn(Reply) -> Command) -> Result<(), SaveError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(command(reply))
            .map_err(|_| SaveError::Closed)?;
        response.await.map_err(|_| SaveError::Closed)?
    }
}

struct SaveWorker<R: ?Sized> {
    repository: Arc<R>,
    case_id: CaseId,
    context: SaveContext,
    debounce: Duration,
    pending: Option<CaseFacts>,
    failed: Option<CaseFacts>,
    deadline: Option<Instant>,
    status: watch::Sender<SaveStatus>,
}

impl<R> SaveWorker<R>
where
    R: FactsRepository + ?Sized + 'static,
{
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        loop {
            let deadline = self.deadline;
            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Schedule(facts)) => {
                        self.pending = Some(facts);
                        self.failed = None;
                        self.deadline = Some(Instant::now() + self.debounce);
                        self.status.send_replace(SaveStatus::Pending);
                    }
                    Some(Command::Flush(reply)) => {
                        let result = self.save_latest().await;
                        let _ = reply.send(result);
                    }
                    Some(Command::Retry(reply)) => {
                        let result = self.retry().await;
                        let _ = reply.send(result);
                    }
                    Some(Command::Shutdown(reply)) => {
                        let result = self.save_latest().await;
                        let _ = reply.send(result);
                        break;
                    }
                    None => {
                        let _ = self.save_latest().await;
                        break;
                    }
                },
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    debug!(case_id = %self.case_id, "debounce elapsed");
                    let _ = self.save_pending().await;
                }
            }
        }
        debug!(case_id = %self.case_id, "save queue stopped");
    }

    async fn save_pending(&mut self) -> Result<(), SaveError> {
        self.deadline = None;
        match self.pending.take() {
            Some(facts) => self.save(facts).await,
            None => Ok(()),
        }
    }

    /// Pending facts win; otherwise a previously failed payload is re-sent.
    async fn save_latest(&mut self) -> Result<(), SaveError> {
        self.deadline = None;
        match self.pending.take().or_else(|| self.failed.take()) {
            Some(facts) => self.save(facts).await,
            None => Ok(()),
        }
    }

    async fn retry(&mut self) -> Result<(), SaveError> {
        if self.pending.is_some() {
            return self.save_pending().await;
        }
        match self.failed.take() {
            Some(facts) => {
                info!(case_id = %self.case_id, "retrying failed save");
                self.save(facts).await
            }
            None => Ok(()),
        }
    }

    async fn save(&mut self, facts: CaseFacts) -> Result<(), SaveError> {
        self.status.send_replace(SaveStatus::Saving);
        match self
            .repository
            .save_case_facts(&self.case_id, &facts, self.context)
            .await
        {
            Ok(()) => {
                debug!(case_id = %self.case_id, "case facts saved");
                self.failed = None;
                self.status.send_replace(SaveStatus::Saved);
                Ok(())
            }
            Err(error) => {
                warn!(case_id = %self.case_id, error = %error, "case facts save failed");
                self.status.send_replace(SaveStatus::Failed {
                    message: error.to_string(),
                });
                self.failed = Some(facts);
                Err(SaveError::Repository(error))
            }
        }
    }
}
