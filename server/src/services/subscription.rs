//! Storage subscriptions — one task per open `storage:*` request.
//!
//! DESIGN
//! ======
//! Each subscription emits its current value immediately, then waits on
//! the revision watch channel and re-reads after every sealed block that
//! changed storage. Items are only sent when the value, or the key set the
//! query watches, differs from the last one sent. Cancellation is cooperative through a
//! `CancellationToken`; once [`Subscription::cancel`] returns, the task has
//! exited and no further item can be queued for the client.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::frame::{Data, Frame};
use crate::runtime::RecordId;
use crate::services::storage::StorageQuery;
use crate::state::AppState;

/// Handle to a running subscription task.
pub struct Subscription {
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl Subscription {
    /// Stop the task and wait for it to exit.
    pub async fn cancel(self) {
        self.token.cancel();
        let _ = self.task.await;
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Start a subscription answering `req`. Items go to `out`.
#[must_use]
pub fn spawn(state: &AppState, req: Frame, query: StorageQuery, out: mpsc::Sender<Frame>) -> Subscription {
    let token = CancellationToken::new();
    let cancelled = token.clone();
    let state = state.clone();
    let mut revisions = state.subscribe_revision();

    let task = tokio::spawn(async move {
        let mut last: Option<(Data, Vec<RecordId>)> = None;
        loop {
            let view = {
                let runtime = state.runtime.read().await;
                (query.snapshot(&runtime), query.watched_keys(&runtime))
            };
            if last.as_ref() != Some(&view) {
                let item = req.item(view.0.clone());
                tokio::select! {
                    biased;
                    () = cancelled.cancelled() => break,
                    sent = out.send(item) => {
                        if sent.is_err() {
                            break;
                        }
                    }
                }
                last = Some(view);
            }

            tokio::select! {
                biased;
                () = cancelled.cancelled() => break,
                changed = revisions.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }
        debug!(id = %req.id, syscall = %req.syscall, "subscription: stopped");
    });

    Subscription { token, task }
}

#[cfg(test)]
#[path = "subscription_test.rs"]
mod tests;
