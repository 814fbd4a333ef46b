//! Actor runtime for the coordinator
//!
//! One task owns the `Coordinator` and drains an unbounded mailbox. The
//! reinitialize timer is awaited by that same task, so nothing else ever
//! touches coordinator state and only the timer can end a pending delay.

use thiserror::Error;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender, WeakUnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace};
use waypost_core::{ChangeListener, PreferenceKey};

use crate::coordinator::Coordinator;
use crate::messages::{Command, Directive, Intent, Message};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("coordinator mailbox is closed")]
    MailboxClosed,
}

/// Cloneable sending side of the coordinator mailbox
#[derive(Debug, Clone)]
pub struct CoordinatorHandle {
    tx: UnboundedSender<Message>,
}

impl CoordinatorHandle {
    pub fn send(&self, message: Message) -> Result<(), RuntimeError> {
        self.tx.send(message).map_err(|_| RuntimeError::MailboxClosed)
    }

    pub fn command(&self, command: Command) -> Result<(), RuntimeError> {
        self.send(Message::Command(command))
    }

    pub fn intent(&self, intent: Intent) -> Result<(), RuntimeError> {
        self.send(Message::Intent(intent))
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// A handle that does not keep the mailbox open
    pub fn downgrade(&self) -> WeakCoordinatorHandle {
        WeakCoordinatorHandle {
            tx: self.tx.downgrade(),
        }
    }
}

/// Non-owning sender for collaborators that post results back to the
/// coordinator they belong to
#[derive(Debug, Clone)]
pub struct WeakCoordinatorHandle {
    tx: WeakUnboundedSender<Message>,
}

impl WeakCoordinatorHandle {
    pub fn send(&self, message: Message) -> Result<(), RuntimeError> {
        let tx = self.tx.upgrade().ok_or(RuntimeError::MailboxClosed)?;
        tx.send(message).map_err(|_| RuntimeError::MailboxClosed)
    }
}

/// Receiving side, consumed by `spawn`
pub struct Mailbox {
    rx: UnboundedReceiver<Message>,
    weak_tx: WeakUnboundedSender<Message>,
}

/// Create a coordinator mailbox
pub fn mailbox() -> (CoordinatorHandle, Mailbox) {
    let (tx, rx) = mpsc::unbounded_channel();
    let weak_tx = tx.downgrade();
    (CoordinatorHandle { tx }, Mailbox { rx, weak_tx })
}

/// Holds only a weak sender so a registered listener does not keep the
/// mailbox open after every handle is dropped.
fn forward_preferences(weak_tx: WeakUnboundedSender<Message>) -> ChangeListener {
    Box::new(move |key: PreferenceKey| {
        if let Some(tx) = weak_tx.upgrade() {
            let _ = tx.send(Message::PreferenceChanged(key));
        }
    })
}

/// Resolves when the pending timer fires, never when there is none
async fn timer_fired(pending: &mut Option<JoinHandle<()>>) {
    match pending {
        Some(task) => {
            let _ = task.await;
        }
        None => std::future::pending().await,
    }
}

/// Run `coordinator` on its own task until `Exit` or until every handle is dropped.
///
/// The coordinator is subscribed to preference changes and started before the
/// first message is read. Collaborators that post back into the mailbox should
/// hold a [`WeakCoordinatorHandle`], otherwise dropping the last external
/// handle does not end the task. The join handle yields the coordinator back
/// after teardown.
pub fn spawn(mut coordinator: Coordinator, mailbox: Mailbox) -> JoinHandle<Coordinator> {
    let Mailbox { mut rx, weak_tx } = mailbox;

    tokio::spawn(async move {
        coordinator
            .preferences()
            .subscribe(forward_preferences(weak_tx));
        coordinator.start();

        let delay = coordinator.config().reinitialize_delay;
        let mut pending: Option<JoinHandle<()>> = None;

        loop {
            let message = tokio::select! {
                received = rx.recv() => match received {
                    Some(message) => message,
                    None => break,
                },
                _ = timer_fired(&mut pending) => {
                    pending = None;
                    Message::ReinitializeDue
                }
            };

            match coordinator.handle(message) {
                Directive::Continue => {}
                Directive::ScheduleReinitialize if pending.is_some() => {
                    trace!("reinitialize already scheduled");
                }
                Directive::ScheduleReinitialize => {
                    debug!(delay_ms = delay.as_millis() as u64, "reinitialize scheduled");
                    pending = Some(tokio::spawn(tokio::time::sleep(delay)));
                }
                Directive::Exit => break,
            }
        }

        if let Some(task) = pending.take() {
            task.abort();
        }
        coordinator.shutdown();
        info!("coordinator task finished");
        coordinator
    })
}
