//! The single slot through which the poller hands the current event to the
//! renderer.
//!
//! Neither half is `Clone`: there is exactly one publisher and
//! one reader for the lifetime of the process. Values are replaced wholesale,
//! so a reader only ever sees something that was published in full, and
//! values published in quick succession simply overwrite each other.

use tokio::sync::watch;

use crate::event::{CurrentState, Event};

/// Creates a connected publisher/reader pair starting out [`CurrentState::Idle`].
pub fn channel() -> (StatePublisher, StateReader) {
    let (tx, rx) = watch::channel(CurrentState::Idle);
    (StatePublisher { tx }, StateReader { rx })
}

#[derive(Debug)]
pub struct StatePublisher {
    tx: watch::Sender<CurrentState>,
}

impl StatePublisher {
    /// Overwrites the slot. Never blocks on the reader and never fails, even
    /// once the reader is gone.
    pub fn publish(&self, state: CurrentState) {
        self.tx.send_replace(state);
    }
}

#[derive(Debug)]
pub struct StateReader {
    rx: watch::Receiver<CurrentState>,
}

impl StateReader {
    /// The most recently published state.
    pub fn read(&self) -> CurrentState {
        self.rx.borrow().clone()
    }

    /// Whether the slot still holds `event` as the active one.
    pub fn holds(&self, event: &Event) -> bool {
        match &*self.rx.borrow() {
            CurrentState::Active(current) => current.as_ref() == event,
            CurrentState::Idle => false,
        }
    }
}
