use std::sync::Arc;

use chrono::DateTime;
use chrono_tz::Tz;
use log::{debug, info, warn};
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::clock::{nap, Clock};
use crate::event::{Candidate, CurrentState};
use crate::source::{CalendarSource, SourceError};
use crate::state::StatePublisher;

pub struct Config {
    pub interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
        }
    }
}

/// Keeps the shared state in line with the calendar.
pub struct Poller<S, C> {
    source: S,
    publisher: StatePublisher,
    clock: C,
    interval: Duration,
}

impl<S: CalendarSource, C: Clock> Poller<S, C> {
    pub fn new(source: S, publisher: StatePublisher, clock: C, config: Config) -> Self {
        Self {
            source,
            publisher,
            clock,
            interval: config.interval,
        }
    }

    /// Queries the calendar once and publishes the outcome.
    ///
    /// A failed query leaves the published state untouched.
    pub async fn poll_once(&self) -> Result<CurrentState, SourceError> {
        let now = self.clock.now();
        let candidates = self.source.query_active_events(now).await?;
        let state = classify(candidates, now);
        self.publisher.publish(state.clone());
        Ok(state)
    }

    /// Polls every `interval` until `cancel` fires.
    pub async fn run(self, cancel: CancellationToken) {
        info!("Polling calendar every {}s", self.interval.as_secs());

        let mut last = None;

        loop {
            let outcome = tokio::select! {
                outcome = self.poll_once() => outcome,
                () = cancel.cancelled() => break,
            };

            match outcome {
                Ok(state) => {
                    if last.as_ref() != Some(&state) {
                        match &state {
                            CurrentState::Idle => info!("No meeting in progress"),
                            CurrentState::Active(event) => info!(
                                "Meeting \"{}\" in progress until {}",
                                event.label(),
                                event.end().format("%H:%M")
                            ),
                        }
                    } else {
                        debug!("Calendar unchanged");
                    }
                    last = Some(state);
                }
                Err(err) => warn!("Calendar query failed, keeping previous state: {err}"),
            }

            if !nap(&cancel, self.interval).await {
                break;
            }
        }

        info!("Poller stopped");
    }
}

/// Decides what the sign should show given the calendar's answer at `now`.
///
/// Only the first candidate counts; a malformed one leaves the sign idle for
/// this cycle.
pub fn classify(candidates: Vec<Candidate>, now: DateTime<Tz>) -> CurrentState {
    let Some(first) = candidates.into_iter().next() else {
        return CurrentState::Idle;
    };

    match first.into_event() {
        Ok(event) if event.covers(now) => CurrentState::Active(Arc::new(event)),
        Ok(_) => CurrentState::Idle,
        Err(err) => {
            warn!("Ignoring malformed calendar event: {err}");
            CurrentState::Idle
        }
    }
}
