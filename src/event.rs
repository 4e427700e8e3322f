use std::sync::Arc;

use chrono::{DateTime, Duration};
use chrono_tz::Tz;
use thiserror::Error;

/// A calendar occurrence that keeps someone busy between `start` and `end`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    start: DateTime<Tz>,
    end: DateTime<Tz>,
    label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EventError {
    #[error("event has no start time")]
    MissingStart,
    #[error("event has no end time")]
    MissingEnd,
    #[error("event ends before it starts")]
    EndNotAfterStart,
}

impl Event {
    pub fn new<S: Into<String>>(
        start: DateTime<Tz>,
        end: DateTime<Tz>,
        label: S,
    ) -> Result<Self, EventError> {
        if end <= start {
            return Err(EventError::EndNotAfterStart);
        }

        Ok(Self {
            start,
            end,
            label: label.into(),
        })
    }

    pub fn start(&self) -> DateTime<Tz> {
        self.start
    }

    pub fn end(&self) -> DateTime<Tz> {
        self.end
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Both boundary instants count as part of the event.
    pub fn covers(&self, now: DateTime<Tz>) -> bool {
        self.start <= now && now <= self.end
    }

    pub fn remaining(&self, now: DateTime<Tz>) -> Duration {
        self.end - now
    }
}

/// An event as reported by a calendar source, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub start: Option<DateTime<Tz>>,
    pub end: Option<DateTime<Tz>>,
    pub label: String,
}

impl Candidate {
    pub fn into_event(self) -> Result<Event, EventError> {
        let start = self.start.ok_or(EventError::MissingStart)?;
        let end = self.end.ok_or(EventError::MissingEnd)?;
        Event::new(start, end, self.label)
    }
}

/// What the status sign should currently show.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CurrentState {
    #[default]
    Idle,
    Active(Arc<Event>),
}

impl CurrentState {
    pub fn event(&self) -> Option<&Arc<Event>> {
        match self {
            CurrentState::Idle => None,
            CurrentState::Active(event) => Some(event),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono_tz::America::Denver;

    use super::*;

    fn at(hour: u32, minute: u32) -> DateTime<Tz> {
        Denver.with_ymd_and_hms(2024, 3, 18, hour, minute, 0).unwrap()
    }

    #[test]
    fn rejects_events_that_do_not_end_after_they_start() {
        assert_eq!(
            Event::new(at(10, 0), at(10, 0), "Standup"),
            Err(EventError::EndNotAfterStart)
        );
        assert_eq!(
            Event::new(at(10, 30), at(10, 0), "Standup"),
            Err(EventError::EndNotAfterStart)
        );
    }

    #[test]
    fn covers_both_boundaries() {
        let event = Event::new(at(10, 0), at(10, 30), "Standup").unwrap();

        assert!(event.covers(at(10, 0)));
        assert!(event.covers(at(10, 15)));
        assert!(event.covers(at(10, 30)));
        assert!(!event.covers(at(10, 0) - Duration::try_seconds(1).unwrap()));
        assert!(!event.covers(at(10, 30) + Duration::try_seconds(1).unwrap()));
    }

    #[test]
    fn remaining_counts_down_to_the_end() {
        let event = Event::new(at(10, 0), at(10, 30), "").unwrap();
        assert_eq!(event.remaining(at(10, 20)), Duration::try_minutes(10).unwrap());
        assert_eq!(event.label(), "");
    }

    #[test]
    fn candidates_without_bounds_are_malformed() {
        let candidate = Candidate {
            start: Some(at(9, 0)),
            end: None,
            label: "Review".into(),
        };
        assert_eq!(candidate.into_event(), Err(EventError::MissingEnd));

        let candidate = Candidate {
            start: None,
            end: Some(at(9, 0)),
            label: "Review".into(),
        };
        assert_eq!(candidate.into_event(), Err(EventError::MissingStart));
    }
}
