//! A door sign that shows whether its owner is in a meeting.
//!
//! A [`Poller`] asks a [`CalendarSource`] for the event happening right now
//! and publishes it into a single shared slot ([`state::channel`]). A
//! [`Renderer`] reads that slot and keeps a small character display up to
//! date, scrolling text that does not fit.

pub mod clock;
pub mod display;
pub mod event;
pub mod humanize;
pub mod poller;
pub mod renderer;
pub mod scroll;
pub mod source;
pub mod state;

#[cfg(test)]
mod testing;

pub use clock::{Clock, SystemClock};
pub use display::{ConsoleDisplay, DisplayError, DisplaySink, Screen};
pub use event::{Candidate, CurrentState, Event, EventError};
pub use humanize::humanize;
pub use poller::Poller;
pub use renderer::Renderer;
pub use scroll::scroll;
pub use source::{CalendarSource, SourceError};
pub use state::{StatePublisher, StateReader};
