//! Fakes shared by the unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, TimeZone};
use chrono_tz::{America::Denver, Tz};
use tokio::time::Instant;

use crate::clock::Clock;
use crate::display::{DisplayError, DisplaySink, Screen};
use crate::event::Candidate;
use crate::source::{CalendarSource, SourceError};

/// Wall clock driven by tokio's (possibly paused) timer.
#[derive(Debug, Clone)]
pub struct TestClock {
    base: DateTime<Tz>,
    origin: Option<Instant>,
}

impl TestClock {
    pub fn base() -> DateTime<Tz> {
        Denver.with_ymd_and_hms(2024, 3, 18, 10, 0, 0).unwrap()
    }

    /// Starts at [`TestClock::base`] and advances with tokio time.
    pub fn new() -> Self {
        Self {
            base: Self::base(),
            origin: Some(Instant::now()),
        }
    }

    pub fn frozen(at: DateTime<Tz>) -> Self {
        Self {
            base: at,
            origin: None,
        }
    }
}

impl Clock for TestClock {
    fn now(&self) -> DateTime<Tz> {
        match self.origin {
            Some(origin) => self.base + Duration::from_std(origin.elapsed()).unwrap(),
            None => self.base,
        }
    }
}

type Answer = Result<Vec<Candidate>, SourceError>;

/// Answers queries from a fixed script, then with "no events".
pub struct ScriptedSource {
    answers: Mutex<VecDeque<Answer>>,
    queries: Arc<Mutex<Vec<DateTime<Tz>>>>,
}

impl ScriptedSource {
    pub fn new<I: IntoIterator<Item = Answer>>(answers: I) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
            queries: Arc::default(),
        }
    }

    pub fn queries(&self) -> Arc<Mutex<Vec<DateTime<Tz>>>> {
        Arc::clone(&self.queries)
    }
}

impl CalendarSource for ScriptedSource {
    async fn query_active_events(&self, at: DateTime<Tz>) -> Result<Vec<Candidate>, SourceError> {
        self.queries.lock().unwrap().push(at);
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// Never answers, like an upstream that accepted the connection and went quiet.
pub struct HangingSource;

impl CalendarSource for HangingSource {
    async fn query_active_events(&self, _: DateTime<Tz>) -> Result<Vec<Candidate>, SourceError> {
        std::future::pending().await
    }
}

/// A [`Screen`] the test keeps a handle on while the renderer owns a clone.
#[derive(Clone)]
pub struct SharedScreen {
    screen: Arc<Mutex<Screen>>,
    writes: Arc<Mutex<Vec<(u8, String)>>>,
}

impl SharedScreen {
    pub fn new(cols: u8, rows: u8) -> Self {
        Self {
            screen: Arc::new(Mutex::new(Screen::new(cols, rows))),
            writes: Arc::default(),
        }
    }

    /// Current content of `row` without trailing blanks.
    pub fn line(&self, row: usize) -> String {
        let line = self.screen.lock().unwrap().line(row).unwrap();
        line.trim_end().to_string()
    }

    /// Every text written to `row` so far, oldest first.
    pub fn written_to(&self, row: u8) -> Vec<String> {
        self.writes
            .lock()
            .unwrap()
            .iter()
            .filter(|(written_row, _)| *written_row == row)
            .map(|(_, text)| text.clone())
            .collect()
    }
}

impl DisplaySink for SharedScreen {
    fn clear(&mut self) -> Result<(), DisplayError> {
        self.screen.lock().unwrap().clear()
    }

    fn write(&mut self, row: u8, col: u8, text: &str) -> Result<(), DisplayError> {
        self.screen.lock().unwrap().write(row, col, text)?;
        self.writes.lock().unwrap().push((row, text.to_string()));
        Ok(())
    }

    fn dimensions(&self) -> (u8, u8) {
        self.screen.lock().unwrap().dimensions()
    }
}
