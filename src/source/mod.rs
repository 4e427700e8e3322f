//! Calendars the poller can ask for the event happening right now.

mod graph;
mod rapla;
mod token;

use std::future::Future;
use std::io;
use std::time::Duration;

use chrono::DateTime;
use chrono_tz::Tz;
use reqwest::{Client, StatusCode};
use thiserror::Error;

use crate::event::Candidate;

pub use graph::GraphCalendar;
pub use rapla::{RaplaCalendar, DEFAULT_UPSTREAM as RAPLA_UPSTREAM};
pub use token::{Credentials, Token, TokenStore};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("calendar answered with status {0}")]
    Status(StatusCode),
    #[error("failed to obtain an access token: {0}")]
    Token(String),
    #[error("unexpected calendar response: {0}")]
    Parse(String),
    #[error("failed to access the token file: {0}")]
    Io(#[from] io::Error),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// HTTP client whose connects and requests give up after `timeout`.
pub fn http_client(timeout: Duration) -> Result<Client, SourceError> {
    Ok(Client::builder()
        .connect_timeout(timeout)
        .timeout(timeout)
        .build()?)
}

pub trait CalendarSource: Send + Sync + 'static {
    /// Events overlapping `at`, earliest start first.
    fn query_active_events(
        &self,
        at: DateTime<Tz>,
    ) -> impl Future<Output = Result<Vec<Candidate>, SourceError>> + Send;
}

/// The calendar selected on the command line.
pub enum Source {
    Graph(GraphCalendar),
    Rapla(RaplaCalendar),
}

impl CalendarSource for Source {
    async fn query_active_events(&self, at: DateTime<Tz>) -> Result<Vec<Candidate>, SourceError> {
        match self {
            Source::Graph(graph) => graph.query_active_events(at).await,
            Source::Rapla(rapla) => rapla.query_active_events(at).await,
        }
    }
}
