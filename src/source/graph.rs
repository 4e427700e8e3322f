use std::time::Duration as Timeout;

use chrono::{DateTime, Duration, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use chrono_tz::Tz;
use log::debug;
use reqwest::Client;
use serde::Deserialize;

use super::{http_client, CalendarSource, SourceError, TokenStore};
use crate::event::Candidate;

const CALENDAR_VIEW: &str = "https://graph.microsoft.com/v1.0/me/calendar/calendarView";

/// Upper bound on the events requested per poll; only the first one is used.
const MAX_EVENTS: usize = 4;

/// The default calendar of a Microsoft 365 account.
pub struct GraphCalendar {
    client: Client,
    tokens: TokenStore,
}

impl GraphCalendar {
    pub fn new(tokens: TokenStore, timeout: Timeout) -> Result<Self, SourceError> {
        Ok(Self {
            client: http_client(timeout)?,
            tokens,
        })
    }

    /// Makes sure a usable access token exists before polling starts.
    pub async fn authenticate(&self) -> Result<(), SourceError> {
        self.tokens.load().await?;
        self.tokens.access_token(&self.client).await.map(|_| ())
    }
}

impl CalendarSource for GraphCalendar {
    async fn query_active_events(&self, at: DateTime<Tz>) -> Result<Vec<Candidate>, SourceError> {
        let token = self.tokens.access_token(&self.client).await?;

        let (window_start, window_end) = query_window(at)?;

        let response = self
            .client
            .get(CALENDAR_VIEW)
            .bearer_auth(token)
            .header("Prefer", "outlook.timezone=\"UTC\"")
            .query(&[
                (
                    "startDateTime",
                    window_start.to_rfc3339_opts(SecondsFormat::Secs, true),
                ),
                (
                    "endDateTime",
                    window_end.to_rfc3339_opts(SecondsFormat::Secs, true),
                ),
                ("$orderby", "start/dateTime".into()),
                ("$top", MAX_EVENTS.to_string()),
                ("$select", "subject,start,end".into()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status(status));
        }

        let body = response.text().await?;
        let candidates = parse_calendar_view(&body, &at.timezone())?;
        debug!("Microsoft Graph returned {} event(s)", candidates.len());

        Ok(candidates)
    }
}

#[derive(Deserialize)]
struct CalendarView {
    value: Vec<GraphEvent>,
}

#[derive(Deserialize)]
struct GraphEvent {
    #[serde(default)]
    subject: Option<String>,
    #[serde(default)]
    start: Option<GraphTime>,
    #[serde(default)]
    end: Option<GraphTime>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphTime {
    date_time: String,
    time_zone: String,
}

impl GraphTime {
    /// Graph reports wall-clock times plus a zone name; only UTC is requested.
    fn to_zone(&self, zone: &Tz) -> Option<DateTime<Tz>> {
        if self.time_zone != "UTC" {
            return None;
        }

        let naive = NaiveDateTime::parse_from_str(&self.date_time, "%Y-%m-%dT%H:%M:%S%.f").ok()?;
        Some(Utc.from_utc_datetime(&naive).with_timezone(zone))
    }
}

/// `calendarView` needs a non-empty range; one minute from `at` is enough.
fn query_window(at: DateTime<Tz>) -> Result<(DateTime<Utc>, DateTime<Utc>), SourceError> {
    let start = at.with_timezone(&Utc);
    let end = Duration::try_minutes(1)
        .and_then(|minute| start.checked_add_signed(minute))
        .ok_or_else(|| SourceError::Parse("query window is out of range".into()))?;
    Ok((start, end))
}

fn parse_calendar_view(body: &str, zone: &Tz) -> Result<Vec<Candidate>, SourceError> {
    let view = serde_json::from_str::<CalendarView>(body)?;

    Ok(view
        .value
        .into_iter()
        .map(|event| Candidate {
            start: event.start.and_then(|start| start.to_zone(zone)),
            end: event.end.and_then(|end| end.to_zone(zone)),
            label: event.subject.unwrap_or_default(),
        })
        .collect())
}
