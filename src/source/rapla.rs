use std::time::Duration as Timeout;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::{Europe::Berlin, Tz};
use log::debug;
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};

use super::{http_client, CalendarSource, SourceError};
use crate::event::Candidate;

pub const DEFAULT_UPSTREAM: &str = "https://rapla.dhbw.de";
const CALENDAR_PATH: &str = "/rapla/calendar";

macro_rules! selector {
    ($query:expr) => {{
        static SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse($query).unwrap());
        &SELECTOR
    }};
}

/// A Rapla course calendar, scraped from its week view.
pub struct RaplaCalendar {
    client: Client,
    upstream: String,
    key: String,
    salt: String,
}

impl RaplaCalendar {
    pub fn new<S: Into<String>>(
        upstream: S,
        key: String,
        salt: String,
        timeout: Timeout,
    ) -> Result<Self, SourceError> {
        Ok(Self {
            client: http_client(timeout)?,
            upstream: upstream.into().trim_end_matches('/').to_string(),
            key,
            salt,
        })
    }
}

impl CalendarSource for RaplaCalendar {
    async fn query_active_events(&self, at: DateTime<Tz>) -> Result<Vec<Candidate>, SourceError> {
        let day = at.with_timezone(&Berlin).date_naive();

        let url = format!(
            "{}{CALENDAR_PATH}?key={}&salt={}&day={}&month={}&year={}&pages=1",
            self.upstream,
            self.key,
            self.salt,
            day.day(),
            day.month(),
            day.year()
        );

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status(status));
        }

        let html = response.text().await?;
        let blocks = parse_week_view(&html)
            .ok_or_else(|| SourceError::Parse("page does not look like a Rapla week view".into()))?;
        debug!("Rapla week view contains {} block(s)", blocks.len());

        Ok(overlapping(blocks, at))
    }
}

/// One reservation in the week table, in Rapla's local time.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Block {
    date: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
    title: String,
}

impl Block {
    fn into_candidate(self, zone: &Tz) -> Candidate {
        let localize = |time| {
            Berlin
                .from_local_datetime(&self.date.and_time(time))
                .earliest()
                .map(|local| local.with_timezone(zone))
        };

        Candidate {
            start: localize(self.start),
            end: localize(self.end),
            label: self.title,
        }
    }
}

/// Blocks overlapping `at`, earliest start first.
fn overlapping(blocks: Vec<Block>, at: DateTime<Tz>) -> Vec<Candidate> {
    let zone = at.timezone();

    let mut candidates = blocks
        .into_iter()
        .map(|block| block.into_candidate(&zone))
        .filter(|candidate| match (candidate.start, candidate.end) {
            (Some(start), Some(end)) => start <= at && at <= end,
            _ => false,
        })
        .collect::<Vec<_>>();

    candidates.sort_by_key(|candidate| candidate.start);
    candidates
}

fn parse_week_view(html: &str) -> Option<Vec<Block>> {
    let html = Html::parse_document(html);

    let mut year = html
        .select(selector!("select[name=year] > option[selected]"))
        .next()?
        .inner_html()
        .trim()
        .parse::<i32>()
        .ok()?;

    let mut blocks = Vec::new();

    for (idx, week) in html
        .select(selector!("div.calendar > table.week_table > tbody"))
        .enumerate()
    {
        let week_number = week
            .select(selector!("th.week_number"))
            .next()?
            .inner_html()
            .split(' ')
            .nth(1)?
            .parse::<u32>()
            .ok()?;

        if week_number == 1 && idx > 0 {
            year += 1;
        }

        blocks.append(&mut parse_week(week, year)?);
    }

    Some(blocks)
}

fn parse_week(week: ElementRef, year: i32) -> Option<Vec<Block>> {
    let header = week
        .select(selector!("tr > td.week_header > nobr"))
        .next()?
        .inner_html();

    let mut day_month = header.split(' ').nth(1)?.trim_end_matches('.').split('.');
    let day = day_month.next()?.parse::<u32>().ok()?;
    let month = day_month.next()?.parse::<u32>().ok()?;
    let monday = NaiveDate::from_ymd_opt(year, month, day)?;

    let mut blocks = Vec::new();

    for row in week.select(selector!("tr")).skip(1) {
        let mut weekday = 0;

        for column in row.select(selector!("td")) {
            let Some(class) = column.value().classes().next() else {
                continue;
            };

            if class.starts_with("week_separatorcell") {
                weekday += 1;
            }

            if class != "week_block" {
                continue;
            }

            let date = monday + Duration::try_days(weekday)?;
            blocks.push(parse_block(column, date)?);
        }
    }

    Some(blocks)
}

fn parse_block(element: ElementRef, date: NaiveDate) -> Option<Block> {
    let details = element.select(selector!("a")).next()?.inner_html();
    let mut lines = details.split("<br>");

    let mut times = lines.next()?.split("&nbsp;-");
    let start = NaiveTime::parse_from_str(times.next()?.trim(), "%H:%M").ok()?;
    let end = NaiveTime::parse_from_str(times.next()?.trim(), "%H:%M").ok()?;

    let title = lines.next()?.trim().replace("&amp;", "&");

    Some(Block {
        date,
        start,
        end,
        title,
    })
}
