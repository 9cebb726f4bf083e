use crate::constants::URL_PLACEHOLDER;
use crate::error::{FinderError, Result};
use chrono::{Datelike, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Canonical wire format for event dates.
pub const CANONICAL_DATE_FORMAT: &str = "%Y-%m-%d";

/// Formats accepted at the adapter boundary, tried in order.
const ACCEPTED_DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y", "%d/%m/%Y"];

static JAPANESE_FULL_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{4})年(\d{1,2})月(\d{1,2})日").expect("static regex"));
static JAPANESE_MONTH_DAY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2})月(\d{1,2})日").expect("static regex"));

/// Identifier attached to a record by some backends. Unique within one
/// response only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventId {
    Int(i64),
    Text(String),
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventId::Int(n) => write!(f, "{n}"),
            EventId::Text(s) => f.write_str(s),
        }
    }
}

/// Calendar date of an event, always serialized as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventDate(NaiveDate);

impl EventDate {
    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Parse any of the date spellings the backend variants emit.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(FinderError::InvalidRecord("date is empty".into()));
        }

        if let Some(caps) = JAPANESE_FULL_DATE.captures(trimmed) {
            return ymd(&caps[1], &caps[2], &caps[3], raw);
        }
        if let Some(caps) = JAPANESE_MONTH_DAY.captures(trimmed) {
            let year = Utc::now().year().to_string();
            return ymd(&year, &caps[1], &caps[2], raw);
        }

        // RFC 3339 timestamps keep only their calendar part
        let head = match trimmed.split_once('T') {
            Some((date, _)) => date,
            None => trimmed,
        };
        let head = head.get(..10).unwrap_or(head);

        for fmt in ACCEPTED_DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(head, fmt) {
                return Ok(Self(date));
            }
        }
        Err(FinderError::InvalidRecord(format!("unrecognized date '{raw}'")))
    }
}

fn ymd(year: &str, month: &str, day: &str, raw: &str) -> Result<EventDate> {
    let parsed = (year.parse(), month.parse(), day.parse());
    match parsed {
        (Ok(y), Ok(m), Ok(d)) => NaiveDate::from_ymd_opt(y, m, d)
            .map(EventDate)
            .ok_or_else(|| FinderError::InvalidRecord(format!("impossible date '{raw}'"))),
        _ => Err(FinderError::InvalidRecord(format!("unrecognized date '{raw}'"))),
    }
}

impl fmt::Display for EventDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(CANONICAL_DATE_FORMAT))
    }
}

impl Serialize for EventDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EventDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        EventDate::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Unvalidated field set for an event, as produced by adapters and
/// built-in datasets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EventId>,
    pub title: String,
    pub date: String,
    #[serde(default)]
    pub place: String,
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub image: String,
}

/// One discoverable event in canonical shape. Constructed only through
/// validation, immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "EventDraft")]
pub struct EventRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<EventId>,
    title: String,
    date: EventDate,
    place: String,
    genre: String,
    description: String,
    url: String,
    image: String,
}

impl EventRecord {
    pub fn id(&self) -> Option<&EventId> {
        self.id.as_ref()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn date(&self) -> EventDate {
        self.date
    }

    pub fn place(&self) -> &str {
        &self.place
    }

    pub fn genre(&self) -> &str {
        &self.genre
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn image(&self) -> &str {
        &self.image
    }

    /// Identity used to drop duplicates within one collection.
    pub fn identity(&self) -> (&str, EventDate) {
        (&self.title, self.date)
    }
}

impl TryFrom<EventDraft> for EventRecord {
    type Error = FinderError;

    fn try_from(draft: EventDraft) -> Result<Self> {
        let title = draft.title.trim().to_string();
        if title.is_empty() {
            return Err(FinderError::InvalidRecord("title is empty".into()));
        }
        let date = EventDate::parse(&draft.date)?;

        let url = draft.url.trim().to_string();
        if !is_link(&url) {
            return Err(FinderError::InvalidRecord(format!("invalid url '{url}'")));
        }
        let image = draft.image.trim().to_string();
        if !is_absolute_url(&image) {
            return Err(FinderError::InvalidRecord(format!("invalid image '{image}'")));
        }

        Ok(Self {
            id: draft.id,
            title,
            date,
            place: draft.place.trim().to_string(),
            genre: draft.genre.trim().to_string(),
            description: draft.description.trim().to_string(),
            url,
            image,
        })
    }
}

/// True for absolute http(s) URLs.
pub fn is_absolute_url(candidate: &str) -> bool {
    match reqwest::Url::parse(candidate) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.has_host(),
        Err(_) => false,
    }
}

/// True for absolute URLs and the "no link" placeholder.
pub fn is_link(candidate: &str) -> bool {
    candidate == URL_PLACEHOLDER || is_absolute_url(candidate)
}
