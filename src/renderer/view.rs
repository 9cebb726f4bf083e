use crate::constants::{DEFAULT_IMAGE, URL_PLACEHOLDER};
use crate::types::is_absolute_url;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

pub const EMPTY_MESSAGE: &str = "No events found. Try a different search.";
pub const ERROR_MESSAGE: &str = "Failed to load events";

/// One event card as shown to the user. Every field is display-ready: missing
/// or malformed input has already been degraded to an empty string (or the
/// default image).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardView {
    pub title: String,
    pub date: String,
    pub place: String,
    pub genre: String,
    pub description: String,
    pub url: Option<String>,
    pub image: String,
}

fn text(record: &Value, key: &str) -> String {
    match record.get(key) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

impl CardView {
    pub fn from_value(record: &Value) -> Self {
        let image = text(record, "image");
        let url = text(record, "url");
        Self {
            title: text(record, "title"),
            date: text(record, "date"),
            place: text(record, "place"),
            genre: text(record, "genre"),
            description: text(record, "description"),
            url: (url != URL_PLACEHOLDER && is_absolute_url(&url)).then_some(url),
            image: if is_absolute_url(&image) {
                image
            } else {
                DEFAULT_IMAGE.to_string()
            },
        }
    }
}

impl fmt::Display for CardView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "  {} | {}", self.date, self.place)?;
        if !self.genre.is_empty() {
            writeln!(f, "  {}", self.genre)?;
        }
        if !self.description.is_empty() {
            writeln!(f, "  {}", self.description)?;
        }
        if let Some(url) = &self.url {
            writeln!(f, "  {url}")?;
        }
        Ok(())
    }
}

/// Exactly one of these is shown for every completed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RenderOutcome {
    Cards {
        cards: Vec<CardView>,
        source: String,
        warning: Option<String>,
    },
    Empty {
        message: String,
    },
    Error {
        message: String,
        retry: bool,
    },
}

impl RenderOutcome {
    pub fn error(message: impl Into<String>) -> Self {
        RenderOutcome::Error {
            message: message.into(),
            retry: true,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, RenderOutcome::Error { .. })
    }

    /// Interpret a response body. Anything that is not a successful envelope
    /// with an `events` list renders as an error.
    pub fn from_body(body: &Value) -> Self {
        if body.get("success").and_then(Value::as_bool) != Some(true) {
            let message = body
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or(ERROR_MESSAGE);
            return Self::error(message);
        }
        let Some(events) = body.get("events").and_then(Value::as_array) else {
            return Self::error(ERROR_MESSAGE);
        };
        if events.is_empty() {
            return RenderOutcome::Empty {
                message: EMPTY_MESSAGE.to_string(),
            };
        }
        RenderOutcome::Cards {
            cards: events.iter().map(CardView::from_value).collect(),
            source: text(body, "source"),
            warning: body
                .get("warning")
                .and_then(Value::as_str)
                .map(str::to_string),
        }
    }
}

impl fmt::Display for RenderOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderOutcome::Cards {
                cards,
                source,
                warning,
            } => {
                if let Some(warning) = warning {
                    writeln!(f, "! {warning}")?;
                }
                writeln!(f, "{} events from {}\n", cards.len(), source)?;
                for card in cards {
                    writeln!(f, "{card}")?;
                }
                Ok(())
            }
            RenderOutcome::Empty { message } => writeln!(f, "{message}"),
            RenderOutcome::Error { message, retry } => {
                writeln!(f, "Error: {message}")?;
                if *retry {
                    writeln!(f, "(retry with --force)")?;
                }
                Ok(())
            }
        }
    }
}
