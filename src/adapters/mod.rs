//! Adapters from each backend variant's record shape to the canonical
//! [`EventRecord`].
//!
//! The backends drifted apart over time: the Express mock says `location`
//! and `link`, the Next.js route says `location` and `url`, and the FastAPI
//! service says `place` and `url` with `YYYY/MM/DD` dates. Each variant gets
//! one adapter; [`detect`] picks the adapter from the fields present.

pub mod express;
pub mod fastapi;
pub mod nextjs;

use crate::constants::{DEFAULT_IMAGE, URL_PLACEHOLDER};
use crate::error::{FinderError, Result};
use crate::types::{is_absolute_url, is_link, EventDraft, EventId, EventRecord};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

pub use express::ExpressAdapter;
pub use fastapi::FastApiAdapter;
pub use nextjs::NextJsAdapter;

/// Raw record as returned by a backend, before adaptation
pub type RawEventData = serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendVariant {
    Express,
    NextJs,
    FastApi,
}

impl fmt::Display for BackendVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BackendVariant::Express => "express",
            BackendVariant::NextJs => "nextjs",
            BackendVariant::FastApi => "fastapi",
        };
        f.write_str(name)
    }
}

/// Maps one backend variant's record shape onto the canonical schema
pub trait RecordAdapter: Send + Sync {
    fn variant(&self) -> BackendVariant;

    /// Pull the canonical field set out of a raw record
    fn get_event_draft(&self, raw: &RawEventData) -> Result<EventDraft>;

    /// Adapt and validate a raw record.
    fn adapt(&self, raw: &RawEventData) -> Result<EventRecord> {
        let draft = repair_links(self.get_event_draft(raw)?);
        EventRecord::try_from(draft)
    }
}

pub fn adapter_for(variant: BackendVariant) -> &'static dyn RecordAdapter {
    match variant {
        BackendVariant::Express => &ExpressAdapter,
        BackendVariant::NextJs => &NextJsAdapter,
        BackendVariant::FastApi => &FastApiAdapter,
    }
}

/// Guess which backend produced a record from the field names it carries.
pub fn detect(raw: &RawEventData) -> BackendVariant {
    if raw.get("place").is_some() {
        BackendVariant::FastApi
    } else if raw.get("link").is_some() {
        BackendVariant::Express
    } else if raw.get("location").is_some() {
        BackendVariant::NextJs
    } else {
        BackendVariant::FastApi
    }
}

/// Adapt a record with the adapter matching its detected variant.
pub fn adapt_record(raw: &RawEventData) -> Result<EventRecord> {
    let adapter = adapter_for(detect(raw));
    debug!(variant = %adapter.variant(), "adapting record");
    adapter.adapt(raw)
}

/// Outcome of adapting a batch: accepted records in input order plus the
/// reasons for every rejected one.
#[derive(Debug, Default)]
pub struct AdaptedBatch {
    pub records: Vec<EventRecord>,
    pub rejected: Vec<(usize, String)>,
}

pub fn adapt_batch(raws: &[RawEventData]) -> AdaptedBatch {
    let mut batch = AdaptedBatch::default();
    for (index, raw) in raws.iter().enumerate() {
        match adapt_record(raw) {
            Ok(record) => batch.records.push(record),
            Err(e) => batch.rejected.push((index, e.to_string())),
        }
    }
    batch
}

/// Broken links degrade to the placeholder, broken images to the default.
fn repair_links(mut draft: EventDraft) -> EventDraft {
    if !is_link(draft.url.trim()) {
        draft.url = URL_PLACEHOLDER.to_string();
    }
    if !is_absolute_url(draft.image.trim()) {
        draft.image = DEFAULT_IMAGE.to_string();
    }
    draft
}

pub(crate) fn required_str(raw: &RawEventData, field: &str) -> Result<String> {
    raw[field]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| FinderError::InvalidRecord(format!("{field} not found")))
}

pub(crate) fn optional_str(raw: &RawEventData, field: &str) -> String {
    raw[field].as_str().unwrap_or_default().to_string()
}

pub(crate) fn optional_id(raw: &RawEventData) -> Option<EventId> {
    match &raw["id"] {
        serde_json::Value::Number(n) => n.as_i64().map(EventId::Int),
        serde_json::Value::String(s) if !s.is_empty() => Some(EventId::Text(s.clone())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn detects_variants_by_field_names() {
        assert_eq!(detect(&json!({"place": "x"})), BackendVariant::FastApi);
        assert_eq!(detect(&json!({"location": "x", "link": "#"})), BackendVariant::Express);
        assert_eq!(detect(&json!({"location": "x", "url": "#"})), BackendVariant::NextJs);
        assert_eq!(detect(&json!({"title": "x"})), BackendVariant::FastApi);
    }

    #[test]
    fn each_adapter_reports_its_own_variant() {
        for variant in [BackendVariant::Express, BackendVariant::NextJs, BackendVariant::FastApi] {
            assert_eq!(adapter_for(variant).variant(), variant);
        }
    }

    #[test]
    fn relative_links_and_broken_images_are_repaired() {
        let raw = json!({
            "title": "Goa Classics",
            "date": "2025/09/12",
            "place": "Contact, Shibuya",
            "url": "/ja/events/12",
            "image": "not a url",
        });
        let record = adapt_record(&raw).unwrap();
        assert_eq!(record.url(), "#");
        assert_eq!(record.image(), DEFAULT_IMAGE);
    }

    #[test]
    fn batch_keeps_order_and_reports_rejections() {
        let raws = vec![
            json!({"title": "A", "date": "2025-01-01", "place": "p"}),
            json!({"title": "", "date": "2025-01-02", "place": "p"}),
            json!({"title": "C", "date": "2025-01-03", "location": "p", "link": "#"}),
        ];
        let batch = adapt_batch(&raws);
        let titles: Vec<_> = batch.records.iter().map(|r| r.title()).collect();
        assert_eq!(titles, vec!["A", "C"]);
        assert_eq!(batch.rejected.len(), 1);
        assert_eq!(batch.rejected[0].0, 1);
    }
}
