use super::{optional_id, optional_str, required_str, BackendVariant, RawEventData, RecordAdapter};
use crate::error::Result;
use crate::types::EventDraft;

/// Records from the Next.js API route: `location` for the venue, `url` for
/// the detail page, ISO dates.
pub struct NextJsAdapter;

impl RecordAdapter for NextJsAdapter {
    fn variant(&self) -> BackendVariant {
        BackendVariant::NextJs
    }

    fn get_event_draft(&self, raw: &RawEventData) -> Result<EventDraft> {
        Ok(EventDraft {
            id: optional_id(raw),
            title: required_str(raw, "title")?,
            date: required_str(raw, "date")?,
            place: optional_str(raw, "location"),
            genre: optional_str(raw, "genre"),
            description: optional_str(raw, "description"),
            url: optional_str(raw, "url"),
            image: optional_str(raw, "image"),
        })
    }
}
