use super::{optional_id, optional_str, required_str, BackendVariant, RawEventData, RecordAdapter};
use crate::error::Result;
use crate::types::EventDraft;

/// Records from the Express mock API: `location` for the venue, `link` for
/// the detail page.
pub struct ExpressAdapter;

impl RecordAdapter for ExpressAdapter {
    fn variant(&self) -> BackendVariant {
        BackendVariant::Express
    }

    fn get_event_draft(&self, raw: &RawEventData) -> Result<EventDraft> {
        Ok(EventDraft {
            id: optional_id(raw),
            title: required_str(raw, "title")?,
            date: required_str(raw, "date")?,
            place: optional_str(raw, "location"),
            genre: optional_str(raw, "genre"),
            description: optional_str(raw, "description"),
            url: optional_str(raw, "link"),
            image: optional_str(raw, "image"),
        })
    }
}
