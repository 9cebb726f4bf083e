use super::{optional_id, optional_str, required_str, BackendVariant, RawEventData, RecordAdapter};
use crate::error::Result;
use crate::types::EventDraft;

/// Records from the FastAPI service: `place` and `url`, `YYYY/MM/DD` dates,
/// plus extra fields (`capacity`, `city`, ...) that are dropped.
pub struct FastApiAdapter;

impl RecordAdapter for FastApiAdapter {
    fn variant(&self) -> BackendVariant {
        BackendVariant::FastApi
    }

    fn get_event_draft(&self, raw: &RawEventData) -> Result<EventDraft> {
        Ok(EventDraft {
            id: optional_id(raw),
            title: required_str(raw, "title")?,
            date: required_str(raw, "date")?,
            place: optional_str(raw, "place"),
            genre: optional_str(raw, "genre"),
            description: optional_str(raw, "description"),
            url: optional_str(raw, "url"),
            image: optional_str(raw, "image"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EventId;
    use serde_json::json;

    #[test]
    fn converts_slash_dates_and_drops_extras() {
        let raw = json!({
            "id": "mock_ozora",
            "title": "Ozora Festival 2025",
            "date": "2025/08/05",
            "place": "Dádpuszta, Hungary",
            "url": "https://ozora.eu",
            "genre": "Psychedelic Trance Festival",
            "description": "Legendary psychedelic trance festival",
            "capacity": 40000,
            "city": "Dádpuszta"
        });
        let record = FastApiAdapter.adapt(&raw).unwrap();
        assert_eq!(record.id(), Some(&EventId::Text("mock_ozora".into())));
        assert_eq!(record.date().to_string(), "2025-08-05");
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("capacity").is_none());
    }
}
