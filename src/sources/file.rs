use super::EventSource;
use crate::adapters::{adapt_batch, RawEventData};
use crate::error::{FinderError, Result};
use crate::types::EventRecord;
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::{info, instrument, warn};

/// Reads a JSON dataset exported by any backend variant: either a bare
/// array of records or an envelope with an `events` array.
pub struct FileSource {
    name: String,
    label: String,
    path: PathBuf,
}

impl FileSource {
    pub fn new(name: &str, label: &str, path: PathBuf) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            path,
        }
    }
}

/// Extract the record list from a dataset document.
pub fn raw_records(document: RawEventData) -> Option<Vec<RawEventData>> {
    match document {
        RawEventData::Array(items) => Some(items),
        RawEventData::Object(mut map) => match map.remove("events") {
            Some(RawEventData::Array(items)) => Some(items),
            _ => None,
        },
        _ => None,
    }
}

#[async_trait]
impl EventSource for FileSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn label(&self) -> &str {
        &self.label
    }

    #[instrument(skip(self), fields(source = %self.name, path = %self.path.display()))]
    async fn fetch_events(&self, _force_refresh: bool) -> Result<Vec<EventRecord>> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| FinderError::upstream(&self.name, format!("cannot read dataset: {e}")))?;
        let document: RawEventData = serde_json::from_slice(&bytes)
            .map_err(|e| FinderError::upstream(&self.name, format!("malformed dataset: {e}")))?;
        let raws = raw_records(document).ok_or_else(|| {
            FinderError::upstream(&self.name, "dataset has no event list")
        })?;

        let batch = adapt_batch(&raws);
        for (index, reason) in &batch.rejected {
            warn!("Skipping record {} of {}: {}", index, self.name, reason);
        }
        info!(
            "Loaded {} events ({} rejected) from {}",
            batch.records.len(),
            batch.rejected.len(),
            self.path.display()
        );
        Ok(batch.records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_dataset(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn reads_envelope_documents() {
        let file = write_dataset(
            r#"{"success": true, "events": [
                {"title": "Goa Classics", "date": "2025/09/12", "place": "Contact, Shibuya", "url": "https://clubberia.com/ja/events/1"},
                {"title": "", "date": "2025/09/13", "place": "Nowhere"}
            ], "total": 2}"#,
        );
        let source = FileSource::new("clubberia", "clubberia", file.path().to_path_buf());
        let events = source.fetch_events(false).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].date().to_string(), "2025-09-12");
    }

    #[tokio::test]
    async fn reads_bare_arrays_in_express_shape() {
        let file = write_dataset(
            r##"[{"id": 1, "title": "Full Moon Party", "date": "2025-12-04", "location": "Koh Phangan, Thailand", "link": "#"}]"##,
        );
        let source = FileSource::new("featured", "featured", file.path().to_path_buf());
        let events = source.fetch_events(false).await.unwrap();
        assert_eq!(events[0].place(), "Koh Phangan, Thailand");
    }

    #[tokio::test]
    async fn missing_file_is_upstream_unavailable() {
        let source = FileSource::new("major", "major", PathBuf::from("/nonexistent/major.json"));
        let err = source.fetch_events(false).await.unwrap_err();
        assert!(matches!(err, FinderError::UpstreamUnavailable { .. }));
    }

    #[tokio::test]
    async fn malformed_file_is_upstream_unavailable() {
        let file = write_dataset("{not json");
        let source = FileSource::new("major", "major", file.path().to_path_buf());
        assert!(matches!(
            source.fetch_events(false).await,
            Err(FinderError::UpstreamUnavailable { .. })
        ));
    }
}
