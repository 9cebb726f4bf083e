//! Hard-coded datasets. They answer the `builtin` backend and stand in as
//! fallback data when a file or remote backend cannot deliver.

use super::EventSource;
use crate::constants::{
    CLUBBERIA_SOURCE, FEATURED_SOURCE, MAJOR_SOURCE, PSYCHEDELIC_IMAGES, PSYTRANCE_SOURCE,
};
use crate::error::{FinderError, Result};
use crate::types::{EventDraft, EventId, EventRecord};
use async_trait::async_trait;
use tracing::warn;

pub struct BuiltinSource {
    name: String,
    label: String,
    dataset: String,
}

impl BuiltinSource {
    pub fn new(name: &str, label: &str, dataset: &str) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            dataset: dataset.to_string(),
        }
    }
}

#[async_trait]
impl EventSource for BuiltinSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn label(&self) -> &str {
        &self.label
    }

    async fn fetch_events(&self, _force_refresh: bool) -> Result<Vec<EventRecord>> {
        dataset_for(&self.dataset).ok_or_else(|| {
            FinderError::upstream(&self.name, format!("no built-in dataset '{}'", self.dataset))
        })
    }
}

/// Built-in dataset for a source name, if one exists.
pub fn dataset_for(source: &str) -> Option<Vec<EventRecord>> {
    let drafts = match source {
        FEATURED_SOURCE => featured_drafts(),
        CLUBBERIA_SOURCE => clubberia_drafts(),
        MAJOR_SOURCE => major_festival_drafts(),
        PSYTRANCE_SOURCE => psytrance_drafts(),
        _ => return None,
    };
    Some(into_records(drafts))
}

fn into_records(drafts: Vec<EventDraft>) -> Vec<EventRecord> {
    drafts
        .into_iter()
        .filter_map(|draft| {
            let title = draft.title.clone();
            EventRecord::try_from(draft)
                .map_err(|e| warn!("Dropping built-in event '{}': {}", title, e))
                .ok()
        })
        .collect()
}

fn image(index: usize) -> String {
    PSYCHEDELIC_IMAGES[index % PSYCHEDELIC_IMAGES.len()].to_string()
}

/// Five showcase events, one per sub-genre.
fn featured_drafts() -> Vec<EventDraft> {
    let rows = [
        (
            "Progressive Sunrise Festival",
            "2025-11-14",
            "Anjuna Beach, Goa, India",
            "Progressive Psytrance",
            "Rolling progressive basslines from dusk until the sun comes up over the Arabian Sea.",
        ),
        (
            "Full Moon Party",
            "2025-12-04",
            "Haad Rin, Koh Phangan, Thailand",
            "Full-On Psytrance",
            "The legendary beach party under the full moon with full-on psytrance all night.",
        ),
        (
            "Forest Spirits Gathering",
            "2025-09-20",
            "Black Forest, Germany",
            "Forest Psytrance",
            "Dark and twisted forest sounds deep in the woods.",
        ),
        (
            "Hitech Madness",
            "2025-10-03",
            "ageHa, Tokyo, Japan",
            "Hitech Psytrance",
            "200+ BPM of hitech psytrance in the heart of Tokyo.",
        ),
        (
            "Tribal Vibrations",
            "2026-01-17",
            "Byron Bay, Australia",
            "Tribal Psytrance",
            "Hypnotic tribal grooves and live percussion by the ocean.",
        ),
    ];
    rows.iter()
        .enumerate()
        .map(|(i, (title, date, place, genre, description))| EventDraft {
            id: Some(EventId::Int(i as i64 + 1)),
            title: title.to_string(),
            date: date.to_string(),
            place: place.to_string(),
            genre: genre.to_string(),
            description: description.to_string(),
            url: "#".to_string(),
            image: image(i),
        })
        .collect()
}

/// Tokyo club nights in the Clubberia listing style.
fn clubberia_drafts() -> Vec<EventDraft> {
    let rows = [
        ("Astrix", "Psychedelic Journey", "WOMB, Shibuya", "2025/08/02"),
        ("Vini Vici", "Progressive Night", "ageHa, Shimbashi", "2025/08/09"),
        ("Captain Hook", "Goa Classics", "Contact, Shibuya", "2025/08/16"),
        ("Avalon", "Forest Gathering", "Sound Museum Vision, Shibuya", "2025/08/23"),
        ("Neelix", "Full-On Experience", "CIRCUS Tokyo, Shibuya", "2025/08/30"),
        ("Liquid Soul", "Hitech Madness", "Camelot, Shibuya", "2025/09/06"),
        ("Ace Ventura", "Trance Unity", "UNIT, Daikanyama", "2025/09/13"),
        ("Symbolic", "Psychedelic Adventure", "Club STORM, Shibuya", "2025/09/20"),
    ];
    rows.iter()
        .enumerate()
        .map(|(i, (artist, kind, venue, date))| {
            let short_venue = venue.split(',').next().unwrap_or(*venue);
            EventDraft {
                id: Some(EventId::Int(5000 + i as i64)),
                title: format!("{artist} presents {kind}"),
                date: date.to_string(),
                place: format!("{venue}, Tokyo, Japan"),
                genre: "Psychedelic Trance".to_string(),
                description: format!(
                    "Experience the psychedelic journey with {artist} at {short_venue}. An unforgettable night of {}!",
                    kind.to_lowercase()
                ),
                url: format!("https://clubberia.com/ja/events/psychedelic-{i}"),
                image: image(i),
            }
        })
        .collect()
}

/// Well-known large festivals.
fn major_festival_drafts() -> Vec<EventDraft> {
    let rows = [
        (
            "mock_ultra",
            "Ultra Music Festival 2025",
            "2025/03/28",
            "Bayfront Park, Miami, USA",
            "https://ultramusicfestival.com",
            "Electronic Festival",
            "Premier electronic music festival in Miami featuring world-class DJs",
        ),
        (
            "mock_awakenings",
            "Awakenings Festival 2025",
            "2025/06/28",
            "Spaarnwoude, Netherlands",
            "https://awakenings.nl",
            "Techno Festival",
            "Europe's premier techno festival featuring the biggest names in techno",
        ),
        (
            "mock_tomorrowland",
            "Tomorrowland 2025",
            "2025/07/25",
            "De Schorre, Boom, Belgium",
            "https://www.tomorrowland.com",
            "Electronic Festival",
            "The world's most famous electronic music festival featuring top EDM artists",
        ),
        (
            "mock_ozora",
            "Ozora Festival 2025",
            "2025/08/05",
            "Dádpuszta, Hungary",
            "https://ozora.eu",
            "Psychedelic Trance Festival",
            "Legendary psychedelic trance festival in the Hungarian countryside",
        ),
        (
            "mock_creamfields",
            "Creamfields 2025",
            "2025/08/28",
            "Daresbury, Cheshire, UK",
            "https://www.creamfields.com",
            "Electronic Festival",
            "UK's biggest electronic music festival with multiple stages",
        ),
    ];
    rows.iter()
        .map(|(id, title, date, place, url, genre, description)| EventDraft {
            id: Some(EventId::Text(id.to_string())),
            title: title.to_string(),
            date: date.to_string(),
            place: place.to_string(),
            genre: genre.to_string(),
            description: description.to_string(),
            url: url.to_string(),
            image: image(0),
        })
        .collect()
}

/// Tokyo psytrance nights at well-known venues.
fn psytrance_drafts() -> Vec<EventDraft> {
    let rows = [
        ("AMAKUSA", "Progressive Psytrance Night", "WOMB, Shibuya"),
        ("Gotalien", "Goa Trance Classic Session", "ageHa, Shimbashi"),
        ("Earthspace", "Forest Psytrance Journey", "Contact, Shibuya"),
        ("Azax Syndrom", "Full-On Psytrance Party", "Sound Museum Vision, Shibuya"),
        ("Hilight Tribe", "Hitech Madness", "CIRCUS Tokyo, Shibuya"),
        ("Astrix", "Psychedelic Trance Festival", "Air, Ginza"),
        ("Interactive Noise", "Underground Psy Gathering", "UNIT, Daikanyama"),
        ("Freedom Fighters", "Trance Unity", "Fai, Shibuya"),
    ];
    rows.iter()
        .enumerate()
        .map(|(i, (artist, kind, venue))| {
            let first_word = kind.split_whitespace().next().unwrap_or(*kind);
            let short_venue = venue.split(',').next().unwrap_or(*venue);
            EventDraft {
                id: Some(EventId::Int(4000 + i as i64)),
                title: format!("{artist} presents {kind}"),
                date: format!("2025-10-{:02}", 4 + i * 3),
                place: format!("{venue}, Tokyo"),
                genre: format!("{first_word} Psytrance"),
                description: format!(
                    "Join us for an unforgettable {} featuring {artist} at {short_venue} in Tokyo. Experience the psychedelic journey!",
                    kind.to_lowercase()
                ),
                url: format!("https://www.eventbrite.com/e/psytrance-tokyo-{i}"),
                image: image(i),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::get_supported_sources;

    #[test]
    fn every_builtin_draft_validates() {
        for (drafts, expected) in [
            (featured_drafts(), 5),
            (clubberia_drafts(), 8),
            (major_festival_drafts(), 5),
            (psytrance_drafts(), 8),
        ] {
            assert_eq!(into_records(drafts).len(), expected);
        }
    }

    #[test]
    fn every_supported_source_has_a_dataset() {
        for source in get_supported_sources() {
            assert!(dataset_for(source).is_some(), "{source}");
        }
        assert!(dataset_for("eventbrite").is_none());
    }

    #[test]
    fn featured_covers_one_event_per_subgenre() {
        let events = dataset_for(FEATURED_SOURCE).unwrap();
        let genres: Vec<_> = events.iter().map(|e| e.genre()).collect();
        assert_eq!(
            genres,
            vec![
                "Progressive Psytrance",
                "Full-On Psytrance",
                "Forest Psytrance",
                "Hitech Psytrance",
                "Tribal Psytrance"
            ]
        );
    }

    #[tokio::test]
    async fn builtin_source_serves_its_dataset() {
        let source = BuiltinSource::new(MAJOR_SOURCE, "major_festivals", MAJOR_SOURCE);
        let events = source.fetch_events(false).await.unwrap();
        assert_eq!(events.len(), 5);
        assert_eq!(source.label(), "major_festivals");
    }

    #[tokio::test]
    async fn missing_dataset_is_an_error_not_an_empty_list() {
        let source = BuiltinSource::new("tokyo", "tokyo", "tokyo");
        assert!(matches!(
            source.fetch_events(false).await,
            Err(FinderError::UpstreamUnavailable { .. })
        ));
    }
}
