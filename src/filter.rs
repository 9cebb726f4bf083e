//! Event filtering: the user-facing substring filter and the Psy keyword
//! screen some sources apply implicitly.

use crate::types::EventRecord;
use serde::{Deserialize, Serialize};

/// Keywords that mark an event as Psy-family.
pub const PSY_KEYWORDS: [&str; 21] = [
    "psy",
    "psychedelic",
    "goa",
    "forest",
    "フルオン",
    "サイケ",
    "ハイテック",
    "psybient",
    "サイビエント",
    "trance",
    "トランス",
    "psytrance",
    "progressive",
    "プログレッシブ",
    "hitech",
    "darkpsy",
    "full-on",
    "minimal",
    "ミニマル",
    "ambient",
    "アンビエント",
];

/// Optional constraints of one query. Blank values impose nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterParams {
    pub query: Option<String>,
    pub location: Option<String>,
    pub genre: Option<String>,
}

impl FilterParams {
    pub fn is_empty(&self) -> bool {
        needle(&self.query).is_none()
            && needle(&self.location).is_none()
            && needle(&self.genre).is_none()
    }

    pub fn matches(&self, event: &EventRecord) -> bool {
        if let Some(q) = needle(&self.query) {
            if !contains_ci(event.title(), &q) && !contains_ci(event.description(), &q) {
                return false;
            }
        }
        if let Some(loc) = needle(&self.location) {
            if !contains_ci(event.place(), &loc) {
                return false;
            }
        }
        if let Some(genre) = needle(&self.genre) {
            if !contains_ci(event.genre(), &genre) {
                return false;
            }
        }
        true
    }
}

/// Lower-cased parameter text, or `None` when absent or blank.
fn needle(param: &Option<String>) -> Option<String> {
    param
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
}

fn contains_ci(haystack: &str, lowered_needle: &str) -> bool {
    haystack.to_lowercase().contains(lowered_needle)
}

/// Stable filter: the matching events in their original order.
pub fn filter_events(events: &[EventRecord], params: &FilterParams) -> Vec<EventRecord> {
    if params.is_empty() {
        return events.to_vec();
    }
    events
        .iter()
        .filter(|event| params.matches(event))
        .cloned()
        .collect()
}

/// Psy keywords found in a piece of text, in keyword-list order.
pub fn matched_keywords(text: &str) -> Vec<&'static str> {
    let lowered = text.to_lowercase();
    PSY_KEYWORDS
        .iter()
        .copied()
        .filter(|keyword| lowered.contains(&keyword.to_lowercase()))
        .collect()
}

/// An event is Psy-family when any keyword appears in its title,
/// description, genre or place.
pub fn is_psy_event(event: &EventRecord) -> bool {
    let combined = [event.title(), event.description(), event.genre(), event.place()].join(" ");
    !matched_keywords(&combined).is_empty()
}

pub fn filter_psy_events(events: &[EventRecord]) -> Vec<EventRecord> {
    events.iter().filter(|e| is_psy_event(e)).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EventDraft;

    fn event(title: &str, place: &str, genre: &str, description: &str) -> EventRecord {
        EventRecord::try_from(EventDraft {
            id: None,
            title: title.into(),
            date: "2025-09-01".into(),
            place: place.into(),
            genre: genre.into(),
            description: description.into(),
            url: "#".into(),
            image: "https://placehold.co/600x400".into(),
        })
        .unwrap()
    }

    fn collection() -> Vec<EventRecord> {
        vec![
            event("Progressive Sunset", "Goa, India", "Progressive Psytrance", "Beach sunset set"),
            event("Full Moon Party", "Koh Phangan, Thailand", "Full-On Psytrance", "Full moon on the beach"),
            event("Forest Ritual", "Nagano, Japan", "Forest Psytrance", "Deep woods night"),
            event("Hitech Madness", "Tokyo, Japan", "Hitech Psytrance", "Fast and furious"),
            event("Tribal Drums", "Byron Bay, Australia", "Tribal Psytrance", "Psychedelic tribal grooves"),
        ]
    }

    fn titles(events: &[EventRecord]) -> Vec<&str> {
        events.iter().map(|e| e.title()).collect()
    }

    fn params(query: Option<&str>, location: Option<&str>, genre: Option<&str>) -> FilterParams {
        FilterParams {
            query: query.map(String::from),
            location: location.map(String::from),
            genre: genre.map(String::from),
        }
    }

    #[test]
    fn no_params_is_identity() {
        let events = collection();
        assert_eq!(filter_events(&events, &FilterParams::default()), events);
        assert_eq!(filter_events(&events, &params(Some("  "), Some(""), None)), events);
    }

    #[test]
    fn genre_matches_only_genre_field() {
        let events = collection();
        let out = filter_events(&events, &params(None, None, Some("hitech")));
        assert_eq!(titles(&out), vec!["Hitech Madness"]);
    }

    #[test]
    fn location_matches_place() {
        let events = collection();
        let out = filter_events(&events, &params(None, Some("japan"), None));
        assert_eq!(titles(&out), vec!["Forest Ritual", "Hitech Madness"]);
    }

    #[test]
    fn query_matches_title_or_description() {
        let events = collection();
        let by_title = filter_events(&events, &params(Some("ritual"), None, None));
        assert_eq!(titles(&by_title), vec!["Forest Ritual"]);
        let by_description = filter_events(&events, &params(Some("beach"), None, None));
        assert_eq!(titles(&by_description), vec!["Progressive Sunset", "Full Moon Party"]);
    }

    #[test]
    fn matching_ignores_case() {
        let events = collection();
        assert_eq!(
            filter_events(&events, &params(Some("PSY"), None, None)),
            filter_events(&events, &params(Some("psy"), None, None)),
        );
    }

    #[test]
    fn parameters_combine_with_and() {
        let events = collection();
        let out = filter_events(&events, &params(Some("night"), Some("japan"), Some("forest")));
        assert_eq!(titles(&out), vec!["Forest Ritual"]);
        let none = filter_events(&events, &params(None, Some("japan"), Some("tribal")));
        assert!(none.is_empty());
    }

    #[test]
    fn composing_disjoint_filters_equals_combined() {
        let events = collection();
        let p1 = params(None, Some("japan"), None);
        let p2 = params(None, None, Some("psytrance"));
        let stepwise = filter_events(&filter_events(&events, &p1), &p2);
        let combined = filter_events(&events, &params(None, Some("japan"), Some("psytrance")));
        assert_eq!(stepwise, combined);
    }

    #[test]
    fn result_is_ordered_subsequence() {
        let events = collection();
        let out = filter_events(&events, &params(Some("e"), None, None));
        let mut cursor = events.iter();
        for kept in &out {
            assert!(cursor.any(|e| e == kept), "{} out of order", kept.title());
        }
    }

    #[test]
    fn empty_collection_yields_empty() {
        assert!(filter_events(&[], &params(Some("psy"), None, None)).is_empty());
    }

    #[test]
    fn filtering_is_idempotent() {
        let events = collection();
        let p = params(None, Some("japan"), None);
        let once = filter_events(&events, &p);
        assert_eq!(filter_events(&once, &p), once);
    }

    #[test]
    fn psy_screen_drops_other_genres() {
        let events = vec![
            event("Psychedelic Trance Night", "WOMB, Tokyo", "Psytrance", "Progressive psytrance event"),
            event("J-POP Night", "Karaoke Bar", "J-Pop", "Japanese pop music event"),
            event("Goa Trance Classics", "Underground Club", "Goa", "Old school goa trance"),
            event("Jazz Night", "Jazz Bar", "Jazz", "Smooth jazz evening"),
        ];
        let out = filter_psy_events(&events);
        assert_eq!(titles(&out), vec!["Psychedelic Trance Night", "Goa Trance Classics"]);
    }

    #[test]
    fn keyword_hits_include_japanese_spellings() {
        let hits = matched_keywords("サイケデリック・トランス オールナイト");
        assert!(hits.contains(&"サイケ"));
        assert!(hits.contains(&"トランス"));
    }
}
