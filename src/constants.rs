/// Source name constants to ensure consistency across the codebase.
/// Names are what callers pass as `?source=`; labels are what the
/// response envelope reports in its `source` field.

// Source names (query parameter values)
pub const CLUBBERIA_SOURCE: &str = "clubberia";
pub const MAJOR_SOURCE: &str = "major";
pub const PSYTRANCE_SOURCE: &str = "psytrance";
pub const FEATURED_SOURCE: &str = "featured";

// Envelope labels
pub const CLUBBERIA_LABEL: &str = "clubberia";
pub const MAJOR_LABEL: &str = "major_festivals";
pub const PSYTRANCE_LABEL: &str = "psytrance";
pub const FEATURED_LABEL: &str = "featured";

/// Suffix appended to a label when the built-in fallback dataset answered.
pub const FALLBACK_SUFFIX: &str = "_fallback";
/// Suffix appended to a label when an expired cached copy answered.
pub const STALE_SUFFIX: &str = "_stale";

/// Placeholder permitted in `url` meaning "no link available".
pub const URL_PLACEHOLDER: &str = "#";

pub const DEFAULT_IMAGE: &str =
    "https://images.unsplash.com/photo-1518005020951-eccb49447d0a?q=80&w=400&auto=format&fit=crop";

pub const PSYCHEDELIC_IMAGES: [&str; 6] = [
    "https://images.unsplash.com/photo-1518005020951-eccb49447d0a?q=80&w=400&auto=format&fit=crop",
    "https://images.unsplash.com/photo-1517457375823-0706694789e8?q=80&w=400&auto=format&fit=crop",
    "https://images.unsplash.com/photo-1500382017468-9049ce8b650c?q=80&w=400&auto=format&fit=crop",
    "https://images.unsplash.com/photo-1493225457124-a3eb161ffa5f?q=80&w=400&auto=format&fit=crop",
    "https://images.unsplash.com/photo-1540039155733-5bb30b53aa14?q=80&w=400&auto=format&fit=crop",
    "https://images.unsplash.com/photo-1571266028243-d220c9b34652?q=80&w=400&auto=format&fit=crop",
];

pub const DEFAULT_CACHE_TTL_SECS: u64 = 3600;
pub const CLUBBERIA_CACHE_TTL_SECS: u64 = 6 * 60 * 60;

/// Renderer-side quiet period before a burst of parameter changes is sent.
pub const DEBOUNCE_MILLIS: u64 = 300;

/// Longest free-text parameter the service accepts.
pub const MAX_PARAM_LEN: usize = 200;

/// Get all built-in source names
pub fn get_supported_sources() -> Vec<&'static str> {
    vec![
        CLUBBERIA_SOURCE,
        MAJOR_SOURCE,
        PSYTRANCE_SOURCE,
        FEATURED_SOURCE,
    ]
}
