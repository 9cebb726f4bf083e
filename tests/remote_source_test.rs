mod common;

use psyfinder::cache::EventCache;
use psyfinder::config::Config;
use psyfinder::error::FinderError;
use psyfinder::filter::FilterParams;
use psyfinder::service::{QueryService, SearchRequest};
use psyfinder::sources::SourceRegistry;
use std::time::Duration;

fn remote_service(upstream: &str, source: &str, extra: &str) -> QueryService {
    let config = Config::from_toml(&format!(
        r#"
        [query]
        default_source = "{source}"

        [sources.{source}]
        backend = "remote"
        url = "{upstream}"
        timeout_secs = 5
        {extra}
        "#
    ))
    .unwrap();
    QueryService::new(
        SourceRegistry::from_config(&config).unwrap(),
        EventCache::new(Duration::from_secs(60)),
    )
}

#[tokio::test]
async fn remote_source_reads_an_upstream_service() {
    let upstream = common::spawn_service().await;
    let service = remote_service(&upstream, "featured", "");

    let envelope = service
        .search(SearchRequest {
            filter: FilterParams {
                genre: Some("hitech".into()),
                ..Default::default()
            },
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(envelope.source, "featured");
    assert_eq!(envelope.total, 1);
    assert_eq!(envelope.events[0].title(), "Hitech Madness");
    assert!(envelope.warning.is_none());
}

#[tokio::test]
async fn upstream_rejection_is_upstream_unavailable() {
    let upstream = common::spawn_service().await;
    // The upstream does not know this source and answers 400
    let service = remote_service(&upstream, "local", "fallback = false");

    let err = service.search(SearchRequest::default()).await.unwrap_err();
    assert!(matches!(err, FinderError::UpstreamUnavailable { .. }));
}

#[tokio::test]
async fn unreachable_upstream_falls_back() {
    let service = remote_service(&common::unused_url(), "major", "label = \"major_festivals\"");

    let envelope = service.search(SearchRequest::default()).await.unwrap();
    assert_eq!(envelope.source, "major_festivals_fallback");
    assert!(envelope.total > 0);
    assert!(envelope.warning.is_some());
}

#[tokio::test]
async fn local_name_maps_to_an_upstream_collection() {
    let upstream = common::spawn_service().await;
    let service = remote_service(
        &upstream,
        "upstream",
        "upstream_source = \"featured\"\ndataset = \"featured\"\nfallback = false",
    );

    let envelope = service.search(SearchRequest::default()).await.unwrap();
    assert_eq!(envelope.source, "upstream");
    assert_eq!(envelope.total, 5);
    assert!(envelope.warning.is_none());
    assert!(envelope
        .events
        .iter()
        .any(|event| event.title() == "Hitech Madness"));
}
