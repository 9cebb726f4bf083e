use axum::body::Body;
use axum::http::Request;
use axum::Router;
use psyfinder::cache::EventCache;
use psyfinder::config::Config;
use psyfinder::server::create_server;
use psyfinder::service::QueryService;
use psyfinder::sources::SourceRegistry;
use std::net::{SocketAddr, TcpListener};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tower::util::MapRequestLayer;

fn app() -> Router {
    let config = Config::default();
    let service = Arc::new(QueryService::new(
        SourceRegistry::from_config(&config).unwrap(),
        EventCache::new(Duration::from_secs(60)),
    ));
    create_server(service, None)
}

/// Serve the built-in datasets on an ephemeral port and return the base URL.
pub async fn spawn_service() -> String {
    serve(app())
}

/// Like `spawn_service`, also counting the requests the service receives.
#[allow(dead_code)]
pub async fn spawn_counting_service() -> (String, Arc<AtomicUsize>) {
    let requests = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&requests);
    let app = app().layer(MapRequestLayer::new(move |request: Request<Body>| {
        counter.fetch_add(1, Ordering::SeqCst);
        request
    }));
    (serve(app), requests)
}

fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    let server = axum::Server::from_tcp(listener)
        .unwrap()
        .serve(app.into_make_service());
    tokio::spawn(async move {
        let _ = server.await;
    });
    format!("http://{addr}")
}

/// An address nothing listens on.
#[allow(dead_code)]
pub fn unused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}
