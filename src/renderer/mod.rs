//! Consumer side of the query contract: turns user input into at most one
//! outstanding request and every response into cards, an empty state, or an
//! error with retry.

pub mod client;
pub mod debounce;
pub mod state;
pub mod view;

pub use client::EventsClient;
pub use debounce::Debouncer;
pub use state::{RequestState, RequestStatus, RequestTracker};
pub use view::{CardView, RenderOutcome};

use crate::service::SearchRequest;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

pub struct Renderer {
    client: EventsClient,
    tracker: Mutex<RequestTracker>,
}

impl Renderer {
    pub fn new(client: EventsClient) -> Self {
        Self {
            client,
            tracker: Mutex::new(RequestTracker::new()),
        }
    }

    pub fn state(&self) -> RequestState {
        self.tracker
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .state()
    }

    /// Issue a query. Returns `None` when the request was suppressed because
    /// another is in flight, or when its response arrived after a newer one
    /// had been started.
    pub async fn load(&self, request: &SearchRequest, forced: bool) -> Option<RenderOutcome> {
        let sequence = self
            .tracker
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .begin(forced);
        let Some(sequence) = sequence else {
            debug!("Request suppressed, one is already in flight");
            return None;
        };

        let outcome = self.client.fetch(request).await;

        let current = self
            .tracker
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .complete(sequence, !outcome.is_error());
        if !current {
            debug!(sequence, "Discarding stale response");
            return None;
        }
        Some(outcome)
    }

    /// Input-driven loading: every keystroke is a trigger, and only the last
    /// request of a burst is loaded once `delay` passes without a newer one.
    /// Outcomes that survive the tracker arrive on the returned receiver.
    pub fn debounced(
        self: Arc<Self>,
        delay: Duration,
    ) -> (Debouncer<SearchRequest>, mpsc::UnboundedReceiver<RenderOutcome>) {
        let (outcomes_tx, outcomes_rx) = mpsc::unbounded_channel();
        let (debouncer, _worker) = Debouncer::spawn(delay, move |request: SearchRequest| {
            let renderer = Arc::clone(&self);
            let outcomes_tx = outcomes_tx.clone();
            async move {
                if let Some(outcome) = renderer.load(&request, false).await {
                    let _ = outcomes_tx.send(outcome);
                }
            }
        });
        (debouncer, outcomes_rx)
    }

    /// The retry control of an error outcome.
    pub async fn retry(&self, request: &SearchRequest) -> Option<RenderOutcome> {
        self.load(request, true).await
    }
}
