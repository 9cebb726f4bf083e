use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Idle,
    Loading,
    Success,
    Error,
}

/// Where the renderer's single request slot stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RequestState {
    pub status: RequestStatus,
    pub sequence: u64,
}

impl Default for RequestState {
    fn default() -> Self {
        Self {
            status: RequestStatus::Idle,
            sequence: 0,
        }
    }
}

/// Hands out monotonic sequence numbers and decides which responses still
/// count. Only the response for the latest sequence may change the state.
#[derive(Debug, Default)]
pub struct RequestTracker {
    state: RequestState,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RequestState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state.status == RequestStatus::Loading
    }

    /// Start a request. Returns its sequence number, or `None` when one is
    /// already in flight and the caller did not force a new one.
    pub fn begin(&mut self, forced: bool) -> Option<u64> {
        if self.is_loading() && !forced {
            return None;
        }
        self.state.sequence += 1;
        self.state.status = RequestStatus::Loading;
        Some(self.state.sequence)
    }

    /// Record the response for `sequence`. Returns `false` for a stale
    /// response, which leaves the state untouched.
    pub fn complete(&mut self, sequence: u64, succeeded: bool) -> bool {
        if sequence != self.state.sequence {
            return false;
        }
        self.state.status = if succeeded {
            RequestStatus::Success
        } else {
            RequestStatus::Error
        };
        true
    }
}
