use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Runs background refresh jobs, at most one at a time.
#[derive(Clone, Default)]
pub struct Refresher {
    running: Arc<AtomicBool>,
}

/// Clears the running flag when the job ends, even if it panicked.
struct RunningGuard(Arc<AtomicBool>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl Refresher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Spawn `job` unless one is already running. Returns whether it was
    /// scheduled.
    pub fn trigger<F>(&self, job: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("Refresh already in progress, skipping");
            return false;
        }
        let guard = RunningGuard(self.running.clone());
        tokio::spawn(async move {
            let _guard = guard;
            info!("Background refresh started");
            job.await;
            info!("Background refresh finished");
        });
        true
    }
}
