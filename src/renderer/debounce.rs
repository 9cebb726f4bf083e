use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Collapses bursts of triggers into one call carrying the last value.
///
/// Every trigger restarts the quiet-period timer; the action runs once the
/// timer expires without a newer trigger. A trigger still pending when the
/// debouncer is dropped is discarded.
pub struct Debouncer<T> {
    tx: mpsc::UnboundedSender<T>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn spawn<F, Fut>(delay: Duration, mut action: F) -> (Self, JoinHandle<()>)
    where
        F: FnMut(T) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<T>();
        let handle = tokio::spawn(async move {
            while let Some(mut latest) = rx.recv().await {
                loop {
                    tokio::select! {
                        next = rx.recv() => match next {
                            Some(value) => {
                                debug!("Debounce timer restarted");
                                latest = value;
                            }
                            None => return,
                        },
                        _ = tokio::time::sleep(delay) => {
                            action(latest).await;
                            break;
                        }
                    }
                }
            }
        });
        (Self { tx }, handle)
    }

    /// Returns `false` once the worker has stopped.
    pub fn trigger(&self, value: T) -> bool {
        self.tx.send(value).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEBOUNCE_MILLIS;

    fn debounced() -> (Debouncer<String>, mpsc::UnboundedReceiver<String>) {
        let (calls_tx, calls_rx) = mpsc::unbounded_channel();
        let (debouncer, _handle) =
            Debouncer::spawn(Duration::from_millis(DEBOUNCE_MILLIS), move |query: String| {
                let calls_tx = calls_tx.clone();
                async move {
                    let _ = calls_tx.send(query);
                }
            });
        (debouncer, calls_rx)
    }

    #[tokio::test(start_paused = true)]
    async fn burst_collapses_to_one_call_with_last_value() {
        let (debouncer, mut calls) = debounced();
        for query in ["p", "ps", "psy", "psyt", "psytrance"] {
            assert!(debouncer.trigger(query.to_string()));
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        tokio::time::sleep(Duration::from_millis(DEBOUNCE_MILLIS + 50)).await;

        assert_eq!(calls.try_recv().unwrap(), "psytrance");
        assert!(calls.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn separated_triggers_each_fire() {
        let (debouncer, mut calls) = debounced();
        debouncer.trigger("goa".to_string());
        tokio::time::sleep(Duration::from_millis(DEBOUNCE_MILLIS + 50)).await;
        debouncer.trigger("forest".to_string());
        tokio::time::sleep(Duration::from_millis(DEBOUNCE_MILLIS + 50)).await;

        assert_eq!(calls.try_recv().unwrap(), "goa");
        assert_eq!(calls.try_recv().unwrap(), "forest");
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_fires_before_the_quiet_period() {
        let (debouncer, mut calls) = debounced();
        debouncer.trigger("tokyo".to_string());
        tokio::time::sleep(Duration::from_millis(DEBOUNCE_MILLIS - 50)).await;
        assert!(calls.try_recv().is_err());
    }
}
