// Fetch view - one view's Idle -> Loading -> Success | Error lifecycle
use crate::domain::panel::{ViewError, ViewErrorKind};
use serde::Serialize;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::AbortHandle;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum FetchState<T> {
    Idle,
    Loading,
    Success(T),
    Error(ViewError),
}

impl<T> FetchState<T> {
    pub fn is_settled(&self) -> bool {
        matches!(self, FetchState::Success(_) | FetchState::Error(_))
    }
}

/// Owns the state of a single view and the request currently feeding it.
///
/// Every `load` bumps a generation counter; a completion is applied only while
/// its generation is still current, so the latest request always wins even
/// when an older one resolves later. Superseded and dropped views abort their
/// in-flight task.
pub struct FetchView<T> {
    state: Arc<watch::Sender<FetchState<T>>>,
    generation: Arc<AtomicU64>,
    in_flight: Mutex<Option<AbortHandle>>,
    timeout: Duration,
}

impl<T> FetchView<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(timeout: Duration) -> Self {
        let (state, _) = watch::channel(FetchState::Idle);
        Self {
            state: Arc::new(state),
            generation: Arc::new(AtomicU64::new(0)),
            in_flight: Mutex::new(None),
            timeout,
        }
    }

    pub fn state(&self) -> FetchState<T> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FetchState<T>> {
        self.state.subscribe()
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Start a request for this view, superseding any request still running.
    /// Returns the generation assigned to it.
    pub fn load<F>(&self, request: F) -> u64
    where
        F: Future<Output = Result<T, ViewError>> + Send + 'static,
    {
        // Generation bump and handle swap share one critical section, so the
        // task that ends up current is always the one with the newest ticket
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);

        let mut ticket = 0;
        self.state.send_modify(|state| {
            ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            *state = FetchState::Loading;
        });

        let state = self.state.clone();
        let generation = self.generation.clone();
        let timeout = self.timeout;

        let task = tokio::spawn(async move {
            let outcome = match tokio::time::timeout(timeout, request).await {
                Ok(result) => result,
                Err(_) => Err(ViewError::new(
                    ViewErrorKind::Timeout,
                    format!("Request timed out after {} seconds.", timeout.as_secs()),
                )),
            };

            let applied = state.send_if_modified(|current| {
                if generation.load(Ordering::SeqCst) != ticket {
                    return false;
                }
                *current = match outcome {
                    Ok(data) => FetchState::Success(data),
                    Err(error) => FetchState::Error(error),
                };
                true
            });

            if !applied {
                tracing::debug!(ticket, "Discarding stale response");
            }
        });

        if let Some(previous) = in_flight.replace(task.abort_handle()) {
            previous.abort();
        }

        ticket
    }

    /// Abort the running request; a view still loading goes back to idle
    pub fn cancel(&self) {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = in_flight.take() {
            handle.abort();
        }
        self.state.send_if_modified(|state| {
            self.generation.fetch_add(1, Ordering::SeqCst);
            if matches!(state, FetchState::Loading) {
                *state = FetchState::Idle;
                true
            } else {
                false
            }
        });
    }
}

impl<T> Drop for FetchView<T> {
    fn drop(&mut self) {
        if let Ok(mut slot) = self.in_flight.lock() {
            if let Some(handle) = slot.take() {
                handle.abort();
            }
        }
    }
}

/// Wait until the view reaches `Success` or `Error`
pub async fn settled<T: Clone>(rx: &mut watch::Receiver<FetchState<T>>) -> Option<FetchState<T>> {
    rx.wait_for(|state| state.is_settled())
        .await
        .ok()
        .map(|state| (*state).clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::oneshot;

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn test_load_moves_through_loading_to_success() {
        let view = FetchView::<u32>::new(TIMEOUT);
        assert_eq!(view.state(), FetchState::Idle);

        let (tx, rx) = oneshot::channel::<u32>();
        let mut states = view.subscribe();
        view.load(async move { Ok(rx.await.unwrap_or(0)) });
        assert_eq!(view.state(), FetchState::Loading);

        tx.send(42).unwrap();
        assert_eq!(settled(&mut states).await, Some(FetchState::Success(42)));
    }

    #[tokio::test]
    async fn test_error_is_reported() {
        let view = FetchView::<u32>::new(TIMEOUT);
        let mut states = view.subscribe();
        view.load(async { Err(ViewError::new(ViewErrorKind::NotFound, "City not found or server error.")) });

        match settled(&mut states).await {
            Some(FetchState::Error(error)) => assert_eq!(error.kind, ViewErrorKind::NotFound),
            other => panic!("unexpected state {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_latest_request_wins() {
        let view = FetchView::<&'static str>::new(TIMEOUT);
        let mut states = view.subscribe();

        let (mut slow_tx, slow_rx) = oneshot::channel::<()>();
        let first = view.load(async move {
            let _ = slow_rx.await;
            Ok("stale")
        });
        let second = view.load(async { Ok("fresh") });
        assert!(second > first);

        assert_eq!(settled(&mut states).await, Some(FetchState::Success("fresh")));

        // The superseded task was aborted, dropping its receiver
        slow_tx.closed().await;
        assert_eq!(view.state(), FetchState::Success("fresh"));
    }

    #[tokio::test]
    async fn test_stale_completion_is_discarded() {
        let view = FetchView::<u32>::new(TIMEOUT);
        let (gate_tx, gate_rx) = oneshot::channel::<()>();
        let (done_tx, done_rx) = oneshot::channel::<()>();

        // First request finishes only after the second one has been issued
        view.load(async move {
            let _ = gate_rx.await;
            let _ = done_tx.send(());
            Ok(1)
        });
        let mut states = view.subscribe();
        let (second_tx, second_rx) = oneshot::channel::<u32>();
        view.load(async move { Ok(second_rx.await.unwrap_or(0)) });

        // Aborted first task never reaches its completion
        drop(gate_tx);
        assert!(done_rx.await.is_err());
        assert_eq!(view.state(), FetchState::Loading);

        second_tx.send(2).unwrap();
        assert_eq!(settled(&mut states).await, Some(FetchState::Success(2)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_request_times_out() {
        let view = FetchView::<u32>::new(Duration::from_secs(3));
        let mut states = view.subscribe();
        view.load(std::future::pending());

        match settled(&mut states).await {
            Some(FetchState::Error(error)) => {
                assert_eq!(error.kind, ViewErrorKind::Timeout);
                assert!(error.message.contains("3 seconds"));
            }
            other => panic!("unexpected state {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_cancel_returns_to_idle() {
        let view = FetchView::<u32>::new(TIMEOUT);
        view.load(std::future::pending());
        assert_eq!(view.state(), FetchState::Loading);

        view.cancel();
        assert_eq!(view.state(), FetchState::Idle);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_loads_settle_on_newest_ticket() {
        let view = Arc::new(FetchView::<u64>::new(TIMEOUT));

        let loads: Vec<_> = (0..16u64)
            .map(|i| {
                let view = view.clone();
                tokio::spawn(async move {
                    let ticket = view.load(async move {
                        tokio::task::yield_now().await;
                        Ok(i)
                    });
                    (ticket, i)
                })
            })
            .collect();

        let mut issued = Vec::new();
        for load in loads {
            issued.push(load.await.unwrap());
        }
        let (newest, expected) = issued.into_iter().max().unwrap();
        assert_eq!(view.generation(), newest);

        let mut states = view.subscribe();
        assert_eq!(settled(&mut states).await, Some(FetchState::Success(expected)));
    }

    #[tokio::test]
    async fn test_drop_aborts_in_flight_request() {
        let view = FetchView::<u32>::new(TIMEOUT);
        let (mut tx, rx) = oneshot::channel::<u32>();
        view.load(async move { Ok(rx.await.unwrap_or(0)) });

        drop(view);
        tx.closed().await;
        assert!(tx.is_closed());
    }
}
