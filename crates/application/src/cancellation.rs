//! Cancellation signals for in-flight requests.
//!
//! A [`CancellationSignal`] flips once from "pending" to "fired" and records
//! why. Timeouts are expressed as signals that fire on their own, and several
//! signals can be folded into one that fires with whichever input fires first.
//!
//! Signals that fire on their own (timeouts, combined signals) run a small
//! tokio task, so they must be created inside a tokio runtime. Those tasks
//! only hold weak references and exit once the signal they feed is dropped.

use std::future::Future;
use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::sync::watch;

use crate::error::ClientResult;

/// Why a signal fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// Cancelled explicitly by the caller.
    Aborted,
    /// A request timeout elapsed.
    TimedOut {
        /// The timeout that elapsed.
        timeout_ms: u64,
    },
}

type State = watch::Sender<Option<CancelReason>>;

/// Handle observable for an "aborted" transition.
///
/// Clones share state: cancelling any clone fires all of them.
#[derive(Debug, Clone)]
pub struct CancellationSignal {
    state: Arc<State>,
}

impl Default for CancellationSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl CancellationSignal {
    /// Creates a signal that has not fired.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            state: Arc::new(tx),
        }
    }

    /// Creates a signal that fires with [`CancelReason::TimedOut`] once
    /// `duration` has elapsed.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn timeout(duration: Duration) -> Self {
        let signal = Self::new();
        let timeout_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        let target = Arc::downgrade(&signal.state);
        let mut done = signal.state.subscribe();

        tokio::spawn(async move {
            tokio::select! {
                () = tokio::time::sleep(duration) => {
                    fire_weak(&target, CancelReason::TimedOut { timeout_ms });
                }
                _ = done.wait_for(Option::is_some) => {}
            }
        });

        signal
    }

    /// Combines signals into one that fires as soon as any of them fires.
    ///
    /// - no signal: `None`
    /// - one signal: that same signal, unchanged
    /// - several: a new signal carrying the reason of the first input to fire.
    ///   It is already fired if any input was fired at composition time.
    ///
    /// Must be called from within a tokio runtime when two or more signals
    /// are given.
    #[must_use]
    pub fn any(mut signals: Vec<Self>) -> Option<Self> {
        if signals.len() <= 1 {
            return signals.pop();
        }

        let composite = Self::new();
        if let Some(reason) = signals.iter().find_map(Self::reason) {
            composite.cancel_with(reason);
            return Some(composite);
        }

        for input in signals {
            let target = Arc::downgrade(&composite.state);
            let mut done = composite.state.subscribe();
            tokio::spawn(async move {
                tokio::select! {
                    reason = input.cancelled() => fire_weak(&target, reason),
                    _ = done.wait_for(Option::is_some) => {}
                }
            });
        }

        Some(composite)
    }

    /// Builds the signal for one request: the timeout-derived signal (if a
    /// timeout is set) combined with the caller's signal (if any).
    #[must_use]
    pub fn for_request(timeout_ms: Option<u64>, external: Option<Self>) -> Option<Self> {
        let timeout = timeout_ms.map(|ms| Self::timeout(Duration::from_millis(ms)));
        Self::any(timeout.into_iter().chain(external).collect())
    }

    /// Fires the signal with [`CancelReason::Aborted`].
    pub fn cancel(&self) {
        self.cancel_with(CancelReason::Aborted);
    }

    /// Fires the signal. Only the first reason is kept.
    pub fn cancel_with(&self, reason: CancelReason) {
        fire(&self.state, reason);
    }

    /// Returns true once the signal has fired.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.state.borrow().is_some()
    }

    /// Returns the reason the signal fired, if it has.
    #[must_use]
    pub fn reason(&self) -> Option<CancelReason> {
        *self.state.borrow()
    }

    /// Returns true if both handles share the same state.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }

    /// Waits until the signal fires. Resolves immediately if it already has.
    pub async fn cancelled(&self) -> CancelReason {
        let mut rx = self.state.subscribe();
        // `self` keeps the sender alive, so the channel cannot close here.
        rx.wait_for(Option::is_some)
            .await
            .map_or(CancelReason::Aborted, |state| {
                state.unwrap_or(CancelReason::Aborted)
            })
    }
}

fn fire(state: &State, reason: CancelReason) {
    state.send_if_modified(|current| {
        if current.is_some() {
            return false;
        }
        *current = Some(reason);
        true
    });
}

fn fire_weak(target: &Weak<State>, reason: CancelReason) {
    if let Some(state) = target.upgrade() {
        fire(&state, reason);
    }
}

/// Runs `future` unless `signal` fires first.
///
/// An already-fired signal wins without polling the future.
///
/// # Errors
///
/// Returns [`ClientError::Cancelled`](crate::ClientError::Cancelled) or
/// [`ClientError::Timeout`](crate::ClientError::Timeout) when the signal
/// fires, otherwise whatever the future returns.
pub async fn with_cancellation<T, F>(signal: Option<&CancellationSignal>, future: F) -> ClientResult<T>
where
    F: Future<Output = ClientResult<T>>,
{
    let Some(signal) = signal else {
        return future.await;
    };

    tokio::select! {
        biased;
        reason = signal.cancelled() => Err(reason.into()),
        result = future => result,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use pretty_assertions::assert_eq;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_timeout_fires_after_duration() {
        let start = Instant::now();
        let signal = CancellationSignal::timeout(Duration::from_millis(250));
        assert!(!signal.is_cancelled());

        let reason = signal.cancelled().await;

        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(250));
        assert!(elapsed < Duration::from_millis(260));
        assert_eq!(reason, CancelReason::TimedOut { timeout_ms: 250 });
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_does_not_fire_early() {
        let signal = CancellationSignal::timeout(Duration::from_millis(100));

        tokio::time::sleep(Duration::from_millis(99)).await;
        assert!(!signal.is_cancelled());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert!(signal.is_cancelled());
    }

    #[test]
    fn test_any_of_nothing_is_none() {
        assert!(CancellationSignal::any(Vec::new()).is_none());
    }

    #[test]
    fn test_any_of_one_is_the_same_signal() {
        let signal = CancellationSignal::new();
        let combined = CancellationSignal::any(vec![signal.clone()]).unwrap();

        assert!(combined.same_as(&signal));
    }

    #[tokio::test]
    async fn test_any_of_many_is_a_new_signal_firing_with_first_input() {
        let first = CancellationSignal::new();
        let second = CancellationSignal::new();
        let combined = CancellationSignal::any(vec![first.clone(), second.clone()]).unwrap();

        assert!(!combined.same_as(&first));
        assert!(!combined.same_as(&second));
        assert!(!combined.is_cancelled());

        second.cancel_with(CancelReason::TimedOut { timeout_ms: 10 });
        let reason = combined.cancelled().await;

        assert_eq!(reason, CancelReason::TimedOut { timeout_ms: 10 });
        assert!(!first.is_cancelled());
    }

    #[tokio::test]
    async fn test_any_with_fired_input_is_fired_immediately() {
        let fired = CancellationSignal::new();
        fired.cancel();
        let pending = CancellationSignal::new();

        let combined = CancellationSignal::any(vec![pending, fired]).unwrap();

        assert!(combined.is_cancelled());
        assert_eq!(combined.reason(), Some(CancelReason::Aborted));
    }

    #[tokio::test(start_paused = true)]
    async fn test_for_request_fires_on_earliest_input() {
        let external = CancellationSignal::new();
        let signal = CancellationSignal::for_request(Some(1_000), Some(external.clone())).unwrap();

        tokio::time::sleep(Duration::from_millis(10)).await;
        external.cancel();

        assert_eq!(signal.cancelled().await, CancelReason::Aborted);
    }

    #[tokio::test(start_paused = true)]
    async fn test_for_request_with_timeout_only() {
        let start = Instant::now();
        let signal = CancellationSignal::for_request(Some(40), None).unwrap();

        assert_eq!(signal.cancelled().await, CancelReason::TimedOut { timeout_ms: 40 });
        assert!(start.elapsed() >= Duration::from_millis(40));
    }

    #[test]
    fn test_for_request_without_inputs_has_no_signal() {
        assert!(CancellationSignal::for_request(None, None).is_none());
    }

    #[test]
    fn test_first_reason_wins() {
        let signal = CancellationSignal::new();
        signal.cancel_with(CancelReason::TimedOut { timeout_ms: 5 });
        signal.cancel();

        assert_eq!(signal.reason(), Some(CancelReason::TimedOut { timeout_ms: 5 }));
    }

    #[tokio::test]
    async fn test_with_cancellation_short_circuits_fired_signal() {
        let signal = CancellationSignal::new();
        signal.cancel();

        let result: ClientResult<u8> = with_cancellation(Some(&signal), async { Ok(1) }).await;

        assert_eq!(result, Err(ClientError::Cancelled));
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_cancellation_times_out_slow_future() {
        let signal = CancellationSignal::timeout(Duration::from_millis(50));

        let result: ClientResult<u8> = with_cancellation(Some(&signal), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(1)
        })
        .await;

        assert_eq!(result, Err(ClientError::Timeout { timeout_ms: 50 }));
    }

    #[tokio::test]
    async fn test_with_cancellation_without_signal_runs_future() {
        let result: ClientResult<u8> = with_cancellation(None, async { Ok(3) }).await;
        assert_eq!(result, Ok(3));
    }
}
