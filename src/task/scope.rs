//! Cancellation scope handed to every task callback.
//!
//! A scope wraps an optional [`AbortSignal`]. While a callback runs inside
//! [`CancellationScope::run`], the scope listens on the signal, caches the first
//! cancellation cause and notifies its own `on_cancel` subscribers exactly once.
//! The signal listener is detached when the callback settles or its future is
//! dropped, so repeated runs never accumulate listeners.
//!
//! Cancellation is cooperative: nothing is interrupted. Callbacks call
//! [`CancellationScope::throw_if_canceled`] at their checkpoints.

use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use crate::error::{SdkError, SdkResult};
use crate::task::signal::{AbortSignal, ListenerId};

type CancelCallback = Box<dyn FnOnce(&SdkError) + Send>;

#[derive(Default)]
struct ScopeState {
    cause: Option<SdkError>,
    subscribers: Vec<CancelCallback>,
}

struct ScopeInner {
    signal: Option<AbortSignal>,
    state: Mutex<ScopeState>,
}

impl ScopeInner {
    fn lock(&self) -> MutexGuard<'_, ScopeState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn fire(&self, reason: &SdkError) {
        let subscribers = {
            let mut state = self.lock();
            if state.cause.is_some() {
                return;
            }
            state.cause = Some(reason.clone());
            std::mem::take(&mut state.subscribers)
        };
        for subscriber in subscribers {
            subscriber(reason);
        }
    }
}

/// Cooperative cancellation handle for one task run.
#[derive(Clone)]
pub struct CancellationScope {
    inner: Arc<ScopeInner>,
}

impl CancellationScope {
    /// Create a scope bound to `signal`, or a scope that is never canceled.
    pub fn new(signal: Option<AbortSignal>) -> Self {
        Self {
            inner: Arc::new(ScopeInner {
                signal,
                state: Mutex::new(ScopeState::default()),
            }),
        }
    }

    /// A scope that can never be canceled.
    pub fn unbound() -> Self {
        Self::new(None)
    }

    /// The signal this scope listens on. Nested tasks inherit it.
    pub fn signal(&self) -> Option<&AbortSignal> {
        self.inner.signal.as_ref()
    }

    /// Whether cancellation was requested. Permanently true once set.
    pub fn is_canceled(&self) -> bool {
        self.inner.lock().cause.is_some()
            || self
                .inner
                .signal
                .as_ref()
                .is_some_and(AbortSignal::is_aborted)
    }

    /// The cached cancellation cause, if any.
    pub fn get_cancelation_error(&self) -> Option<SdkError> {
        if let Some(cause) = self.inner.lock().cause.clone() {
            return Some(cause);
        }
        self.inner.signal.as_ref().and_then(AbortSignal::reason)
    }

    /// Return the cancellation cause as an error if canceled.
    pub fn throw_if_canceled(&self) -> SdkResult<()> {
        match self.get_cancelation_error() {
            Some(cause) => Err(cause),
            None if self.is_canceled() => Err(SdkError::canceled("aborted")),
            None => Ok(()),
        }
    }

    /// Subscribe to the cancellation event.
    ///
    /// Subscribers registered after the event fired are not replayed.
    pub fn on_cancel(&self, callback: impl FnOnce(&SdkError) + Send + 'static) -> &Self {
        let mut state = self.inner.lock();
        if state.cause.is_none() {
            state.subscribers.push(Box::new(callback));
        }
        self
    }

    /// Invoke `callback` with this scope, listening on the signal until it settles.
    pub async fn run<T, F, Fut>(&self, callback: F) -> SdkResult<T>
    where
        F: FnOnce(CancellationScope) -> Fut,
        Fut: Future<Output = SdkResult<T>>,
    {
        let _attachment = self.attach();
        callback(self.clone()).await
    }

    fn attach(&self) -> Attachment {
        let Some(signal) = self.inner.signal.clone() else {
            return Attachment {
                signal: None,
                id: None,
                scope: Arc::downgrade(&self.inner),
            };
        };

        if let Some(reason) = signal.reason() {
            self.inner.fire(&reason);
        }

        let weak = Arc::downgrade(&self.inner);
        let id = signal.add_listener(move |reason| {
            if let Some(inner) = weak.upgrade() {
                inner.fire(reason);
            }
        });

        Attachment {
            signal: Some(signal),
            id: Some(id),
            scope: Arc::downgrade(&self.inner),
        }
    }
}

impl Default for CancellationScope {
    fn default() -> Self {
        Self::unbound()
    }
}

impl fmt::Debug for CancellationScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancellationScope")
            .field("canceled", &self.is_canceled())
            .field("bound", &self.inner.signal.is_some())
            .finish()
    }
}

/// Detaches the signal listener and drops pending subscribers on drop.
struct Attachment {
    signal: Option<AbortSignal>,
    id: Option<ListenerId>,
    scope: Weak<ScopeInner>,
}

impl Drop for Attachment {
    fn drop(&mut self) {
        if let (Some(signal), Some(id)) = (&self.signal, self.id) {
            signal.remove_listener(id);
        }
        if let Some(inner) = self.scope.upgrade() {
            inner.lock().subscribers.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::signal::AbortController;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_unbound_scope_is_never_canceled() {
        let scope = CancellationScope::unbound();
        assert!(!scope.is_canceled());
        assert!(scope.throw_if_canceled().is_ok());
        assert!(scope.get_cancelation_error().is_none());
    }

    #[tokio::test]
    async fn test_run_detaches_listener() {
        let controller = AbortController::new();
        let scope = CancellationScope::new(Some(controller.signal()));

        let observed = scope
            .run(|scope| async move {
                Ok(scope.signal().map(AbortSignal::listener_count))
            })
            .await
            .unwrap();

        assert_eq!(observed, Some(1));
        assert_eq!(controller.signal().listener_count(), 0);
    }

    #[tokio::test]
    async fn test_run_detaches_listener_on_error() {
        let controller = AbortController::new();
        let scope = CancellationScope::new(Some(controller.signal()));

        let result: SdkResult<()> = scope
            .run(|_| async { Err(SdkError::Validation("boom".into())) })
            .await;

        assert!(result.is_err());
        assert_eq!(controller.signal().listener_count(), 0);
    }

    #[tokio::test]
    async fn test_cancellation_notifies_subscribers_once() {
        let controller = AbortController::new();
        let scope = CancellationScope::new(Some(controller.signal()));
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = calls.clone();
        scope.on_cancel(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let handle = controller.clone();
        let result: SdkResult<()> = scope
            .run(|scope| async move {
                handle.abort_with(SdkError::canceled("stop"));
                handle.abort_with(SdkError::canceled("again"));
                scope.throw_if_canceled()
            })
            .await;

        assert!(matches!(result, Err(SdkError::Canceled { reason }) if reason == "stop"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(scope.is_canceled());
    }

    #[test]
    fn test_already_aborted_signal_is_visible_without_running() {
        let controller = AbortController::new();
        controller.abort();
        let scope = CancellationScope::new(Some(controller.signal()));
        assert!(scope.is_canceled());
        assert!(scope.throw_if_canceled().unwrap_err().is_canceled());
    }
}
