//! Load-once, reload-on-demand variant of [`Task`](super::Task).
//!
//! A [`Loader`] runs its handler on the first `load` and serves the cached
//! result afterwards. `reload` always re-executes. With `fail_silently`, a failed
//! run resolves to `Ok(None)` instead of an error. A canceled run always
//! resolves to `Ok(None)`, so callers inspect [`Loader::status`] to tell them apart.
//!
//! The abort signal can be set once with [`Loader::set_abort_signal`] and
//! reused by every call, or passed per call in [`LoaderOptions`]. A per-call
//! signal wins. `Loader<()>` covers handlers that only mutate external state.

use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex};

use futures_util::FutureExt;

use crate::error::{SdkError, SdkResult};
use crate::task::lifecycle::{Lifecycle, TaskStatus};
use crate::task::scope::CancellationScope;
use crate::task::signal::AbortSignal;
use crate::task::task::{RunGuard, TaskCallback};

/// Per-call loader options.
#[derive(Debug, Clone, Default)]
pub struct LoaderOptions {
    /// Resolve failures to `Ok(None)` instead of returning the error.
    pub fail_silently: bool,
    /// Signal for this call only.
    pub signal: Option<AbortSignal>,
}

impl LoaderOptions {
    pub fn silent() -> Self {
        Self {
            fail_silently: true,
            signal: None,
        }
    }

    pub fn with_signal(mut self, signal: AbortSignal) -> Self {
        self.signal = Some(signal);
        self
    }
}

/// A cached, reloadable async value.
pub struct Loader<T> {
    handler: TaskCallback<T>,
    lifecycle: Arc<Lifecycle<T>>,
    signal: Arc<Mutex<Option<AbortSignal>>>,
}

impl<T> Clone for Loader<T> {
    fn clone(&self) -> Self {
        Self {
            handler: self.handler.clone(),
            lifecycle: self.lifecycle.clone(),
            signal: self.signal.clone(),
        }
    }
}

impl<T: Clone + Send + 'static> Loader<T> {
    pub fn new<F, Fut>(handler: F) -> Self
    where
        F: Fn(CancellationScope) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = SdkResult<T>> + Send + 'static,
    {
        Self {
            handler: Arc::new(move |scope| handler(scope).boxed()),
            lifecycle: Arc::new(Lifecycle::new()),
            signal: Arc::new(Mutex::new(None)),
        }
    }

    /// Set the long-lived signal used when a call passes none.
    pub fn set_abort_signal(&self, signal: Option<AbortSignal>) -> &Self {
        *self
            .signal
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = signal;
        self
    }

    /// Load if pending, otherwise return the cached result.
    pub async fn load(&self, options: LoaderOptions) -> SdkResult<Option<T>> {
        if self.status() != TaskStatus::Pending {
            return Ok(self.result());
        }
        self.reload(options).await
    }

    /// Execute the handler again.
    ///
    /// Fails with [`SdkError::LoaderAlreadyRunning`] if a load is in flight.
    pub async fn reload(&self, options: LoaderOptions) -> SdkResult<Option<T>> {
        self.lifecycle.start(SdkError::LoaderAlreadyRunning)?;

        let signal = options.signal.or_else(|| {
            self.signal
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .clone()
        });
        let scope = CancellationScope::new(signal);
        let handler = self.handler.clone();
        let mut guard = RunGuard {
            lifecycle: self.lifecycle.clone(),
            armed: true,
        };

        let outcome = scope
            .run(|scope| async move {
                let value = handler(scope.clone()).await?;
                scope.throw_if_canceled()?;
                Ok(value)
            })
            .await;
        guard.armed = false;

        match outcome {
            Ok(value) => {
                self.lifecycle.succeed(value.clone());
                Ok(Some(value))
            }
            Err(error) => {
                let canceled = scope.is_canceled();
                self.lifecycle.fail(error.clone(), canceled);
                if canceled || options.fail_silently {
                    tracing::debug!(%error, canceled, "loader resolved without a value");
                    Ok(None)
                } else {
                    Err(error)
                }
            }
        }
    }

    /// Mark loaded with a known value.
    pub fn load_with(&self, value: T) -> &Self {
        self.lifecycle.succeed(value);
        self
    }

    pub fn reset(&self) -> &Self {
        self.lifecycle.reset();
        self
    }

    pub fn status(&self) -> TaskStatus {
        self.lifecycle.status()
    }

    pub fn result(&self) -> Option<T> {
        self.lifecycle.result()
    }

    pub fn error(&self) -> Option<SdkError> {
        self.lifecycle.error()
    }

    pub fn is_pending(&self) -> bool {
        self.status() == TaskStatus::Pending
    }

    pub fn is_loading(&self) -> bool {
        self.status() == TaskStatus::Running
    }

    pub fn is_loaded(&self) -> bool {
        self.status().is_completed()
    }

    pub fn is_successful(&self) -> bool {
        self.status() == TaskStatus::Successful
    }

    pub fn is_failed(&self) -> bool {
        self.status() == TaskStatus::Failed
    }

    pub fn is_canceled(&self) -> bool {
        self.status() == TaskStatus::Canceled
    }

    pub fn on_status_change(&self, callback: impl Fn(TaskStatus) + Send + Sync + 'static) -> &Self {
        self.lifecycle.subscribe(Arc::new(callback));
        self
    }
}

impl<T: Clone + Send + 'static> fmt::Debug for Loader<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Loader")
            .field("status", &self.lifecycle.status())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::signal::AbortController;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_load_runs_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let loader = Loader::new(move |_| {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            async move { Ok(n) }
        });

        assert_eq!(loader.load(LoaderOptions::default()).await.unwrap(), Some(0));
        assert_eq!(loader.load(LoaderOptions::default()).await.unwrap(), Some(0));
        assert_eq!(loader.reload(LoaderOptions::default()).await.unwrap(), Some(1));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_fail_silently_resolves_to_none() {
        let loader: Loader<u32> =
            Loader::new(|_| async { Err(SdkError::Rpc("unreachable node".into())) });

        let result = loader.load(LoaderOptions::silent()).await.unwrap();
        assert!(result.is_none());
        assert!(loader.is_failed());
        assert!(matches!(loader.error(), Some(SdkError::Rpc(_))));
    }

    #[tokio::test]
    async fn test_failure_propagates_without_fail_silently() {
        let loader: Loader<u32> =
            Loader::new(|_| async { Err(SdkError::Rpc("unreachable node".into())) });
        assert!(loader.load(LoaderOptions::default()).await.is_err());
        assert!(loader.is_failed());
    }

    #[tokio::test]
    async fn test_stored_signal_cancels_void_loader() {
        let controller = AbortController::new();
        let handle = controller.clone();
        let loader: Loader<()> = Loader::new(move |scope| {
            let handle = handle.clone();
            async move {
                handle.abort();
                scope.throw_if_canceled()
            }
        });
        loader.set_abort_signal(Some(controller.signal()));

        assert_eq!(loader.load(LoaderOptions::default()).await.unwrap(), None);
        assert!(loader.is_canceled());
    }

    #[tokio::test]
    async fn test_reload_rejected_while_loading() {
        let (release, wait) = tokio::sync::oneshot::channel::<()>();
        let wait = Arc::new(Mutex::new(Some(wait)));
        let loader: Loader<u8> = Loader::new(move |_| {
            let wait = wait.lock().unwrap().take();
            async move {
                if let Some(wait) = wait {
                    let _ = wait.await;
                }
                Ok(1)
            }
        });

        let background = loader.clone();
        let first = tokio::spawn(async move { background.load(LoaderOptions::default()).await });
        while !loader.is_loading() {
            tokio::task::yield_now().await;
        }

        assert!(matches!(
            loader.reload(LoaderOptions::default()).await,
            Err(SdkError::LoaderAlreadyRunning)
        ));
        release.send(()).unwrap();
        assert_eq!(first.await.unwrap().unwrap(), Some(1));
    }

    #[tokio::test]
    async fn test_dropped_load_is_canceled_and_reloadable() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let loader: Loader<usize> = Loader::new(move |_| {
            let attempt = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt == 0 {
                    std::future::pending::<()>().await;
                }
                Ok(attempt)
            }
        });

        let timed_out = tokio::time::timeout(
            std::time::Duration::from_millis(20),
            loader.load(LoaderOptions::default()),
        )
        .await;
        assert!(timed_out.is_err());
        assert!(loader.is_canceled());
        assert!(loader.error().is_some_and(|error| error.is_canceled()));

        assert_eq!(loader.reload(LoaderOptions::default()).await.unwrap(), Some(1));
        assert!(loader.is_successful());
    }
}
