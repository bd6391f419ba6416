//! Re-runnable asynchronous unit of work.
//!
//! A [`Task`] wraps a callback receiving a [`CancellationScope`]. It tracks its
//! status, caches the outcome of the last run and notifies status subscribers.
//!
//! ```rust,ignore
//! let task = Task::new(|scope| async move {
//!     scope.throw_if_canceled()?;
//!     Ok(42u64)
//! });
//! assert_eq!(task.run(TaskOptions::default()).await?, 42);
//! // Cached, the callback does not run again.
//! assert_eq!(task.run(TaskOptions::default()).await?, 42);
//! ```

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;

use crate::error::{SdkError, SdkResult};
use crate::task::lifecycle::{Lifecycle, RunDecision, TaskStatus};
use crate::task::scope::CancellationScope;
use crate::task::signal::AbortSignal;

/// Boxed future returned by task callbacks.
pub type TaskFuture<T> = BoxFuture<'static, SdkResult<T>>;

/// Shared task callback.
pub type TaskCallback<T> = Arc<dyn Fn(CancellationScope) -> TaskFuture<T> + Send + Sync>;

/// Options for a single [`Task::run`].
#[derive(Debug, Clone, Default)]
pub struct TaskOptions {
    /// Signal observed by this run's scope.
    pub signal: Option<AbortSignal>,
    /// Re-execute even if the task already completed.
    pub force: bool,
}

impl TaskOptions {
    pub fn with_signal(mut self, signal: AbortSignal) -> Self {
        self.signal = Some(signal);
        self
    }

    pub fn forced(mut self) -> Self {
        self.force = true;
        self
    }
}

/// Type-erased view of a task, used for children of composite tasks.
pub trait TaskNode: Send + Sync {
    fn status(&self) -> TaskStatus;
    fn children(&self) -> Vec<Arc<dyn TaskNode>>;
}

/// A stateful, re-runnable async unit of work.
///
/// Clones share state: a status subscription on one clone observes runs
/// started from another.
pub struct Task<T> {
    callback: TaskCallback<T>,
    children: Vec<Arc<dyn TaskNode>>,
    lifecycle: Arc<Lifecycle<T>>,
}

impl<T> Clone for Task<T> {
    fn clone(&self) -> Self {
        Self {
            callback: self.callback.clone(),
            children: self.children.clone(),
            lifecycle: self.lifecycle.clone(),
        }
    }
}

impl<T: Clone + Send + 'static> Task<T> {
    /// Create a task from a callback.
    pub fn new<F, Fut>(callback: F) -> Self
    where
        F: Fn(CancellationScope) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = SdkResult<T>> + Send + 'static,
    {
        Self {
            callback: Arc::new(move |scope| callback(scope).boxed()),
            children: Vec::new(),
            lifecycle: Arc::new(Lifecycle::new()),
        }
    }

    /// Attach child tasks, making this a composite task.
    pub fn with_children(mut self, children: Vec<Arc<dyn TaskNode>>) -> Self {
        self.children = children;
        self
    }

    /// Attach one child task.
    pub fn with_child<U: Clone + Send + 'static>(mut self, child: Task<U>) -> Self {
        self.children.push(Arc::new(child));
        self
    }

    /// Run the task.
    ///
    /// Fails with [`SdkError::TaskAlreadyRunning`] if a run is in flight.
    /// A completed task replays its cached result or error unless
    /// `options.force` is set.
    pub async fn run(&self, options: TaskOptions) -> SdkResult<T> {
        match self
            .lifecycle
            .decide(options.force, SdkError::TaskAlreadyRunning)?
        {
            RunDecision::Replay(outcome) => outcome,
            RunDecision::Execute => self.execute(options.signal).await,
        }
    }

    /// Run inside a parent scope, inheriting its abort signal.
    pub async fn run_in(&self, scope: &CancellationScope) -> SdkResult<T> {
        self.run(TaskOptions {
            signal: scope.signal().cloned(),
            force: false,
        })
        .await
    }

    async fn execute(&self, signal: Option<AbortSignal>) -> SdkResult<T> {
        let scope = CancellationScope::new(signal);
        scope.on_cancel(|reason| tracing::debug!(%reason, "task cancellation requested"));

        let mut guard = RunGuard {
            lifecycle: self.lifecycle.clone(),
            armed: true,
        };
        let callback = self.callback.clone();
        let lifecycle = self.lifecycle.clone();

        let outcome = scope
            .run(|scope| async move {
                let value = callback(scope.clone()).await?;
                scope.throw_if_canceled()?;
                Ok(value)
            })
            .await;
        guard.armed = false;

        match outcome {
            Ok(value) => {
                lifecycle.succeed(value.clone());
                Ok(value)
            }
            Err(error) => {
                let canceled = scope.is_canceled();
                tracing::debug!(%error, canceled, "task run did not succeed");
                lifecycle.fail(error.clone(), canceled);
                Err(error)
            }
        }
    }

    /// Mark the task successful with a known value, bypassing the callback.
    pub fn load_with(&self, value: T) -> &Self {
        self.lifecycle.succeed(value);
        self
    }

    /// Back to `Pending`, clearing result and error.
    pub fn reset(&self) -> &Self {
        self.lifecycle.reset();
        self
    }

    pub fn status(&self) -> TaskStatus {
        self.lifecycle.status()
    }

    /// Result of the last successful run.
    pub fn result(&self) -> Option<T> {
        self.lifecycle.result()
    }

    /// Error of the last failed or canceled run.
    pub fn error(&self) -> Option<SdkError> {
        self.lifecycle.error()
    }

    pub fn children(&self) -> &[Arc<dyn TaskNode>] {
        &self.children
    }

    pub fn is_pending(&self) -> bool {
        self.status() == TaskStatus::Pending
    }

    pub fn is_running(&self) -> bool {
        self.status() == TaskStatus::Running
    }

    pub fn is_completed(&self) -> bool {
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

    /// Subscribe to every status transition.
    pub fn on_status_change(&self, callback: impl Fn(TaskStatus) + Send + Sync + 'static) -> &Self {
        self.lifecycle.subscribe(Arc::new(callback));
        self
    }

    /// Subscribe to transitions into `status`.
    pub fn on_status_change_to(
        &self,
        status: TaskStatus,
        callback: impl Fn() + Send + Sync + 'static,
    ) -> &Self {
        self.on_status_change(move |new_status| {
            if new_status == status {
                callback();
            }
        })
    }

    pub fn on_success(&self, callback: impl Fn() + Send + Sync + 'static) -> &Self {
        self.on_status_change_to(TaskStatus::Successful, callback)
    }

    pub fn on_failure(&self, callback: impl Fn() + Send + Sync + 'static) -> &Self {
        self.on_status_change_to(TaskStatus::Failed, callback)
    }

    pub fn on_cancel(&self, callback: impl Fn() + Send + Sync + 'static) -> &Self {
        self.on_status_change_to(TaskStatus::Canceled, callback)
    }
}

impl<T: Clone + Send + 'static> TaskNode for Task<T> {
    fn status(&self) -> TaskStatus {
        self.lifecycle.status()
    }

    fn children(&self) -> Vec<Arc<dyn TaskNode>> {
        self.children.clone()
    }
}

impl<T: Clone + Send + 'static> fmt::Debug for Task<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("status", &self.lifecycle.status())
            .field("children", &self.children.len())
            .finish()
    }
}

/// Marks the lifecycle canceled if a run future is dropped before it settles.
pub(crate) struct RunGuard<T: Clone> {
    pub(crate) lifecycle: Arc<Lifecycle<T>>,
    pub(crate) armed: bool,
}

impl<T: Clone> Drop for RunGuard<T> {
    fn drop(&mut self) {
        if self.armed {
            self.lifecycle
                .fail(SdkError::canceled("run future dropped"), true);
        }
    }
}
