//! Status state machine shared by [`Task`](super::Task) and [`Loader`](super::Loader).

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use crate::error::{SdkError, SdkResult};

/// Lifecycle status of a task or loader.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Pending,
    Running,
    Successful,
    Failed,
    Canceled,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Successful => "successful",
            Self::Failed => "failed",
            Self::Canceled => "canceled",
        }
    }

    /// Whether the status is terminal for the current run.
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Successful | Self::Failed | Self::Canceled)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub(crate) type StatusListener = Arc<dyn Fn(TaskStatus) + Send + Sync>;

/// What `run`/`load` should do given the current status.
pub(crate) enum RunDecision<T> {
    /// The caller now owns the run; status is `Running`.
    Execute,
    /// Completed earlier; hand back the cached outcome.
    Replay(SdkResult<T>),
}

struct State<T> {
    status: TaskStatus,
    result: Option<T>,
    error: Option<SdkError>,
}

pub(crate) struct Lifecycle<T> {
    state: Mutex<State<T>>,
    listeners: Mutex<Vec<StatusListener>>,
}

impl<T: Clone> Lifecycle<T> {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(State {
                status: TaskStatus::Pending,
                result: None,
                error: None,
            }),
            listeners: Mutex::new(Vec::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub(crate) fn status(&self) -> TaskStatus {
        self.lock().status
    }

    pub(crate) fn result(&self) -> Option<T> {
        self.lock().result.clone()
    }

    pub(crate) fn error(&self) -> Option<SdkError> {
        self.lock().error.clone()
    }

    /// Decide atomically whether to execute, replay, or reject.
    ///
    /// `Running` is rejected with `busy`. `Pending` or `force` moves to `Running`
    /// and clears the previous outcome. Anything else replays.
    pub(crate) fn decide(&self, force: bool, busy: SdkError) -> SdkResult<RunDecision<T>> {
        let state = self.lock();
        if state.status == TaskStatus::Running {
            return Err(busy);
        }
        if force || state.status == TaskStatus::Pending {
            self.commit(state, TaskStatus::Running, None, None);
            return Ok(RunDecision::Execute);
        }
        let replay = match (&state.result, &state.error) {
            (Some(result), _) if state.status == TaskStatus::Successful => Ok(result.clone()),
            (_, Some(error)) => Err(error.clone()),
            _ => Err(SdkError::canceled(state.status.as_str())),
        };
        Ok(RunDecision::Replay(replay))
    }

    /// Move to `Running` unless already running.
    pub(crate) fn start(&self, busy: SdkError) -> SdkResult<()> {
        let state = self.lock();
        if state.status == TaskStatus::Running {
            return Err(busy);
        }
        self.commit(state, TaskStatus::Running, None, None);
        Ok(())
    }

    pub(crate) fn succeed(&self, value: T) {
        self.transition(TaskStatus::Successful, Some(value), None);
    }

    pub(crate) fn fail(&self, error: SdkError, canceled: bool) {
        let status = if canceled {
            TaskStatus::Canceled
        } else {
            TaskStatus::Failed
        };
        self.transition(status, None, Some(error));
    }

    pub(crate) fn reset(&self) {
        self.transition(TaskStatus::Pending, None, None);
    }

    pub(crate) fn subscribe(&self, listener: StatusListener) {
        self.listeners
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(listener);
    }

    fn transition(&self, status: TaskStatus, result: Option<T>, error: Option<SdkError>) {
        let state = self.lock();
        self.commit(state, status, result, error);
    }

    /// Store the outcome and notify listeners if the status changed.
    ///
    /// Listeners run after the state lock is released, in registration order.
    fn commit(
        &self,
        mut state: MutexGuard<'_, State<T>>,
        status: TaskStatus,
        result: Option<T>,
        error: Option<SdkError>,
    ) {
        let changed = state.status != status;
        state.status = status;
        state.result = result;
        state.error = error;
        drop(state);

        if !changed {
            return;
        }
        tracing::trace!(status = %status, "status transition");
        let listeners = self
            .listeners
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();
        for listener in listeners {
            listener(status);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recording(lifecycle: &Lifecycle<u32>) -> Arc<Mutex<Vec<TaskStatus>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        lifecycle.subscribe(Arc::new(move |status| sink.lock().unwrap().push(status)));
        seen
    }

    #[test]
    fn test_same_status_does_not_notify() {
        let lifecycle = Lifecycle::<u32>::new();
        let seen = recording(&lifecycle);

        lifecycle.reset();
        lifecycle.succeed(1);
        lifecycle.succeed(2);

        assert_eq!(*seen.lock().unwrap(), vec![TaskStatus::Successful]);
        assert_eq!(lifecycle.result(), Some(2));
    }

    #[test]
    fn test_decide_rejects_running() {
        let lifecycle = Lifecycle::<u32>::new();
        assert!(matches!(
            lifecycle.decide(false, SdkError::TaskAlreadyRunning),
            Ok(RunDecision::Execute)
        ));
        assert!(matches!(
            lifecycle.decide(true, SdkError::TaskAlreadyRunning),
            Err(SdkError::TaskAlreadyRunning)
        ));
        assert_eq!(lifecycle.status(), TaskStatus::Running);
    }

    #[test]
    fn test_decide_replays_completed() {
        let lifecycle = Lifecycle::<u32>::new();
        lifecycle.succeed(7);
        assert!(matches!(
            lifecycle.decide(false, SdkError::TaskAlreadyRunning),
            Ok(RunDecision::Replay(Ok(7)))
        ));

        lifecycle.fail(SdkError::Validation("bad".into()), false);
        assert_eq!(lifecycle.status(), TaskStatus::Failed);
        assert!(lifecycle.result().is_none());
        assert!(matches!(
            lifecycle.decide(false, SdkError::TaskAlreadyRunning),
            Ok(RunDecision::Replay(Err(SdkError::Validation(_))))
        ));
    }

    #[test]
    fn test_forced_decision_clears_outcome() {
        let lifecycle = Lifecycle::<u32>::new();
        lifecycle.succeed(7);
        let seen = recording(&lifecycle);
        assert!(lifecycle.start(SdkError::TaskAlreadyRunning).is_ok());
        assert!(lifecycle.result().is_none());
        assert_eq!(*seen.lock().unwrap(), vec![TaskStatus::Running]);
    }
}
