//! Abort controller and signal.
//!
//! An [`AbortController`] owns the right to cancel; the [`AbortSignal`] it hands out
//! can be cloned freely and passed into tasks and loaders. Aborting is
//! edge-triggered: the first `abort` records the reason and notifies the
//! listeners registered at that moment. Later calls do nothing.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::SdkError;

type AbortListener = Box<dyn FnOnce(&SdkError) + Send>;

/// Handle returned by [`AbortSignal::add_listener`], used to detach the listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Default)]
struct SignalState {
    reason: Option<SdkError>,
    listeners: Vec<(ListenerId, AbortListener)>,
    next_id: u64,
}

/// Read side of an abort controller.
#[derive(Clone, Default)]
pub struct AbortSignal {
    state: Arc<Mutex<SignalState>>,
}

impl AbortSignal {
    fn lock(&self) -> MutexGuard<'_, SignalState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Whether the signal has fired.
    pub fn is_aborted(&self) -> bool {
        self.lock().reason.is_some()
    }

    /// The reason given to the first `abort` call.
    pub fn reason(&self) -> Option<SdkError> {
        self.lock().reason.clone()
    }

    /// Register a listener fired once on abort.
    ///
    /// Listeners added after the signal fired are never called; check
    /// [`is_aborted`](Self::is_aborted) first.
    pub fn add_listener(&self, listener: impl FnOnce(&SdkError) + Send + 'static) -> ListenerId {
        let mut state = self.lock();
        let id = ListenerId(state.next_id);
        state.next_id += 1;
        if state.reason.is_none() {
            state.listeners.push((id, Box::new(listener)));
        }
        id
    }

    /// Detach a listener. Unknown ids are ignored.
    pub fn remove_listener(&self, id: ListenerId) {
        self.lock().listeners.retain(|(listener_id, _)| *listener_id != id);
    }

    /// Number of attached listeners.
    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }

    fn abort(&self, reason: SdkError) {
        let listeners = {
            let mut state = self.lock();
            if state.reason.is_some() {
                return;
            }
            state.reason = Some(reason.clone());
            std::mem::take(&mut state.listeners)
        };
        tracing::debug!(%reason, listeners = listeners.len(), "abort signal fired");
        for (_, listener) in listeners {
            listener(&reason);
        }
    }
}

impl fmt::Debug for AbortSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("AbortSignal")
            .field("reason", &state.reason)
            .field("listeners", &state.listeners.len())
            .finish()
    }
}

/// Write side: cancels every task and loader holding its signal.
#[derive(Debug, Clone, Default)]
pub struct AbortController {
    signal: AbortSignal,
}

impl AbortController {
    pub fn new() -> Self {
        Self::default()
    }

    /// A clone of the controlled signal.
    pub fn signal(&self) -> AbortSignal {
        self.signal.clone()
    }

    /// Abort with a generic reason.
    pub fn abort(&self) {
        self.abort_with(SdkError::canceled("aborted"));
    }

    /// Abort with a specific reason. Only the first reason is kept.
    pub fn abort_with(&self, reason: SdkError) {
        self.signal.abort(reason);
    }

    pub fn is_aborted(&self) -> bool {
        self.signal.is_aborted()
    }
}
