//! Asynchronous task framework with cooperative cancellation.
//!
//! - [`AbortController`] / [`AbortSignal`]: the external cancellation source
//! - [`CancellationScope`]: per-run view of a signal with checkpoints
//! - [`Task`]: re-runnable unit of work with a cached outcome
//! - [`Loader`]: load-once variant with optional silent failure

pub mod loader;
pub mod scope;
pub mod signal;
#[allow(clippy::module_inception)]
pub mod task;

mod lifecycle;

pub use lifecycle::TaskStatus;
pub use loader::{Loader, LoaderOptions};
pub use scope::CancellationScope;
pub use signal::{AbortController, AbortSignal, ListenerId};
pub use task::{Task, TaskCallback, TaskFuture, TaskNode, TaskOptions};
