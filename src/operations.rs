//! Typed operation registry.
//!
//! Each feature action is an [`OperationKind`]: a marker type naming the key,
//! the input and the output. Handlers implement [`OperationHandler`] for a kind
//! and are registered at runtime, usually by a [`Plugin`](crate::client::Plugin).
//! Dispatch is by the kind's `TypeId`, so a handler can only ever receive the
//! input type it was written for.
//!
//! ```rust,ignore
//! let task = client.operations().get_task(Operation::<CreateBid>::new(input))?;
//! let output = task.run(TaskOptions::default().with_signal(signal)).await?;
//! ```

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::client::MintlineClient;
use crate::error::{SdkError, SdkResult};
use crate::task::{CancellationScope, Task, TaskOptions};

/// Marker trait describing one operation.
pub trait OperationKind: Send + Sync + 'static {
    /// Stable name, used in logs and errors.
    const KEY: &'static str;
    type Input: Clone + Send + Sync + 'static;
    type Output: Clone + Send + Sync + 'static;
}

/// A request for an operation of kind `K`.
pub struct Operation<K: OperationKind> {
    pub input: K::Input,
    kind: PhantomData<K>,
}

impl<K: OperationKind> Operation<K> {
    pub fn new(input: K::Input) -> Self {
        Self {
            input,
            kind: PhantomData,
        }
    }

    pub fn key(&self) -> &'static str {
        K::KEY
    }
}

impl<K: OperationKind> Clone for Operation<K> {
    fn clone(&self) -> Self {
        Self::new(self.input.clone())
    }
}

impl<K: OperationKind> fmt::Debug for Operation<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation").field("key", &K::KEY).finish()
    }
}

/// Executes operations of kind `K`.
#[async_trait]
pub trait OperationHandler<K: OperationKind>: Send + Sync {
    async fn handle(
        &self,
        operation: Operation<K>,
        client: &MintlineClient,
        scope: &CancellationScope,
    ) -> SdkResult<K::Output>;
}

struct Registration {
    key: &'static str,
    /// Holds an `Arc<dyn OperationHandler<K>>` for the registered `K`.
    handler: Box<dyn Any + Send + Sync>,
}

/// Handlers keyed by operation kind.
#[derive(Default)]
pub struct OperationRegistry {
    handlers: RwLock<HashMap<TypeId, Registration>>,
}

impl OperationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `K`, replacing any previous handler.
    pub fn register<K, H>(&self, handler: H)
    where
        K: OperationKind,
        H: OperationHandler<K> + 'static,
    {
        let handler: Arc<dyn OperationHandler<K>> = Arc::new(handler);
        tracing::trace!(key = K::KEY, "registering operation handler");
        self.handlers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(
                TypeId::of::<K>(),
                Registration {
                    key: K::KEY,
                    handler: Box::new(handler),
                },
            );
    }

    /// The handler registered for `K`.
    pub fn get<K: OperationKind>(&self) -> SdkResult<Arc<dyn OperationHandler<K>>> {
        self.handlers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&TypeId::of::<K>())
            .and_then(|registration| {
                registration
                    .handler
                    .downcast_ref::<Arc<dyn OperationHandler<K>>>()
                    .cloned()
            })
            .ok_or_else(|| SdkError::OperationHandlerMissing(K::KEY.to_string()))
    }

    pub fn contains<K: OperationKind>(&self) -> bool {
        self.handlers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .contains_key(&TypeId::of::<K>())
    }

    /// Keys of every registered operation, sorted.
    pub fn keys(&self) -> Vec<&'static str> {
        let mut keys: Vec<&'static str> = self
            .handlers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .values()
            .map(|registration| registration.key)
            .collect();
        keys.sort_unstable();
        keys
    }
}

impl fmt::Debug for OperationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationRegistry")
            .field("keys", &self.keys())
            .finish()
    }
}

/// Operation facade bound to a client.
pub struct Operations<'a> {
    pub(crate) client: &'a MintlineClient,
}

impl<'a> Operations<'a> {
    pub fn register<K, H>(&self, handler: H)
    where
        K: OperationKind,
        H: OperationHandler<K> + 'static,
    {
        self.client.operation_registry().register::<K, H>(handler);
    }

    /// Wrap `operation` in a task that dispatches to its handler.
    ///
    /// Fails immediately when no handler is registered for `K`.
    pub fn get_task<K: OperationKind>(&self, operation: Operation<K>) -> SdkResult<Task<K::Output>> {
        let handler = self.client.operation_registry().get::<K>()?;
        let client = self.client.clone();
        Ok(Task::new(move |scope| {
            let handler = handler.clone();
            let client = client.clone();
            let operation = operation.clone();
            async move {
                tracing::debug!(operation = K::KEY, "executing operation");
                handler.handle(operation, &client, &scope).await
            }
        }))
    }

    /// Run `operation` once.
    pub async fn execute<K: OperationKind>(
        &self,
        operation: Operation<K>,
        options: TaskOptions,
    ) -> SdkResult<K::Output> {
        self.get_task(operation)?.run(options).await
    }

    /// Run `operation` inside a parent scope, inheriting its signal.
    pub async fn execute_in<K: OperationKind>(
        &self,
        operation: Operation<K>,
        scope: &CancellationScope,
    ) -> SdkResult<K::Output> {
        self.get_task(operation)?.run_in(scope).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Double;

    impl OperationKind for Double {
        const KEY: &'static str = "DoubleOperation";
        type Input = u64;
        type Output = u64;
    }

    struct DoubleHandler;

    #[async_trait]
    impl OperationHandler<Double> for DoubleHandler {
        async fn handle(
            &self,
            operation: Operation<Double>,
            _client: &MintlineClient,
            scope: &CancellationScope,
        ) -> SdkResult<u64> {
            scope.throw_if_canceled()?;
            Ok(operation.input * 2)
        }
    }

    struct Unregistered;

    impl OperationKind for Unregistered {
        const KEY: &'static str = "UnregisteredOperation";
        type Input = ();
        type Output = ();
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = OperationRegistry::new();
        assert!(!registry.contains::<Double>());
        registry.register::<Double, _>(DoubleHandler);
        assert!(registry.contains::<Double>());
        assert!(registry.get::<Double>().is_ok());
        assert_eq!(registry.keys(), vec!["DoubleOperation"]);
    }

    #[test]
    fn test_missing_handler() {
        let registry = OperationRegistry::new();
        assert!(matches!(
            registry.get::<Unregistered>(),
            Err(SdkError::OperationHandlerMissing(key)) if key == "UnregisteredOperation"
        ));
    }

    #[test]
    fn test_operation_key() {
        let operation = Operation::<Double>::new(21);
        assert_eq!(operation.key(), "DoubleOperation");
        assert_eq!(operation.clone().input, 21);
    }
}
