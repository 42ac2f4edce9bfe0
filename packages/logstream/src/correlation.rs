//! Per-thread correlation context.
//!
//! Each thread that runs an invocation holds the invocation's ids while the
//! invocation is in flight. Nothing flows to other threads implicitly: work
//! handed to another thread must be wrapped with [`propagate`] (or started
//! with [`spawn_with_context`]) to carry the caller's context along.

use std::cell::RefCell;
use std::marker::PhantomData;
use std::sync::Arc;
use std::thread::JoinHandle;

use serde::{Deserialize, Serialize};

thread_local! {
    static CURRENT: RefCell<Option<Arc<CorrelationContext>>> = const { RefCell::new(None) };
}

/// Ids identifying the invocation a thread is currently working for.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationContext {
    pub invoke_id: String,
    pub request_id: String,
    pub instance_id: String,
    pub function_info: String,
    pub log_group_id: String,
    pub log_stream_id: String,
}

impl CorrelationContext {
    pub fn new(request_id: impl Into<String>, invoke_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            invoke_id: invoke_id.into(),
            ..Self::default()
        }
    }

    pub fn with_instance_id(mut self, instance_id: impl Into<String>) -> Self {
        self.instance_id = instance_id.into();
        self
    }

    pub fn with_function_info(mut self, function_info: impl Into<String>) -> Self {
        self.function_info = function_info.into();
        self
    }

    pub fn with_log_group(
        mut self,
        log_group_id: impl Into<String>,
        log_stream_id: impl Into<String>,
    ) -> Self {
        self.log_group_id = log_group_id.into();
        self.log_stream_id = log_stream_id.into();
        self
    }

    /// Makes this the current thread's context until the guard drops.
    pub fn enter(self) -> CorrelationGuard {
        Self::enter_shared(Arc::new(self))
    }

    pub fn enter_shared(context: Arc<Self>) -> CorrelationGuard {
        let previous = CURRENT.with(|current| current.replace(Some(context)));
        CorrelationGuard {
            previous,
            _not_send: PhantomData,
        }
    }

    pub fn current() -> Option<Arc<Self>> {
        CURRENT.with(|current| current.borrow().clone())
    }
}

/// Restores the previously current context when dropped.
///
/// Guards are tied to the thread that created them.
#[must_use = "the context is cleared as soon as the guard is dropped"]
pub struct CorrelationGuard {
    previous: Option<Arc<CorrelationContext>>,
    _not_send: PhantomData<*const ()>,
}

impl Drop for CorrelationGuard {
    fn drop(&mut self) {
        let previous = self.previous.take();
        CURRENT.with(|current| *current.borrow_mut() = previous);
    }
}

/// Wraps `f` so that it runs under the calling thread's current context.
pub fn propagate<F, R>(f: F) -> impl FnOnce() -> R + Send
where
    F: FnOnce() -> R + Send,
{
    let context = CorrelationContext::current();
    move || {
        let _guard = context.map(CorrelationContext::enter_shared);
        f()
    }
}

/// Spawns a thread that runs `f` under the caller's context.
pub fn spawn_with_context<F, T>(f: F) -> JoinHandle<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    std::thread::spawn(propagate(f))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_context_by_default() {
        assert!(CorrelationContext::current().is_none());
    }

    #[test]
    fn guard_sets_and_clears() {
        {
            let _guard = CorrelationContext::new("req", "inv").enter();
            let current = CorrelationContext::current().unwrap();
            assert_eq!(current.request_id, "req");
            assert_eq!(current.invoke_id, "inv");
        }
        assert!(CorrelationContext::current().is_none());
    }

    #[test]
    fn nested_guard_restores_outer() {
        let _outer = CorrelationContext::new("outer", "1").enter();
        {
            let _inner = CorrelationContext::new("inner", "2").enter();
            assert_eq!(CorrelationContext::current().unwrap().request_id, "inner");
        }
        assert_eq!(CorrelationContext::current().unwrap().request_id, "outer");
    }

    #[test]
    fn plain_threads_do_not_inherit() {
        let _guard = CorrelationContext::new("req", "inv").enter();
        let seen = std::thread::spawn(CorrelationContext::current)
            .join()
            .unwrap();
        assert!(seen.is_none());
    }

    #[test]
    fn spawned_thread_inherits() {
        let _guard = CorrelationContext::new("req", "inv")
            .with_instance_id("instance-1")
            .enter();
        let inside = spawn_with_context(CorrelationContext::current)
            .join()
            .unwrap();
        assert_eq!(inside.unwrap().instance_id, "instance-1");
    }

    #[test]
    fn propagated_closure_restores_worker_context() {
        let task = {
            let _guard = CorrelationContext::new("caller", "1").enter();
            propagate(|| CorrelationContext::current().map(|c| c.request_id.clone()))
        };

        let _worker = CorrelationContext::new("worker", "2").enter();
        assert_eq!(task().as_deref(), Some("caller"));
        assert_eq!(CorrelationContext::current().unwrap().request_id, "worker");
    }

    #[test]
    fn wire_shape() {
        let context = CorrelationContext::new("r", "i").with_log_group("g", "s");
        let json = serde_json::to_value(&context).unwrap();
        assert_eq!(json["requestId"], "r");
        assert_eq!(json["invokeId"], "i");
        assert_eq!(json["logGroupId"], "g");
        assert_eq!(json["logStreamId"], "s");
    }
}
