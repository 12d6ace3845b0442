//! Request-scoped context tracking whether a callee has deferred its response.
//!
//! A service method may start the async context to signal that it will write its response from
//! another thread. The invoker consults this when dispatch raises synchronously: once a deferred
//! reply may be in flight, the exception can no longer be safely written back to the consumer.
use std::cell;
use std::sync;
use std::sync::atomic;

const IDLE: usize = 0;
const STARTED: usize = 1;
const STOPPED: usize = 2;
const REPLIED: usize = 3;

thread_local! {
    static CURRENT: cell::RefCell<RpcContext> = cell::RefCell::new(RpcContext::new());
}

/// The per-request context shared between the invoker and the callee.
///
/// Handles are cheaply cloneable and may be observed from other threads; all state transitions
/// are atomic.
#[derive(Clone, Debug)]
pub struct RpcContext {
    state: sync::Arc<atomic::AtomicUsize>,
}

impl RpcContext {
    fn new() -> RpcContext {
        RpcContext {
            state: sync::Arc::new(atomic::AtomicUsize::new(IDLE)),
        }
    }

    /// Returns a handle to the calling thread's current request context.
    pub fn current() -> RpcContext {
        CURRENT.with(|current| current.borrow().clone())
    }

    /// Replaces the calling thread's context with a fresh one.
    ///
    /// The framework does this between requests; tests do it between simulated requests.
    pub fn reset() {
        CURRENT.with(|current| *current.borrow_mut() = RpcContext::new());
    }

    /// Marks this request as answering asynchronously. Returns `false` if the context had
    /// already left the idle state.
    pub fn start_async(&self) -> bool {
        self.transition(IDLE, STARTED)
    }

    /// Whether the callee has started answering asynchronously (and has not been stopped).
    pub fn is_async_started(&self) -> bool {
        let state = self.state.load(atomic::Ordering::Acquire);
        state == STARTED || state == REPLIED
    }

    /// Attempts to stop the asynchronous answer before any reply is written.
    ///
    /// Returns `false` when stopping is no longer possible, in particular once a reply is in
    /// flight on another thread.
    pub fn stop_async(&self) -> bool {
        self.transition(STARTED, STOPPED)
    }

    /// Records that the asynchronous reply has been handed off. Returns `false` if the context
    /// was not in the started state.
    pub fn mark_replied(&self) -> bool {
        self.transition(STARTED, REPLIED)
    }

    fn transition(&self, from: usize, to: usize) -> bool {
        self.state
            .compare_exchange(
                from,
                to,
                atomic::Ordering::AcqRel,
                atomic::Ordering::Acquire,
            )
            .is_ok()
    }
}
