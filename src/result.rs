//! Result types bridging publisher outcomes into the framework's result model.
//!
//! The pivot of this module is the first-writer-wins completion cell created by
//! [`pending`](fn.pending.html): the invoker keeps the [`Completer`](struct.Completer.html) for
//! the publisher's callbacks and hands the [`ResultFuture`](struct.ResultFuture.html) to the
//! caller. Exactly one terminal write ever takes effect, even if a misbehaving publisher signals
//! more than once.
use std::fmt;
use std::sync;
use std::sync::atomic;

use bytes;
use failure;
use futures;
use futures::task;

use error;

/// The payload of a completed call.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Body {
    /// A single value, from a plain method or a single-value publisher.
    Value(bytes::Bytes),
    /// The ordered sequence collected from a multi-value publisher. May be empty.
    Sequence(Vec<bytes::Bytes>),
}

const PENDING: usize = 0;
const WRITING: usize = 1;
const COMPLETE: usize = 2;

enum Outcome<E> {
    Resolved(Body),
    Failed(E),
    Canceled,
}

struct Cell<E> {
    state: atomic::AtomicUsize,
    outcome: sync::Mutex<Option<Outcome<E>>>,
    task: task::AtomicTask,
}

impl<E> Cell<E> {
    fn outcome_slot(&self) -> sync::MutexGuard<Option<Outcome<E>>> {
        match self.outcome.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Creates a pending result: a future for the caller and a completer for the publisher side.
///
/// If the completer is dropped without ever completing, the future stays pending for the life of
/// the process; guarding against a publisher that never signals is the framework's concern, not
/// this crate's.
pub fn pending<E>() -> (ResultFuture<E>, Completer<E>)
where
    E: failure::Fail,
{
    let cell = sync::Arc::new(Cell {
        state: atomic::AtomicUsize::new(PENDING),
        outcome: sync::Mutex::new(None),
        task: task::AtomicTask::new(),
    });
    (
        ResultFuture { cell: cell.clone() },
        Completer { cell },
    )
}

/// The write side of a pending result.
///
/// Each of the three completion operations performs the cell's single terminal transition and
/// returns whether this call was the one that did so; losing writes are no-ops.
pub struct Completer<E> {
    cell: sync::Arc<Cell<E>>,
}

impl<E> Completer<E>
where
    E: failure::Fail,
{
    /// Resolves the pending result with a value.
    pub fn resolve(&self, body: Body) -> bool {
        self.complete(Outcome::Resolved(body))
    }

    /// Resolves the pending result to a failed state carrying the publisher's error.
    pub fn fail(&self, error: E) -> bool {
        self.complete(Outcome::Failed(error))
    }

    /// Resolves the pending result to the canceled state.
    pub fn cancel(&self) -> bool {
        self.complete(Outcome::Canceled)
    }

    fn complete(&self, outcome: Outcome<E>) -> bool {
        if self
            .cell
            .state
            .compare_exchange(
                PENDING,
                WRITING,
                atomic::Ordering::AcqRel,
                atomic::Ordering::Acquire,
            )
            .is_err()
        {
            return false;
        }
        *self.cell.outcome_slot() = Some(outcome);
        self.cell.state.store(COMPLETE, atomic::Ordering::Release);
        self.cell.task.notify();
        true
    }
}

impl<E> Clone for Completer<E> {
    fn clone(&self) -> Self {
        Completer {
            cell: self.cell.clone(),
        }
    }
}

impl<E> fmt::Debug for Completer<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Completer")
            .field("state", &self.cell.state.load(atomic::Ordering::Acquire))
            .finish()
    }
}

/// The read side of a pending result.
///
/// Resolves to the completed body; a publisher failure surfaces as
/// [`Error::Execution`](../error/enum.Error.html) and a cancellation as
/// [`Error::Canceled`](../error/enum.Error.html).
pub struct ResultFuture<E> {
    cell: sync::Arc<Cell<E>>,
}

impl<E> futures::Future for ResultFuture<E>
where
    E: failure::Fail,
{
    type Item = Body;
    type Error = error::Error<E>;

    fn poll(&mut self) -> futures::Poll<Self::Item, Self::Error> {
        if self.cell.state.load(atomic::Ordering::Acquire) != COMPLETE {
            self.cell.task.register();
            if self.cell.state.load(atomic::Ordering::Acquire) != COMPLETE {
                return Ok(futures::Async::NotReady);
            }
        }
        let outcome = match self.cell.outcome_slot().take() {
            Some(outcome) => outcome,
            None => panic!("cannot poll a result future twice"),
        };
        match outcome {
            Outcome::Resolved(body) => Ok(futures::Async::Ready(body)),
            Outcome::Failed(error) => Err(error::Error::execution(error)),
            Outcome::Canceled => Err(error::Error::from(futures::Canceled)),
        }
    }
}

impl<E> fmt::Debug for ResultFuture<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ResultFuture")
            .field("state", &self.cell.state.load(atomic::Ordering::Acquire))
            .finish()
    }
}

/// The outcome handle an invoker returns for one call.
///
/// Either the outcome is already known (the standard, non-reactive path and the synchronous
/// exception path) or it is still pending on a publisher. Both shapes are consumed uniformly as
/// a future.
#[derive(Debug)]
pub enum RpcResult<E>
where
    E: failure::Fail,
{
    /// An outcome that was known when the invoker returned. The option is the future's
    /// consume-once storage; it is `Some` until first polled.
    Immediate(Option<Result<Body, error::Error<E>>>),
    /// An outcome that a publisher resolves later.
    Pending(ResultFuture<E>),
}

impl<E> RpcResult<E>
where
    E: failure::Fail,
{
    /// Wraps an already-known outcome.
    pub fn immediate(outcome: Result<Body, error::Error<E>>) -> RpcResult<E> {
        RpcResult::Immediate(Some(outcome))
    }

    /// Whether this result was produced synchronously.
    pub fn is_immediate(&self) -> bool {
        match *self {
            RpcResult::Immediate(_) => true,
            RpcResult::Pending(_) => false,
        }
    }
}

impl<E> futures::Future for RpcResult<E>
where
    E: failure::Fail,
{
    type Item = Body;
    type Error = error::Error<E>;

    fn poll(&mut self) -> futures::Poll<Self::Item, Self::Error> {
        match *self {
            RpcResult::Immediate(ref mut outcome) => match outcome.take() {
                Some(Ok(body)) => Ok(futures::Async::Ready(body)),
                Some(Err(error)) => Err(error),
                None => panic!("cannot poll an rpc result twice"),
            },
            RpcResult::Pending(ref mut future) => future.poll(),
        }
    }
}
