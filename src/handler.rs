//! Traits for defining generic RPC handlers and the replies they produce.
use std::fmt;

use bytes;
use failure;
use futures;

use descriptor;

/// An implementation of a specific RPC handler.
///
/// This can be an actual implementation of a service, or something that will send a request over
/// a network to fulfill a request. A handler answers each call with a [`Reply`](enum.Reply.html):
/// either an immediate value or a reactive publisher that produces the outcome later.
pub trait Handler: Clone + Send + 'static {
    /// The type of errors that this handler might generate, beyond the default RPC error type.
    type Error: failure::Fail;
    /// The service descriptor for the service whose requests this handler can handle.
    type Descriptor: descriptor::ServiceDescriptor;

    /// Perform a raw call to the specified service method.
    ///
    /// Returning `Err` means the method itself raised before producing any reply; for reactive
    /// methods this is distinct from the publisher failing later.
    fn call(
        &mut self,
        method: <Self::Descriptor as descriptor::ServiceDescriptor>::Method,
        arguments: Vec<bytes::Bytes>,
    ) -> Result<Reply<Self::Error>, Self::Error>;
}

/// A single-value publisher: produces one value, or a terminal signal, asynchronously.
pub type BoxMono<E> = Box<dyn futures::Future<Item = bytes::Bytes, Error = Signal<E>> + Send>;

/// A multi-value publisher: produces any number of values before completing or terminating with
/// a signal.
pub type BoxFlux<E> = Box<dyn futures::Stream<Item = bytes::Bytes, Error = Signal<E>> + Send>;

/// The reply a handler produces for one call.
pub enum Reply<E>
where
    E: failure::Fail,
{
    /// An immediate value from a plain, non-reactive method.
    Value(bytes::Bytes),
    /// A single-value publisher.
    Mono(BoxMono<E>),
    /// A multi-value publisher.
    Flux(BoxFlux<E>),
}

impl<E> fmt::Debug for Reply<E>
where
    E: failure::Fail,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Reply::Value(ref value) => f.debug_tuple("Value").field(value).finish(),
            Reply::Mono(_) => f.debug_tuple("Mono").finish(),
            Reply::Flux(_) => f.debug_tuple("Flux").finish(),
        }
    }
}

/// A terminal signal from a publisher that did not produce a value.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Signal<E>
where
    E: failure::Fail,
{
    /// The publisher failed with an error.
    Failed(E),
    /// The publisher was canceled before producing a terminal value or error.
    Canceled,
}

impl<E> From<futures::Canceled> for Signal<E>
where
    E: failure::Fail,
{
    fn from(_: futures::Canceled) -> Self {
        Signal::Canceled
    }
}
