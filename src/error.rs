//! Error type definitions for errors that can occur during RPC interactions.
use std::result;

use failure;
use futures;

use endpoint;

/// A convenience type alias for creating a `Result` with the error being of type `Error`.
pub type Result<A, E> = result::Result<A, Error<E>>;

/// An error has occurred.
#[derive(Clone, Debug, Eq, Fail, PartialEq)]
pub enum Error<E>
where
    E: failure::Fail,
{
    /// An error raised by the underlying service method, either synchronously during dispatch or
    /// asynchronously through the publisher's failure signal.
    #[fail(display = "Execution error: {}", error)]
    Execution {
        /// The underlying execution error.
        #[cause]
        error: E,
    },
    /// The publisher canceled before producing a terminal value or error.
    #[fail(display = "Canceled error: {}", error)]
    Canceled {
        /// The underlying canceled error.
        #[cause]
        error: futures::Canceled,
    },
    /// An unrecoverable failure at the invoker boundary: the call could not be dispatched or
    /// bridged at all, and no result handle was produced.
    #[fail(
        display = "Failed to invoke remote proxy method {} to {}, cause: {}",
        method, endpoint, message
    )]
    Invocation {
        /// The name of the method that was being invoked.
        method: String,
        /// The endpoint the invoker dispatches to.
        endpoint: endpoint::Endpoint,
        /// A description of the underlying cause.
        message: String,
    },
}

impl<E> Error<E>
where
    E: failure::Fail,
{
    /// Constructs a new execution error.
    pub fn execution(error: E) -> Self {
        Error::Execution { error }
    }

    /// Constructs a new unrecoverable invocation error for the given method and endpoint.
    pub fn invocation<M, C>(method: M, endpoint: &endpoint::Endpoint, message: C) -> Self
    where
        M: Into<String>,
        C: Into<String>,
    {
        Error::Invocation {
            method: method.into(),
            endpoint: endpoint.clone(),
            message: message.into(),
        }
    }
}

impl<E> From<futures::Canceled> for Error<E>
where
    E: failure::Fail,
{
    fn from(error: futures::Canceled) -> Self {
        Error::Canceled { error }
    }
}
