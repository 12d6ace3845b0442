//! Reactive result bridging for simple RPC invokers.
//!
//! An RPC framework's invoker normally dispatches a call and wraps the plain
//! return value into a result object. This crate lets a service method return
//! a reactive publisher instead: a single-value mono or a multi-value flux.
//! The [`ReactiveInvoker`](invoker/struct.ReactiveInvoker.html) inspects the
//! invocation's `"Publisher"` attachment to decide which shape to expect,
//! dispatches to the underlying [`Handler`](handler/trait.Handler.html),
//! subscribes to the publisher, and bridges its terminal outcome (value,
//! failure, or cancellation) into the framework's
//! [`RpcResult`](result/enum.RpcResult.html) without ever blocking the
//! calling thread.

#![deny(missing_docs)]
#![deny(missing_debug_implementations)]
#![deny(missing_copy_implementations)]
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]
#![deny(unsafe_code)]
#![deny(unstable_features)]
#![deny(unused_import_braces)]
#![deny(unused_qualifications)]
#![cfg_attr(feature = "dev", allow(unstable_features))]
#![cfg_attr(feature = "dev", feature(plugin))]
#![cfg_attr(feature = "dev", plugin(clippy))]

extern crate bytes;
extern crate failure;
#[macro_use]
extern crate failure_derive;
extern crate futures;
#[macro_use]
extern crate log;
#[cfg(test)]
extern crate tokio;

pub mod context;
pub mod descriptor;
pub mod diagnostics;
pub mod endpoint;
pub mod error;
pub mod handler;
pub mod invocation;
pub mod invoker;
pub mod result;
