//! Observability hooks for conditions the invoker can only report, not recover.
use std::fmt;

use failure;

/// A sink for invoker diagnostics.
///
/// The only report today is the lossy synchronous-exception path: the method raised before
/// producing a publisher, but the callee had already started answering asynchronously and the
/// async context could not be stopped, so the exception cannot be written back to the consumer.
pub trait DiagnosticSink: fmt::Debug + Send + Sync + 'static {
    /// Reports a synchronous exception that could not be written back to the consumer.
    fn async_reply_abandoned(&self, method: &str, error: &dyn failure::Fail);
}

/// The default sink, reporting through the `log` crate at error level.
#[derive(Clone, Copy, Debug)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn async_reply_abandoned(&self, method: &str, error: &dyn failure::Fail) {
        error!(
            "Provider async started, but got an exception from the original method {}, cannot \
             write the exception back to consumer because an async result may have returned the \
             new thread: {}",
            method, error
        );
    }
}
