//! The framework invocation entry point and the reactive bridge implementing it.
//!
//! [`ReactiveInvoker`](struct.ReactiveInvoker.html) is the heart of the crate: it routes an
//! invocation on its `"Publisher"` attachment, dispatches to the underlying handler, normalizes
//! the reply into a single-value publisher, and subscribes to it so that the publisher's one
//! terminal signal resolves the pending result. The calling thread gets its result handle back
//! immediately; resolution happens on whatever thread the executor runs the subscription on.
use std::fmt;
use std::sync;

use failure;
use futures;

use context;
use descriptor;
use diagnostics;
use endpoint;
use error;
use handler;
use invocation;
use result;

/// A task driving one publisher subscription to completion.
///
/// The invoker hands one of these to its executor per reactive call; the task itself never
/// fails, since every publisher outcome is absorbed into the pending result.
pub type SubscriptionTask = Box<dyn futures::Future<Item = (), Error = ()> + Send>;

/// The framework's standard invocation entry point.
pub trait Invoker {
    /// The type of errors the underlying service can raise.
    type Error: failure::Fail;

    /// The endpoint this invoker dispatches to.
    fn endpoint(&self) -> &endpoint::Endpoint;

    /// Performs one invocation.
    ///
    /// On success the caller receives a result handle that is either already complete or still
    /// pending on a publisher; an `Err` means the call could not be dispatched or bridged at
    /// all. The caller is never blocked.
    fn invoke(
        &self,
        invocation: invocation::Invocation,
    ) -> error::Result<result::RpcResult<Self::Error>, Self::Error>;
}

type NormalizedMono<E> =
    Box<dyn futures::Future<Item = result::Body, Error = handler::Signal<E>> + Send>;

/// An invoker that bridges reactive handler replies into RPC results.
pub struct ReactiveInvoker<H, X>
where
    H: handler::Handler,
    X: futures::future::Executor<SubscriptionTask>,
{
    handler: H,
    endpoint: endpoint::Endpoint,
    executor: X,
    diagnostics: sync::Arc<dyn diagnostics::DiagnosticSink>,
}

impl<H, X> ReactiveInvoker<H, X>
where
    H: handler::Handler,
    X: futures::future::Executor<SubscriptionTask>,
{
    /// Creates an invoker dispatching to the given handler, reporting diagnostics through the
    /// default log-based sink.
    pub fn new(handler: H, endpoint: endpoint::Endpoint, executor: X) -> ReactiveInvoker<H, X> {
        ReactiveInvoker {
            handler,
            endpoint,
            executor,
            diagnostics: sync::Arc::new(diagnostics::LogSink),
        }
    }

    /// Replaces the diagnostic sink.
    pub fn with_diagnostics(
        mut self,
        diagnostics: sync::Arc<dyn diagnostics::DiagnosticSink>,
    ) -> ReactiveInvoker<H, X> {
        self.diagnostics = diagnostics;
        self
    }

    fn resolve(
        &self,
        invocation: &invocation::Invocation,
    ) -> error::Result<<H::Descriptor as descriptor::ServiceDescriptor>::Method, H::Error> {
        descriptor::resolve_method::<H::Descriptor>(
            invocation.method_name(),
            invocation.parameter_types(),
        ).ok_or_else(|| {
            error::Error::invocation(
                invocation.method_name(),
                &self.endpoint,
                "no such method on the target service",
            )
        })
    }

    fn invoke_standard(
        &self,
        invocation: invocation::Invocation,
    ) -> error::Result<result::RpcResult<H::Error>, H::Error> {
        let method = self.resolve(&invocation)?;
        let mut handler = self.handler.clone();
        match handler.call(method, invocation.arguments().to_vec()) {
            Ok(handler::Reply::Value(value)) => Ok(result::RpcResult::immediate(Ok(
                result::Body::Value(value),
            ))),
            Ok(reply) => Err(error::Error::invocation(
                invocation.method_name(),
                &self.endpoint,
                format!(
                    "method replied with a publisher ({:?}) on the standard invocation path",
                    reply
                ),
            )),
            Err(error) => Ok(result::RpcResult::immediate(Err(error::Error::execution(
                error,
            )))),
        }
    }

    fn invoke_reactive(
        &self,
        invocation: invocation::Invocation,
        cardinality: invocation::Cardinality,
    ) -> error::Result<result::RpcResult<H::Error>, H::Error> {
        use futures::Future;

        let rpc_context = context::RpcContext::current();
        let method = self.resolve(&invocation)?;
        let mut handler = self.handler.clone();
        let reply = match handler.call(method, invocation.arguments().to_vec()) {
            Ok(reply) => reply,
            Err(error) => {
                // The method raised before producing a publisher. If the callee already started
                // answering asynchronously and stopping is no longer possible, the exception
                // cannot be written back; report it and fall through to the immediate result.
                if rpc_context.is_async_started() && !rpc_context.stop_async() {
                    self.diagnostics
                        .async_reply_abandoned(invocation.method_name(), &error);
                }
                return Ok(result::RpcResult::immediate(Err(error::Error::execution(
                    error,
                ))));
            }
        };
        let mono = self.normalize(&invocation, cardinality, reply)?;
        let (future, completer) = result::pending();
        let task = mono.then(move |outcome| -> Result<(), ()> {
            match outcome {
                Ok(body) => completer.resolve(body),
                Err(handler::Signal::Failed(error)) => completer.fail(error),
                Err(handler::Signal::Canceled) => completer.cancel(),
            };
            Ok(())
        });
        if self.executor.execute(Box::new(task)).is_err() {
            return Err(error::Error::invocation(
                invocation.method_name(),
                &self.endpoint,
                "executor refused the publisher subscription task",
            ));
        }
        Ok(result::RpcResult::Pending(future))
    }

    fn normalize(
        &self,
        invocation: &invocation::Invocation,
        cardinality: invocation::Cardinality,
        reply: handler::Reply<H::Error>,
    ) -> error::Result<NormalizedMono<H::Error>, H::Error> {
        use futures::{Future, Stream};

        match (cardinality, reply) {
            (invocation::Cardinality::Single, handler::Reply::Mono(mono)) => {
                Ok(Box::new(mono.map(result::Body::Value)))
            }
            (invocation::Cardinality::Multi, handler::Reply::Flux(flux)) => {
                Ok(Box::new(flux.collect().map(result::Body::Sequence)))
            }
            (cardinality, reply) => Err(error::Error::invocation(
                invocation.method_name(),
                &self.endpoint,
                format!(
                    "declared a {:?} publisher but the method replied with {:?}",
                    cardinality, reply
                ),
            )),
        }
    }
}

impl<H, X> Invoker for ReactiveInvoker<H, X>
where
    H: handler::Handler,
    X: futures::future::Executor<SubscriptionTask>,
{
    type Error = H::Error;

    fn endpoint(&self) -> &endpoint::Endpoint {
        &self.endpoint
    }

    fn invoke(
        &self,
        invocation: invocation::Invocation,
    ) -> error::Result<result::RpcResult<H::Error>, H::Error> {
        match invocation.cardinality() {
            None => self.invoke_standard(invocation),
            Some(cardinality) => self.invoke_reactive(invocation, cardinality),
        }
    }
}

impl<H, X> fmt::Debug for ReactiveInvoker<H, X>
where
    H: handler::Handler,
    X: futures::future::Executor<SubscriptionTask>,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ReactiveInvoker")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

#[cfg(test)]
mod test {
    use std::sync;

    use bytes;
    use tokio;

    use super::*;
    use descriptor::MethodDescriptor;
    use descriptor::ServiceDescriptor;

    #[derive(Clone, Debug, Eq, Fail, PartialEq)]
    #[fail(display = "person service error: {}", message)]
    struct PersonError {
        message: &'static str,
    }

    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    enum PersonServiceMethodDescriptor {
        GetPersonNameById,
        GetPersonNameList,
    }

    impl MethodDescriptor for PersonServiceMethodDescriptor {
        fn name(&self) -> &'static str {
            match *self {
                PersonServiceMethodDescriptor::GetPersonNameById => "getPersonNameById",
                PersonServiceMethodDescriptor::GetPersonNameList => "getPersonNameList",
            }
        }

        fn parameter_types(&self) -> &'static [&'static str] {
            match *self {
                PersonServiceMethodDescriptor::GetPersonNameById => &["i32"],
                PersonServiceMethodDescriptor::GetPersonNameList => &[],
            }
        }
    }

    #[derive(Clone, Copy, Debug)]
    struct PersonServiceDescriptor;

    impl ServiceDescriptor for PersonServiceDescriptor {
        type Method = PersonServiceMethodDescriptor;

        fn name() -> &'static str {
            "PersonService"
        }

        fn methods() -> &'static [Self::Method] {
            &[
                PersonServiceMethodDescriptor::GetPersonNameById,
                PersonServiceMethodDescriptor::GetPersonNameList,
            ]
        }
    }

    #[derive(Clone, Debug)]
    enum Behavior {
        Reactive,
        Plain,
        EmptyList,
        RaiseSync,
        FailPublisher,
        CancelPublisher,
        WrongShape,
    }

    #[derive(Clone, Debug)]
    struct PersonHandler {
        behavior: Behavior,
    }

    impl handler::Handler for PersonHandler {
        type Error = PersonError;
        type Descriptor = PersonServiceDescriptor;

        fn call(
            &mut self,
            method: PersonServiceMethodDescriptor,
            _arguments: Vec<bytes::Bytes>,
        ) -> Result<handler::Reply<PersonError>, PersonError> {
            match (self.behavior.clone(), method) {
                (Behavior::Reactive, PersonServiceMethodDescriptor::GetPersonNameById) => {
                    Ok(handler::Reply::Mono(Box::new(futures::future::ok(
                        bytes::Bytes::from("Alice"),
                    ))))
                }
                (Behavior::Reactive, PersonServiceMethodDescriptor::GetPersonNameList) => {
                    Ok(handler::Reply::Flux(Box::new(futures::stream::iter_ok(
                        vec![bytes::Bytes::from("Alice"), bytes::Bytes::from("Bob")],
                    ))))
                }
                (Behavior::Plain, _) => Ok(handler::Reply::Value(bytes::Bytes::from("Alice"))),
                (Behavior::EmptyList, _) => {
                    Ok(handler::Reply::Flux(Box::new(futures::stream::iter_ok(
                        Vec::<bytes::Bytes>::new(),
                    ))))
                }
                (Behavior::RaiseSync, _) => Err(PersonError {
                    message: "no such person",
                }),
                (Behavior::FailPublisher, _) => {
                    Ok(handler::Reply::Mono(Box::new(futures::future::err(
                        handler::Signal::Failed(PersonError {
                            message: "lookup failed",
                        }),
                    ))))
                }
                (Behavior::CancelPublisher, _) => {
                    use futures::Future;

                    let (sender, receiver) = futures::sync::oneshot::channel::<bytes::Bytes>();
                    drop(sender);
                    Ok(handler::Reply::Mono(Box::new(
                        receiver.map_err(handler::Signal::from),
                    )))
                }
                (Behavior::WrongShape, _) => {
                    Ok(handler::Reply::Flux(Box::new(futures::stream::iter_ok(
                        vec![bytes::Bytes::from("Alice")],
                    ))))
                }
            }
        }
    }

    #[derive(Clone, Debug, Default)]
    struct RecordingSink {
        reports: sync::Arc<sync::Mutex<Vec<String>>>,
    }

    impl diagnostics::DiagnosticSink for RecordingSink {
        fn async_reply_abandoned(&self, method: &str, error: &dyn failure::Fail) {
            self.reports
                .lock()
                .unwrap()
                .push(format!("{}: {}", method, error));
        }
    }

    fn endpoint() -> endpoint::Endpoint {
        endpoint::Endpoint::new("mem", "localhost", 20880, "PersonService")
    }

    fn invoker(
        behavior: Behavior,
        executor: tokio::runtime::TaskExecutor,
    ) -> ReactiveInvoker<PersonHandler, tokio::runtime::TaskExecutor> {
        ReactiveInvoker::new(PersonHandler { behavior }, endpoint(), executor)
    }

    fn mono_invocation() -> invocation::Invocation {
        invocation::Invocation::new(
            "getPersonNameById",
            vec!["i32".to_owned()],
            vec![bytes::Bytes::from("1")],
        ).with_attachment("Publisher", "mono")
    }

    fn flux_invocation() -> invocation::Invocation {
        invocation::Invocation::new("getPersonNameList", vec![], vec![])
            .with_attachment("Publisher", "flux")
    }

    #[test]
    fn mono_resolves_to_the_single_value() {
        let mut runtime = tokio::runtime::Runtime::new().unwrap();
        let invoker = invoker(Behavior::Reactive, runtime.executor());

        let result = invoker.invoke(mono_invocation()).unwrap();
        assert!(!result.is_immediate());
        assert_eq!(
            runtime.block_on(result),
            Ok(result::Body::Value(bytes::Bytes::from("Alice")))
        );
    }

    #[test]
    fn flux_resolves_to_the_ordered_sequence() {
        let mut runtime = tokio::runtime::Runtime::new().unwrap();
        let invoker = invoker(Behavior::Reactive, runtime.executor());

        let result = invoker.invoke(flux_invocation()).unwrap();
        assert!(!result.is_immediate());
        assert_eq!(
            runtime.block_on(result),
            Ok(result::Body::Sequence(vec![
                bytes::Bytes::from("Alice"),
                bytes::Bytes::from("Bob"),
            ]))
        );
    }

    #[test]
    fn empty_flux_resolves_to_the_empty_sequence() {
        let mut runtime = tokio::runtime::Runtime::new().unwrap();
        let invoker = invoker(Behavior::EmptyList, runtime.executor());

        let result = invoker.invoke(flux_invocation()).unwrap();
        assert_eq!(
            runtime.block_on(result),
            Ok(result::Body::Sequence(vec![]))
        );
    }

    #[test]
    fn publisher_failure_resolves_to_an_execution_error() {
        let mut runtime = tokio::runtime::Runtime::new().unwrap();
        let invoker = invoker(Behavior::FailPublisher, runtime.executor());

        let result = invoker.invoke(mono_invocation()).unwrap();
        assert_eq!(
            runtime.block_on(result),
            Err(error::Error::execution(PersonError {
                message: "lookup failed",
            }))
        );
    }

    #[test]
    fn publisher_cancellation_resolves_to_canceled() {
        let mut runtime = tokio::runtime::Runtime::new().unwrap();
        let invoker = invoker(Behavior::CancelPublisher, runtime.executor());

        let result = invoker.invoke(mono_invocation()).unwrap();
        assert_eq!(
            runtime.block_on(result),
            Err(error::Error::from(futures::Canceled))
        );
    }

    #[test]
    fn absent_attachment_takes_the_standard_path() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let invoker = invoker(Behavior::Plain, runtime.executor());

        let invocation = invocation::Invocation::new(
            "getPersonNameById",
            vec!["i32".to_owned()],
            vec![bytes::Bytes::from("1")],
        );
        let mut result = invoker.invoke(invocation).unwrap();
        assert!(result.is_immediate());
        assert_eq!(
            futures::Future::poll(&mut result),
            Ok(futures::Async::Ready(result::Body::Value(
                bytes::Bytes::from("Alice"),
            )))
        );
    }

    #[test]
    fn blank_attachment_takes_the_standard_path() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let invoker = invoker(Behavior::Plain, runtime.executor());

        let invocation = invocation::Invocation::new(
            "getPersonNameById",
            vec!["i32".to_owned()],
            vec![bytes::Bytes::from("1")],
        ).with_attachment("Publisher", " ");
        let result = invoker.invoke(invocation).unwrap();
        assert!(result.is_immediate());
    }

    #[test]
    fn sync_exception_returns_an_immediate_error_result() {
        context::RpcContext::reset();
        let mut runtime = tokio::runtime::Runtime::new().unwrap();
        let invoker = invoker(Behavior::RaiseSync, runtime.executor());

        let result = invoker.invoke(mono_invocation()).unwrap();
        assert!(result.is_immediate());
        assert_eq!(
            runtime.block_on(result),
            Err(error::Error::execution(PersonError {
                message: "no such person",
            }))
        );
    }

    // Known-lossy path: once a deferred reply is in flight the exception is only reported to the
    // diagnostic sink; the consumer may never observe it.
    #[test]
    fn unstoppable_async_context_reports_to_the_diagnostic_sink() {
        context::RpcContext::reset();
        let rpc_context = context::RpcContext::current();
        assert!(rpc_context.start_async());
        assert!(rpc_context.mark_replied());

        let mut runtime = tokio::runtime::Runtime::new().unwrap();
        let sink = RecordingSink::default();
        let invoker = invoker(Behavior::RaiseSync, runtime.executor())
            .with_diagnostics(sync::Arc::new(sink.clone()));

        let result = invoker.invoke(mono_invocation()).unwrap();
        assert!(result.is_immediate());
        assert_eq!(
            runtime.block_on(result),
            Err(error::Error::execution(PersonError {
                message: "no such person",
            }))
        );
        let reports = sink.reports.lock().unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(
            reports[0],
            "getPersonNameById: person service error: no such person"
        );
    }

    #[test]
    fn stoppable_async_context_is_stopped_silently() {
        context::RpcContext::reset();
        let rpc_context = context::RpcContext::current();
        assert!(rpc_context.start_async());

        let runtime = tokio::runtime::Runtime::new().unwrap();
        let sink = RecordingSink::default();
        let invoker = invoker(Behavior::RaiseSync, runtime.executor())
            .with_diagnostics(sync::Arc::new(sink.clone()));

        let result = invoker.invoke(mono_invocation()).unwrap();
        assert!(result.is_immediate());
        assert!(!rpc_context.is_async_started());
        assert!(sink.reports.lock().unwrap().is_empty());
    }

    #[test]
    fn unknown_method_is_an_unrecoverable_error() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let invoker = invoker(Behavior::Reactive, runtime.executor());

        let invocation = invocation::Invocation::new("getPersonAgeById", vec!["i32".to_owned()], vec![])
            .with_attachment("Publisher", "mono");
        match invoker.invoke(invocation) {
            Err(error::Error::Invocation {
                method, endpoint, ..
            }) => {
                assert_eq!(method, "getPersonAgeById");
                assert_eq!(endpoint.service(), "PersonService");
            }
            other => panic!("expected an invocation error, got {:?}", other),
        }
    }

    #[test]
    fn cardinality_mismatch_is_an_unrecoverable_error() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let invoker = invoker(Behavior::WrongShape, runtime.executor());

        match invoker.invoke(mono_invocation()) {
            Err(error::Error::Invocation { method, .. }) => {
                assert_eq!(method, "getPersonNameById");
            }
            other => panic!("expected an invocation error, got {:?}", other),
        }
    }

    #[test]
    fn publisher_reply_on_the_standard_path_is_unrecoverable() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let invoker = invoker(Behavior::Reactive, runtime.executor());

        let invocation =
            invocation::Invocation::new("getPersonNameById", vec!["i32".to_owned()], vec![]);
        assert!(invoker.invoke(invocation).is_err());
    }
}
