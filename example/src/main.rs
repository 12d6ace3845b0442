extern crate bytes;
extern crate failure;
#[macro_use]
extern crate failure_derive;
extern crate futures;
extern crate reactive_simple_rpc;
extern crate tokio;

mod schema;

use reactive_simple_rpc::endpoint::Endpoint;
use reactive_simple_rpc::handler;
use reactive_simple_rpc::invocation::Invocation;
use reactive_simple_rpc::invocation::PUBLISHER_ATTACHMENT;
use reactive_simple_rpc::invoker::Invoker;
use reactive_simple_rpc::invoker::ReactiveInvoker;

fn main() {
    run_name_lookup_roundtrip();
    run_name_list_roundtrip();
}

fn run_name_lookup_roundtrip() {
    let mut runtime = tokio::runtime::Runtime::new().unwrap();
    let invoker = ReactiveInvoker::new(PersonDirectory::new(), endpoint(), runtime.executor());

    let invocation = Invocation::new(
        "getPersonNameById",
        vec!["i32".to_owned()],
        vec![bytes::Bytes::from("1")],
    ).with_attachment(PUBLISHER_ATTACHMENT, "mono");
    let result = invoker.invoke(invocation).unwrap();
    match runtime.block_on(result) {
        Ok(body) => eprintln!("Response: {:?}", body),
        Err(error) => eprintln!("Error: {:?}", error),
    }
}

fn run_name_list_roundtrip() {
    let mut runtime = tokio::runtime::Runtime::new().unwrap();
    let invoker = ReactiveInvoker::new(PersonDirectory::new(), endpoint(), runtime.executor());

    let invocation = Invocation::new("getPersonNameList", vec![], vec![])
        .with_attachment(PUBLISHER_ATTACHMENT, "flux");
    let result = invoker.invoke(invocation).unwrap();
    match runtime.block_on(result) {
        Ok(body) => eprintln!("Response: {:?}", body),
        Err(error) => eprintln!("Error: {:?}", error),
    }
}

fn endpoint() -> Endpoint {
    Endpoint::new("mem", "localhost", 20880, "PersonService")
}

#[derive(Clone, Debug)]
struct PersonDirectory {
    names: Vec<&'static str>,
}

impl PersonDirectory {
    fn new() -> PersonDirectory {
        PersonDirectory {
            names: vec!["Alice", "Bob"],
        }
    }

    fn parse_id(&self, arguments: &[bytes::Bytes]) -> Result<i32, schema::PersonServiceError> {
        let raw = arguments
            .first()
            .map(|argument| String::from_utf8_lossy(argument).into_owned())
            .unwrap_or_default();
        raw.parse()
            .map_err(|_| schema::PersonServiceError::InvalidId { id: raw.clone() })
    }

    fn name_by_id(&self, id: i32) -> Option<&'static str> {
        if id >= 1 {
            self.names.get(id as usize - 1).cloned()
        } else {
            None
        }
    }
}

impl handler::Handler for PersonDirectory {
    type Error = schema::PersonServiceError;
    type Descriptor = schema::PersonServiceDescriptor;

    fn call(
        &mut self,
        method: schema::PersonServiceMethodDescriptor,
        arguments: Vec<bytes::Bytes>,
    ) -> Result<handler::Reply<schema::PersonServiceError>, schema::PersonServiceError> {
        match method {
            schema::PersonServiceMethodDescriptor::GetPersonNameById => {
                // A malformed argument raises synchronously; an unknown id fails through the
                // publisher after dispatch succeeded.
                let id = self.parse_id(&arguments)?;
                let mono: handler::BoxMono<schema::PersonServiceError> = match self.name_by_id(id)
                {
                    Some(name) => Box::new(futures::future::ok(bytes::Bytes::from(name))),
                    None => Box::new(futures::future::err(handler::Signal::Failed(
                        schema::PersonServiceError::UnknownPerson { id },
                    ))),
                };
                Ok(handler::Reply::Mono(mono))
            }
            schema::PersonServiceMethodDescriptor::GetPersonNameList => {
                let names = self
                    .names
                    .iter()
                    .map(|name| bytes::Bytes::from(*name))
                    .collect::<Vec<_>>();
                Ok(handler::Reply::Flux(Box::new(futures::stream::iter_ok(
                    names,
                ))))
            }
        }
    }
}
