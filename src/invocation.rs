//! Types describing a single RPC invocation and its reactive metadata.
use std::collections;

use bytes;

/// The attachment key whose value declares the cardinality of a reactive result.
pub const PUBLISHER_ATTACHMENT: &str = "Publisher";

/// How many values the publisher behind a reactive method produces.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Cardinality {
    /// The method returns a single-value publisher.
    Single,
    /// The method returns a multi-value publisher whose emissions are collected into an ordered
    /// sequence.
    Multi,
}

impl Cardinality {
    /// Parses a `"Publisher"` attachment value.
    ///
    /// A blank value means the method is not reactive at all and yields `None`; `"mono"` declares
    /// a single-value publisher and any other non-blank value a multi-value one.
    pub fn from_attachment(value: &str) -> Option<Cardinality> {
        let value = value.trim();
        if value.is_empty() {
            None
        } else if value == "mono" {
            Some(Cardinality::Single)
        } else {
            Some(Cardinality::Multi)
        }
    }
}

/// A single call against a service: the method to run, its arguments, and string-keyed
/// attachments carrying call metadata.
///
/// An invocation is created by the framework per call and is immutable once built; the invoker
/// consumes it exactly once.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Invocation {
    method_name: String,
    parameter_types: Vec<String>,
    arguments: Vec<bytes::Bytes>,
    attachments: collections::HashMap<String, String>,
}

impl Invocation {
    /// Creates an invocation of the named method with the given parameter type descriptors and
    /// argument values.
    pub fn new<M>(
        method_name: M,
        parameter_types: Vec<String>,
        arguments: Vec<bytes::Bytes>,
    ) -> Invocation
    where
        M: Into<String>,
    {
        Invocation {
            method_name: method_name.into(),
            parameter_types,
            arguments,
            attachments: collections::HashMap::new(),
        }
    }

    /// Adds a string-keyed attachment, replacing any previous value for the key.
    pub fn with_attachment<K, V>(mut self, key: K, value: V) -> Invocation
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.attachments.insert(key.into(), value.into());
        self
    }

    /// The name of the method being invoked.
    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    /// The type descriptors of the method's parameters, in declaration order.
    pub fn parameter_types(&self) -> &[String] {
        &self.parameter_types
    }

    /// The argument values of this call, in declaration order.
    pub fn arguments(&self) -> &[bytes::Bytes] {
        &self.arguments
    }

    /// Looks up an attachment by key.
    pub fn attachment(&self, key: &str) -> Option<&str> {
        self.attachments.get(key).map(|value| value.as_str())
    }

    /// The reactive cardinality declared by the `"Publisher"` attachment, if any.
    ///
    /// `None` means the invocation takes the standard, non-reactive path.
    pub fn cardinality(&self) -> Option<Cardinality> {
        self.attachment(PUBLISHER_ATTACHMENT)
            .and_then(Cardinality::from_attachment)
    }
}
