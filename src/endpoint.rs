//! The description of a remote service target that an invoker dispatches to.
use std::fmt;

/// Identifies the remote endpoint behind an invoker.
///
/// Invokers carry an endpoint so that unrecoverable invocation errors can name the target that
/// failed; the endpoint plays no part in transport, which is outside this crate.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Endpoint {
    scheme: String,
    host: String,
    port: u16,
    service: String,
}

impl Endpoint {
    /// Creates a new endpoint from its parts.
    pub fn new<A, B, C>(scheme: A, host: B, port: u16, service: C) -> Endpoint
    where
        A: Into<String>,
        B: Into<String>,
        C: Into<String>,
    {
        Endpoint {
            scheme: scheme.into(),
            host: host.into(),
            port,
            service: service.into(),
        }
    }

    /// The scheme used to reach this endpoint.
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// The host name of this endpoint.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The port of this endpoint.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// The name of the service exposed at this endpoint.
    pub fn service(&self) -> &str {
        &self.service
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}://{}:{}/{}",
            self.scheme, self.host, self.port, self.service
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn display_includes_all_parts() {
        let endpoint = Endpoint::new("mem", "localhost", 20880, "PersonService");
        assert_eq!(endpoint.to_string(), "mem://localhost:20880/PersonService");
    }
}
