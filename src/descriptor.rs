//! Traits for statically describing services and their methods.
//!
//! Descriptors are the crate's replacement for runtime reflection: a service lists its methods as
//! a static table, and an invoker resolves an invocation's method name and parameter type
//! descriptors against that table before dispatching.
use std::fmt;

/// Describes a service: a named collection of callable methods.
pub trait ServiceDescriptor {
    /// The enumeration of methods this service exposes.
    type Method: MethodDescriptor;

    /// The name of this service.
    fn name() -> &'static str;

    /// All of the methods this service exposes.
    fn methods() -> &'static [Self::Method];
}

/// Describes a single method of a service.
pub trait MethodDescriptor: Clone + Copy + fmt::Debug + Eq + Send + 'static {
    /// The name of this method.
    fn name(&self) -> &'static str;

    /// The type descriptors of this method's parameters, in declaration order.
    fn parameter_types(&self) -> &'static [&'static str];
}

/// Resolves a method by name and parameter type descriptors against a service's method table.
///
/// Both the name and the full parameter type list must match; `None` means the service exposes no
/// such method.
pub fn resolve_method<S>(name: &str, parameter_types: &[String]) -> Option<S::Method>
where
    S: ServiceDescriptor,
{
    S::methods().iter().cloned().find(|method| {
        method.name() == name
            && method
                .parameter_types()
                .iter()
                .cloned()
                .eq(parameter_types.iter().map(|descriptor| descriptor.as_str()))
    })
}
