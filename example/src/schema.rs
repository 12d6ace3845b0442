//! The person service contract: its method table and error type.
use reactive_simple_rpc::descriptor;

/// The errors the person service can raise.
#[derive(Clone, Debug, Eq, Fail, PartialEq)]
pub enum PersonServiceError {
    /// The id argument could not be parsed.
    #[fail(display = "invalid person id: {:?}", id)]
    InvalidId {
        /// The raw argument value.
        id: String,
    },
    /// No person exists with the given id.
    #[fail(display = "no person with id {}", id)]
    UnknownPerson {
        /// The id that was looked up.
        id: i32,
    },
}

/// The methods of the person service.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PersonServiceMethodDescriptor {
    /// Looks up one person's name by id; replies with a single-value publisher.
    GetPersonNameById,
    /// Lists all person names; replies with a multi-value publisher.
    GetPersonNameList,
}

impl descriptor::MethodDescriptor for PersonServiceMethodDescriptor {
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

/// The descriptor of the person service.
#[derive(Clone, Copy, Debug)]
pub struct PersonServiceDescriptor;

impl descriptor::ServiceDescriptor for PersonServiceDescriptor {
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
