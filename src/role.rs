use std::fmt;

/// The semantic category a handler parameter or return value is bound to.
///
/// The set is closed. Every parameter type implementing [`Param`](crate::Param) and every
/// return shape implementing [`Outputs`](crate::Outputs) maps onto exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    /// The request's cancellation and deadline carrier, see [`Context`](crate::Context).
    Context,
    /// The raw [`Request`](crate::Request).
    RawRequest,
    /// The raw [`ResponseSink`](crate::ResponseSink).
    ResponseSink,
    /// The single decoded payload parameter.
    PayloadIn,
    /// The single value handed to the success encoder.
    PayloadOut,
    /// The single value handed to the error encoder when it holds an error.
    ErrorOut,
}

impl Role {
    pub(crate) const COUNT: usize = 6;

    pub(crate) const fn index(self) -> usize {
        match self {
            Role::Context => 0,
            Role::RawRequest => 1,
            Role::ResponseSink => 2,
            Role::PayloadIn => 3,
            Role::PayloadOut => 4,
            Role::ErrorOut => 5,
        }
    }

    /// `true` for roles a parameter can hold.
    pub const fn is_input(self) -> bool {
        matches!(
            self,
            Role::Context | Role::RawRequest | Role::ResponseSink | Role::PayloadIn
        )
    }

    /// `true` for roles a return value can hold.
    pub const fn is_output(self) -> bool {
        !self.is_input()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Role::Context => "context",
            Role::RawRequest => "raw request",
            Role::ResponseSink => "response sink",
            Role::PayloadIn => "payload",
            Role::PayloadOut => "result",
            Role::ErrorOut => "error",
        })
    }
}

/// How a parameter participates in classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Bound to one of the input [`Role`]s.
    Role(Role),
    /// Trailing call options. Only legal as the final parameter, where it is excluded
    /// from the effective arity and never bound.
    Options,
}
