use rpcweave_serde::SerdeErr;
use thiserror::Error;

use crate::{module::ModuleError, stable_hash::StableHash};

/// Errors raised while executing a module in the reference interpreter
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    /// Module lookup failed
    #[error("Module error: {0}")]
    Module(#[from] ModuleError),

    /// Reading an argument back out of a payload failed
    #[error("Failed to read argument: {0}")]
    Serde(#[from] SerdeErr),

    /// An instruction needed more operands than the stack held
    #[error("Stack underflow in {method} at instruction {index}")]
    StackUnderflow { method: String, index: usize },

    /// An operand had the wrong kind of value
    #[error("Expected {expected} in {method} at instruction {index}, found {found}")]
    TypeMismatch {
        method: String,
        index: usize,
        expected: &'static str,
        found: &'static str,
    },

    /// `CastClass` saw an object of an unrelated class
    #[error("Cannot cast instance of {class} to {target}")]
    InvalidCast { class: String, target: String },

    /// A field access named a field the object does not have
    #[error("Field {field} not found on {type_name}")]
    FieldNotFound { type_name: String, field: String },

    /// An abstract method was called
    #[error("Method {method} is abstract and has no body")]
    AbstractMethod { method: String },

    /// The call chain became too deep
    #[error("Call depth limit of {limit} exceeded calling {method}")]
    CallDepthExceeded { method: String, limit: usize },

    /// A method was invoked with the wrong number of arguments
    #[error("Method {method} takes {expected} arguments, got {actual}")]
    ArgumentCount {
        method: String,
        expected: usize,
        actual: usize,
    },

    /// The dispatch registry has no trampoline for a hash
    #[error("No remote call registered for hash {hash}")]
    UnknownRemoteCall { hash: StableHash },

    /// Two registrations in one module share a hash
    #[error("Remote calls {first} and {second} share hash {hash}")]
    DuplicateRegistration {
        hash: StableHash,
        first: String,
        second: String,
    },
}
