use std::fmt;

use rpcweave_shared::{ModuleError, StableHash};
use thiserror::Error;

/// Illegal marker values or marker placement
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttributeConfigurationError {
    /// Channel ids are non-negative
    #[error("channel must be 0 or greater, found {channel}")]
    NegativeChannel { channel: i64 },

    /// Channel id does not fit the wire's 32-bit channel field
    #[error("channel {channel} is larger than {max}")]
    ChannelOutOfRange { channel: i64, max: i32 },

    /// A marker field has a value of the wrong kind
    #[error("{marker} field {field} must be {expected}, found {found}")]
    WrongFieldType {
        marker: String,
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A marker carries a field it does not define
    #[error("{marker} has no field named {field}")]
    UnknownField { marker: String, field: String },

    /// A marker sets the same field more than once
    #[error("{marker} field {field} is given more than once")]
    DuplicateField { marker: String, field: String },

    /// Remote calls are instance methods
    #[error("{marker} cannot be static")]
    StaticMethod { marker: String },

    /// Remote calls need a body to relocate
    #[error("{marker} cannot be abstract")]
    AbstractMethod { marker: String },

    /// Remote calls cannot return a value across the network
    #[error("{marker} must return void, found {return_type}")]
    NonVoidReturn { marker: String, return_type: String },

    /// The declaring type cannot host remote calls
    #[error("{marker} can only be declared on types deriving from {base}")]
    NotRemoteCallCapable { marker: String, base: String },

    /// A method carries both remote-call markers
    #[error("a method cannot be both {first} and {second}")]
    ConflictingMarkers { first: String, second: String },

    /// The declaring type already has a member with a generated name
    #[error("generated member name {name} is already declared on this type")]
    ReservedName { name: String },

    /// A networked field is declared outside a remote-call capable type
    #[error("Networked fields can only be declared on types deriving from {base}")]
    NetworkedFieldOutsideBehaviour { base: String },
}

/// A parameter or field type the writer/reader registry cannot marshal
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnsupportedTypeError {
    /// Neither built in, registered, nor synthesizable
    #[error("no writer/reader is registered for type {ty}")]
    Unregistered { ty: String },

    /// Runtime-only handles never travel over the wire
    #[error("type {ty} cannot be sent over the network")]
    NotMarshalable { ty: String },

    /// A struct contains itself, directly or through other structs
    #[error("struct {ty} is recursive and cannot be serialized")]
    RecursiveStruct { ty: String },

    /// A struct field could not be resolved
    #[error("struct {ty} field {field} has unsupported type {field_type}")]
    UnsupportedField {
        ty: String,
        field: String,
        field_type: String,
    },
}

/// Misuse of the sender-connection parameter marker
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    /// Only calls executed on the server know their sender
    #[error("parameter {param} is marked SenderConnection, which is only valid on ServerRpc")]
    WrongDirection { param: String },

    /// The sender connection must be the final parameter
    #[error("SenderConnection parameter {param} must be the last parameter, found at position {position}")]
    WrongPosition { param: String, position: usize },

    /// The sender connection must be a connection
    #[error("SenderConnection parameter {param} must be of type connection, found {ty}")]
    WrongType { param: String, ty: String },

    /// At most one sender connection per call
    #[error("parameters {first} and {second} are both marked SenderConnection")]
    Duplicate { first: String, second: String },

    /// The marker only means something on remote calls
    #[error("parameter {param} is marked SenderConnection on a method that is not a remote call")]
    OutsideRemoteCall { param: String },
}

/// Two remote calls of one module hash to the same identifier
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{second} has stable hash {hash}, already used by {first}; rename one of them")]
pub struct CollisionError {
    pub hash: StableHash,
    pub first: String,
    pub second: String,
}

/// Any recoverable problem found while weaving. These are collected,
/// never raised on their own
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WeaveError {
    #[error("{0}")]
    AttributeConfiguration(#[from] AttributeConfigurationError),

    #[error("{0}")]
    UnsupportedType(#[from] UnsupportedTypeError),

    #[error("{0}")]
    Signature(#[from] SignatureError),

    #[error("{0}")]
    Collision(#[from] CollisionError),
}

/// The member of a type a diagnostic points at
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DiagnosticMember {
    Method(String),
    Field(String),
}

/// Where a diagnostic was found
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DiagnosticContext {
    pub type_name: String,
    pub member: Option<DiagnosticMember>,
}

impl DiagnosticContext {
    pub fn method(type_name: &str, method: &str) -> Self {
        Self {
            type_name: type_name.to_string(),
            member: Some(DiagnosticMember::Method(method.to_string())),
        }
    }

    pub fn field(type_name: &str, field: &str) -> Self {
        Self {
            type_name: type_name.to_string(),
            member: Some(DiagnosticMember::Field(field.to_string())),
        }
    }

    pub fn type_only(type_name: &str) -> Self {
        Self {
            type_name: type_name.to_string(),
            member: None,
        }
    }
}

impl fmt::Display for DiagnosticContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.member {
            Some(DiagnosticMember::Method(method)) => write!(f, "{}::{}", self.type_name, method),
            Some(DiagnosticMember::Field(field)) => {
                write!(f, "field {}::{}", self.type_name, field)
            }
            None => f.write_str(&self.type_name),
        }
    }
}

/// A collected weave error, tagged with the member it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub context: DiagnosticContext,
    pub error: WeaveError,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.context, self.error)
    }
}

/// Errors from loading, saving or persisting a module
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistError {
    #[error("Failed to read module from {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("Failed to write module to {path}: {reason}")]
    Write { path: String, reason: String },

    #[error("Failed to encode module {module}: {reason}")]
    Encode { module: String, reason: String },

    #[error("Failed to decode module from {path}: {reason}")]
    Decode { path: String, reason: String },
}

/// Errors that end a weave pass
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WeaverError {
    /// The module is structurally broken and cannot be analyzed
    #[error("Malformed module: {0}")]
    MalformedModule(#[from] ModuleError),

    /// One or more diagnostics were collected; nothing was committed
    #[error("Weaving module {module} failed with {} error(s):\n{}", .diagnostics.len(), render(.diagnostics))]
    Failed {
        module: String,
        diagnostics: Vec<Diagnostic>,
    },

    /// The woven module could not be loaded or persisted
    #[error("Persistence error: {0}")]
    Persist(#[from] PersistError),
}

fn render(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(|diagnostic| format!("  {}", diagnostic))
        .collect::<Vec<_>>()
        .join("\n")
}
