use std::fmt;

use serde::{Deserialize, Serialize};

/// The type of a field, parameter, local or return value
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TypeRef {
    Void,
    Bool,
    Byte,
    Int,
    UInt,
    Long,
    ULong,
    Float,
    Double,
    String,
    /// A connection handle supplied by the runtime
    Connection,
    /// A pooled serialization buffer
    Writer,
    /// A deserialization source
    Reader,
    /// A class or struct declared by name
    Named(String),
}

impl TypeRef {
    pub fn named(name: &str) -> Self {
        TypeRef::Named(name.to_string())
    }

    pub fn is_void(&self) -> bool {
        matches!(self, TypeRef::Void)
    }

    pub fn name(&self) -> &str {
        match self {
            TypeRef::Void => "void",
            TypeRef::Bool => "bool",
            TypeRef::Byte => "byte",
            TypeRef::Int => "int",
            TypeRef::UInt => "uint",
            TypeRef::Long => "long",
            TypeRef::ULong => "ulong",
            TypeRef::Float => "float",
            TypeRef::Double => "double",
            TypeRef::String => "string",
            TypeRef::Connection => "connection",
            TypeRef::Writer => "writer",
            TypeRef::Reader => "reader",
            TypeRef::Named(name) => name,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
