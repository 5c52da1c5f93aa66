//! # rpcweave Shared
//! The compiled-module model, stable hashing and reference runtime shared
//! by the rpcweave weaver and the applications that run woven modules.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

pub use rpcweave_serde::{
    BitReader, BitWrite, BitWriter, ConstBitLength, Serde, SerdeErr, SignedVariableInteger,
    UnsignedVariableInteger,
};

pub mod constants;
pub mod module;
mod remote_call;
pub mod runtime;
mod stable_hash;
mod types;

pub use module::{
    Constant, FieldDef, HasMarkers, Instruction, Marker, MarkerValue, MethodBody, MethodDef,
    MethodRef, Module, ModuleError, ParamDef, TypeDef, TypeKind, TypeRef, Visibility, WireOp,
};
pub use remote_call::{RemoteCall, RemoteCallDirection, RemoteCallRegistration};
pub use runtime::{
    DispatchRegistry, Interpreter, ObjectRef, ReaderRef, Runtime, RuntimeError, StructValue,
    Value, WriterRef,
};
pub use stable_hash::{qualified_name, StableHash};
pub use types::{ConnectionId, HostType};
