use serde::{Deserialize, Serialize};

use crate::{module::MethodRef, remote_call::RemoteCallDirection, types::HostType};

/// A constant pushed by `LoadConst`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Constant {
    Null,
    Bool(bool),
    Byte(u8),
    Int(i32),
    UInt(u32),
    Long(i64),
    ULong(u64),
    Float(f32),
    Double(f64),
    Str(String),
}

/// Primitive encodings a writer/reader pair understands. Composite values
/// are built from sequences of these.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WireOp {
    Bool,
    Byte,
    Int,
    UInt,
    Long,
    ULong,
    Float,
    Double,
    String,
}

/// One stack-machine instruction of a method body.
///
/// Instance methods receive `this` as argument 0. Jump targets are
/// instruction indices within the same body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Instruction {
    Nop,
    LoadArg(u16),
    LoadLocal(u16),
    StoreLocal(u16),
    LoadConst(Constant),
    /// Pops an object or struct, pushes one of its fields
    LoadField(String),
    /// Pops a value then an object, assigns the field
    StoreField(String),
    /// Pops one value per field (last field on top), pushes a struct
    NewStruct { type_name: String, fields: Vec<String> },
    /// Pops two values of the same numeric or string type, pushes their sum
    Add,
    /// Checks the object on top of the stack derives from the given type
    CastClass(String),
    /// Calls exactly the referenced method
    Call(MethodRef),
    /// Calls the most derived override of the referenced method on `this`
    CallVirtual(MethodRef),
    Jump(usize),
    JumpIfTrue(usize),
    JumpIfFalse(usize),
    /// Pushes a writer taken from the runtime's pool
    AcquireWriter,
    /// Pops a writer and hands it back to the pool
    ReleaseWriter,
    /// Pops a value then a writer, appends the value
    Write(WireOp),
    /// Pops a reader, pushes the next value read from it
    Read(WireOp),
    /// Pushes whether the process is running in the given role
    IsActive(HostType),
    /// Reports a diagnostic through the runtime
    LogError(String),
    /// Pops flag, channel, writer, hash, qualified name and instance, then
    /// hands them to the runtime's send primitive for that direction
    SendRemoteCall(RemoteCallDirection),
    Return,
}

impl Instruction {
    pub fn jump_target(&self) -> Option<usize> {
        match self {
            Instruction::Jump(target)
            | Instruction::JumpIfTrue(target)
            | Instruction::JumpIfFalse(target) => Some(*target),
            _ => None,
        }
    }
}
