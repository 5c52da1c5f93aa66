use rpcweave_shared::{Instruction, TypeRef, WireOp};

use crate::error::UnsupportedTypeError;

use super::{ReaderGenerator, Registry, WriterGenerator};

/// Writes and reads a value with a single wire op
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PrimitiveGenerator(pub WireOp);

impl WriterGenerator for PrimitiveGenerator {
    fn emit_write(
        &self,
        _registry: &Registry,
        load_writer: &[Instruction],
        load_value: &[Instruction],
        out: &mut Vec<Instruction>,
    ) -> Result<(), UnsupportedTypeError> {
        out.extend_from_slice(load_writer);
        out.extend_from_slice(load_value);
        out.push(Instruction::Write(self.0));
        Ok(())
    }
}

impl ReaderGenerator for PrimitiveGenerator {
    fn emit_read(
        &self,
        _registry: &Registry,
        load_reader: &[Instruction],
        out: &mut Vec<Instruction>,
    ) -> Result<(), UnsupportedTypeError> {
        out.extend_from_slice(load_reader);
        out.push(Instruction::Read(self.0));
        Ok(())
    }
}

/// The wire contract: every built-in type and the op that carries it
pub fn builtin_wire_ops() -> [(TypeRef, WireOp); 9] {
    [
        (TypeRef::Bool, WireOp::Bool),
        (TypeRef::Byte, WireOp::Byte),
        (TypeRef::Int, WireOp::Int),
        (TypeRef::UInt, WireOp::UInt),
        (TypeRef::Long, WireOp::Long),
        (TypeRef::ULong, WireOp::ULong),
        (TypeRef::Float, WireOp::Float),
        (TypeRef::Double, WireOp::Double),
        (TypeRef::String, WireOp::String),
    ]
}

/// Runtime-only handles that can never travel over the wire
pub fn is_marshalable(ty: &TypeRef) -> bool {
    !matches!(
        ty,
        TypeRef::Void | TypeRef::Connection | TypeRef::Writer | TypeRef::Reader
    )
}
