use rpcweave_shared::{Instruction, TypeRef};

use crate::error::UnsupportedTypeError;

use super::{ReaderGenerator, Registry, WriterGenerator};

/// Writes a struct as its fields in declaration order, each with the
/// field type's own generator, and reads it back the same way
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StructGenerator {
    type_name: String,
    fields: Vec<(String, TypeRef)>,
}

impl StructGenerator {
    pub fn new(type_name: &str, fields: Vec<(String, TypeRef)>) -> Self {
        Self {
            type_name: type_name.to_string(),
            fields,
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn fields(&self) -> &[(String, TypeRef)] {
        &self.fields
    }
}

impl WriterGenerator for StructGenerator {
    fn emit_write(
        &self,
        registry: &Registry,
        load_writer: &[Instruction],
        load_value: &[Instruction],
        out: &mut Vec<Instruction>,
    ) -> Result<(), UnsupportedTypeError> {
        for (field, field_type) in &self.fields {
            let mut load_field = load_value.to_vec();
            load_field.push(Instruction::LoadField(field.clone()));
            registry.emit_write(field_type, load_writer, &load_field, out)?;
        }
        Ok(())
    }

    fn dependencies(&self) -> Vec<(String, TypeRef)> {
        self.fields.clone()
    }
}

impl ReaderGenerator for StructGenerator {
    fn emit_read(
        &self,
        registry: &Registry,
        load_reader: &[Instruction],
        out: &mut Vec<Instruction>,
    ) -> Result<(), UnsupportedTypeError> {
        for (_, field_type) in &self.fields {
            registry.emit_read(field_type, load_reader, out)?;
        }
        out.push(Instruction::NewStruct {
            type_name: self.type_name.clone(),
            fields: self.fields.iter().map(|(name, _)| name.clone()).collect(),
        });
        Ok(())
    }
}
