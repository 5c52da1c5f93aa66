//! # Compiled module model
//!
//! The unit the weaver rewrites: named types, their fields and methods,
//! and each method's stack-machine body. A module is plain data so it can
//! be cloned, inspected, mutated and persisted as a whole.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::remote_call::RemoteCallRegistration;

pub mod error;
pub mod instruction;
pub mod marker;
pub mod type_ref;

pub use error::ModuleError;
pub use instruction::{Constant, Instruction, WireOp};
pub use marker::{HasMarkers, Marker, MarkerValue};
pub use type_ref::TypeRef;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub name: String,
    pub types: Vec<TypeDef>,
    /// Remote calls the runtime must register, filled in by a committed weave
    pub registrations: Vec<RemoteCallRegistration>,
    /// Set once the module has been woven, so it is never woven twice
    pub weaved: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeKind {
    /// Reference type, instantiated as a shared object
    Class,
    /// Value type, copied field by field
    Struct,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TypeDef {
    pub name: String,
    pub base: Option<String>,
    pub kind: TypeKind,
    pub fields: Vec<FieldDef>,
    pub methods: Vec<MethodDef>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub ty: TypeRef,
    pub markers: Vec<Marker>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Visibility {
    Public,
    Protected,
    Private,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MethodDef {
    pub name: String,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_abstract: bool,
    pub params: Vec<ParamDef>,
    pub return_type: TypeRef,
    pub markers: Vec<Marker>,
    pub body: MethodBody,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParamDef {
    pub name: String,
    pub ty: TypeRef,
    pub markers: Vec<Marker>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MethodBody {
    pub locals: Vec<TypeRef>,
    pub instructions: Vec<Instruction>,
}

/// Names a method by its declaring type
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodRef {
    pub declaring_type: String,
    pub name: String,
}

impl MethodRef {
    pub fn new(declaring_type: &str, name: &str) -> Self {
        Self {
            declaring_type: declaring_type.to_string(),
            name: name.to_string(),
        }
    }
}

impl HasMarkers for FieldDef {
    fn markers(&self) -> &[Marker] {
        &self.markers
    }
}

impl HasMarkers for MethodDef {
    fn markers(&self) -> &[Marker] {
        &self.markers
    }
}

impl HasMarkers for ParamDef {
    fn markers(&self) -> &[Marker] {
        &self.markers
    }
}

impl MethodDef {
    /// Number of argument slots, including `this` for instance methods
    pub fn arg_count(&self) -> usize {
        self.params.len() + usize::from(!self.is_static)
    }
}

impl TypeDef {
    pub fn method(&self, name: &str) -> Option<&MethodDef> {
        self.methods.iter().find(|method| method.name == name)
    }

    pub fn method_mut(&mut self, name: &str) -> Option<&mut MethodDef> {
        self.methods.iter_mut().find(|method| method.name == name)
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|field| field.name == name)
    }
}

impl Module {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            types: Vec::new(),
            registrations: Vec::new(),
            weaved: false,
        }
    }

    pub fn find_type(&self, name: &str) -> Option<&TypeDef> {
        self.types.iter().find(|type_def| type_def.name == name)
    }

    pub fn find_type_mut(&mut self, name: &str) -> Option<&mut TypeDef> {
        self.types.iter_mut().find(|type_def| type_def.name == name)
    }

    pub fn method(&self, method_ref: &MethodRef) -> Result<&MethodDef, ModuleError> {
        self.find_type(&method_ref.declaring_type)
            .and_then(|type_def| type_def.method(&method_ref.name))
            .ok_or_else(|| ModuleError::MethodNotFound {
                type_name: method_ref.declaring_type.clone(),
                method: method_ref.name.clone(),
            })
    }

    /// Whether `type_name` is `base`, or has `base` somewhere in its chain.
    /// A chain that leaves the module ends at the first external base name.
    pub fn derives_from(&self, type_name: &str, base: &str) -> bool {
        let mut visited = HashSet::new();
        let mut current = Some(type_name.to_string());
        while let Some(name) = current {
            if name == base {
                return true;
            }
            if !visited.insert(name.clone()) {
                return false;
            }
            current = self.find_type(&name).and_then(|type_def| type_def.base.clone());
        }
        false
    }

    /// Finds the most derived definition of `method_name`, starting at
    /// `type_name` and walking towards the root of the chain
    pub fn resolve_virtual(
        &self,
        type_name: &str,
        method_name: &str,
    ) -> Result<(&TypeDef, &MethodDef), ModuleError> {
        let mut visited = HashSet::new();
        let mut current = Some(type_name.to_string());
        while let Some(name) = current {
            if !visited.insert(name.clone()) {
                break;
            }
            let Some(type_def) = self.find_type(&name) else {
                break;
            };
            if let Some(method) = type_def.method(method_name) {
                return Ok((type_def, method));
            }
            current = type_def.base.clone();
        }
        Err(ModuleError::MethodNotFound {
            type_name: type_name.to_string(),
            method: method_name.to_string(),
        })
    }

    /// All fields of `type_name` including inherited ones, root first
    pub fn all_fields(&self, type_name: &str) -> Vec<&FieldDef> {
        let mut chain = Vec::new();
        let mut visited = HashSet::new();
        let mut current = self.find_type(type_name);
        while let Some(type_def) = current {
            if !visited.insert(type_def.name.as_str()) {
                break;
            }
            chain.push(type_def);
            current = type_def.base.as_deref().and_then(|base| self.find_type(base));
        }
        chain
            .into_iter()
            .rev()
            .flat_map(|type_def| type_def.fields.iter())
            .collect()
    }

    /// Checks the structural invariants every later analysis relies on
    pub fn validate(&self) -> Result<(), ModuleError> {
        let mut type_names = HashSet::new();
        for type_def in &self.types {
            if !type_names.insert(type_def.name.as_str()) {
                return Err(ModuleError::DuplicateType {
                    module: self.name.clone(),
                    type_name: type_def.name.clone(),
                });
            }
        }

        for type_def in &self.types {
            self.validate_type(type_def)?;
        }

        Ok(())
    }

    fn validate_type(&self, type_def: &TypeDef) -> Result<(), ModuleError> {
        if let Some(base) = &type_def.base {
            if self.derives_from(base, &type_def.name) {
                return Err(ModuleError::CyclicBase {
                    type_name: type_def.name.clone(),
                });
            }
        }

        let mut field_names = HashSet::new();
        for field in &type_def.fields {
            if !field_names.insert(field.name.as_str()) {
                return Err(ModuleError::DuplicateField {
                    type_name: type_def.name.clone(),
                    field: field.name.clone(),
                });
            }
        }

        let mut method_names = HashSet::new();
        for method in &type_def.methods {
            if !method_names.insert(method.name.as_str()) {
                return Err(ModuleError::DuplicateMethod {
                    type_name: type_def.name.clone(),
                    method: method.name.clone(),
                });
            }
            validate_body(&type_def.name, method)?;
        }

        Ok(())
    }
}

fn validate_body(type_name: &str, method: &MethodDef) -> Result<(), ModuleError> {
    let length = method.body.instructions.len();
    let arg_count = method.arg_count();
    let local_count = method.body.locals.len();
    let label = || format!("{}::{}", type_name, method.name);

    for instruction in &method.body.instructions {
        if let Some(target) = instruction.jump_target() {
            if target >= length {
                return Err(ModuleError::JumpOutOfRange {
                    method: label(),
                    target,
                    length,
                });
            }
        }
        match instruction {
            Instruction::LoadArg(index) if usize::from(*index) >= arg_count => {
                return Err(ModuleError::ArgumentOutOfRange {
                    method: label(),
                    index: *index,
                    count: arg_count,
                });
            }
            Instruction::LoadLocal(index) | Instruction::StoreLocal(index)
                if usize::from(*index) >= local_count =>
            {
                return Err(ModuleError::LocalOutOfRange {
                    method: label(),
                    index: *index,
                    count: local_count,
                });
            }
            _ => {}
        }
    }

    Ok(())
}
