//! # Writer/Reader Registry
//!
//! Maps every type a remote call marshals to the generators that emit its
//! serialize and deserialize instructions. A `SerializerProvider` holds the
//! long-lived lookup (built-ins plus user registrations); a `Registry` is
//! resolved from it once per weave pass, before any method is rewritten,
//! and is read-only afterwards.

use std::{collections::HashMap, rc::Rc};

use log::debug;

use rpcweave_shared::{Instruction, Module, TypeKind, TypeRef};

use crate::{
    classifier::{Classification, RemoteCallDescriptor},
    config::WeaverConfig,
    diagnostics::Diagnostics,
    error::{DiagnosticContext, UnsupportedTypeError},
};

mod builtin;
mod composite;

pub use builtin::{builtin_wire_ops, is_marshalable, PrimitiveGenerator};
pub use composite::StructGenerator;

/// Emits the instructions that append one value to a writer
pub trait WriterGenerator {
    /// `load_writer` and `load_value` each push exactly one value and may
    /// be repeated as often as the generator needs
    fn emit_write(
        &self,
        registry: &Registry,
        load_writer: &[Instruction],
        load_value: &[Instruction],
        out: &mut Vec<Instruction>,
    ) -> Result<(), UnsupportedTypeError>;

    /// Member name and type of every value this generator delegates to.
    /// Each is resolved before the generator is used
    fn dependencies(&self) -> Vec<(String, TypeRef)> {
        Vec::new()
    }
}

/// Emits the instructions that read one value and leave it on the stack
pub trait ReaderGenerator {
    fn emit_read(
        &self,
        registry: &Registry,
        load_reader: &[Instruction],
        out: &mut Vec<Instruction>,
    ) -> Result<(), UnsupportedTypeError>;
}

#[derive(Clone)]
struct ProviderEntry {
    writer: Rc<dyn WriterGenerator>,
    reader: Rc<dyn ReaderGenerator>,
}

/// Type-keyed lookup of writer/reader generators
pub struct SerializerProvider {
    entries: HashMap<TypeRef, ProviderEntry>,
}

impl Default for SerializerProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SerializerProvider {
    /// A provider holding a generator for every built-in wire type
    pub fn new() -> Self {
        let mut provider = Self::empty();
        for (ty, op) in builtin_wire_ops() {
            provider.register(ty, PrimitiveGenerator(op), PrimitiveGenerator(op));
        }
        provider
    }

    /// A provider with nothing registered
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Registers generators for `ty`, replacing any earlier registration
    pub fn register<W, R>(&mut self, ty: TypeRef, writer: W, reader: R) -> &mut Self
    where
        W: WriterGenerator + 'static,
        R: ReaderGenerator + 'static,
    {
        self.entries.insert(
            ty,
            ProviderEntry {
                writer: Rc::new(writer),
                reader: Rc::new(reader),
            },
        );
        self
    }

    /// Registers a composite type written as the given fields, in order
    pub fn register_struct(&mut self, type_name: &str, fields: Vec<(String, TypeRef)>) -> &mut Self {
        let generator = Rc::new(StructGenerator::new(type_name, fields));
        self.entries.insert(
            TypeRef::named(type_name),
            ProviderEntry {
                writer: generator.clone(),
                reader: generator,
            },
        );
        self
    }

    pub fn is_registered(&self, ty: &TypeRef) -> bool {
        self.entries.contains_key(ty)
    }

    fn get(&self, ty: &TypeRef) -> Option<&ProviderEntry> {
        self.entries.get(ty)
    }
}

/// A resolved type and its generators
pub struct RegistryEntry {
    pub ty: TypeRef,
    pub dependencies: Vec<TypeRef>,
    writer: Rc<dyn WriterGenerator>,
    reader: Rc<dyn ReaderGenerator>,
}

/// Generators for every type used by one module's remote calls and
/// networked fields. Built once, then only read
pub struct Registry {
    entries: HashMap<TypeRef, RegistryEntry>,
    failures: HashMap<TypeRef, UnsupportedTypeError>,
}

impl Registry {
    /// Resolves the union of all parameter and networked field types.
    /// Every use of a type that does not resolve is reported with the
    /// context of the member using it
    pub fn build(
        module: &Module,
        provider: &SerializerProvider,
        config: &WeaverConfig,
        classification: &Classification,
        diagnostics: &mut Diagnostics,
    ) -> Self {
        let mut builder = RegistryBuilder {
            module,
            provider,
            config,
            entries: HashMap::new(),
            failures: HashMap::new(),
        };

        for descriptor in &classification.remote_calls {
            for (_, param) in descriptor.wire_params() {
                if let Err(error) = builder.resolve(&param.ty, &mut Vec::new()) {
                    diagnostics.report(descriptor.context(), error);
                }
            }
        }

        for field in &classification.networked_fields {
            if let Err(error) = builder.resolve(&field.ty, &mut Vec::new()) {
                diagnostics.report(
                    DiagnosticContext::field(&field.declaring_type, &field.field_name),
                    error,
                );
            }
        }

        debug!(
            "Registry for module {} resolved {} type(s), {} unresolved",
            module.name,
            builder.entries.len(),
            builder.failures.len()
        );

        Self {
            entries: builder.entries,
            failures: builder.failures,
        }
    }

    pub fn resolve(&self, ty: &TypeRef) -> Result<&RegistryEntry, UnsupportedTypeError> {
        if let Some(entry) = self.entries.get(ty) {
            return Ok(entry);
        }
        Err(self
            .failures
            .get(ty)
            .cloned()
            .unwrap_or_else(|| UnsupportedTypeError::Unregistered { ty: ty.to_string() }))
    }

    pub fn contains(&self, ty: &TypeRef) -> bool {
        self.entries.contains_key(ty)
    }

    /// Whether every wire parameter of `descriptor` resolved
    pub fn supports(&self, descriptor: &RemoteCallDescriptor) -> bool {
        descriptor
            .wire_params()
            .all(|(_, param)| self.contains(&param.ty))
    }

    pub fn emit_write(
        &self,
        ty: &TypeRef,
        load_writer: &[Instruction],
        load_value: &[Instruction],
        out: &mut Vec<Instruction>,
    ) -> Result<(), UnsupportedTypeError> {
        let entry = self.resolve(ty)?;
        entry.writer.emit_write(self, load_writer, load_value, out)
    }

    pub fn emit_read(
        &self,
        ty: &TypeRef,
        load_reader: &[Instruction],
        out: &mut Vec<Instruction>,
    ) -> Result<(), UnsupportedTypeError> {
        let entry = self.resolve(ty)?;
        entry.reader.emit_read(self, load_reader, out)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

struct RegistryBuilder<'a> {
    module: &'a Module,
    provider: &'a SerializerProvider,
    config: &'a WeaverConfig,
    entries: HashMap<TypeRef, RegistryEntry>,
    failures: HashMap<TypeRef, UnsupportedTypeError>,
}

impl<'a> RegistryBuilder<'a> {
    fn resolve(
        &mut self,
        ty: &TypeRef,
        visiting: &mut Vec<TypeRef>,
    ) -> Result<(), UnsupportedTypeError> {
        if self.entries.contains_key(ty) {
            return Ok(());
        }
        if let Some(error) = self.failures.get(ty) {
            return Err(error.clone());
        }
        if visiting.contains(ty) {
            return Err(UnsupportedTypeError::RecursiveStruct { ty: ty.to_string() });
        }

        let result = self.resolve_uncached(ty, visiting);
        if let Err(error) = &result {
            self.failures.insert(ty.clone(), error.clone());
        }
        result
    }

    fn resolve_uncached(
        &mut self,
        ty: &TypeRef,
        visiting: &mut Vec<TypeRef>,
    ) -> Result<(), UnsupportedTypeError> {
        if !is_marshalable(ty) {
            return Err(UnsupportedTypeError::NotMarshalable { ty: ty.to_string() });
        }

        if let Some(entry) = self.provider.get(ty).cloned() {
            let dependencies = entry.writer.dependencies();
            self.resolve_dependencies(ty, &dependencies, visiting)?;
            self.insert(ty, entry.writer, entry.reader, dependencies);
            return Ok(());
        }

        if let TypeRef::Named(name) = ty {
            let declared_struct = self
                .module
                .find_type(name)
                .is_some_and(|type_def| type_def.kind == TypeKind::Struct);
            if declared_struct && self.config.generate_struct_serializers {
                let fields: Vec<(String, TypeRef)> = self
                    .module
                    .all_fields(name)
                    .into_iter()
                    .map(|field| (field.name.clone(), field.ty.clone()))
                    .collect();
                self.resolve_dependencies(ty, &fields, visiting)?;
                let generator = Rc::new(StructGenerator::new(name, fields.clone()));
                self.insert(ty, generator.clone(), generator, fields);
                debug!("Synthesized writer/reader for struct {}", name);
                return Ok(());
            }
        }

        Err(UnsupportedTypeError::Unregistered { ty: ty.to_string() })
    }

    fn resolve_dependencies(
        &mut self,
        ty: &TypeRef,
        dependencies: &[(String, TypeRef)],
        visiting: &mut Vec<TypeRef>,
    ) -> Result<(), UnsupportedTypeError> {
        visiting.push(ty.clone());
        let mut result = Ok(());
        for (member, member_type) in dependencies {
            if let Err(error) = self.resolve(member_type, visiting) {
                result = Err(match error {
                    UnsupportedTypeError::RecursiveStruct { .. } => error,
                    _ => UnsupportedTypeError::UnsupportedField {
                        ty: ty.to_string(),
                        field: member.clone(),
                        field_type: member_type.to_string(),
                    },
                });
                break;
            }
        }
        visiting.pop();
        result
    }

    fn insert(
        &mut self,
        ty: &TypeRef,
        writer: Rc<dyn WriterGenerator>,
        reader: Rc<dyn ReaderGenerator>,
        dependencies: Vec<(String, TypeRef)>,
    ) {
        self.entries.insert(
            ty.clone(),
            RegistryEntry {
                ty: ty.clone(),
                dependencies: dependencies.into_iter().map(|(_, ty)| ty).collect(),
                writer,
                reader,
            },
        );
    }
}
