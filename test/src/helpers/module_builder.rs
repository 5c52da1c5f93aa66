use rpcweave_shared::{
    constants::{
        CLIENT_RPC_MARKER, DEFAULT_BEHAVIOUR_BASE, NETWORKED_FIELD_MARKER,
        SENDER_CONNECTION_MARKER, SERVER_RPC_MARKER,
    },
    FieldDef, Instruction, Marker, MarkerValue, MethodBody, MethodDef, Module, ParamDef,
    TypeDef, TypeKind, TypeRef, Visibility,
};

/// Fluent builder for test modules
pub struct ModuleBuilder {
    module: Module,
}

impl ModuleBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            module: Module::new(name),
        }
    }

    pub fn with_type(mut self, type_builder: TypeBuilder) -> Self {
        self.module.types.push(type_builder.build());
        self
    }

    /// Adds a value type with the given fields, in order
    pub fn with_struct(self, name: &str, fields: &[(&str, TypeRef)]) -> Self {
        let mut type_builder = TypeBuilder::new(name, None);
        type_builder.type_def.kind = TypeKind::Struct;
        for (field, ty) in fields {
            type_builder = type_builder.field(field, ty.clone());
        }
        self.with_type(type_builder)
    }

    pub fn build(self) -> Module {
        self.module
    }
}

/// Fluent builder for one class or struct
pub struct TypeBuilder {
    type_def: TypeDef,
}

impl TypeBuilder {
    pub fn new(name: &str, base: Option<&str>) -> Self {
        Self {
            type_def: TypeDef {
                name: name.to_string(),
                base: base.map(str::to_string),
                kind: TypeKind::Class,
                fields: Vec::new(),
                methods: Vec::new(),
            },
        }
    }

    /// A class deriving directly from the remote-call capable base
    pub fn behaviour(name: &str) -> Self {
        Self::new(name, Some(DEFAULT_BEHAVIOUR_BASE))
    }

    pub fn field(mut self, name: &str, ty: TypeRef) -> Self {
        self.type_def.fields.push(FieldDef {
            name: name.to_string(),
            ty,
            markers: Vec::new(),
        });
        self
    }

    pub fn networked(mut self, name: &str, ty: TypeRef) -> Self {
        self.type_def.fields.push(FieldDef {
            name: name.to_string(),
            ty,
            markers: vec![Marker::new(NETWORKED_FIELD_MARKER)],
        });
        self
    }

    pub fn method(mut self, method: MethodBuilder) -> Self {
        self.type_def.methods.push(method.build());
        self
    }

    pub fn build(self) -> TypeDef {
        self.type_def
    }
}

/// Fluent builder for one method
pub struct MethodBuilder {
    method: MethodDef,
}

impl MethodBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            method: MethodDef {
                name: name.to_string(),
                visibility: Visibility::Public,
                is_static: false,
                is_abstract: false,
                params: Vec::new(),
                return_type: TypeRef::Void,
                markers: Vec::new(),
                body: MethodBody {
                    locals: Vec::new(),
                    instructions: vec![Instruction::Return],
                },
            },
        }
    }

    pub fn server_rpc(name: &str) -> Self {
        Self::new(name).marker(Marker::new(SERVER_RPC_MARKER))
    }

    pub fn client_rpc(name: &str) -> Self {
        Self::new(name).marker(Marker::new(CLIENT_RPC_MARKER))
    }

    pub fn marker(mut self, marker: Marker) -> Self {
        self.method.markers.push(marker);
        self
    }

    /// Adds an argument to the first marker
    pub fn marker_arg(mut self, key: &str, value: MarkerValue) -> Self {
        if let Some(marker) = self.method.markers.first_mut() {
            marker.args.push((key.to_string(), value));
        }
        self
    }

    pub fn param(mut self, name: &str, ty: TypeRef) -> Self {
        self.method.params.push(ParamDef {
            name: name.to_string(),
            ty,
            markers: Vec::new(),
        });
        self
    }

    /// Adds a connection parameter marked as the sender connection
    pub fn sender(mut self, name: &str) -> Self {
        self.method.params.push(ParamDef {
            name: name.to_string(),
            ty: TypeRef::Connection,
            markers: vec![Marker::new(SENDER_CONNECTION_MARKER)],
        });
        self
    }

    pub fn returns(mut self, ty: TypeRef) -> Self {
        self.method.return_type = ty;
        self
    }

    pub fn body(mut self, locals: Vec<TypeRef>, instructions: Vec<Instruction>) -> Self {
        self.method.body = MethodBody {
            locals,
            instructions,
        };
        self
    }

    /// Body that stores each parameter into the field of the same index,
    /// so a test can see which arguments the method ran with
    pub fn stores_params_in(mut self, fields: &[&str]) -> Self {
        let mut instructions = Vec::new();
        for (index, field) in fields.iter().enumerate() {
            instructions.push(Instruction::LoadArg(0));
            instructions.push(Instruction::LoadArg((index + 1) as u16));
            instructions.push(Instruction::StoreField(field.to_string()));
        }
        instructions.push(Instruction::Return);
        self.method.body = MethodBody {
            locals: Vec::new(),
            instructions,
        };
        self
    }

    pub fn build(self) -> MethodDef {
        self.method
    }
}
