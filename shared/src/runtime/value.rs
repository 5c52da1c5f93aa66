use std::{cell::RefCell, collections::HashMap, fmt, rc::Rc};

use rpcweave_serde::{BitReader, BitWriter};

use crate::{
    module::{Constant, Module, TypeKind, TypeRef},
    types::ConnectionId,
};

const MAX_STRUCT_NESTING: usize = 32;

/// A runtime value on the interpreter's stack
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
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
    Struct(StructValue),
    Object(ObjectRef),
    Connection(ConnectionId),
    Writer(WriterRef),
    Reader(ReaderRef),
}

impl Value {
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Byte(_) => "byte",
            Value::Int(_) => "int",
            Value::UInt(_) => "uint",
            Value::Long(_) => "long",
            Value::ULong(_) => "ulong",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::Str(_) => "string",
            Value::Struct(_) => "struct",
            Value::Object(_) => "object",
            Value::Connection(_) => "connection",
            Value::Writer(_) => "writer",
            Value::Reader(_) => "reader",
        }
    }

    /// The zero value a freshly created field of `ty` holds
    pub fn default_for(module: &Module, ty: &TypeRef) -> Value {
        Self::default_at_depth(module, ty, 0)
    }

    fn default_at_depth(module: &Module, ty: &TypeRef, depth: usize) -> Value {
        // self-referential structs stop expanding here
        if depth > MAX_STRUCT_NESTING {
            return Value::Null;
        }
        match ty {
            TypeRef::Bool => Value::Bool(false),
            TypeRef::Byte => Value::Byte(0),
            TypeRef::Int => Value::Int(0),
            TypeRef::UInt => Value::UInt(0),
            TypeRef::Long => Value::Long(0),
            TypeRef::ULong => Value::ULong(0),
            TypeRef::Float => Value::Float(0.0),
            TypeRef::Double => Value::Double(0.0),
            TypeRef::String => Value::Str(String::new()),
            TypeRef::Named(name) => match module.find_type(name) {
                Some(type_def) if type_def.kind == TypeKind::Struct => {
                    Value::Struct(StructValue {
                        type_name: name.clone(),
                        fields: module
                            .all_fields(name)
                            .into_iter()
                            .map(|field| {
                                (
                                    field.name.clone(),
                                    Value::default_at_depth(module, &field.ty, depth + 1),
                                )
                            })
                            .collect(),
                    })
                }
                _ => Value::Null,
            },
            TypeRef::Void
            | TypeRef::Connection
            | TypeRef::Writer
            | TypeRef::Reader => Value::Null,
        }
    }
}

impl From<&Constant> for Value {
    fn from(constant: &Constant) -> Self {
        match constant {
            Constant::Null => Value::Null,
            Constant::Bool(value) => Value::Bool(*value),
            Constant::Byte(value) => Value::Byte(*value),
            Constant::Int(value) => Value::Int(*value),
            Constant::UInt(value) => Value::UInt(*value),
            Constant::Long(value) => Value::Long(*value),
            Constant::ULong(value) => Value::ULong(*value),
            Constant::Float(value) => Value::Float(*value),
            Constant::Double(value) => Value::Double(*value),
            Constant::Str(value) => Value::Str(value.clone()),
        }
    }
}

/// A value-type instance: copied on assignment, compared by field
#[derive(Clone, Debug, PartialEq)]
pub struct StructValue {
    pub type_name: String,
    pub fields: Vec<(String, Value)>,
}

impl StructValue {
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }
}

/// A class instance, shared between every holder of the reference
pub struct Object {
    pub class: String,
    pub fields: HashMap<String, Value>,
}

#[derive(Clone)]
pub struct ObjectRef(Rc<RefCell<Object>>);

impl ObjectRef {
    /// Creates an instance of `class` with every field, inherited ones
    /// included, set to its zero value
    pub fn new(module: &Module, class: &str) -> Self {
        let fields = module
            .all_fields(class)
            .into_iter()
            .map(|field| (field.name.clone(), Value::default_for(module, &field.ty)))
            .collect();
        Self(Rc::new(RefCell::new(Object {
            class: class.to_string(),
            fields,
        })))
    }

    pub fn class(&self) -> String {
        self.0.borrow().class.clone()
    }

    pub fn get(&self, field: &str) -> Option<Value> {
        self.0.borrow().fields.get(field).cloned()
    }

    pub fn set(&self, field: &str, value: Value) -> bool {
        let mut object = self.0.borrow_mut();
        match object.fields.get_mut(field) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(object) => write!(f, "ObjectRef({})", object.class),
            Err(_) => f.write_str("ObjectRef(<borrowed>)"),
        }
    }
}

/// Handle to a pooled writer
#[derive(Clone)]
pub struct WriterRef(Rc<RefCell<BitWriter>>);

impl WriterRef {
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(BitWriter::new())))
    }

    pub fn with<T>(&self, f: impl FnOnce(&mut BitWriter) -> T) -> T {
        f(&mut self.0.borrow_mut())
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.0.borrow().to_bytes()
    }
}

impl Default for WriterRef {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for WriterRef {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for WriterRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WriterRef")
    }
}

/// Handle to an argument source. Shared so the caller can see how much
/// of it a trampoline consumed.
#[derive(Clone)]
pub struct ReaderRef(Rc<RefCell<BitReader>>);

impl ReaderRef {
    pub fn new(payload: &[u8]) -> Self {
        Self(Rc::new(RefCell::new(BitReader::new(payload))))
    }

    pub fn with<T>(&self, f: impl FnOnce(&mut BitReader) -> T) -> T {
        f(&mut self.0.borrow_mut())
    }

    pub fn bits_read(&self) -> usize {
        self.0.borrow().bits_read()
    }
}

impl PartialEq for ReaderRef {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ReaderRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ReaderRef(bits_read: {})", self.bits_read())
    }
}
