use log::debug;
use rpcweave_serde::Serde;

use crate::{
    constants::MAX_CALL_DEPTH,
    module::{Instruction, MethodDef, MethodRef, Module, ModuleError, WireOp},
    remote_call::{RemoteCall, RemoteCallDirection},
    runtime::{
        error::RuntimeError,
        value::{ObjectRef, ReaderRef, StructValue, Value, WriterRef},
        Runtime,
    },
    stable_hash::StableHash,
};

/// Stack-machine interpreter over a [`Module`]
pub struct Interpreter<'a> {
    module: &'a Module,
    runtime: &'a mut dyn Runtime,
    writer_pool: Vec<WriterRef>,
    depth: usize,
}

struct Frame<'m> {
    label: String,
    method: &'m MethodDef,
    args: Vec<Value>,
    locals: Vec<Value>,
    stack: Vec<Value>,
    held_writers: Vec<WriterRef>,
    pc: usize,
}

impl<'m> Frame<'m> {
    fn pop(&mut self) -> Result<Value, RuntimeError> {
        self.stack.pop().ok_or_else(|| RuntimeError::StackUnderflow {
            method: self.label.clone(),
            index: self.pc.saturating_sub(1),
        })
    }

    fn mismatch(&self, expected: &'static str, found: &Value) -> RuntimeError {
        RuntimeError::TypeMismatch {
            method: self.label.clone(),
            index: self.pc.saturating_sub(1),
            expected,
            found: found.kind(),
        }
    }

    fn pop_bool(&mut self) -> Result<bool, RuntimeError> {
        match self.pop()? {
            Value::Bool(value) => Ok(value),
            other => Err(self.mismatch("bool", &other)),
        }
    }

    fn pop_int(&mut self) -> Result<i32, RuntimeError> {
        match self.pop()? {
            Value::Int(value) => Ok(value),
            other => Err(self.mismatch("int", &other)),
        }
    }

    fn pop_str(&mut self) -> Result<String, RuntimeError> {
        match self.pop()? {
            Value::Str(value) => Ok(value),
            other => Err(self.mismatch("string", &other)),
        }
    }

    fn pop_object(&mut self) -> Result<ObjectRef, RuntimeError> {
        match self.pop()? {
            Value::Object(object) => Ok(object),
            other => Err(self.mismatch("object", &other)),
        }
    }

    fn pop_writer(&mut self) -> Result<WriterRef, RuntimeError> {
        match self.pop()? {
            Value::Writer(writer) => Ok(writer),
            other => Err(self.mismatch("writer", &other)),
        }
    }

    fn pop_reader(&mut self) -> Result<ReaderRef, RuntimeError> {
        match self.pop()? {
            Value::Reader(reader) => Ok(reader),
            other => Err(self.mismatch("reader", &other)),
        }
    }

    fn pop_args(&mut self, count: usize) -> Result<Vec<Value>, RuntimeError> {
        if self.stack.len() < count {
            return Err(RuntimeError::StackUnderflow {
                method: self.label.clone(),
                index: self.pc.saturating_sub(1),
            });
        }
        Ok(self.stack.split_off(self.stack.len() - count))
    }
}

impl<'a> Interpreter<'a> {
    pub fn new(module: &'a Module, runtime: &'a mut dyn Runtime) -> Self {
        Self {
            module,
            runtime,
            writer_pool: Vec::new(),
            depth: 0,
        }
    }

    /// Number of idle writers in the pool
    pub fn pooled_writers(&self) -> usize {
        self.writer_pool.len()
    }

    /// Calls exactly `method_ref`. Instance methods take `this` as the first argument.
    pub fn call(&mut self, method_ref: &MethodRef, args: Vec<Value>) -> Result<Value, RuntimeError> {
        let module = self.module;
        let method = module.method(method_ref)?;
        self.execute(&method_ref.declaring_type, method, args)
    }

    /// Calls the most derived `method_name` on `this`
    pub fn call_virtual(
        &mut self,
        this: &ObjectRef,
        method_name: &str,
        mut args: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        let module = self.module;
        let (owner, method) = module.resolve_virtual(&this.class(), method_name)?;
        args.insert(0, Value::Object(this.clone()));
        self.execute(&owner.name, method, args)
    }

    fn execute(
        &mut self,
        type_name: &str,
        method: &'a MethodDef,
        args: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        let label = format!("{}::{}", type_name, method.name);
        if method.is_abstract {
            return Err(RuntimeError::AbstractMethod { method: label });
        }
        if args.len() != method.arg_count() {
            return Err(RuntimeError::ArgumentCount {
                method: label,
                expected: method.arg_count(),
                actual: args.len(),
            });
        }
        if self.depth >= MAX_CALL_DEPTH {
            return Err(RuntimeError::CallDepthExceeded {
                method: label,
                limit: MAX_CALL_DEPTH,
            });
        }

        let module = self.module;
        let mut frame = Frame {
            label,
            method,
            args,
            locals: method
                .body
                .locals
                .iter()
                .map(|ty| Value::default_for(module, ty))
                .collect(),
            stack: Vec::new(),
            held_writers: Vec::new(),
            pc: 0,
        };

        self.depth += 1;
        let result = self.run(&mut frame);
        self.depth -= 1;

        // writers still held when the frame ends go back to the pool, on every exit path
        for writer in frame.held_writers.drain(..) {
            writer.with(|inner| inner.reset());
            self.writer_pool.push(writer);
        }

        result
    }

    fn run(&mut self, frame: &mut Frame<'a>) -> Result<Value, RuntimeError> {
        let module = self.module;
        let method: &'a MethodDef = frame.method;
        let instructions = &method.body.instructions;

        while let Some(instruction) = instructions.get(frame.pc) {
            frame.pc += 1;
            match instruction {
                Instruction::Nop => {}
                Instruction::LoadArg(index) => {
                    let value = frame.args.get(usize::from(*index)).cloned().ok_or_else(|| {
                        ModuleError::ArgumentOutOfRange {
                            method: frame.label.clone(),
                            index: *index,
                            count: frame.args.len(),
                        }
                    })?;
                    frame.stack.push(value);
                }
                Instruction::LoadLocal(index) => {
                    let value = frame.locals.get(usize::from(*index)).cloned().ok_or_else(|| {
                        ModuleError::LocalOutOfRange {
                            method: frame.label.clone(),
                            index: *index,
                            count: frame.locals.len(),
                        }
                    })?;
                    frame.stack.push(value);
                }
                Instruction::StoreLocal(index) => {
                    let value = frame.pop()?;
                    let slot = usize::from(*index);
                    if slot >= frame.locals.len() {
                        return Err(ModuleError::LocalOutOfRange {
                            method: frame.label.clone(),
                            index: *index,
                            count: frame.locals.len(),
                        }
                        .into());
                    }
                    frame.locals[slot] = value;
                }
                Instruction::LoadConst(constant) => frame.stack.push(Value::from(constant)),
                Instruction::LoadField(field) => {
                    let value = match frame.pop()? {
                        Value::Object(object) => {
                            object.get(field).ok_or_else(|| RuntimeError::FieldNotFound {
                                type_name: object.class(),
                                field: field.clone(),
                            })?
                        }
                        Value::Struct(value) => {
                            value.field(field).cloned().ok_or_else(|| {
                                RuntimeError::FieldNotFound {
                                    type_name: value.type_name.clone(),
                                    field: field.clone(),
                                }
                            })?
                        }
                        other => return Err(frame.mismatch("object or struct", &other)),
                    };
                    frame.stack.push(value);
                }
                Instruction::StoreField(field) => {
                    let value = frame.pop()?;
                    let object = frame.pop_object()?;
                    if !object.set(field, value) {
                        return Err(RuntimeError::FieldNotFound {
                            type_name: object.class(),
                            field: field.clone(),
                        });
                    }
                }
                Instruction::NewStruct { type_name, fields } => {
                    let values = frame.pop_args(fields.len())?;
                    frame.stack.push(Value::Struct(StructValue {
                        type_name: type_name.clone(),
                        fields: fields.iter().cloned().zip(values).collect(),
                    }));
                }
                Instruction::Add => {
                    let right = frame.pop()?;
                    let left = frame.pop()?;
                    let sum = match (left, right) {
                        (Value::Byte(a), Value::Byte(b)) => Value::Byte(a.wrapping_add(b)),
                        (Value::Int(a), Value::Int(b)) => Value::Int(a.wrapping_add(b)),
                        (Value::UInt(a), Value::UInt(b)) => Value::UInt(a.wrapping_add(b)),
                        (Value::Long(a), Value::Long(b)) => Value::Long(a.wrapping_add(b)),
                        (Value::ULong(a), Value::ULong(b)) => Value::ULong(a.wrapping_add(b)),
                        (Value::Float(a), Value::Float(b)) => Value::Float(a + b),
                        (Value::Double(a), Value::Double(b)) => Value::Double(a + b),
                        (Value::Str(a), Value::Str(b)) => Value::Str(a + &b),
                        (left, _) => return Err(frame.mismatch("matching numbers or strings", &left)),
                    };
                    frame.stack.push(sum);
                }
                Instruction::CastClass(target) => match frame.stack.last().cloned() {
                    Some(Value::Object(object)) => {
                        let class = object.class();
                        if !module.derives_from(&class, target) {
                            return Err(RuntimeError::InvalidCast {
                                class,
                                target: target.clone(),
                            });
                        }
                    }
                    Some(Value::Null) => {}
                    Some(other) => return Err(frame.mismatch("object", &other)),
                    None => {
                        frame.pop()?;
                    }
                },
                Instruction::Call(method_ref) => {
                    let callee = module.method(method_ref)?;
                    let args = frame.pop_args(callee.arg_count())?;
                    let result = self.execute(&method_ref.declaring_type, callee, args)?;
                    if !callee.return_type.is_void() {
                        frame.stack.push(result);
                    }
                }
                Instruction::CallVirtual(method_ref) => {
                    let declared = module.method(method_ref)?;
                    let args = frame.pop_args(declared.arg_count())?;
                    let class = match args.first() {
                        Some(Value::Object(object)) => object.class(),
                        Some(other) => return Err(frame.mismatch("object", other)),
                        None => method_ref.declaring_type.clone(),
                    };
                    let (owner, callee) = module.resolve_virtual(&class, &method_ref.name)?;
                    let result = self.execute(&owner.name, callee, args)?;
                    if !callee.return_type.is_void() {
                        frame.stack.push(result);
                    }
                }
                Instruction::Jump(target) => frame.pc = *target,
                Instruction::JumpIfTrue(target) => {
                    if frame.pop_bool()? {
                        frame.pc = *target;
                    }
                }
                Instruction::JumpIfFalse(target) => {
                    if !frame.pop_bool()? {
                        frame.pc = *target;
                    }
                }
                Instruction::AcquireWriter => {
                    let writer = self.writer_pool.pop().unwrap_or_default();
                    writer.with(|inner| inner.reset());
                    frame.held_writers.push(writer.clone());
                    frame.stack.push(Value::Writer(writer));
                }
                Instruction::ReleaseWriter => {
                    let writer = frame.pop_writer()?;
                    frame.held_writers.retain(|held| held != &writer);
                    writer.with(|inner| inner.reset());
                    self.writer_pool.push(writer);
                }
                Instruction::Write(op) => {
                    let value = frame.pop()?;
                    let writer = frame.pop_writer()?;
                    write_value(frame, &writer, *op, value)?;
                }
                Instruction::Read(op) => {
                    let reader = frame.pop_reader()?;
                    let value = read_value(&reader, *op)?;
                    frame.stack.push(value);
                }
                Instruction::IsActive(host) => {
                    frame.stack.push(Value::Bool(self.runtime.is_active(*host)));
                }
                Instruction::LogError(message) => self.runtime.report_error(message),
                Instruction::SendRemoteCall(direction) => {
                    let call = pop_remote_call(frame)?;
                    debug!(
                        "{} sending {} {} on channel {}",
                        frame.label,
                        direction.label(),
                        call.qualified_name,
                        call.channel
                    );
                    self.send(*direction, call);
                }
                Instruction::Return => {
                    return if method.return_type.is_void() {
                        Ok(Value::Null)
                    } else {
                        frame.pop()
                    };
                }
            }
        }

        Ok(Value::Null)
    }

    fn send(&mut self, direction: RemoteCallDirection, call: RemoteCall) {
        self.runtime.send_remote_call(direction, call);
    }
}

fn pop_remote_call(frame: &mut Frame<'_>) -> Result<RemoteCall, RuntimeError> {
    let flag = frame.pop_bool()?;
    let channel = frame.pop_int()?;
    let writer = frame.pop_writer()?;
    let hash = frame.pop_int()?;
    let qualified_name = frame.pop_str()?;
    let instance = frame.pop_object()?;
    Ok(RemoteCall {
        instance,
        qualified_name,
        hash: StableHash::from_raw(hash),
        payload: writer.to_bytes(),
        channel,
        flag,
    })
}

fn write_value(
    frame: &Frame<'_>,
    writer: &WriterRef,
    op: WireOp,
    value: Value,
) -> Result<(), RuntimeError> {
    writer.with(|inner| {
        match (op, value) {
            (WireOp::Bool, Value::Bool(value)) => value.ser(inner),
            (WireOp::Byte, Value::Byte(value)) => value.ser(inner),
            (WireOp::Int, Value::Int(value)) => value.ser(inner),
            (WireOp::UInt, Value::UInt(value)) => value.ser(inner),
            (WireOp::Long, Value::Long(value)) => value.ser(inner),
            (WireOp::ULong, Value::ULong(value)) => value.ser(inner),
            (WireOp::Float, Value::Float(value)) => value.ser(inner),
            (WireOp::Double, Value::Double(value)) => value.ser(inner),
            (WireOp::String, Value::Str(value)) => value.ser(inner),
            (op, other) => return Err(frame.mismatch(wire_op_label(op), &other)),
        }
        Ok(())
    })
}

fn read_value(reader: &ReaderRef, op: WireOp) -> Result<Value, RuntimeError> {
    let value = reader.with(|inner| -> Result<Value, RuntimeError> {
        Ok(match op {
            WireOp::Bool => Value::Bool(bool::de(inner)?),
            WireOp::Byte => Value::Byte(u8::de(inner)?),
            WireOp::Int => Value::Int(i32::de(inner)?),
            WireOp::UInt => Value::UInt(u32::de(inner)?),
            WireOp::Long => Value::Long(i64::de(inner)?),
            WireOp::ULong => Value::ULong(u64::de(inner)?),
            WireOp::Float => Value::Float(f32::de(inner)?),
            WireOp::Double => Value::Double(f64::de(inner)?),
            WireOp::String => Value::Str(String::de(inner)?),
        })
    })?;
    Ok(value)
}

fn wire_op_label(op: WireOp) -> &'static str {
    match op {
        WireOp::Bool => "bool",
        WireOp::Byte => "byte",
        WireOp::Int => "int",
        WireOp::UInt => "uint",
        WireOp::Long => "long",
        WireOp::ULong => "ulong",
        WireOp::Float => "float",
        WireOp::Double => "double",
        WireOp::String => "string",
    }
}
