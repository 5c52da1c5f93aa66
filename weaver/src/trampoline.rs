//! Generates the static entry point the runtime dispatch registry calls
//! for an incoming remote call.
//!
//! Signature: `(instance, reader, sender connection or null) -> void`.
//! The role guard runs before anything is read, so a call arriving at the
//! wrong role has no side effect beyond one logged error.

use rpcweave_shared::{
    HostType, Instruction, MethodBody, MethodDef, MethodRef, ParamDef, TypeRef, Visibility,
};

use crate::{
    classifier::{ParamRole, RemoteCallDescriptor},
    config::WeaverConfig,
    error::UnsupportedTypeError,
    registry::Registry,
};

const INSTANCE_ARG: u16 = 0;
const READER_ARG: u16 = 1;
const CONNECTION_ARG: u16 = 2;

pub struct TrampolineGenerator<'a> {
    config: &'a WeaverConfig,
    registry: &'a Registry,
}

impl<'a> TrampolineGenerator<'a> {
    pub fn new(config: &'a WeaverConfig, registry: &'a Registry) -> Self {
        Self { config, registry }
    }

    pub fn generate(
        &self,
        descriptor: &RemoteCallDescriptor,
    ) -> Result<MethodDef, UnsupportedTypeError> {
        let host = descriptor.direction.receiving_host();
        let guard_message = format!(
            "{} {} called while not running as {}",
            descriptor.direction.label(),
            descriptor.qualified_name,
            role_name(host)
        );

        let mut instructions = vec![
            Instruction::IsActive(host),
            Instruction::JumpIfTrue(4),
            Instruction::LogError(guard_message),
            Instruction::Return,
            Instruction::LoadArg(INSTANCE_ARG),
            Instruction::CastClass(descriptor.declaring_type.clone()),
        ];

        // same order the dispatcher wrote them in
        let load_reader = [Instruction::LoadArg(READER_ARG)];
        for param in &descriptor.params {
            match param.role {
                ParamRole::Argument => {
                    self.registry
                        .emit_read(&param.ty, &load_reader, &mut instructions)?;
                }
                ParamRole::SenderConnection => {
                    instructions.push(Instruction::LoadArg(CONNECTION_ARG));
                }
            }
        }

        instructions.push(Instruction::CallVirtual(MethodRef::new(
            &descriptor.declaring_type,
            &self.config.user_code_name(&descriptor.method_name),
        )));
        instructions.push(Instruction::Return);

        Ok(MethodDef {
            name: self.config.invoke_name(&descriptor.method_name),
            visibility: Visibility::Protected,
            is_static: true,
            is_abstract: false,
            params: vec![
                ParamDef {
                    name: "obj".to_string(),
                    ty: TypeRef::named(&self.config.behaviour_base),
                    markers: Vec::new(),
                },
                ParamDef {
                    name: "reader".to_string(),
                    ty: TypeRef::Reader,
                    markers: Vec::new(),
                },
                ParamDef {
                    name: "senderConnection".to_string(),
                    ty: TypeRef::Connection,
                    markers: Vec::new(),
                },
            ],
            return_type: TypeRef::Void,
            markers: Vec::new(),
            body: MethodBody {
                locals: Vec::new(),
                instructions,
            },
        })
    }
}

fn role_name(host: HostType) -> &'static str {
    match host {
        HostType::Server => "server",
        HostType::Client => "client",
    }
}
