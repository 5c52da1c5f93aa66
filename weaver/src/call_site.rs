//! Rewrites a remote-call method into a network send. The original body
//! moves, untouched, into a relocated method; the original name then only
//! marshals its arguments and hands them to the runtime.

use rpcweave_shared::{
    constants::{CLIENT_RPC_MARKER, SENDER_CONNECTION_MARKER, SERVER_RPC_MARKER},
    Constant, Instruction, MethodBody, MethodDef, StableHash, TypeRef, Visibility,
};

use crate::{
    classifier::RemoteCallDescriptor, config::WeaverConfig, error::UnsupportedTypeError,
    registry::Registry,
};

/// Local slot holding the pooled writer inside a dispatcher
const WRITER_LOCAL: u16 = 0;

pub struct CallSiteTransformer<'a> {
    config: &'a WeaverConfig,
    registry: &'a Registry,
}

impl<'a> CallSiteTransformer<'a> {
    pub fn new(config: &'a WeaverConfig, registry: &'a Registry) -> Self {
        Self { config, registry }
    }

    /// The original method under its generated name. Only the name, the
    /// visibility and the remote-call markers change
    pub fn relocate(&self, original: &MethodDef) -> MethodDef {
        let mut relocated = original.clone();
        relocated.name = self.config.user_code_name(&original.name);
        relocated.visibility = Visibility::Protected;
        relocated
            .markers
            .retain(|marker| marker.name != SERVER_RPC_MARKER && marker.name != CLIENT_RPC_MARKER);
        for param in &mut relocated.params {
            param
                .markers
                .retain(|marker| marker.name != SENDER_CONNECTION_MARKER);
        }
        relocated
    }

    /// The body that replaces the original: acquire a writer, write every
    /// wire parameter in declaration order, send, release
    pub fn dispatcher_body(
        &self,
        descriptor: &RemoteCallDescriptor,
        hash: StableHash,
    ) -> Result<MethodBody, UnsupportedTypeError> {
        let load_writer = [Instruction::LoadLocal(WRITER_LOCAL)];
        let mut instructions = vec![
            Instruction::AcquireWriter,
            Instruction::StoreLocal(WRITER_LOCAL),
        ];

        for (index, param) in descriptor.wire_params() {
            // argument 0 is `this`
            let load_value = [Instruction::LoadArg(param_arg(index))];
            self.registry
                .emit_write(&param.ty, &load_writer, &load_value, &mut instructions)?;
        }

        instructions.extend([
            Instruction::LoadArg(0),
            Instruction::LoadConst(Constant::Str(descriptor.qualified_name.clone())),
            Instruction::LoadConst(Constant::Int(hash.value())),
            Instruction::LoadLocal(WRITER_LOCAL),
            Instruction::LoadConst(Constant::Int(descriptor.channel)),
            Instruction::LoadConst(Constant::Bool(descriptor.send_flag())),
            Instruction::SendRemoteCall(descriptor.direction),
            Instruction::LoadLocal(WRITER_LOCAL),
            Instruction::ReleaseWriter,
            Instruction::Return,
        ]);

        Ok(MethodBody {
            locals: vec![TypeRef::Writer],
            instructions,
        })
    }
}

fn param_arg(index: usize) -> u16 {
    u16::try_from(index + 1).unwrap_or(u16::MAX)
}
