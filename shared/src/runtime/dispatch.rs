use std::collections::HashMap;

use log::{debug, warn};

use crate::{
    module::Module,
    remote_call::RemoteCallRegistration,
    runtime::{
        error::RuntimeError,
        interpreter::Interpreter,
        value::{ObjectRef, ReaderRef, Value},
    },
    stable_hash::StableHash,
    types::ConnectionId,
};

/// Routes incoming remote calls, keyed by stable hash, to the trampolines
/// a woven module registered
pub struct DispatchRegistry {
    entries: HashMap<StableHash, RemoteCallRegistration>,
}

impl DispatchRegistry {
    /// Collects every registration of a woven module
    pub fn from_module(module: &Module) -> Result<Self, RuntimeError> {
        let mut entries: HashMap<StableHash, RemoteCallRegistration> = HashMap::new();
        for registration in &module.registrations {
            if let Some(existing) = entries.get(&registration.hash) {
                return Err(RuntimeError::DuplicateRegistration {
                    hash: registration.hash,
                    first: existing.qualified_name.clone(),
                    second: registration.qualified_name.clone(),
                });
            }
            entries.insert(registration.hash, registration.clone());
        }
        if entries.is_empty() && !module.weaved {
            warn!(
                "Module {} has not been woven; no remote calls will be dispatched",
                module.name
            );
        }
        Ok(Self { entries })
    }

    pub fn get(&self, hash: StableHash) -> Option<&RemoteCallRegistration> {
        self.entries.get(&hash)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Runs the trampoline registered under `hash` against `instance`,
    /// reading arguments from `reader`
    pub fn invoke(
        &self,
        interpreter: &mut Interpreter<'_>,
        hash: StableHash,
        instance: &ObjectRef,
        reader: &ReaderRef,
        sender: Option<ConnectionId>,
    ) -> Result<(), RuntimeError> {
        let registration = self
            .entries
            .get(&hash)
            .ok_or(RuntimeError::UnknownRemoteCall { hash })?;

        debug!(
            "Dispatching {} ({}) to {}",
            registration.qualified_name, hash, registration.trampoline.name
        );

        let connection = match sender {
            Some(connection) => Value::Connection(connection),
            None => Value::Null,
        };
        interpreter.call(
            &registration.trampoline,
            vec![
                Value::Object(instance.clone()),
                Value::Reader(reader.clone()),
                connection,
            ],
        )?;
        Ok(())
    }

    /// Convenience for a payload that arrived as bytes
    pub fn invoke_payload(
        &self,
        interpreter: &mut Interpreter<'_>,
        hash: StableHash,
        instance: &ObjectRef,
        payload: &[u8],
        sender: Option<ConnectionId>,
    ) -> Result<(), RuntimeError> {
        let reader = ReaderRef::new(payload);
        self.invoke(interpreter, hash, instance, &reader, sender)
    }
}
