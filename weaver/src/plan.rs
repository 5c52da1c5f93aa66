//! Weaving as two steps: build every change as plain data first, then
//! apply the lot to the module in one go.

use log::debug;

use rpcweave_shared::{
    MethodBody, MethodDef, MethodRef, Module, ModuleError, RemoteCallRegistration, StableHash,
};

use crate::{
    call_site::CallSiteTransformer,
    classifier::{NetworkedFieldDescriptor, RemoteCallDescriptor},
    config::WeaverConfig,
    diagnostics::Diagnostics,
    hash::HashAssigner,
    registry::Registry,
    trampoline::TrampolineGenerator,
};

/// Everything weaving one remote call changes
#[derive(Clone, Debug, PartialEq)]
pub struct PlannedRemoteCall {
    pub descriptor: RemoteCallDescriptor,
    pub hash: StableHash,
    /// Replaces the body of the original method
    pub dispatcher_body: MethodBody,
    /// Added to the declaring type, holds the original body
    pub relocated: MethodDef,
    /// Added to the declaring type, registered under `hash`
    pub trampoline: MethodDef,
}

impl PlannedRemoteCall {
    pub fn registration(&self) -> RemoteCallRegistration {
        RemoteCallRegistration {
            hash: self.hash,
            qualified_name: self.descriptor.qualified_name.clone(),
            direction: self.descriptor.direction,
            declaring_type: self.descriptor.declaring_type.clone(),
            trampoline: MethodRef::new(&self.descriptor.declaring_type, &self.trampoline.name),
            requires_authority: self.descriptor.requires_authority,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct WeavePlan {
    pub remote_calls: Vec<PlannedRemoteCall>,
    /// Validated only; their synchronization is generated elsewhere
    pub networked_fields: Vec<NetworkedFieldDescriptor>,
}

impl WeavePlan {
    /// Plans every descriptor against a read-only module. Hashes are
    /// assigned to all descriptors first so collisions surface even for
    /// calls whose types did not resolve
    pub fn build(
        module: &Module,
        config: &WeaverConfig,
        registry: &Registry,
        descriptors: &[RemoteCallDescriptor],
        diagnostics: &mut Diagnostics,
    ) -> Self {
        let mut assigner = HashAssigner::new();
        let hashes: Vec<Option<StableHash>> = descriptors
            .iter()
            .map(|descriptor| match assigner.assign(&descriptor.qualified_name) {
                Ok(hash) => Some(hash),
                Err(collision) => {
                    diagnostics.report(descriptor.context(), collision);
                    None
                }
            })
            .collect();

        let transformer = CallSiteTransformer::new(config, registry);
        let generator = TrampolineGenerator::new(config, registry);
        let mut plan = WeavePlan::default();

        for (descriptor, hash) in descriptors.iter().zip(hashes) {
            let Some(hash) = hash else {
                continue;
            };
            // unresolved types were reported while the registry was built
            if !registry.supports(descriptor) {
                continue;
            }
            let Some(original) = module
                .find_type(&descriptor.declaring_type)
                .and_then(|type_def| type_def.method(&descriptor.method_name))
            else {
                continue;
            };

            let planned = transformer
                .dispatcher_body(descriptor, hash)
                .and_then(|dispatcher_body| {
                    Ok(PlannedRemoteCall {
                        descriptor: descriptor.clone(),
                        hash,
                        dispatcher_body,
                        relocated: transformer.relocate(original),
                        trampoline: generator.generate(descriptor)?,
                    })
                });

            match planned {
                Ok(planned) => {
                    debug!(
                        "Planned {} {} with hash {}",
                        descriptor.direction.label(),
                        descriptor.qualified_name,
                        hash
                    );
                    plan.remote_calls.push(planned);
                }
                Err(error) => diagnostics.report(descriptor.context(), error),
            }
        }

        plan
    }

    /// Applies every planned change and marks the module woven
    pub fn apply(&self, module: &mut Module) -> Result<(), ModuleError> {
        for planned in &self.remote_calls {
            let descriptor = &planned.descriptor;
            let type_def = module
                .find_type_mut(&descriptor.declaring_type)
                .ok_or_else(|| ModuleError::TypeNotFound {
                    type_name: descriptor.declaring_type.clone(),
                })?;
            let original = type_def
                .method_mut(&descriptor.method_name)
                .ok_or_else(|| ModuleError::MethodNotFound {
                    type_name: descriptor.declaring_type.clone(),
                    method: descriptor.method_name.clone(),
                })?;
            original.body = planned.dispatcher_body.clone();
            type_def.methods.push(planned.relocated.clone());
            type_def.methods.push(planned.trampoline.clone());
        }
        module.registrations.extend(self.registrations());
        module.weaved = true;
        Ok(())
    }

    pub fn registrations(&self) -> Vec<RemoteCallRegistration> {
        self.remote_calls
            .iter()
            .map(PlannedRemoteCall::registration)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.remote_calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.remote_calls.is_empty()
    }
}
