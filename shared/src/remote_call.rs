use serde::{Deserialize, Serialize};

use crate::{module::MethodRef, runtime::ObjectRef, stable_hash::StableHash, types::HostType};

/// Which way a remote call travels
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RemoteCallDirection {
    ToServer,
    ToClient,
}

impl RemoteCallDirection {
    /// The role a process must be running in to execute an incoming call
    pub fn receiving_host(&self) -> HostType {
        match self {
            RemoteCallDirection::ToServer => HostType::Server,
            RemoteCallDirection::ToClient => HostType::Client,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RemoteCallDirection::ToServer => "ServerRpc",
            RemoteCallDirection::ToClient => "ClientRpc",
        }
    }
}

/// Entry the runtime dispatch registry uses to route an incoming call to
/// its trampoline. Written into the module when a weave commits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteCallRegistration {
    pub hash: StableHash,
    pub qualified_name: String,
    pub direction: RemoteCallDirection,
    pub declaring_type: String,
    pub trampoline: MethodRef,
    pub requires_authority: bool,
}

/// Arguments handed to the runtime's send primitive by a woven dispatcher
#[derive(Clone, Debug, PartialEq)]
pub struct RemoteCall {
    pub instance: ObjectRef,
    pub qualified_name: String,
    pub hash: StableHash,
    pub payload: Vec<u8>,
    pub channel: i32,
    /// `requiresAuthority` for calls to the server, `includeOwner` for calls to clients
    pub flag: bool,
}
