use serde::{Deserialize, Serialize};

/// Identifies a connection as seen by the runtime transport
pub type ConnectionId = u32;

/// The role a process is running in
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HostType {
    Server,
    Client,
}

