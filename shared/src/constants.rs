// Marker names recognized on compiled members

/// Marks a method whose calls are redirected from a client to the server
pub const SERVER_RPC_MARKER: &str = "ServerRpc";
/// Marks a method whose calls are redirected from the server to clients
pub const CLIENT_RPC_MARKER: &str = "ClientRpc";
/// Marks the parameter that receives the calling connection on the server
pub const SENDER_CONNECTION_MARKER: &str = "SenderConnection";
/// Marks a field kept in sync by the runtime's field synchronization components
pub const NETWORKED_FIELD_MARKER: &str = "Networked";

// Marker field names

pub const CHANNEL_FIELD: &str = "channel";
pub const REQUIRES_AUTHORITY_FIELD: &str = "requiresAuthority";
pub const INCLUDE_OWNER_FIELD: &str = "includeOwner";

// Generated members

/// Prefix of the method that receives the user's original logic
pub const USER_CODE_PREFIX: &str = "UserCode_";
/// Prefix of the static dispatcher the runtime invokes for incoming calls
pub const INVOKE_PREFIX: &str = "InvokeUserCode_";

/// Base type every remote-call capable type must derive from
pub const DEFAULT_BEHAVIOUR_BASE: &str = "NetworkBehaviour";

/// Deepest call chain the reference interpreter will follow. Each
/// interpreted call recurses on the native stack, so this stays well inside
/// a default 2 MiB thread stack in unoptimized builds.
pub const MAX_CALL_DEPTH: usize = 64;
