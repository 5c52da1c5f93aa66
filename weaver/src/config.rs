use rpcweave_shared::constants::{DEFAULT_BEHAVIOUR_BASE, INVOKE_PREFIX, USER_CODE_PREFIX};

/// Contains Config properties which will be used by the Weaver
#[derive(Clone, Debug)]
pub struct WeaverConfig {
    /// Name of the base type a type must derive from (directly or
    /// transitively) for its methods to carry remote-call markers
    pub behaviour_base: String,
    /// Whether struct types declared in the woven module get writers and
    /// readers synthesized from their fields when nothing is registered
    pub generate_struct_serializers: bool,
    /// Prefix of the method that receives a remote call's original body
    pub user_code_prefix: String,
    /// Prefix of the generated static invoke trampoline
    pub invoke_prefix: String,
}

impl Default for WeaverConfig {
    fn default() -> Self {
        Self {
            behaviour_base: DEFAULT_BEHAVIOUR_BASE.to_string(),
            generate_struct_serializers: true,
            user_code_prefix: USER_CODE_PREFIX.to_string(),
            invoke_prefix: INVOKE_PREFIX.to_string(),
        }
    }
}

impl WeaverConfig {
    pub fn user_code_name(&self, method_name: &str) -> String {
        format!("{}{}", self.user_code_prefix, method_name)
    }

    pub fn invoke_name(&self, method_name: &str) -> String {
        format!("{}{}", self.invoke_prefix, method_name)
    }
}
