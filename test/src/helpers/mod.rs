pub mod harness;
pub mod module_builder;

pub use harness::Harness;
pub use module_builder::{MethodBuilder, ModuleBuilder, TypeBuilder};
pub use recording_runtime::RecordingRuntime;
