//! # rpcweave Weaver
//! Rewrites the `ServerRpc`/`ClientRpc` methods of a compiled module into
//! network send stubs, relocates their original bodies and generates the
//! static trampolines the runtime dispatches incoming calls to.
//!
//! A pass either commits every change or none: diagnostics are collected
//! across the whole module and any one of them aborts the pass.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod call_site;
mod classifier;
mod config;
mod diagnostics;
mod driver;
mod error;
mod hash;
mod persist;
mod plan;
mod registry;
mod trampoline;

pub use call_site::CallSiteTransformer;
pub use classifier::{
    Classification, Classifier, NetworkedFieldDescriptor, ParamDescriptor, ParamRole,
    RemoteCallDescriptor,
};
pub use config::WeaverConfig;
pub use diagnostics::Diagnostics;
pub use driver::{WeaveOutcome, WeaveReport, Weaver};
pub use error::{
    AttributeConfigurationError, CollisionError, Diagnostic, DiagnosticContext, DiagnosticMember,
    PersistError, SignatureError, UnsupportedTypeError, WeaveError, WeaverError,
};
pub use hash::HashAssigner;
pub use persist::{atomic_write, load_module, save_module};
pub use plan::{PlannedRemoteCall, WeavePlan};
pub use registry::{
    builtin_wire_ops, is_marshalable, PrimitiveGenerator, ReaderGenerator, Registry,
    RegistryEntry, SerializerProvider, StructGenerator, WriterGenerator,
};
pub use trampoline::TrampolineGenerator;
