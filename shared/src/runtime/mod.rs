//! # Reference runtime
//!
//! Executes woven modules so their generated dispatchers and trampolines
//! can be exercised end to end. The transport, role oracle and send
//! primitive are supplied by the embedding application through [`Runtime`].

mod dispatch;
mod error;
mod interpreter;
mod value;

pub use dispatch::DispatchRegistry;
pub use error::RuntimeError;
pub use interpreter::Interpreter;
pub use value::{Object, ObjectRef, ReaderRef, StructValue, Value, WriterRef};

use log::error;

use crate::{
    remote_call::{RemoteCall, RemoteCallDirection},
    types::HostType,
};

/// Services a woven module calls into while running
pub trait Runtime {
    /// Whether this process is currently running in the given role.
    /// A listen server is active as both.
    fn is_active(&self, host: HostType) -> bool;

    /// Hands an outgoing remote call to the transport
    fn send_remote_call(&mut self, direction: RemoteCallDirection, call: RemoteCall);

    /// Receives diagnostics emitted by generated code
    fn report_error(&mut self, message: &str) {
        error!("{}", message);
    }
}
