use rpcweave_shared::{
    ConnectionId, DispatchRegistry, Interpreter, Module, ObjectRef, ReaderRef, RemoteCall,
    RuntimeError, Value,
};
use rpcweave_weaver::{WeaveOutcome, Weaver};

use super::RecordingRuntime;

/// A woven module plus the dispatch registry built from it
pub struct Harness {
    pub module: Module,
    pub registry: DispatchRegistry,
}

impl Harness {
    /// Weaves `module` with the default weaver
    pub fn weave(module: Module) -> Self {
        Self::weave_with(&Weaver::default(), module)
    }

    pub fn weave_with(weaver: &Weaver, mut module: Module) -> Self {
        let outcome = weaver.weave(&mut module).expect("module should weave");
        assert!(matches!(outcome, WeaveOutcome::Woven(_)));
        let registry = DispatchRegistry::from_module(&module).expect("registrations should be unique");
        Self { module, registry }
    }

    pub fn instance(&self, class: &str) -> ObjectRef {
        ObjectRef::new(&self.module, class)
    }

    /// Calls `method` on `instance` the way user code would
    pub fn call(
        &self,
        runtime: &mut RecordingRuntime,
        instance: &ObjectRef,
        method: &str,
        args: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        let mut interpreter = Interpreter::new(&self.module, runtime);
        interpreter.call_virtual(instance, method, args)
    }

    /// Hands a sent call to the receiving side's dispatch registry.
    /// Returns the reader so a test can see how much of it was consumed
    pub fn deliver(
        &self,
        runtime: &mut RecordingRuntime,
        instance: &ObjectRef,
        call: &RemoteCall,
        sender: Option<ConnectionId>,
    ) -> Result<ReaderRef, RuntimeError> {
        let reader = ReaderRef::new(&call.payload);
        let mut interpreter = Interpreter::new(&self.module, runtime);
        self.registry
            .invoke(&mut interpreter, call.hash, instance, &reader, sender)?;
        Ok(reader)
    }

    /// Sends from a client-side instance and delivers to a fresh
    /// server-side instance of the same class. Returns the receiving instance
    pub fn send_to_server(
        &self,
        class: &str,
        method: &str,
        args: Vec<Value>,
        sender: Option<ConnectionId>,
    ) -> Result<ObjectRef, RuntimeError> {
        let mut client = RecordingRuntime::client();
        let local = self.instance(class);
        self.call(&mut client, &local, method, args)?;
        let (_, call) = client.take_sent();

        let mut server = RecordingRuntime::server();
        let remote = self.instance(class);
        self.deliver(&mut server, &remote, &call, sender)?;
        Ok(remote)
    }
}
