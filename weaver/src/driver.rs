use std::path::Path;

use log::{info, warn};

use rpcweave_shared::{Module, RemoteCallRegistration};

use crate::{
    classifier::Classifier,
    config::WeaverConfig,
    diagnostics::Diagnostics,
    error::WeaverError,
    persist::{load_module, save_module},
    plan::WeavePlan,
    registry::{Registry, SerializerProvider},
};

/// Summary of a committed weave
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WeaveReport {
    pub module: String,
    pub networked_fields: usize,
    pub registrations: Vec<RemoteCallRegistration>,
}

impl WeaveReport {
    pub fn remote_calls(&self) -> usize {
        self.registrations.len()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WeaveOutcome {
    Woven(WeaveReport),
    /// The module was woven by an earlier pass and was left untouched
    AlreadyWeaved,
}

/// Rewrites the remote-call methods of compiled modules. One `Weaver`
/// can weave any number of modules; every pass starts from scratch
pub struct Weaver {
    config: WeaverConfig,
    provider: SerializerProvider,
}

impl Default for Weaver {
    fn default() -> Self {
        Self::new(WeaverConfig::default(), SerializerProvider::new())
    }
}

impl Weaver {
    pub fn new(config: WeaverConfig, provider: SerializerProvider) -> Self {
        Self { config, provider }
    }

    pub fn config(&self) -> &WeaverConfig {
        &self.config
    }

    /// Registers additional writer/reader generators before weaving
    pub fn provider_mut(&mut self) -> &mut SerializerProvider {
        &mut self.provider
    }

    /// Analyzes `module` and plans every change without touching it.
    /// Any collected diagnostic fails the whole plan
    pub fn plan(&self, module: &Module) -> Result<WeavePlan, WeaverError> {
        module.validate()?;

        let mut diagnostics = Diagnostics::new();
        let classification = Classifier::new(module, &self.config).classify(&mut diagnostics);
        let registry = Registry::build(
            module,
            &self.provider,
            &self.config,
            &classification,
            &mut diagnostics,
        );
        let mut plan = WeavePlan::build(
            module,
            &self.config,
            &registry,
            &classification.remote_calls,
            &mut diagnostics,
        );

        if diagnostics.failed() {
            warn!(
                "Weaving module {} failed with {} error(s)",
                module.name,
                diagnostics.len()
            );
            return Err(WeaverError::Failed {
                module: module.name.clone(),
                diagnostics: diagnostics.into_entries(),
            });
        }

        plan.networked_fields = classification.networked_fields;
        Ok(plan)
    }

    /// Weaves `module` in place. On failure `module` is left exactly as
    /// it was
    pub fn weave(&self, module: &mut Module) -> Result<WeaveOutcome, WeaverError> {
        if module.weaved {
            info!("Module {} is already woven, skipping", module.name);
            return Ok(WeaveOutcome::AlreadyWeaved);
        }

        let plan = self.plan(module)?;

        let mut woven = module.clone();
        plan.apply(&mut woven)?;
        *module = woven;

        info!(
            "Woven module {}: {} remote call(s)",
            module.name,
            plan.len()
        );

        Ok(WeaveOutcome::Woven(WeaveReport {
            module: module.name.clone(),
            networked_fields: plan.networked_fields.len(),
            registrations: plan.registrations(),
        }))
    }

    /// Loads a module, weaves it and atomically writes the result to
    /// `output`. Nothing is written when weaving fails
    pub fn weave_file(&self, input: &Path, output: &Path) -> Result<WeaveOutcome, WeaverError> {
        let mut module = load_module(input)?;
        let outcome = self.weave(&mut module)?;
        if outcome != WeaveOutcome::AlreadyWeaved || input != output {
            save_module(output, &module)?;
            info!("Wrote module {} to {}", module.name, output.display());
        }
        Ok(outcome)
    }
}
