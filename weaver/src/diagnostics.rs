use log::error;

use crate::error::{Diagnostic, DiagnosticContext, WeaveError};

/// Collects every recoverable weave error of one pass. Any entry marks
/// the whole module as failed; scanning carries on so one build reports
/// everything at once.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, context: DiagnosticContext, error: impl Into<WeaveError>) {
        let diagnostic = Diagnostic {
            context,
            error: error.into(),
        };
        error!("{}", diagnostic);
        self.entries.push(diagnostic);
    }

    pub fn report_all<E: Into<WeaveError>>(
        &mut self,
        context: &DiagnosticContext,
        errors: impl IntoIterator<Item = E>,
    ) {
        for error in errors {
            self.report(context.clone(), error);
        }
    }

    /// The module-wide failure flag
    pub fn failed(&self) -> bool {
        !self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<Diagnostic> {
        self.entries
    }
}
