use crate::collection::Entry;
use std::fmt;
use thiserror::Error as ThisError;

///
/// Mutation pipeline
///
/// Before-create and before-update hooks as an explicit ordered list of
/// transformation steps owned by the collection. Hooks run synchronously,
/// in registration order, strictly before statement construction; a hook
/// error aborts the operation before anything reaches the engine.
///

pub type Hook = Box<dyn Fn(&mut Entry) -> Result<(), HookError> + Send + Sync>;

///
/// HookError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("mutation hook '{name}' failed: {message}")]
pub struct HookError {
    pub name: String,
    pub message: String,
}

impl HookError {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }
}

///
/// MutationPipeline
///

#[derive(Default)]
pub struct MutationPipeline {
    before_create: Vec<Hook>,
    before_update: Vec<Hook>,
}

impl MutationPipeline {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a before-create step.
    pub fn before_create<F>(&mut self, hook: F)
    where
        F: Fn(&mut Entry) -> Result<(), HookError> + Send + Sync + 'static,
    {
        self.before_create.push(Box::new(hook));
    }

    /// Append a before-update step.
    pub fn before_update<F>(&mut self, hook: F)
    where
        F: Fn(&mut Entry) -> Result<(), HookError> + Send + Sync + 'static,
    {
        self.before_update.push(Box::new(hook));
    }

    pub(crate) fn run_before_create(&self, entry: &mut Entry) -> Result<(), HookError> {
        for hook in &self.before_create {
            hook(entry)?;
        }

        Ok(())
    }

    pub(crate) fn run_before_update(&self, entry: &mut Entry) -> Result<(), HookError> {
        for hook in &self.before_update {
            hook(entry)?;
        }

        Ok(())
    }
}

impl fmt::Debug for MutationPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutationPipeline")
            .field("before_create", &self.before_create.len())
            .field("before_update", &self.before_update.len())
            .finish()
    }
}
