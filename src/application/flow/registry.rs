use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::{FlowError, Step};

/// A registry entry: a single step, or a named sub-flow expanded in place
pub enum StepEntry<D> {
    Step(Arc<dyn Step<D>>),
    Flow(Vec<String>),
}

impl<D> Clone for StepEntry<D> {
    fn clone(&self) -> Self {
        match self {
            Self::Step(step) => Self::Step(Arc::clone(step)),
            Self::Flow(names) => Self::Flow(names.clone()),
        }
    }
}

/// A step after name resolution, ready to run
pub struct ResolvedStep<D> {
    pub name: String,
    pub step: Arc<dyn Step<D>>,
}

/// Name-keyed table of steps and sub-flows for one kind of flow data
pub struct StepRegistry<D> {
    entries: HashMap<String, StepEntry<D>>,
}

impl<D> Default for StepRegistry<D> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<D> Clone for StepRegistry<D> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<D: Send> StepRegistry<D> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a step under `name`
    pub fn register_step(&mut self, name: impl Into<String>, step: Arc<dyn Step<D>>) {
        self.entries.insert(name.into(), StepEntry::Step(step));
    }

    /// Register a sub-flow whose steps are spliced in wherever `name` appears
    pub fn register_flow<I, S>(&mut self, name: impl Into<String>, steps: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let steps = steps.into_iter().map(Into::into).collect();
        self.entries.insert(name.into(), StepEntry::Flow(steps));
    }

    pub fn insert(&mut self, name: impl Into<String>, entry: StepEntry<D>) {
        self.entries.insert(name.into(), entry);
    }

    /// Expand `names` into the flat, ordered list of steps to run
    pub fn resolve(&self, names: &[String]) -> Result<Vec<ResolvedStep<D>>, FlowError> {
        let mut resolved = Vec::new();
        let mut expanding = HashSet::new();
        for name in names {
            self.expand(name, &mut expanding, &mut resolved)?;
        }
        Ok(resolved)
    }

    fn expand(
        &self,
        name: &str,
        expanding: &mut HashSet<String>,
        out: &mut Vec<ResolvedStep<D>>,
    ) -> Result<(), FlowError> {
        match self.entries.get(name) {
            None => Err(FlowError::UnknownStep(name.to_string())),
            Some(StepEntry::Step(step)) => {
                out.push(ResolvedStep {
                    name: name.to_string(),
                    step: Arc::clone(step),
                });
                Ok(())
            }
            Some(StepEntry::Flow(children)) => {
                if !expanding.insert(name.to_string()) {
                    return Err(FlowError::StepCycle(name.to_string()));
                }
                for child in children {
                    self.expand(child, expanding, out)?;
                }
                expanding.remove(name);
                Ok(())
            }
        }
    }
}
