use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::{FlowError, FlowState, ResolvedStep, Step, StepEntry, StepRegistry};

/// Composes a flow from step names, with overrides fixed at construction
pub struct FlowBuilder<D> {
    name: &'static str,
    registry: StepRegistry<D>,
    steps: Vec<String>,
    overrides: HashMap<String, StepEntry<D>>,
}

impl<D: Send> FlowBuilder<D> {
    pub fn new(name: &'static str, registry: &StepRegistry<D>) -> Self {
        Self {
            name,
            registry: registry.clone(),
            steps: Vec::new(),
            overrides: HashMap::new(),
        }
    }

    pub fn with_steps<I, S>(mut self, steps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.steps.extend(steps.into_iter().map(Into::into));
        self
    }

    /// Replace the step registered under `name` for this flow only
    pub fn with_override(mut self, name: impl Into<String>, step: Arc<dyn Step<D>>) -> Self {
        self.overrides.insert(name.into(), StepEntry::Step(step));
        self
    }

    /// Resolve every step name and attach the initial state
    pub fn build(self, state: FlowState<D>) -> Result<Flow<D>, FlowError> {
        let mut registry = self.registry;
        for (name, entry) in self.overrides {
            registry.insert(name, entry);
        }
        let steps = registry.resolve(&self.steps)?;
        debug!(flow = self.name, steps = steps.len(), "Flow built");
        Ok(Flow {
            name: self.name,
            steps,
            state,
            completed: Vec::new(),
        })
    }
}

/// A resolved, ready-to-run sequence of steps owning its state
pub struct Flow<D> {
    name: &'static str,
    steps: Vec<ResolvedStep<D>>,
    state: FlowState<D>,
    completed: Vec<String>,
}

impl<D: Send> Flow<D> {
    /// Names of the steps that returned `true` during the last run
    pub fn completed_steps(&self) -> &[String] {
        &self.completed
    }

    pub fn state(&self) -> &FlowState<D> {
        &self.state
    }

    pub fn into_state(self) -> FlowState<D> {
        self.state
    }

    /// Run every step in order.
    ///
    /// Returns `Ok(false)` when a step declines or fails; steps before it keep their
    /// mutations. Only configuration faults surface as `Err`.
    pub async fn begin(&mut self) -> Result<bool, FlowError> {
        self.completed.clear();
        info!(flow = self.name, actor = %self.state.actor.id, "Beginning flow");

        for resolved in &self.steps {
            debug!(flow = self.name, step = %resolved.name, "Running step");
            match resolved.step.run(&mut self.state).await {
                Ok(true) => self.completed.push(resolved.name.clone()),
                Ok(false) => {
                    info!(flow = self.name, step = %resolved.name, "Flow halted by step");
                    return Ok(false);
                }
                Err(e) if e.is_configuration_fault() => return Err(e),
                Err(e) => {
                    warn!(flow = self.name, step = %resolved.name, error = %e, "Flow step failed");
                    return Ok(false);
                }
            }
        }

        info!(flow = self.name, "Flow complete");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Actor, ActorKind};
    use async_trait::async_trait;

    enum Outcome {
        Continue,
        Halt,
        Fail,
    }

    /// Appends its label to the trace, then behaves as configured
    struct Trace {
        label: &'static str,
        outcome: Outcome,
    }

    impl Trace {
        fn ok(label: &'static str) -> Arc<dyn Step<Vec<String>>> {
            Arc::new(Self {
                label,
                outcome: Outcome::Continue,
            })
        }
    }

    #[async_trait]
    impl Step<Vec<String>> for Trace {
        async fn run(&self, state: &mut FlowState<Vec<String>>) -> Result<bool, FlowError> {
            let (_, _, trace) = state.parts_mut("Trace")?;
            trace.push(self.label.to_string());
            match self.outcome {
                Outcome::Continue => Ok(true),
                Outcome::Halt => Ok(false),
                Outcome::Fail => Err(FlowError::step_failed(self.label, "boom")),
            }
        }
    }

    fn state() -> FlowState<Vec<String>> {
        FlowState::new(Actor::new("Lancer", ActorKind::Mech).snapshot(), None, Vec::new())
    }

    fn registry() -> StepRegistry<Vec<String>> {
        let mut registry = StepRegistry::new();
        registry.register_step("one", Trace::ok("one"));
        registry.register_step("two", Trace::ok("two"));
        registry.register_step(
            "halt",
            Arc::new(Trace {
                label: "halt",
                outcome: Outcome::Halt,
            }),
        );
        registry.register_step(
            "fail",
            Arc::new(Trace {
                label: "fail",
                outcome: Outcome::Fail,
            }),
        );
        registry
    }

    #[tokio::test]
    async fn test_runs_steps_in_order() {
        let mut flow = FlowBuilder::new("Test", &registry())
            .with_steps(["one", "two"])
            .build(state())
            .unwrap();

        assert!(flow.begin().await.unwrap());
        assert_eq!(flow.state().data.as_deref(), Some(&["one".to_string(), "two".to_string()][..]));
        assert_eq!(flow.completed_steps(), &["one".to_string(), "two".to_string()]);
    }

    #[tokio::test]
    async fn test_false_step_short_circuits() {
        let mut flow = FlowBuilder::new("Test", &registry())
            .with_steps(["one", "halt", "two"])
            .build(state())
            .unwrap();

        assert!(!flow.begin().await.unwrap());
        let trace = flow.into_state().data.unwrap();
        assert_eq!(trace, vec!["one", "halt"]);
    }

    #[tokio::test]
    async fn test_step_error_reports_failure() {
        let mut flow = FlowBuilder::new("Test", &registry())
            .with_steps(["fail", "one"])
            .build(state())
            .unwrap();

        assert!(!flow.begin().await.unwrap());
        assert!(flow.completed_steps().is_empty());
    }

    #[tokio::test]
    async fn test_missing_state_propagates() {
        let mut missing = state();
        missing.data = None;
        let mut flow = FlowBuilder::new("Test", &registry())
            .with_steps(["one"])
            .build(missing)
            .unwrap();

        let err = flow.begin().await.unwrap_err();
        assert!(matches!(err, FlowError::MissingState("Trace")));
    }

    #[tokio::test]
    async fn test_override_applies_to_one_flow_only() {
        let registry = registry();
        let mut overridden = FlowBuilder::new("Test", &registry)
            .with_steps(["one", "two"])
            .with_override("two", Trace::ok("replacement"))
            .build(state())
            .unwrap();
        let mut plain = FlowBuilder::new("Test", &registry)
            .with_steps(["one", "two"])
            .build(state())
            .unwrap();

        overridden.begin().await.unwrap();
        plain.begin().await.unwrap();
        assert_eq!(overridden.into_state().data.unwrap(), vec!["one", "replacement"]);
        assert_eq!(plain.into_state().data.unwrap(), vec!["one", "two"]);
    }

    #[tokio::test]
    async fn test_embedded_sub_flow() {
        let mut registry = registry();
        registry.register_flow("pair", ["one", "two"]);
        let mut flow = FlowBuilder::new("Test", &registry)
            .with_steps(["two", "pair"])
            .build(state())
            .unwrap();

        assert!(flow.begin().await.unwrap());
        assert_eq!(flow.completed_steps(), ["two", "one", "two"]);
        assert_eq!(flow.into_state().data.unwrap(), vec!["two", "one", "two"]);
    }

    #[test]
    fn test_unknown_step_fails_build() {
        let result = FlowBuilder::new("Test", &registry())
            .with_steps(["nope"])
            .build(state());
        assert!(matches!(result, Err(FlowError::UnknownStep(_))));
    }
}
