//! Flow engine - named, ordered pipelines of asynchronous steps over a shared state
//!
//! A flow is built from step names resolved against a [`StepRegistry`]. Registry
//! entries are either single steps or named sub-flows that expand in place.
//! Steps run strictly one after another; a step returning `false` halts the rest.

mod engine;
mod registry;
mod state;
mod step;

pub use engine::{Flow, FlowBuilder};
pub use registry::{ResolvedStep, StepEntry, StepRegistry};
pub use state::FlowState;
pub use step::Step;

/// Errors raised while building or running a flow
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    /// Required flow data was never initialised
    #[error("{0} flow state missing!")]
    MissingState(&'static str),

    #[error("Unknown flow step: {0}")]
    UnknownStep(String),

    #[error("Flow step cycle detected at {0}")]
    StepCycle(String),

    /// A collaborator failed while a step was running
    #[error("Step {step} failed: {message}")]
    StepFailed { step: String, message: String },
}

impl FlowError {
    /// Configuration faults signal a flow that was built or fed wrongly.
    /// They propagate to the caller instead of being reported as a failed run.
    pub fn is_configuration_fault(&self) -> bool {
        matches!(
            self,
            Self::MissingState(_) | Self::UnknownStep(_) | Self::StepCycle(_)
        )
    }

    pub fn step_failed(step: &str, error: impl std::fmt::Display) -> Self {
        Self::StepFailed {
            step: step.to_string(),
            message: error.to_string(),
        }
    }
}
