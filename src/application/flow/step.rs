use async_trait::async_trait;

use super::{FlowError, FlowState};

/// One unit of a flow
///
/// Returning `Ok(false)` halts the flow gracefully. Steps must guard on their own
/// preconditions so a partially completed flow can be re-run safely.
#[async_trait]
pub trait Step<D>: Send + Sync {
    async fn run(&self, state: &mut FlowState<D>) -> Result<bool, FlowError>;
}
