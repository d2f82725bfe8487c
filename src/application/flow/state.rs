use crate::domain::entities::{ActorSnapshot, Item};

use super::FlowError;

/// Shared mutable record a flow's steps operate on
///
/// `actor` and `item` are copies taken when the flow was created; steps only
/// ever mutate `data`.
#[derive(Debug, Clone)]
pub struct FlowState<D> {
    pub actor: ActorSnapshot,
    pub item: Option<Item>,
    pub data: Option<D>,
}

impl<D> FlowState<D> {
    pub fn new(actor: ActorSnapshot, item: Option<Item>, data: D) -> Self {
        Self {
            actor,
            item,
            data: Some(data),
        }
    }

    /// Split the state into its read-only parts and mutable data
    pub fn parts_mut(
        &mut self,
        flow: &'static str,
    ) -> Result<(&ActorSnapshot, Option<&Item>, &mut D), FlowError> {
        let data = self.data.as_mut().ok_or(FlowError::MissingState(flow))?;
        Ok((&self.actor, self.item.as_ref(), data))
    }
}
