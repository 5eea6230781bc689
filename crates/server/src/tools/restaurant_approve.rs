//! restaurant_approve tool implementation.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tastemaker_core::{ApprovalDecision, Error, RestaurantAgent};

use super::{RestaurantChatOutput, SessionSlot, json_result};

/// Input parameters for the restaurant_approve tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RestaurantApproveParams {
    /// Accept (true) or reject (false) the pending recommendation.
    pub approved: bool,

    /// Keep only these 1-based positions of the recommendation.
    /// Ignored when `approved` is false.
    #[serde(default)]
    pub selection: Option<Vec<usize>>,
}

impl RestaurantApproveParams {
    fn decision(&self) -> ApprovalDecision {
        match (&self.selection, self.approved) {
            (Some(positions), true) => ApprovalDecision::Partial(positions.clone()),
            (_, approved) => ApprovalDecision::from_flag(approved),
        }
    }
}

/// Implementation of the restaurant_approve tool.
pub async fn approve_impl(
    agent: &RestaurantAgent, slot: &SessionSlot, params: RestaurantApproveParams,
) -> Result<CallToolResult, McpError> {
    let mut slot = slot.lock().await;
    let session = match slot.take() {
        Some(session) if session.awaiting_approval() => session,
        other => {
            *slot = other;
            return Err(Error::NoPendingApproval.into());
        }
    };

    let session = agent.resume(session, params.decision()).await?;
    let output = RestaurantChatOutput::from(&session);
    *slot = Some(session);

    json_result(&output)
}
