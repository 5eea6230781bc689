//! restaurant_details tool implementation.
//!
//! Looks up one entry of the most recent recommendation by its presented position.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tastemaker_core::Error;

use super::{SessionSlot, json_result};

/// Input parameters for the restaurant_details tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RestaurantDetailsParams {
    /// 1-based position in the presented recommendation.
    pub index: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RestaurantDetailsOutput {
    /// Formatted detail block, as shown in the recommendation.
    pub detail: String,
    pub restaurant: serde_json::Value,
}

/// Implementation of the restaurant_details tool.
pub async fn details_impl(slot: &SessionSlot, params: RestaurantDetailsParams) -> Result<CallToolResult, McpError> {
    let slot = slot.lock().await;
    let Some(session) = slot.as_ref() else {
        return Err(Error::InvalidInput("no recommendation has been presented yet".into()).into());
    };

    let Some(detail) = session.recommendation_detail(params.index) else {
        return Err(Error::InvalidInput(format!(
            "index {} is out of range; the recommendation has {} restaurant(s)",
            params.index,
            session.to_add.len()
        ))
        .into());
    };

    let restaurant = serde_json::to_value(&session.to_add[params.index - 1])
        .map_err(|e| Error::Internal(format!("Failed to serialize restaurant: {e}")))?;

    json_result(&RestaurantDetailsOutput { detail, restaurant })
}
