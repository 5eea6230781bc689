//! restaurant_chat tool implementation.
//!
//! Runs one agent turn from a free-text message. Discovery turns stop at the
//! approval step; the session is kept for `restaurant_approve` and
//! `restaurant_details`.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tastemaker_core::agent::Intent;
use tastemaker_core::{Error, RestaurantAgent, Session};

use super::{SessionSlot, json_result};

/// Input parameters for the restaurant_chat tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RestaurantChatParams {
    /// What the user wants, e.g. "Find new restaurants", "Remove Albi from my list"
    /// or "Show my list".
    pub message: String,
}

/// Output shared by restaurant_chat and restaurant_approve.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RestaurantChatOutput {
    /// Human-readable reply for the user.
    pub response: String,
    /// Classified intent: discover, edit or view.
    pub intent: String,
    /// Whether the turn waits on restaurant_approve.
    pub awaiting_approval: bool,
    /// Names proposed for addition, in presentation order.
    pub additions: Vec<String>,
    /// Names proposed for removal.
    pub removals: Vec<String>,
    /// Per-source counts of discovered candidates.
    #[serde(default)]
    pub found_per_source: std::collections::BTreeMap<String, usize>,
    /// Errors raised during the turn, verbatim.
    pub errors: Vec<String>,
}

fn intent_label(intent: Intent) -> &'static str {
    match intent {
        Intent::Discover => "discover",
        Intent::Edit => "edit",
        Intent::View => "view",
    }
}

impl From<&Session> for RestaurantChatOutput {
    fn from(session: &Session) -> Self {
        let mut errors = session.errors.clone();
        errors.extend(session.failures.iter().map(ToString::to_string));

        Self {
            response: session.recommendation.clone(),
            intent: intent_label(session.intent).to_string(),
            awaiting_approval: session.awaiting_approval(),
            additions: session.to_add.iter().map(|r| r.name.clone()).collect(),
            removals: session.to_remove.iter().map(|r| r.name.clone()).collect(),
            found_per_source: session.found_per_source.clone(),
            errors,
        }
    }
}

/// Implementation of the restaurant_chat tool.
///
/// A new message replaces any turn still waiting on approval.
pub async fn chat_impl(
    agent: &RestaurantAgent, slot: &SessionSlot, params: RestaurantChatParams,
) -> Result<CallToolResult, McpError> {
    let message = params.message.trim();
    if message.is_empty() {
        return Err(Error::InvalidInput("message cannot be empty".into()).into());
    }

    let session = agent.start(message).await;
    let output = RestaurantChatOutput::from(&session);

    let mut slot = slot.lock().await;
    if slot.as_ref().is_some_and(Session::awaiting_approval) {
        tracing::info!("discarding turn still awaiting approval");
    }
    *slot = Some(session);

    json_result(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{agent, text_of};
    use tastemaker_core::{ListStore, Restaurant};

    fn params(message: &str) -> RestaurantChatParams {
        RestaurantChatParams { message: message.into() }
    }

    #[tokio::test]
    async fn test_empty_message_rejected() {
        let (agent, _) = agent("{}").await;
        let slot = SessionSlot::default();

        let err = chat_impl(&agent, &slot, params("   ")).await.unwrap_err();
        assert_eq!(err.code.0, -32602);
        assert!(slot.lock().await.is_none());
    }

    #[tokio::test]
    async fn test_discover_without_search_key_reports_config_error() {
        let (agent, _) = agent("{}").await;
        let slot = SessionSlot::default();

        let result = chat_impl(&agent, &slot, params("Find new restaurants")).await.unwrap();
        let output: RestaurantChatOutput = serde_json::from_str(&text_of(&result)).unwrap();

        assert_eq!(output.intent, "discover");
        assert!(!output.awaiting_approval);
        assert!(output.errors.iter().any(|e| e.starts_with("CONFIG_ERROR")));
        assert!(output.response.contains("CONFIG_ERROR"));
    }

    #[tokio::test]
    async fn test_edit_remove_waits_for_approval() {
        let (agent, store) = agent(r#"{"action": "remove", "restaurant_name": "albi"}"#).await;
        store.append_batch(&[Restaurant::new("Albi")]).await.unwrap();
        let slot = SessionSlot::default();

        let result = chat_impl(&agent, &slot, params("Remove Albi please")).await.unwrap();
        let output: RestaurantChatOutput = serde_json::from_str(&text_of(&result)).unwrap();

        assert_eq!(output.intent, "edit");
        assert!(output.awaiting_approval);
        assert_eq!(output.removals, vec!["Albi"]);
        assert!(slot.lock().await.as_ref().is_some_and(Session::awaiting_approval));
    }

    #[tokio::test]
    async fn test_view_renders_list() {
        let (agent, store) = agent("{}").await;
        store.append_batch(&[Restaurant::new("Albi")]).await.unwrap();
        let slot = SessionSlot::default();

        let result = chat_impl(&agent, &slot, params("show me everything")).await.unwrap();
        let output: RestaurantChatOutput = serde_json::from_str(&text_of(&result)).unwrap();

        assert_eq!(output.intent, "view");
        assert!(output.response.starts_with("Your list has 1 restaurant(s)"));
        assert!(output.response.contains("Albi"));
    }
}
