//! Conversational edit commands.

use serde::Deserialize;

use crate::discovery::prompts;
use crate::provider::{CompletionRequest, LanguageModel};
use crate::restaurant::{Restaurant, normalize_name};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditAction {
    Remove,
    Add,
    Update,
    #[default]
    #[serde(other)]
    Unknown,
}

/// A parsed edit request.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct EditCommand {
    #[serde(default)]
    pub action: EditAction,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub restaurant_name: String,
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub new_value: Option<serde_json::Value>,
}

fn null_as_empty<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Ask the model to structure `message`. Any failure reads as an unknown action.
pub async fn parse_edit_command(llm: &dyn LanguageModel, message: &str) -> EditCommand {
    let request = CompletionRequest::json(prompts::EDIT_SYSTEM, prompts::edit_command(message));

    let body = match llm.complete(&request).await {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!(error = %e, "edit command parse failed");
            return EditCommand::default();
        }
    };

    serde_json::from_str(body.trim()).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "edit command was not valid JSON");
        EditCommand::default()
    })
}

/// Case-insensitive exact lookup in the persisted list.
pub fn find_by_name<'a>(restaurants: &'a [Restaurant], name: &str) -> Option<&'a Restaurant> {
    let wanted = normalize_name(name);
    restaurants.iter().find(|r| r.normalized_name() == wanted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::testing::MockLanguageModel;

    #[tokio::test]
    async fn test_parse_remove() {
        let llm = MockLanguageModel::new(|req| {
            assert!(req.json_mode);
            assert!(req.user.contains("Remove Albi"));
            Ok(r#"{"action": "remove", "restaurant_name": "Albi", "field": null, "new_value": null}"#.into())
        });
        let command = parse_edit_command(&llm, "Remove Albi").await;
        assert_eq!(command.action, EditAction::Remove);
        assert_eq!(command.restaurant_name, "Albi");
    }

    #[tokio::test]
    async fn test_parse_failures_are_unknown() {
        let garbage = MockLanguageModel::new(|_| Ok("not json".into()));
        assert_eq!(parse_edit_command(&garbage, "?").await.action, EditAction::Unknown);

        let down = MockLanguageModel::new(|_| Err(Error::LlmFailed("down".into())));
        assert_eq!(parse_edit_command(&down, "?").await.action, EditAction::Unknown);

        let odd = MockLanguageModel::new(|_| Ok(r#"{"action": "rename", "restaurant_name": null}"#.into()));
        let command = parse_edit_command(&odd, "?").await;
        assert_eq!(command.action, EditAction::Unknown);
        assert_eq!(command.restaurant_name, "");
    }

    #[test]
    fn test_find_by_name_ignores_case() {
        let list = vec![Restaurant::new("Rose's Luxury"), Restaurant::new("Albi")];
        assert_eq!(find_by_name(&list, "  rose's LUXURY").map(|r| r.name.as_str()), Some("Rose's Luxury"));
        assert!(find_by_name(&list, "Rose").is_none());
    }
}
