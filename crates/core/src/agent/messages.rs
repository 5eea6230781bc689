//! User-facing text for each turn outcome.

use crate::discovery::SourceFailure;
use crate::restaurant::Restaurant;

pub const UP_TO_DATE: &str = "I didn't find any new restaurants to add. Your list is up to date!";

pub const UPDATE_UNSUPPORTED: &str = "Update functionality not yet implemented.";

pub const ADD_UNSUPPORTED: &str = "Manual add functionality not yet implemented.";

pub const EDIT_USAGE: &str =
    "I didn't understand that command. Try 'Remove [Restaurant Name]' or 'Find new restaurants'.";

pub const NO_CHANGES: &str = "No changes made to your list.";

/// The numbered recommendation list, or the up-to-date notice.
pub fn recommendations(additions: &[Restaurant], failures: &[SourceFailure]) -> String {
    if additions.is_empty() {
        if failures.is_empty() {
            return UP_TO_DATE.to_string();
        }
        let lines: Vec<String> = failures.iter().map(|f| format!("- {f}")).collect();
        return format!(
            "I didn't find any new restaurants to add, but {} source(s) failed:\n{}",
            failures.len(),
            lines.join("\n")
        );
    }

    let count = additions.len();
    let mut message = format!(
        "I found {count} new restaurant{} for your list:\n\nNEW RESTAURANTS:\n",
        if count == 1 { "" } else { "s" }
    );
    for (idx, restaurant) in additions.iter().enumerate() {
        message.push('\n');
        message.push_str(&restaurant.detail_block(idx + 1));
    }
    message.push_str("\n\nWould you like to add these restaurants to your list?");
    message
}

/// Rendering of the persisted list for the view intent.
pub fn current_list(restaurants: &[Restaurant]) -> String {
    if restaurants.is_empty() {
        return "Your list is empty. Try 'Find new restaurants'.".to_string();
    }

    let mut message = format!("Your list has {} restaurant(s):\n", restaurants.len());
    for (idx, restaurant) in restaurants.iter().enumerate() {
        message.push('\n');
        message.push_str(&restaurant.detail_block(idx + 1));
    }
    message
}

pub fn discovery_failed(errors: &[String]) -> String {
    format!(
        "I encountered an error during restaurant discovery.\n\n\
         **What happened:** The discovery process failed.\n\n\
         **Technical Details:**\n{}\n\n\
         Would you like me to try again or cancel this discovery?",
        errors.join("\n")
    )
}

pub fn confirm_removal(name: &str) -> String {
    format!("Remove {name} from your list?")
}

pub fn not_in_list(name: &str) -> String {
    format!("I couldn't find '{name}' in your list.")
}

/// Summary after an approved write.
pub fn stored(added: usize, removed: &[String], errors: &[String]) -> String {
    let mut lines = Vec::new();
    if added > 0 {
        lines.push(format!("Added {added} restaurant(s) to your list."));
    }
    for name in removed {
        lines.push(format!("Removed {name} from your list."));
    }
    if lines.is_empty() && errors.is_empty() {
        lines.push(NO_CHANGES.to_string());
    }
    if !errors.is_empty() {
        lines.push(format!("Some changes failed:\n{}", errors.join("\n")));
    }
    lines.join("\n")
}
