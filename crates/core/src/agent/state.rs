//! Stages of a conversation turn and the transitions between them.

use serde::Serialize;

/// What the user asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    #[default]
    Discover,
    Edit,
    View,
}

const DISCOVER_KEYWORDS: [&str; 5] = ["find", "discover", "search", "new", "update"];
const EDIT_KEYWORDS: [&str; 4] = ["remove", "delete", "edit", "change"];
const VIEW_KEYWORDS: [&str; 3] = ["show", "view", "list"];

impl Intent {
    /// Keyword classification, checked in discover, edit, view order.
    pub fn classify(message: &str) -> Self {
        let message = message.to_lowercase();
        let mentions = |keywords: &[&str]| keywords.iter().any(|k| message.contains(k));

        if mentions(&DISCOVER_KEYWORDS) {
            Intent::Discover
        } else if mentions(&EDIT_KEYWORDS) {
            Intent::Edit
        } else if mentions(&VIEW_KEYWORDS) {
            Intent::View
        } else {
            Intent::Discover
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Initiate,
    SearchSources,
    HandleEdit,
    Evaluate,
    FetchCurrentList,
    Compare,
    Present,
    ErrorHandler,
    AwaitApproval,
    UpdateStore,
    Done,
}

/// What just happened in the current stage.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Classified(Intent),
    Acquired { total_failure: bool },
    Evaluated,
    ListFetched(Intent),
    Compared,
    ErrorsReported,
    /// `pending` is true when something awaits the user's approval.
    Presented { pending: bool },
    EditParsed { pending: bool },
    Approval(bool),
    Stored,
}

/// Next stage, or `None` when `event` cannot happen in `stage`.
pub fn transition(stage: Stage, event: &Event) -> Option<Stage> {
    use Event as E;
    use Stage as S;

    let next = match (stage, event) {
        (S::Initiate, E::Classified(Intent::Discover)) => S::SearchSources,
        (S::Initiate, E::Classified(Intent::Edit)) => S::HandleEdit,
        (S::Initiate, E::Classified(Intent::View)) => S::FetchCurrentList,

        (S::SearchSources, E::Acquired { total_failure: true }) => S::ErrorHandler,
        (S::SearchSources, E::Acquired { total_failure: false }) => S::Evaluate,
        (S::Evaluate, E::Evaluated) => S::FetchCurrentList,

        (S::FetchCurrentList, E::ListFetched(Intent::View)) => S::Present,
        (S::FetchCurrentList, E::ListFetched(_)) => S::Compare,
        (S::Compare, E::Compared) => S::Present,
        (S::ErrorHandler, E::ErrorsReported) => S::Present,

        (S::Present, E::Presented { pending: true }) => S::AwaitApproval,
        (S::HandleEdit, E::EditParsed { pending: true }) => S::AwaitApproval,
        (S::Present, E::Presented { pending: false }) | (S::HandleEdit, E::EditParsed { pending: false }) => S::Done,

        (S::AwaitApproval, E::Approval(true)) => S::UpdateStore,
        (S::AwaitApproval, E::Approval(false)) => S::Done,
        (S::UpdateStore, E::Stored) => S::Done,

        _ => return None,
    };
    Some(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(Intent::classify("Find new restaurants"), Intent::Discover);
        assert_eq!(Intent::classify("Remove Minibar"), Intent::Edit);
        assert_eq!(Intent::classify("DELETE Albi please"), Intent::Edit);
        assert_eq!(Intent::classify("show me my list"), Intent::View);
        assert_eq!(Intent::classify("hello"), Intent::Discover);
        assert_eq!(Intent::classify(""), Intent::Discover);
    }

    #[test]
    fn test_discover_keywords_win() {
        assert_eq!(Intent::classify("update my list"), Intent::Discover);
        assert_eq!(Intent::classify("search then remove"), Intent::Discover);
    }

    fn walk(events: &[Event]) -> Option<Stage> {
        events.iter().try_fold(Stage::Initiate, |stage, event| transition(stage, event))
    }

    #[test]
    fn test_discover_path() {
        let events = [
            Event::Classified(Intent::Discover),
            Event::Acquired { total_failure: false },
            Event::Evaluated,
            Event::ListFetched(Intent::Discover),
            Event::Compared,
            Event::Presented { pending: true },
        ];
        assert_eq!(walk(&events), Some(Stage::AwaitApproval));

        let approve = [&events[..], &[Event::Approval(true), Event::Stored]].concat();
        assert_eq!(walk(&approve), Some(Stage::Done));

        let reject = [&events[..], &[Event::Approval(false)]].concat();
        assert_eq!(walk(&reject), Some(Stage::Done));
    }

    #[test]
    fn test_error_branch_reenters_present() {
        let events = [
            Event::Classified(Intent::Discover),
            Event::Acquired { total_failure: true },
            Event::ErrorsReported,
            Event::Presented { pending: false },
        ];
        assert_eq!(walk(&events), Some(Stage::Done));
    }

    #[test]
    fn test_edit_and_view_paths() {
        assert_eq!(
            walk(&[Event::Classified(Intent::Edit), Event::EditParsed { pending: true }]),
            Some(Stage::AwaitApproval)
        );
        assert_eq!(
            walk(&[Event::Classified(Intent::View), Event::ListFetched(Intent::View), Event::Presented { pending: false }]),
            Some(Stage::Done)
        );
    }

    #[test]
    fn test_invalid_transitions() {
        assert_eq!(transition(Stage::Done, &Event::Approval(true)), None);
        assert_eq!(transition(Stage::Initiate, &Event::Stored), None);
        assert_eq!(transition(Stage::Present, &Event::Approval(true)), None);
    }
}
