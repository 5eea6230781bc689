//! The conversational agent: one state machine per user turn.
//!
//! A turn starts from a free-text message, runs until it either needs the
//! user's approval or is finished, and is resumed with an
//! [`ApprovalDecision`]. Nothing is written to the list without approval.

pub mod edit;
pub mod messages;
mod runner;
pub mod state;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::cache::ResponseCache;
use crate::config::AppConfig;
use crate::discovery::{Discovery, SourceFailure};
use crate::provider::{LanguageModel, ListStore, SearchProvider};
use crate::restaurant::Restaurant;

pub use edit::{EditAction, EditCommand};
pub use state::{Event, Intent, Stage, transition};

/// Accumulated context of one turn.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub message: String,
    pub intent: Intent,
    pub stage: Stage,
    /// Evaluated candidates, best first.
    pub discovered: Vec<Restaurant>,
    pub found_per_source: BTreeMap<String, usize>,
    pub current_list: Vec<Restaurant>,
    pub to_add: Vec<Restaurant>,
    pub to_remove: Vec<Restaurant>,
    pub recommendation: String,
    pub failures: Vec<SourceFailure>,
    pub errors: Vec<String>,
    discovery_failed: bool,
}

impl Session {
    fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
            intent: Intent::default(),
            stage: Stage::Initiate,
            discovered: Vec::new(),
            found_per_source: BTreeMap::new(),
            current_list: Vec::new(),
            to_add: Vec::new(),
            to_remove: Vec::new(),
            recommendation: String::new(),
            failures: Vec::new(),
            errors: Vec::new(),
            discovery_failed: false,
        }
    }

    pub fn awaiting_approval(&self) -> bool {
        self.stage == Stage::AwaitApproval
    }

    /// Detail block of the `position`-th (1-based) presented addition.
    pub fn recommendation_detail(&self, position: usize) -> Option<String> {
        let restaurant = self.to_add.get(position.checked_sub(1)?)?;
        Some(restaurant.detail_block(position))
    }

    /// Apply `event`; an impossible event ends the turn.
    fn advance(&mut self, event: Event) {
        match transition(self.stage, &event) {
            Some(next) => {
                tracing::debug!(from = ?self.stage, to = ?next, ?event, "stage transition");
                self.stage = next;
            }
            None => {
                tracing::error!(stage = ?self.stage, ?event, "invalid transition");
                self.errors.push(format!("invalid transition from {:?} on {event:?}", self.stage));
                self.stage = Stage::Done;
            }
        }
    }
}

/// The human's answer to a presented recommendation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApprovalDecision {
    Approve,
    Reject,
    /// 1-based positions to keep; out-of-range positions are ignored.
    Partial(Vec<usize>),
}

impl ApprovalDecision {
    pub fn from_flag(approved: bool) -> Self {
        if approved { Self::Approve } else { Self::Reject }
    }

    fn select(&self, items: Vec<Restaurant>) -> Vec<Restaurant> {
        match self {
            Self::Approve => items,
            Self::Reject => Vec::new(),
            Self::Partial(positions) => {
                let keep: BTreeSet<usize> = positions.iter().copied().filter(|&p| p >= 1).collect();
                items
                    .into_iter()
                    .enumerate()
                    .filter(|(idx, _)| keep.contains(&(idx + 1)))
                    .map(|(_, item)| item)
                    .collect()
            }
        }
    }
}

/// Runs turns against the pipeline and the persisted list.
pub struct RestaurantAgent {
    discovery: Option<Discovery>,
    search_unavailable: String,
    llm: Arc<dyn LanguageModel>,
    store: Arc<dyn ListStore>,
}

impl fmt::Debug for RestaurantAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestaurantAgent")
            .field("discovery", &self.discovery)
            .finish_non_exhaustive()
    }
}

impl RestaurantAgent {
    /// Without a search provider, discovery turns report the missing
    /// credential instead of running.
    pub fn new(
        config: &AppConfig, search: Option<Arc<dyn SearchProvider>>, llm: Arc<dyn LanguageModel>,
        store: Arc<dyn ListStore>, cache: ResponseCache,
    ) -> Self {
        let search_unavailable = match config.require_tavily_api_key() {
            Err(e) => crate::Error::from(e).to_string(),
            Ok(_) => "search provider unavailable".to_string(),
        };
        let discovery = search.map(|search| Discovery::new(config, search, llm.clone(), cache));

        Self { discovery, search_unavailable, llm, store }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_selection() {
        let items = vec![Restaurant::new("A"), Restaurant::new("B"), Restaurant::new("C")];
        let kept = ApprovalDecision::Partial(vec![3, 1, 0, 9, 1]).select(items.clone());
        let names: Vec<&str> = kept.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["A", "C"]);

        assert!(ApprovalDecision::Reject.select(items.clone()).is_empty());
        assert_eq!(ApprovalDecision::from_flag(true).select(items).len(), 3);
    }

    #[test]
    fn test_recommendation_detail_is_one_based() {
        let mut session = Session::new("find");
        session.to_add = vec![Restaurant::new("Albi")];
        assert!(session.recommendation_detail(0).is_none());
        assert!(session.recommendation_detail(1).is_some_and(|d| d.starts_with("1. **Albi**")));
        assert!(session.recommendation_detail(2).is_none());
    }
}
