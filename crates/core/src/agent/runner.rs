use std::collections::HashSet;
use std::mem;

use super::edit::{EditAction, find_by_name, parse_edit_command};
use super::{ApprovalDecision, Event, Intent, RestaurantAgent, Session, Stage, messages};
use crate::Error;

impl RestaurantAgent {
    /// Run a new turn until it needs approval or is done.
    pub async fn start(&self, message: &str) -> Session {
        let mut session = Session::new(message);
        self.drive(&mut session).await;
        session
    }

    /// Continue a turn waiting on approval.
    ///
    /// # Errors
    ///
    /// [`Error::NoPendingApproval`] when `session` is not awaiting approval.
    pub async fn resume(&self, mut session: Session, decision: ApprovalDecision) -> Result<Session, Error> {
        if !session.awaiting_approval() {
            return Err(Error::NoPendingApproval);
        }

        session.to_add = decision.select(mem::take(&mut session.to_add));
        session.to_remove = decision.select(mem::take(&mut session.to_remove));
        let approved = !session.to_add.is_empty() || !session.to_remove.is_empty();

        tracing::info!(approved, additions = session.to_add.len(), removals = session.to_remove.len(), "approval received");
        if !approved {
            session.recommendation = messages::NO_CHANGES.to_string();
        }
        session.advance(Event::Approval(approved));

        self.drive(&mut session).await;
        Ok(session)
    }

    async fn drive(&self, session: &mut Session) {
        loop {
            let event = match session.stage {
                Stage::Initiate => self.initiate(session),
                Stage::SearchSources => self.search_sources(session).await,
                Stage::HandleEdit => self.handle_edit(session).await,
                Stage::Evaluate => self.evaluate(session).await,
                Stage::FetchCurrentList => self.fetch_current_list(session).await,
                Stage::Compare => self.compare(session),
                Stage::ErrorHandler => self.report_errors(session),
                Stage::Present => self.present(session),
                Stage::UpdateStore => self.update_store(session).await,
                Stage::AwaitApproval | Stage::Done => return,
            };
            session.advance(event);
        }
    }

    fn initiate(&self, session: &mut Session) -> Event {
        session.intent = Intent::classify(&session.message);
        tracing::info!(intent = ?session.intent, "turn started");
        Event::Classified(session.intent)
    }

    async fn search_sources(&self, session: &mut Session) -> Event {
        let Some(discovery) = &self.discovery else {
            session.errors.push(self.search_unavailable.clone());
            return Event::Acquired { total_failure: true };
        };

        let acquisition = discovery.acquire().await;
        let total_failure = acquisition.is_total_failure();

        session.discovered = acquisition.restaurants;
        session.found_per_source = acquisition.found_per_source;
        session.failures = acquisition.failures;
        session.errors.extend(acquisition.errors);

        Event::Acquired { total_failure }
    }

    async fn evaluate(&self, session: &mut Session) -> Event {
        if let Some(discovery) = &self.discovery {
            session.discovered = discovery.evaluate(mem::take(&mut session.discovered)).await;
        }
        Event::Evaluated
    }

    async fn fetch_current_list(&self, session: &mut Session) -> Event {
        self.load_current_list(session).await;
        Event::ListFetched(session.intent)
    }

    /// A failed read leaves the list empty and records the error.
    async fn load_current_list(&self, session: &mut Session) {
        session.current_list = match self.store.read_all().await {
            Ok(list) => list,
            Err(e) => {
                tracing::error!(error = %e, "reading current list failed");
                session.errors.push(format!("Failed to fetch current list: {e}"));
                Vec::new()
            }
        };
    }

    /// Additions are discovered names not already on the list.
    fn compare(&self, session: &mut Session) -> Event {
        let current: HashSet<String> = session.current_list.iter().map(|r| r.normalized_name()).collect();
        session.to_add = session
            .discovered
            .iter()
            .filter(|r| !current.contains(&r.normalized_name()))
            .cloned()
            .collect();

        tracing::info!(discovered = session.discovered.len(), new = session.to_add.len(), "compared with current list");
        Event::Compared
    }

    fn report_errors(&self, session: &mut Session) -> Event {
        let mut details = session.errors.clone();
        details.extend(session.failures.iter().map(ToString::to_string));

        session.discovery_failed = true;
        session.recommendation = messages::discovery_failed(&details);
        Event::ErrorsReported
    }

    fn present(&self, session: &mut Session) -> Event {
        if session.discovery_failed {
            return Event::Presented { pending: false };
        }
        if session.intent == Intent::View {
            session.recommendation = messages::current_list(&session.current_list);
            return Event::Presented { pending: false };
        }

        session.recommendation = messages::recommendations(&session.to_add, &session.failures);
        Event::Presented { pending: !session.to_add.is_empty() }
    }

    async fn handle_edit(&self, session: &mut Session) -> Event {
        let command = parse_edit_command(self.llm.as_ref(), &session.message).await;
        tracing::info!(action = ?command.action, name = %command.restaurant_name, "edit parsed");

        match command.action {
            EditAction::Remove => {
                self.load_current_list(session).await;
                match find_by_name(&session.current_list, &command.restaurant_name) {
                    Some(found) => {
                        session.recommendation = messages::confirm_removal(&found.name);
                        session.to_remove = vec![found.clone()];
                        Event::EditParsed { pending: true }
                    }
                    None => {
                        session.recommendation = messages::not_in_list(&command.restaurant_name);
                        Event::EditParsed { pending: false }
                    }
                }
            }
            EditAction::Update => {
                session.recommendation = messages::UPDATE_UNSUPPORTED.to_string();
                Event::EditParsed { pending: false }
            }
            EditAction::Add => {
                session.recommendation = messages::ADD_UNSUPPORTED.to_string();
                Event::EditParsed { pending: false }
            }
            EditAction::Unknown => {
                session.recommendation = messages::EDIT_USAGE.to_string();
                Event::EditParsed { pending: false }
            }
        }
    }

    async fn update_store(&self, session: &mut Session) -> Event {
        let mut added = 0;
        let mut removed = Vec::new();
        let mut errors = Vec::new();

        if !session.to_add.is_empty() {
            match self.store.append_batch(&session.to_add).await {
                Ok(count) => added = count,
                Err(e) => errors.push(format!("Failed to add restaurants: {e}")),
            }
        }

        for restaurant in &session.to_remove {
            match self.store.remove_by_name(&restaurant.name).await {
                Ok(true) => removed.push(restaurant.name.clone()),
                Ok(false) => errors.push(format!("{} was no longer in your list", restaurant.name)),
                Err(e) => errors.push(format!("Failed to remove {}: {e}", restaurant.name)),
            }
        }

        if errors.is_empty() {
            tracing::info!(added, removed = removed.len(), "list updated");
        } else {
            tracing::error!(added, removed = removed.len(), errors = errors.len(), "list update incomplete");
        }

        session.recommendation = messages::stored(added, &removed, &errors);
        session.errors.extend(errors);
        Event::Stored
    }
}
