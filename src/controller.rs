use crate::api::{ApiError, JournalApi};
use crate::journal_entry::{JournalEntry, NewEntry, Reply};
use crate::journal_state::JournalState;
use futures::future::{BoxFuture, FutureExt};
use std::sync::Arc;

/// Result of one finished request, ready to be applied to the page.
#[derive(Debug)]
pub enum Outcome {
    Listed(Result<Vec<JournalEntry>, ApiError>),
    Submitted {
        text: String,
        result: Result<Reply, ApiError>,
    },
}

/// A request that is in flight. It owns everything it needs, so several
/// can run at once and finish in any order.
pub type PendingRequest = BoxFuture<'static, Outcome>;

/// Bridges the input box and the entry list to the two endpoints.
pub struct JournalClient<A> {
    api: Arc<A>,
    state: JournalState,
}

impl<A: JournalApi + 'static> JournalClient<A> {
    pub fn new(api: Arc<A>) -> Self {
        JournalClient::with_state(api, JournalState::new())
    }

    pub fn with_state(api: Arc<A>, state: JournalState) -> Self {
        JournalClient { api, state }
    }

    pub fn state(&self) -> &JournalState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut JournalState {
        &mut self.state
    }

    /// Initial fetch when the page comes up.
    pub fn load(&self) -> PendingRequest {
        self.refresh()
    }

    pub fn refresh(&self) -> PendingRequest {
        let api = Arc::clone(&self.api);
        async move { Outcome::Listed(api.list_entries().await) }.boxed()
    }

    /// `None` when the input is empty: nothing is sent.
    pub fn submit(&self) -> Option<PendingRequest> {
        let text = self.state.take_submission()?;
        let api = Arc::clone(&self.api);
        Some(
            async move {
                let result = api.create_entry(&NewEntry::new(text.clone())).await;
                Outcome::Submitted { text, result }
            }
            .boxed(),
        )
    }

    /// Applies a finished request. A successful submit hands back the
    /// re-fetch that has to follow it.
    pub fn apply(&mut self, outcome: Outcome) -> Option<PendingRequest> {
        match outcome {
            Outcome::Listed(Ok(entries)) => {
                tracing::debug!(
                    count = entries.len(),
                    newest_id = ?entries.first().and_then(|e| e.id),
                    "rendering journal entries"
                );
                self.state.replace_entries(entries);
                None
            }
            Outcome::Listed(Err(err)) => {
                tracing::error!(error = %err, "failed to fetch entries");
                None
            }
            Outcome::Submitted {
                text,
                result: Ok(reply),
            } => {
                tracing::info!(
                    chars = text.chars().count(),
                    server_message = reply.message.as_deref().unwrap_or_default(),
                    "journal entry submitted"
                );
                self.state.show_reply(reply.llm_response);
                self.state.clear_input();
                Some(self.refresh())
            }
            Outcome::Submitted {
                result: Err(err), ..
            } => {
                tracing::error!(error = %err, "failed to submit journal entry");
                None
            }
        }
    }

    /// Sequential form of a refresh: fetch, apply, report.
    pub async fn refresh_list(&mut self) -> Result<&[JournalEntry], ApiError> {
        let entries = self.api.list_entries().await?;
        self.state.replace_entries(entries);
        Ok(self.state.get_entries())
    }

    /// Sequential form of a submit. `Ok(None)` for an empty input. The
    /// caller decides when to follow up with [`JournalClient::refresh_list`].
    pub async fn submit_entry(&mut self) -> Result<Option<Reply>, ApiError> {
        let Some(text) = self.state.take_submission() else {
            return Ok(None);
        };
        let reply = self.api.create_entry(&NewEntry::new(text)).await?;
        self.state.show_reply(reply.llm_response.clone());
        self.state.clear_input();
        Ok(Some(reply))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    pub(crate) fn entry(text: &str) -> JournalEntry {
        JournalEntry {
            id: None,
            text: text.to_string(),
            created_date: Some(Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap()),
        }
    }

    fn parse_error() -> ApiError {
        ApiError::Parse(serde_json::from_str::<Reply>("not json").unwrap_err())
    }

    /// Scripted stand-in for the server. Each call pops the next queued answer.
    #[derive(Default)]
    pub(crate) struct FakeApi {
        lists: Mutex<VecDeque<Result<Vec<JournalEntry>, ApiError>>>,
        creates: Mutex<VecDeque<Result<Reply, ApiError>>>,
        list_calls: Mutex<usize>,
        created: Mutex<Vec<NewEntry>>,
    }

    impl FakeApi {
        pub(crate) fn queue_list(&self, result: Result<Vec<JournalEntry>, ApiError>) {
            self.lists.lock().unwrap().push_back(result);
        }

        pub(crate) fn queue_create(&self, result: Result<Reply, ApiError>) {
            self.creates.lock().unwrap().push_back(result);
        }

        pub(crate) fn list_calls(&self) -> usize {
            *self.list_calls.lock().unwrap()
        }

        pub(crate) fn created(&self) -> Vec<NewEntry> {
            self.created.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl JournalApi for FakeApi {
        async fn list_entries(&self) -> Result<Vec<JournalEntry>, ApiError> {
            *self.list_calls.lock().unwrap() += 1;
            self.lists
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Vec::new()))
        }

        async fn create_entry(&self, entry: &NewEntry) -> Result<Reply, ApiError> {
            self.created.lock().unwrap().push(entry.clone());
            self.creates
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(parse_error()))
        }
    }

    fn reply(text: &str) -> Reply {
        Reply {
            llm_response: text.to_string(),
            message: None,
        }
    }

    fn client_with_input(api: &Arc<FakeApi>, input: &str) -> JournalClient<FakeApi> {
        let mut client = JournalClient::new(Arc::clone(api));
        input.chars().for_each(|c| client.state_mut().insert_char(c));
        client
    }

    #[tokio::test]
    async fn load_fetches_once_and_creates_nothing() {
        let api = Arc::new(FakeApi::default());
        api.queue_list(Ok(vec![entry("a"), entry("b")]));
        let mut client = JournalClient::new(Arc::clone(&api));

        let outcome = client.load().await;
        assert!(client.apply(outcome).is_none());

        assert_eq!(api.list_calls(), 1);
        assert!(api.created().is_empty());
        assert_eq!(client.state().get_entries().len(), 2);
    }

    #[tokio::test]
    async fn empty_submit_is_a_no_op() {
        let api = Arc::new(FakeApi::default());
        let client = JournalClient::new(Arc::clone(&api));
        let before = client.state().clone();

        assert!(client.submit().is_none());

        assert_eq!(api.list_calls(), 0);
        assert!(api.created().is_empty());
        assert_eq!(client.state(), &before);
    }

    #[tokio::test]
    async fn successful_submit_shows_reply_clears_input_and_refetches() {
        let api = Arc::new(FakeApi::default());
        api.queue_create(Ok(reply("Nice!")));
        api.queue_list(Ok(vec![entry("Hello"), entry("older")]));
        let mut client = client_with_input(&api, "Hello");

        let outcome = client.submit().expect("non-empty input").await;
        let refetch = client.apply(outcome).expect("refetch after create");

        assert_eq!(api.created(), vec![NewEntry::new("Hello")]);
        assert_eq!(client.state().reply(), Some("Nice!"));
        assert_eq!(client.state().input(), "");
        assert_eq!(api.list_calls(), 0);

        let outcome = refetch.await;
        assert!(client.apply(outcome).is_none());
        assert_eq!(api.list_calls(), 1);
        let texts: Vec<&str> = client
            .state()
            .get_entries()
            .iter()
            .map(|e| e.text.as_str())
            .collect();
        assert_eq!(texts, vec!["Hello", "older"]);
    }

    #[tokio::test]
    async fn failed_submit_keeps_input_and_hides_reply() {
        let api = Arc::new(FakeApi::default());
        api.queue_create(Err(parse_error()));
        let mut client = client_with_input(&api, "keep me");

        let outcome = client.submit().expect("non-empty input").await;
        assert!(client.apply(outcome).is_none());

        assert_eq!(client.state().input(), "keep me");
        assert_eq!(client.state().reply(), None);
        assert_eq!(api.list_calls(), 0);
    }

    #[tokio::test]
    async fn failed_list_leaves_previous_rendering() {
        let api = Arc::new(FakeApi::default());
        api.queue_list(Ok(vec![entry("kept")]));
        api.queue_list(Err(parse_error()));
        let mut client = JournalClient::new(Arc::clone(&api));

        let first = client.load().await;
        client.apply(first);
        let second = client.refresh().await;
        client.apply(second);

        assert_eq!(api.list_calls(), 2);
        assert_eq!(client.state().get_entries(), &[entry("kept")]);
    }

    #[tokio::test]
    async fn last_completed_list_wins() {
        let api = Arc::new(FakeApi::default());
        api.queue_list(Ok(vec![entry("first")]));
        api.queue_list(Ok(vec![entry("second"), entry("first")]));
        let mut client = JournalClient::new(Arc::clone(&api));

        let early = client.refresh();
        let late = client.refresh();
        // The later request is polled first, so it takes the first scripted answer.
        let late_outcome = late.await;
        let early_outcome = early.await;
        client.apply(late_outcome);
        client.apply(early_outcome);

        assert_eq!(
            client.state().get_entries(),
            &[entry("second"), entry("first")]
        );
    }

    #[tokio::test]
    async fn sequential_submit_then_refresh() {
        let api = Arc::new(FakeApi::default());
        api.queue_create(Ok(reply("Thank you for sharing.")));
        api.queue_list(Ok(vec![entry("Hello")]));
        let mut client = client_with_input(&api, "Hello");

        let reply = client.submit_entry().await.unwrap().expect("reply");
        assert_eq!(reply.llm_response, "Thank you for sharing.");
        assert_eq!(client.state().input(), "");

        let entries = client.refresh_list().await.unwrap();
        assert_eq!(entries, &[entry("Hello")]);
    }

    #[tokio::test]
    async fn sequential_submit_of_empty_input_sends_nothing() {
        let api = Arc::new(FakeApi::default());
        let mut client = JournalClient::new(Arc::clone(&api));

        assert!(client.submit_entry().await.unwrap().is_none());
        assert!(api.created().is_empty());
    }

    #[tokio::test]
    async fn sequential_refresh_error_keeps_entries() {
        let api = Arc::new(FakeApi::default());
        api.queue_list(Err(parse_error()));
        let mut state = JournalState::new();
        state.replace_entries(vec![entry("stale")]);
        let mut client = JournalClient::with_state(Arc::clone(&api), state);

        assert!(client.refresh_list().await.is_err());
        assert_eq!(client.state().get_entries(), &[entry("stale")]);
    }
}
