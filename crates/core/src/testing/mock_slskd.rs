//! Mock Soulseek client for testing.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

use crate::slskd::{FileListing, Offer, SearchState, SlskdError, SoulseekClient};

/// A recorded transfer enqueue for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedEnqueue {
    pub username: String,
    pub filename: String,
}

/// Mock implementation of the SoulseekClient trait.
///
/// Each started search consumes the next scripted offer set, in order;
/// searches beyond the script see no offers. Polls consume the state
/// script first and fall back to a constant state (default Completed).
/// Injected errors are consumed once.
///
/// # Example
///
/// ```rust,ignore
/// use soulfetch_core::testing::{fixtures, MockSoulseek};
///
/// let client = MockSoulseek::new();
/// client.push_offers(vec![fixtures::offer(
///     "peer",
///     vec![fixtures::listing("flo-rida-low.mp3", 320)],
/// )]).await;
///
/// // First search sees the scripted offers, a second search sees none
/// let id = client.start_search("low flo rida").await?;
/// assert_eq!(client.search_responses(&id).await?.len(), 1);
/// ```
pub struct MockSoulseek {
    /// Scripted offer sets, one per started search.
    scripted_offers: RwLock<VecDeque<Vec<Offer>>>,
    /// Offers keyed by issued search id.
    results_by_search: RwLock<HashMap<String, Vec<Offer>>>,
    /// Per-poll state script; when empty, `state` applies.
    state_script: RwLock<VecDeque<SearchState>>,
    /// Constant state reported once the script is drained.
    state: RwLock<SearchState>,
    /// Recorded search queries, in order.
    searches: RwLock<Vec<String>>,
    /// Recorded transfer enqueues, in order.
    enqueues: RwLock<Vec<RecordedEnqueue>>,
    next_start_error: RwLock<Option<SlskdError>>,
    next_state_error: RwLock<Option<SlskdError>>,
    next_responses_error: RwLock<Option<SlskdError>>,
    next_enqueue_error: RwLock<Option<SlskdError>>,
    counter: AtomicUsize,
}

impl Default for MockSoulseek {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSoulseek {
    /// Create a mock whose searches complete immediately with no offers.
    pub fn new() -> Self {
        Self {
            scripted_offers: RwLock::new(VecDeque::new()),
            results_by_search: RwLock::new(HashMap::new()),
            state_script: RwLock::new(VecDeque::new()),
            state: RwLock::new(SearchState::Completed),
            searches: RwLock::new(Vec::new()),
            enqueues: RwLock::new(Vec::new()),
            next_start_error: RwLock::new(None),
            next_state_error: RwLock::new(None),
            next_responses_error: RwLock::new(None),
            next_enqueue_error: RwLock::new(None),
            counter: AtomicUsize::new(0),
        }
    }

    /// Queue the offer set for the next started search.
    pub async fn push_offers(&self, offers: Vec<Offer>) {
        self.scripted_offers.write().await.push_back(offers);
    }

    /// Set the constant state reported by polls.
    pub async fn set_state(&self, state: SearchState) {
        *self.state.write().await = state;
    }

    /// Script a sequence of states, consumed one per poll.
    pub async fn push_states(&self, states: Vec<SearchState>) {
        self.state_script.write().await.extend(states);
    }

    /// Fail the next start_search call.
    pub async fn fail_next_start(&self, error: SlskdError) {
        *self.next_start_error.write().await = Some(error);
    }

    /// Fail the next search_state call.
    pub async fn fail_next_state(&self, error: SlskdError) {
        *self.next_state_error.write().await = Some(error);
    }

    /// Fail the next search_responses call.
    pub async fn fail_next_responses(&self, error: SlskdError) {
        *self.next_responses_error.write().await = Some(error);
    }

    /// Fail the next enqueue_download call.
    pub async fn fail_next_enqueue(&self, error: SlskdError) {
        *self.next_enqueue_error.write().await = Some(error);
    }

    /// Recorded search queries.
    pub async fn recorded_searches(&self) -> Vec<String> {
        self.searches.read().await.clone()
    }

    /// Number of searches started.
    pub async fn search_count(&self) -> usize {
        self.searches.read().await.len()
    }

    /// Recorded transfer enqueues.
    pub async fn recorded_enqueues(&self) -> Vec<RecordedEnqueue> {
        self.enqueues.read().await.clone()
    }
}

#[async_trait]
impl SoulseekClient for MockSoulseek {
    fn name(&self) -> &str {
        "mock"
    }

    async fn start_search(&self, query: &str) -> Result<String, SlskdError> {
        if let Some(err) = self.next_start_error.write().await.take() {
            return Err(err);
        }
        if query.trim().is_empty() {
            return Err(SlskdError::InvalidQuery);
        }

        self.searches.write().await.push(query.to_string());

        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let id = format!("search-{}", n);
        let offers = self
            .scripted_offers
            .write()
            .await
            .pop_front()
            .unwrap_or_default();
        self.results_by_search.write().await.insert(id.clone(), offers);

        Ok(id)
    }

    async fn search_state(&self, _id: &str) -> Result<SearchState, SlskdError> {
        if let Some(err) = self.next_state_error.write().await.take() {
            return Err(err);
        }
        if let Some(state) = self.state_script.write().await.pop_front() {
            return Ok(state);
        }
        Ok(*self.state.read().await)
    }

    async fn search_responses(&self, id: &str) -> Result<Vec<Offer>, SlskdError> {
        if let Some(err) = self.next_responses_error.write().await.take() {
            return Err(err);
        }
        Ok(self
            .results_by_search
            .read()
            .await
            .get(id)
            .cloned()
            .unwrap_or_default())
    }

    async fn enqueue_download(
        &self,
        username: &str,
        file: &FileListing,
    ) -> Result<(), SlskdError> {
        if let Some(err) = self.next_enqueue_error.write().await.take() {
            return Err(err);
        }
        self.enqueues.write().await.push(RecordedEnqueue {
            username: username.to_string(),
            filename: file.filename.clone(),
        });
        Ok(())
    }
}
