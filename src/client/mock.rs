//! Mock ticket source for testing
//!
//! Canned pages and conversations, configured via builder methods, with call
//! counters so tests can assert exactly how often the engine hit the remote.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::TicketSource;
use super::models::{ConversationEvent, Page, RawTechnician, RawTicket};
use crate::error::{ApiError, Result};

/// Mock remote source for unit tests.
///
/// # Example
/// ```ignore
/// let source = MockTicketSource::new()
///     .with_ticket_pages(vec![vec![raw_ticket("1", "Open")]]);
///
/// let page = source.list_tickets(1, 100, &[]).await?;
/// assert_eq!(page.items.len(), 1);
/// ```
///
/// Clones share state, so tests can keep a handle for assertions after
/// handing the source to the cache manager.
#[derive(Clone)]
pub struct MockTicketSource {
    /// Ticket pages, one inner vec per page
    ticket_pages: Arc<Mutex<Vec<Vec<RawTicket>>>>,
    /// Technician pages, one inner vec per page
    technician_pages: Arc<Mutex<Vec<Vec<RawTechnician>>>>,
    /// Conversation entries per ticket id
    conversations: Arc<Mutex<HashMap<String, Vec<ConversationEvent>>>>,
    /// Ticket ids whose conversation lookups always fail
    failing_conversations: Arc<Mutex<HashSet<String>>>,
    /// Error returned by the next listing call - consumed on first use
    error: Arc<Mutex<Option<ApiError>>>,
    /// Exclude-status lists captured from list_tickets calls
    captured_excludes: Arc<Mutex<Vec<Vec<String>>>>,
    /// Per-method call counts for verification
    call_counts: Arc<Mutex<CallCounts>>,
}

/// Tracks source call counts for test verification
#[derive(Default, Debug, Clone)]
pub struct CallCounts {
    pub list_tickets: usize,
    pub list_technicians: usize,
    pub conversation_events: usize,
}

impl Default for MockTicketSource {
    fn default() -> Self {
        Self {
            ticket_pages: Arc::new(Mutex::new(Vec::new())),
            technician_pages: Arc::new(Mutex::new(Vec::new())),
            conversations: Arc::new(Mutex::new(HashMap::new())),
            failing_conversations: Arc::new(Mutex::new(HashSet::new())),
            error: Arc::new(Mutex::new(None)),
            captured_excludes: Arc::new(Mutex::new(Vec::new())),
            call_counts: Arc::new(Mutex::new(CallCounts::default())),
        }
    }
}

impl MockTicketSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the ticket pages returned by `list_tickets`
    pub fn with_ticket_pages(self, pages: Vec<Vec<RawTicket>>) -> Self {
        *self.ticket_pages.try_lock().unwrap() = pages;
        self
    }

    /// Set the technician pages returned by `list_technicians`
    pub fn with_technician_pages(self, pages: Vec<Vec<RawTechnician>>) -> Self {
        *self.technician_pages.try_lock().unwrap() = pages;
        self
    }

    /// Set the conversation entries for a ticket
    pub fn with_conversation(self, ticket_id: &str, events: Vec<ConversationEvent>) -> Self {
        self.conversations
            .try_lock()
            .unwrap()
            .insert(ticket_id.to_string(), events);
        self
    }

    /// Make conversation lookups for a ticket fail with a server error
    pub fn with_failing_conversation(self, ticket_id: &str) -> Self {
        self.failing_conversations
            .try_lock()
            .unwrap()
            .insert(ticket_id.to_string());
        self
    }

    /// Inject an error returned by the next listing call
    pub fn with_error(self, error: ApiError) -> Self {
        *self.error.try_lock().unwrap() = Some(error);
        self
    }

    /// Replace the ticket pages after construction
    pub async fn set_ticket_pages(&self, pages: Vec<Vec<RawTicket>>) {
        *self.ticket_pages.lock().await = pages;
    }

    /// Inject an error after construction
    pub async fn set_error(&self, error: ApiError) {
        *self.error.lock().await = Some(error);
    }

    /// Make conversation lookups for a ticket fail after construction
    pub async fn set_failing_conversation(&self, ticket_id: &str) {
        self.failing_conversations
            .lock()
            .await
            .insert(ticket_id.to_string());
    }

    /// Snapshot of the call counts
    pub async fn calls(&self) -> CallCounts {
        self.call_counts.lock().await.clone()
    }

    /// Exclude-status lists seen by `list_tickets`
    pub async fn captured_excludes(&self) -> Vec<Vec<String>> {
        self.captured_excludes.lock().await.clone()
    }

    async fn take_error(&self) -> Option<ApiError> {
        self.error.lock().await.take()
    }
}

fn page_of<T: Clone>(pages: &[Vec<T>], page: usize) -> Page<T> {
    let items = pages.get(page.saturating_sub(1)).cloned().unwrap_or_default();
    Page {
        items,
        has_more: page < pages.len(),
    }
}

#[async_trait]
impl TicketSource for MockTicketSource {
    async fn list_tickets(
        &self,
        page: usize,
        _page_size: usize,
        exclude_statuses: &[String],
    ) -> Result<Page<RawTicket>> {
        self.call_counts.lock().await.list_tickets += 1;
        self.captured_excludes
            .lock()
            .await
            .push(exclude_statuses.to_vec());

        if let Some(error) = self.take_error().await {
            return Err(error.into());
        }

        Ok(page_of(&self.ticket_pages.lock().await, page))
    }

    async fn list_technicians(
        &self,
        page: usize,
        _page_size: usize,
    ) -> Result<Page<RawTechnician>> {
        self.call_counts.lock().await.list_technicians += 1;

        if let Some(error) = self.take_error().await {
            return Err(error.into());
        }

        Ok(page_of(&self.technician_pages.lock().await, page))
    }

    async fn conversation_events(&self, ticket_id: &str) -> Result<Vec<ConversationEvent>> {
        self.call_counts.lock().await.conversation_events += 1;

        if self.failing_conversations.lock().await.contains(ticket_id) {
            return Err(ApiError::Status(500).into());
        }

        Ok(self
            .conversations
            .lock()
            .await
            .get(ticket_id)
            .cloned()
            .unwrap_or_default())
    }
}
