//! SuperOps API client
//!
//! The engine only sees the [`TicketSource`] trait; the GraphQL wiring lives
//! in [`superops`] and tests substitute [`mock::MockTicketSource`].

use async_trait::async_trait;

#[cfg(test)]
pub mod mock;
pub mod models;
pub mod pagination;
pub mod parallel;
pub mod superops;

#[cfg(test)]
#[allow(unused_imports)]
pub use mock::MockTicketSource;
pub use models::{ConversationEvent, Page, RawTechnician, RawTicket};
#[allow(unused_imports)]
pub use pagination::{MAX_PAGES, fetch_all_pages};
pub use parallel::resolve_concurrently;
pub use superops::SuperOpsClient;

use crate::error::Result;

/// Remote ticket source capability
///
/// Listing queries are page-numbered (1-indexed) and report whether more
/// pages follow. Ticket listings are filtered server-side to exclude the
/// given statuses; callers trust that filter and do no local re-filtering.
#[async_trait]
pub trait TicketSource: Send + Sync {
    /// Fetch one page of active tickets, excluding the given statuses
    async fn list_tickets(
        &self,
        page: usize,
        page_size: usize,
        exclude_statuses: &[String],
    ) -> Result<Page<RawTicket>>;

    /// Fetch one page of technicians
    async fn list_technicians(
        &self,
        page: usize,
        page_size: usize,
    ) -> Result<Page<RawTechnician>>;

    /// Fetch the full conversation entry list for a ticket, oldest first
    async fn conversation_events(&self, ticket_id: &str) -> Result<Vec<ConversationEvent>>;
}
