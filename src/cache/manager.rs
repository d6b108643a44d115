//! Cache manager: the read-through layer in front of the ticket source
//!
//! Owns three independent caches — tickets, technicians, and the per-ticket
//! conversation signal — behind one mutex. Remote failures never escape a
//! public operation: the previous payload is served stale if one exists,
//! otherwise the result is empty.
//!
//! Lock discipline: every check-then-store sequence holds the mutex; the
//! remote call itself always runs with the lock released.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use log::{error, info, warn};

use crate::client::{TicketSource, fetch_all_pages, resolve_concurrently};
use crate::config::Config;
use crate::error::Result;
use crate::models::{TechnicianMap, Ticket};

/// Max in-flight conversation lookups per resolution pass
const CONVERSATION_WORKERS: usize = 10;

/// A cached payload and the instant it was stored
#[derive(Debug, Clone)]
struct Cached<T> {
    payload: T,
    fetched_at: Instant,
}

impl<T> Cached<T> {
    fn new(payload: T) -> Self {
        Self {
            payload,
            fetched_at: Instant::now(),
        }
    }

    fn is_fresh(&self, ttl: Duration) -> bool {
        self.fetched_at.elapsed() < ttl
    }
}

/// Conversation signal for one ticket.
///
/// Valid only while `updated_at_str` matches the ticket's current value; any
/// mismatch is a miss and forces a re-fetch.
#[derive(Debug, Clone)]
pub struct ConversationEntry {
    /// Ticket `updated_at_str` the flag was computed against
    pub updated_at_str: Option<String>,

    /// Whether the last conversation entry was authored by the requester
    pub has_requester_reply: bool,
}

#[derive(Default)]
struct CacheState {
    tickets: Option<Cached<Vec<Ticket>>>,
    technicians: Option<Cached<TechnicianMap>>,
    conversations: HashMap<String, ConversationEntry>,
}

/// TTL-cached, stale-tolerant access to the remote ticket source.
///
/// Constructed once at startup and handed to the web layer; there is no
/// ambient global instance.
pub struct CacheManager<S> {
    source: Arc<S>,
    page_size: usize,
    exclude_statuses: Vec<String>,
    ticket_ttl: Duration,
    technician_ttl: Duration,
    state: Mutex<CacheState>,
}

impl<S: TicketSource + 'static> CacheManager<S> {
    /// Create a manager over a source, taking page size, TTLs, and the
    /// closed-status exclusion list from the configuration
    pub fn new(source: S, config: &Config) -> Self {
        Self {
            source: Arc::new(source),
            page_size: config.superops.page_size,
            exclude_statuses: config.closed_statuses.clone(),
            ticket_ttl: config.ticket_cache_ttl(),
            technician_ttl: config.technician_cache_ttl(),
            state: Mutex::new(CacheState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetch all active tickets, serving from cache while the TTL holds.
    ///
    /// `force` bypasses the TTL check. Fetch failures are logged and resolved
    /// as stale-cache-or-empty; this never returns an error.
    pub async fn fetch_tickets(&self, force: bool) -> Vec<Ticket> {
        if !force {
            let state = self.state();
            if let Some(cached) = &state.tickets
                && cached.is_fresh(self.ticket_ttl)
            {
                return cached.payload.clone();
            }
        }

        match self.fetch_tickets_remote().await {
            Ok(tickets) => {
                info!("Fetched {} active tickets from SuperOps", tickets.len());
                let mut state = self.state();
                state.tickets = Some(Cached::new(tickets.clone()));
                tickets
            }
            Err(err) => {
                error!("Failed to fetch tickets from SuperOps: {}", err);
                let state = self.state();
                match &state.tickets {
                    Some(cached) => {
                        warn!("Returning stale cached tickets");
                        cached.payload.clone()
                    }
                    None => Vec::new(),
                }
            }
        }
    }

    async fn fetch_tickets_remote(&self) -> Result<Vec<Ticket>> {
        let raw = fetch_all_pages(|page| {
            self.source
                .list_tickets(page, self.page_size, &self.exclude_statuses)
        })
        .await?;

        Ok(raw.into_iter().map(Ticket::from_raw).collect())
    }

    /// Fetch the technician id-to-name map, serving from cache while its own
    /// TTL holds. Same stale-serve policy as tickets.
    pub async fn fetch_technicians(&self, force: bool) -> TechnicianMap {
        if !force {
            let state = self.state();
            if let Some(cached) = &state.technicians
                && cached.is_fresh(self.technician_ttl)
            {
                return cached.payload.clone();
            }
        }

        match self.fetch_technicians_remote().await {
            Ok(mapping) => {
                info!("Fetched {} active technicians from SuperOps", mapping.len());
                let mut state = self.state();
                state.technicians = Some(Cached::new(mapping.clone()));
                mapping
            }
            Err(err) => {
                error!("Failed to fetch technicians: {}", err);
                let state = self.state();
                match &state.technicians {
                    Some(cached) => cached.payload.clone(),
                    None => TechnicianMap::new(),
                }
            }
        }
    }

    async fn fetch_technicians_remote(&self) -> Result<TechnicianMap> {
        let raw =
            fetch_all_pages(|page| self.source.list_technicians(page, self.page_size)).await?;

        let mut mapping = TechnicianMap::new();
        for tech in raw {
            if let (Some(id), Some(name)) = (tech.user_id, tech.name)
                && !name.is_empty()
            {
                mapping.insert(id, name);
            }
        }
        Ok(mapping)
    }

    /// Determine which tickets have a requester reply as their most recent
    /// conversation entry.
    ///
    /// Tickets whose lowercased status is already in `replied_statuses` are
    /// skipped. Cache entries whose stored `updated_at_str` matches the
    /// ticket answer without network access; the rest are resolved with
    /// bounded concurrency, one bad lookup falling back to the previous
    /// cached value (or false) without disturbing its siblings. Entries for
    /// tickets no longer in the ticket cache are pruned afterwards.
    pub async fn resolve_requester_reply_flags(
        &self,
        tickets: &[Ticket],
        replied_statuses: &HashSet<String>,
    ) -> HashSet<String> {
        let mut flagged = HashSet::new();
        let mut misses: Vec<(String, Option<String>)> = Vec::new();

        {
            let state = self.state();
            for ticket in tickets {
                let Some(ticket_id) = &ticket.ticket_id else {
                    continue;
                };
                if replied_statuses.contains(&ticket.status_lower()) {
                    continue;
                }

                match state.conversations.get(ticket_id) {
                    Some(entry) if entry.updated_at_str == ticket.updated_at_str => {
                        if entry.has_requester_reply {
                            flagged.insert(ticket_id.clone());
                        }
                    }
                    _ => misses.push((ticket_id.clone(), ticket.updated_at_str.clone())),
                }
            }
        }

        if !misses.is_empty() {
            let keys: Vec<String> = misses.iter().map(|(id, _)| id.clone()).collect();
            let updated_by_id: HashMap<String, Option<String>> = misses.into_iter().collect();

            let source = self.source.clone();
            let results = resolve_concurrently(
                keys,
                move |ticket_id: String| {
                    let source = source.clone();
                    async move {
                        let events = source.conversation_events(&ticket_id).await?;
                        Ok(events.last().is_some_and(|e| e.is_requester_entry()))
                    }
                },
                CONVERSATION_WORKERS,
            )
            .await;

            let mut state = self.state();
            for (ticket_id, result) in results {
                let has_reply = match result {
                    Ok(flag) => flag,
                    Err(err) => {
                        warn!("Conversation lookup failed for ticket {}: {}", ticket_id, err);
                        state
                            .conversations
                            .get(&ticket_id)
                            .map(|e| e.has_requester_reply)
                            .unwrap_or(false)
                    }
                };

                let updated_at_str = updated_by_id.get(&ticket_id).cloned().flatten();
                state.conversations.insert(
                    ticket_id.clone(),
                    ConversationEntry {
                        updated_at_str,
                        has_requester_reply: has_reply,
                    },
                );

                if has_reply {
                    flagged.insert(ticket_id);
                }
            }
        }

        self.prune_conversations();
        flagged
    }

    /// Drop conversation entries for tickets no longer in the ticket cache.
    ///
    /// Keeps the conversation cache from growing without bound as tickets
    /// close and disappear from listings.
    fn prune_conversations(&self) {
        let mut state = self.state();

        let live: HashSet<String> = state
            .tickets
            .as_ref()
            .map(|cached| {
                cached
                    .payload
                    .iter()
                    .filter_map(|t| t.ticket_id.clone())
                    .collect()
            })
            .unwrap_or_default();

        let before = state.conversations.len();
        state.conversations.retain(|id, _| live.contains(id));

        let pruned = before - state.conversations.len();
        if pruned > 0 {
            info!("Pruned {} conversation cache entries", pruned);
        }
    }

    /// Clear all three caches; the next read of any kind hits the source
    pub fn invalidate_cache(&self) {
        let mut state = self.state();
        state.tickets = None;
        state.technicians = None;
        state.conversations.clear();
        info!("SuperOps cache invalidated");
    }
}
