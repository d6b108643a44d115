//! View and agent filter predicates
//!
//! Pure list-narrowing helpers applied by the web layer between the cache and
//! the classifier. Both are total: malformed input degrades to a no-op
//! filter, never an error.

use std::collections::{BTreeMap, HashSet};

use crate::config::ViewConfig;
use crate::models::Ticket;

/// Keep tickets belonging to a view's tech groups.
///
/// A view with explicit `tech_group_ids` keeps exactly those groups. A view
/// with none is the catch-all: it keeps every ticket whose group is not
/// claimed by any other view (tickets with no group always pass). If no other
/// view claims any group, everything passes.
pub fn filter_by_view(
    tickets: Vec<Ticket>,
    view: &ViewConfig,
    all_views: &BTreeMap<String, ViewConfig>,
) -> Vec<Ticket> {
    if view.tech_group_ids.is_empty() {
        let claimed: HashSet<&String> = all_views
            .values()
            .filter(|v| !v.tech_group_ids.is_empty())
            .flat_map(|v| v.tech_group_ids.iter())
            .collect();

        if claimed.is_empty() {
            return tickets;
        }

        return tickets
            .into_iter()
            .filter(|t| !t.group_id.as_ref().is_some_and(|g| claimed.contains(g)))
            .collect();
    }

    let target: HashSet<&String> = view.tech_group_ids.iter().collect();
    tickets
        .into_iter()
        .filter(|t| t.group_id.as_ref().is_some_and(|g| target.contains(g)))
        .collect()
}

/// Keep tickets assigned to a specific agent.
///
/// An absent, empty, or non-numeric id passes everything through unchanged.
pub fn filter_by_agent(tickets: Vec<Ticket>, agent_id: Option<&str>) -> Vec<Ticket> {
    let Some(raw) = agent_id.map(str::trim).filter(|s| !s.is_empty()) else {
        return tickets;
    };

    let Ok(wanted) = raw.parse::<i64>() else {
        return tickets;
    };

    tickets
        .into_iter()
        .filter(|t| {
            t.responder_id
                .as_deref()
                .and_then(|id| id.parse::<i64>().ok())
                .is_some_and(|id| id == wanted)
        })
        .collect()
}
