//! Ticket-to-section classification
//!
//! Maps enriched tickets onto the four dashboard sections using the
//! configured status rules. The precedence is fixed: needs-agent wins, then
//! open, then customer-replied, and everything left lands in other-active.

pub mod filters;

#[allow(unused_imports)]
pub use filters::{filter_by_agent, filter_by_view};

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::{SectionConfig, StatusMapping};
use crate::models::display;
use crate::models::Ticket;

/// Classification rules for one section, statuses lowercased
#[derive(Debug, Clone, Default)]
pub struct SectionRule {
    pub statuses: HashSet<String>,
    pub include_no_first_response: bool,
    pub include_unassigned: bool,
    pub include_sla_violated: bool,
}

impl SectionRule {
    fn from_config(config: &SectionConfig) -> Self {
        Self {
            statuses: config.statuses.iter().map(|s| s.to_lowercase()).collect(),
            include_no_first_response: config.include_no_first_response,
            include_unassigned: config.include_unassigned,
            include_sla_violated: config.include_sla_violated,
        }
    }

    fn contains(&self, status: &str) -> bool {
        self.statuses.contains(status)
    }
}

/// All four section rules, built once from the config mapping
#[derive(Debug, Clone, Default)]
pub struct SectionRules {
    pub open: SectionRule,
    pub customer_replied: SectionRule,
    pub needs_agent: SectionRule,
    pub other_active: SectionRule,
}

impl SectionRules {
    /// Lowercase every configured status once up front
    pub fn from_mapping(mapping: &StatusMapping) -> Self {
        Self {
            open: SectionRule::from_config(&mapping.open),
            customer_replied: SectionRule::from_config(&mapping.customer_replied),
            needs_agent: SectionRule::from_config(&mapping.needs_agent),
            other_active: SectionRule::from_config(&mapping.other_active),
        }
    }
}

/// The four dashboard sections, in display order
#[derive(Debug, Clone, Default, Serialize)]
pub struct Sections {
    /// Open / unresponded tickets
    pub open: Vec<Ticket>,

    /// Tickets awaiting an agent after a customer reply
    pub customer_replied: Vec<Ticket>,

    /// SLA-violated tickets and explicitly flagged statuses
    pub needs_agent: Vec<Ticket>,

    /// Everything else still active
    pub other_active: Vec<Ticket>,
}

impl Sections {
    /// Total tickets across all four sections
    pub fn total(&self) -> usize {
        self.open.len() + self.customer_replied.len() + self.needs_agent.len()
            + self.other_active.len()
    }
}

/// Classify tickets into the four sections as of now
pub fn classify(tickets: Vec<Ticket>, rules: &SectionRules) -> Sections {
    classify_at(tickets, rules, Utc::now())
}

/// Classify at an explicit instant.
///
/// Each ticket's derived fields are recomputed first, then the precedence
/// rules run, first match wins. Tickets keep their input order within each
/// section.
pub fn classify_at(tickets: Vec<Ticket>, rules: &SectionRules, now: DateTime<Utc>) -> Sections {
    let mut sections = Sections::default();

    for mut ticket in tickets {
        display::enrich(&mut ticket, now);

        let status = ticket.status_lower();
        let in_customer_replied = rules.customer_replied.contains(&status);

        if (rules.needs_agent.include_sla_violated && ticket.is_sla_violated())
            || rules.needs_agent.contains(&status)
        {
            sections.needs_agent.push(ticket);
        } else if rules.open.contains(&status)
            || (rules.open.include_no_first_response
                && !ticket.has_first_response()
                && !in_customer_replied)
            || (rules.open.include_unassigned && ticket.is_unassigned() && !in_customer_replied)
        {
            sections.open.push(ticket);
        } else if in_customer_replied {
            sections.customer_replied.push(ticket);
        } else {
            // Configured other-active statuses and the unconditional catch-all
            sections.other_active.push(ticket);
        }
    }

    sections
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> SectionRules {
        SectionRules::from_mapping(&StatusMapping::default())
    }

    fn ticket(id: &str, status: &str) -> Ticket {
        Ticket {
            ticket_id: Some(id.to_string()),
            status_text: status.to_string(),
            // Responded and assigned so the open-section switches stay quiet
            first_responded_at_iso: Some("2025-03-01T10:00:00Z".to_string()),
            agent_name: Some("Ada".to_string()),
            ..Ticket::default()
        }
    }

    fn ids(section: &[Ticket]) -> Vec<String> {
        section.iter().filter_map(|t| t.ticket_id.clone()).collect()
    }

    #[test]
    fn test_sla_violated_lands_in_needs_agent_regardless_of_status() {
        let mut t = ticket("1", "In Progress");
        t.resolution_violated = true;

        let sections = classify(vec![t], &rules());
        assert_eq!(ids(&sections.needs_agent), vec!["1"]);
        assert!(sections.other_active.is_empty());
    }

    #[test]
    fn test_needs_agent_status_match() {
        let sections = classify(vec![ticket("1", "Pending")], &rules());
        assert_eq!(ids(&sections.needs_agent), vec!["1"]);
    }

    #[test]
    fn test_open_status_match() {
        let sections = classify(vec![ticket("1", "Open")], &rules());
        assert_eq!(ids(&sections.open), vec!["1"]);
    }

    #[test]
    fn test_status_matching_is_case_insensitive() {
        let sections = classify(vec![ticket("1", "OPEN"), ticket("2", "customer reply")], &rules());
        assert_eq!(ids(&sections.open), vec!["1"]);
        assert_eq!(ids(&sections.customer_replied), vec!["2"]);
    }

    #[test]
    fn test_no_first_response_pulls_into_open() {
        let mut t = ticket("1", "In Progress");
        t.first_responded_at_iso = None;

        let sections = classify(vec![t], &rules());
        assert_eq!(ids(&sections.open), vec!["1"]);
    }

    #[test]
    fn test_customer_replied_status_beats_no_first_response() {
        let mut t = ticket("1", "Customer Reply");
        t.first_responded_at_iso = None;

        let sections = classify(vec![t], &rules());
        assert_eq!(ids(&sections.customer_replied), vec!["1"]);
        assert!(sections.open.is_empty());
    }

    #[test]
    fn test_unassigned_pulls_into_open() {
        let mut t = ticket("1", "In Progress");
        t.agent_name = None;

        let sections = classify(vec![t], &rules());
        assert_eq!(ids(&sections.open), vec!["1"]);
    }

    #[test]
    fn test_unknown_status_falls_through_to_other_active() {
        let sections = classify(vec![ticket("1", "Waiting On Vendor")], &rules());
        assert_eq!(ids(&sections.other_active), vec!["1"]);
    }

    #[test]
    fn test_other_active_status_match() {
        let sections = classify(vec![ticket("1", "On Hold")], &rules());
        assert_eq!(ids(&sections.other_active), vec!["1"]);
    }

    #[test]
    fn test_section_order_is_input_order() {
        let tickets = vec![ticket("3", "Open"), ticket("1", "Open"), ticket("2", "Open")];

        let sections = classify(tickets, &rules());
        assert_eq!(ids(&sections.open), vec!["3", "1", "2"]);
    }

    #[test]
    fn test_derived_fields_are_recomputed() {
        let mut t = ticket("1", "Open");
        t.derived.sla_text = "stale".to_string();

        let sections = classify(vec![t], &rules());
        assert_eq!(sections.open[0].derived.sla_text, "Open");
        assert_eq!(sections.open[0].derived.updated_friendly, "N/A");
    }

    #[test]
    fn test_total_counts_all_sections() {
        let tickets = vec![
            ticket("1", "Open"),
            ticket("2", "Pending"),
            ticket("3", "Customer Reply"),
            ticket("4", "On Hold"),
        ];

        let sections = classify(tickets, &rules());
        assert_eq!(sections.total(), 4);
    }
}
