//! Normalized ticket record and its derived display fields

use std::collections::BTreeMap;

use serde::Serialize;

use crate::client::models::RawTicket;

/// Technician user id mapped to display name
pub type TechnicianMap = BTreeMap<String, String>;

/// CSS class driving the SLA cell styling
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum SlaClass {
    #[serde(rename = "sla-responded")]
    Responded,

    #[serde(rename = "sla-overdue")]
    Overdue,

    #[serde(rename = "sla-critical")]
    Critical,

    #[serde(rename = "sla-warning")]
    Warning,

    #[serde(rename = "sla-normal")]
    Normal,

    #[default]
    #[serde(rename = "sla-none")]
    None,
}

impl SlaClass {
    /// The CSS class string used by the web layer
    pub fn as_str(&self) -> &'static str {
        match self {
            SlaClass::Responded => "sla-responded",
            SlaClass::Overdue => "sla-overdue",
            SlaClass::Critical => "sla-critical",
            SlaClass::Warning => "sla-warning",
            SlaClass::Normal => "sla-normal",
            SlaClass::None => "sla-none",
        }
    }
}

/// Display fields derived from the raw timestamps and SLA flags.
///
/// Never read from the remote source; always recomputed before
/// classification.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Derived {
    /// SLA cell text, e.g. "FR Critical" or the plain status
    pub sla_text: String,

    /// SLA cell styling class
    pub sla_class: SlaClass,

    /// "2h ago" style rendering of the last update
    pub updated_friendly: String,

    /// "5 days" style rendering of the ticket age
    pub created_days_old: String,
}

/// Normalized ticket record.
///
/// Source fields are immutable after normalization; only [`Ticket::derived`]
/// changes afterwards, and only via a full recompute.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Ticket {
    /// Human-facing display code, e.g. "TKT-104"
    pub id: Option<String>,

    /// Internal id used for API lookups and the conversation cache key
    pub ticket_id: Option<String>,

    pub subject: String,

    /// Free-form status; matched case-insensitively everywhere
    pub status_text: String,

    pub priority_text: String,

    /// Priority ordinal 0-4 for sorting; unknown text maps to 0
    pub priority_raw: u8,

    /// Assigned technician; both `None` means unassigned
    pub agent_name: Option<String>,
    pub responder_id: Option<String>,

    pub requester_name: String,
    pub client_name: Option<String>,

    pub group_id: Option<String>,
    pub group_name: Option<String>,

    pub request_type: Option<String>,

    pub created_at_str: Option<String>,
    pub updated_at_str: Option<String>,
    pub fr_due_by_str: Option<String>,
    pub first_responded_at_iso: Option<String>,
    pub due_by_str: Option<String>,
    pub resolution_time: Option<String>,

    pub first_response_violated: bool,
    pub resolution_violated: bool,

    pub sla_name: Option<String>,

    /// Display fields; default-empty until the classifier recomputes them
    pub derived: Derived,
}

/// Drop empty strings so "missing" has a single representation
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

impl Ticket {
    /// Normalize a raw wire record into the engine's ticket type.
    ///
    /// Missing nested objects coalesce to empty; the priority vocabulary maps
    /// onto ordinals 0-4 with unknown text defaulting to 0.
    pub fn from_raw(raw: RawTicket) -> Self {
        let technician = raw.technician.unwrap_or_default();
        let requester = raw.requester.unwrap_or_default();
        let client = raw.client.unwrap_or_default();
        let tech_group = raw.tech_group.unwrap_or_default();
        let sla = raw.sla.unwrap_or_default();

        let priority_text = non_empty(raw.priority).unwrap_or_else(|| "N/A".to_string());
        let priority_raw = match priority_text.as_str() {
            "Very Low" => 0,
            "Low" => 1,
            "Medium" => 2,
            "High" => 3,
            "Critical" | "Urgent" => 4,
            _ => 0,
        };

        Self {
            id: raw.display_id,
            ticket_id: raw.ticket_id,
            subject: non_empty(raw.subject).unwrap_or_else(|| "No Subject".to_string()),
            status_text: non_empty(raw.status).unwrap_or_else(|| "Unknown".to_string()),
            priority_text,
            priority_raw,
            agent_name: non_empty(technician.name),
            responder_id: technician.user_id,
            requester_name: non_empty(requester.name).unwrap_or_else(|| "Unknown".to_string()),
            client_name: non_empty(client.name),
            group_id: tech_group.group_id,
            group_name: non_empty(tech_group.name),
            request_type: non_empty(raw.request_type),
            created_at_str: non_empty(raw.created_time),
            updated_at_str: non_empty(raw.updated_time),
            fr_due_by_str: non_empty(raw.first_response_due_time),
            first_responded_at_iso: non_empty(raw.first_response_time),
            due_by_str: non_empty(raw.resolution_due_time),
            resolution_time: non_empty(raw.resolution_time),
            first_response_violated: raw.first_response_violated,
            resolution_violated: raw.resolution_violated,
            sla_name: non_empty(sla.name),
            derived: Derived::default(),
        }
    }

    /// Lowercased status for rule matching
    pub fn status_lower(&self) -> String {
        self.status_text.to_lowercase()
    }

    /// Whether an agent has responded at least once
    pub fn has_first_response(&self) -> bool {
        self.first_responded_at_iso.is_some()
    }

    /// Either SLA deadline blown
    pub fn is_sla_violated(&self) -> bool {
        self.first_response_violated || self.resolution_violated
    }

    /// No technician assigned
    pub fn is_unassigned(&self) -> bool {
        self.agent_name.is_none()
    }
}
