//! Raw wire records returned by the SuperOps API
//!
//! These mirror the GraphQL response shapes. Id scalars arrive as either JSON
//! numbers or strings depending on the tenant, so they are normalized to
//! strings during deserialization. Everything else stays optional until
//! normalization into the engine's `Ticket` type.

use serde::{Deserialize, Deserializer};

/// One page of a listing query
#[derive(Debug, Clone)]
pub struct Page<T> {
    /// Records on this page
    pub items: Vec<T>,

    /// Whether the source reports more pages after this one
    pub has_more: bool,
}

/// Id scalars come back as numbers or strings depending on the field
#[derive(Deserialize)]
#[serde(untagged)]
enum IdScalar {
    Str(String),
    Num(i64),
}

/// Deserialize an optional id scalar into a non-empty string
fn de_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<IdScalar>::deserialize(deserializer)?;
    Ok(value
        .map(|id| match id {
            IdScalar::Str(s) => s,
            IdScalar::Num(n) => n.to_string(),
        })
        .filter(|s| !s.is_empty()))
}

/// Raw ticket record from `getTicketList`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawTicket {
    #[serde(deserialize_with = "de_opt_id")]
    pub ticket_id: Option<String>,

    #[serde(deserialize_with = "de_opt_id")]
    pub display_id: Option<String>,

    pub subject: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,

    pub technician: Option<RawUserRef>,
    pub requester: Option<RawUserRef>,
    pub client: Option<RawClientRef>,
    pub tech_group: Option<RawGroupRef>,
    pub sla: Option<RawSlaRef>,

    pub created_time: Option<String>,
    pub updated_time: Option<String>,
    pub first_response_due_time: Option<String>,
    pub first_response_time: Option<String>,
    pub first_response_violated: bool,
    pub resolution_due_time: Option<String>,
    pub resolution_time: Option<String>,
    pub resolution_violated: bool,

    pub request_type: Option<String>,
}

/// Embedded user reference (technician or requester)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawUserRef {
    #[serde(deserialize_with = "de_opt_id")]
    pub user_id: Option<String>,

    pub name: Option<String>,
}

/// Embedded client (account) reference
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawClientRef {
    pub name: Option<String>,
}

/// Embedded tech group reference
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawGroupRef {
    #[serde(deserialize_with = "de_opt_id")]
    pub group_id: Option<String>,

    pub name: Option<String>,
}

/// Embedded SLA reference
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawSlaRef {
    pub name: Option<String>,
}

/// Raw technician record from `getTechnicianList`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawTechnician {
    #[serde(deserialize_with = "de_opt_id")]
    pub user_id: Option<String>,

    pub name: Option<String>,
}

/// A single conversation entry on a ticket, oldest first
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConversationEvent {
    /// Author kind, e.g. "REQUESTER" or "TECHNICIAN"
    #[serde(rename = "type")]
    pub event_type: Option<String>,
}

impl ConversationEvent {
    /// Whether this entry was authored by the ticket requester
    pub fn is_requester_entry(&self) -> bool {
        self.event_type
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case("requester"))
    }
}
