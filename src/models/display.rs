//! SLA and relative-time display computation
//!
//! Everything here is total: unparseable or missing timestamps render as
//! "N/A" (or fall through to the next SLA rule), never as an error.

use chrono::{DateTime, NaiveDateTime, TimeDelta, TimeZone, Utc};

use super::ticket::{Derived, SlaClass, Ticket};

/// Fallback patterns for sources that drop the timezone suffix
const NAIVE_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Parse a timestamp string into a UTC datetime.
///
/// Accepts RFC 3339 (trailing `Z` or explicit offset); naive fallback forms
/// are assumed UTC. Returns `None` for anything else.
pub fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    None
}

/// Render an elapsed-time delta as "2h ago" style text.
///
/// Negative deltas (clock skew, future timestamps) render as "Just now".
fn friendly_delta(delta: TimeDelta) -> String {
    let total_seconds = delta.num_seconds();
    if total_seconds < 0 {
        return "Just now".to_string();
    }

    let minutes = total_seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;

    if days > 0 {
        if days <= 30 {
            format!("{}d ago", days)
        } else {
            format!("{}mo ago", days / 30)
        }
    } else if hours > 0 {
        format!("{}h ago", hours)
    } else if minutes > 0 {
        format!("{}m ago", minutes)
    } else {
        "Just now".to_string()
    }
}

/// Render ticket age in whole days
fn days_old(delta: TimeDelta) -> String {
    match delta.num_days() {
        0 => "Today".to_string(),
        1 => "1 day".to_string(),
        days => format!("{} days", days),
    }
}

/// SLA status text and class, evaluated in rule order, first match wins
fn sla_status(ticket: &Ticket, now: DateTime<Utc>) -> (String, SlaClass) {
    let has_first_response = ticket.has_first_response();

    // Already responded and resolution still inside SLA
    if has_first_response && !ticket.resolution_violated {
        return (ticket.status_text.clone(), SlaClass::Responded);
    }

    if ticket.first_response_violated || ticket.resolution_violated {
        return ("SLA Violated".to_string(), SlaClass::Overdue);
    }

    // Countdown to the first-response deadline
    if !has_first_response
        && let Some(due) = ticket.fr_due_by_str.as_deref().and_then(parse_datetime)
    {
        let remaining_secs = (due - now).num_seconds();
        return if remaining_secs < 0 {
            ("FR Overdue".to_string(), SlaClass::Overdue)
        } else if remaining_secs < 30 * 60 {
            ("FR Critical".to_string(), SlaClass::Critical)
        } else if remaining_secs < 120 * 60 {
            ("FR Warning".to_string(), SlaClass::Warning)
        } else {
            ("FR OK".to_string(), SlaClass::Normal)
        };
    }

    (ticket.status_text.clone(), SlaClass::None)
}

impl Derived {
    /// Compute all display fields for a ticket at the given instant
    pub fn compute(ticket: &Ticket, now: DateTime<Utc>) -> Self {
        let updated_friendly = ticket
            .updated_at_str
            .as_deref()
            .and_then(parse_datetime)
            .map(|updated| friendly_delta(now - updated))
            .unwrap_or_else(|| "N/A".to_string());

        let created_days_old = ticket
            .created_at_str
            .as_deref()
            .and_then(parse_datetime)
            .map(|created| days_old(now - created))
            .unwrap_or_else(|| "N/A".to_string());

        let (sla_text, sla_class) = sla_status(ticket, now);

        Self {
            sla_text,
            sla_class,
            updated_friendly,
            created_days_old,
        }
    }
}

/// Recompute a ticket's derived fields in place
pub fn enrich(ticket: &mut Ticket, now: DateTime<Utc>) {
    ticket.derived = Derived::compute(ticket, now);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn ticket_with(updated: Option<String>, created: Option<String>) -> Ticket {
        Ticket {
            status_text: "Open".to_string(),
            updated_at_str: updated,
            created_at_str: created,
            ..Ticket::default()
        }
    }

    fn iso(dt: DateTime<Utc>) -> String {
        dt.to_rfc3339()
    }

    #[test]
    fn test_parse_rfc3339_with_z_suffix() {
        let dt = parse_datetime("2025-03-01T10:30:00Z").unwrap();
        assert_eq!(dt.to_rfc3339(), "2025-03-01T10:30:00+00:00");
    }

    #[test]
    fn test_parse_explicit_offset_normalizes_to_utc() {
        let dt = parse_datetime("2025-03-01T12:30:00+02:00").unwrap();
        assert_eq!(dt.to_rfc3339(), "2025-03-01T10:30:00+00:00");
    }

    #[test]
    fn test_parse_naive_fallback_formats() {
        assert!(parse_datetime("2025-03-01T10:30:00").is_some());
        assert!(parse_datetime("2025-03-01 10:30:00").is_some());
        assert!(parse_datetime("2025-03-01T10:30:00.123").is_some());
    }

    #[test]
    fn test_parse_garbage_returns_none() {
        assert!(parse_datetime("").is_none());
        assert!(parse_datetime("yesterday").is_none());
        assert!(parse_datetime("2025-13-45T99:99:99").is_none());
    }

    #[test]
    fn test_updated_friendly_buckets() {
        let now = Utc::now();

        let cases = [
            (Duration::seconds(20), "Just now"),
            (Duration::minutes(5), "5m ago"),
            (Duration::minutes(90), "1h ago"),
            (Duration::hours(23), "23h ago"),
            (Duration::days(3), "3d ago"),
            (Duration::days(30), "30d ago"),
            (Duration::days(90), "3mo ago"),
        ];

        for (age, expected) in cases {
            let ticket = ticket_with(Some(iso(now - age)), None);
            let derived = Derived::compute(&ticket, now);
            assert_eq!(derived.updated_friendly, expected, "age {:?}", age);
        }
    }

    #[test]
    fn test_future_update_renders_just_now() {
        let now = Utc::now();
        let ticket = ticket_with(Some(iso(now + Duration::minutes(10))), None);

        let derived = Derived::compute(&ticket, now);
        assert_eq!(derived.updated_friendly, "Just now");
    }

    #[test]
    fn test_missing_or_bad_timestamps_render_na() {
        let now = Utc::now();

        let derived = Derived::compute(&ticket_with(None, None), now);
        assert_eq!(derived.updated_friendly, "N/A");
        assert_eq!(derived.created_days_old, "N/A");

        let bad = ticket_with(Some("not-a-date".to_string()), Some("nope".to_string()));
        let derived = Derived::compute(&bad, now);
        assert_eq!(derived.updated_friendly, "N/A");
        assert_eq!(derived.created_days_old, "N/A");
    }

    #[test]
    fn test_created_days_old_wording() {
        let now = Utc::now();

        let cases = [
            (Duration::hours(2), "Today"),
            (Duration::days(1), "1 day"),
            (Duration::days(5), "5 days"),
        ];

        for (age, expected) in cases {
            let ticket = ticket_with(None, Some(iso(now - age)));
            let derived = Derived::compute(&ticket, now);
            assert_eq!(derived.created_days_old, expected, "age {:?}", age);
        }
    }

    #[test]
    fn test_sla_responded_when_first_response_exists() {
        let now = Utc::now();
        let mut ticket = ticket_with(None, None);
        ticket.status_text = "In Progress".to_string();
        ticket.first_responded_at_iso = Some(iso(now - Duration::hours(1)));

        let derived = Derived::compute(&ticket, now);
        assert_eq!(derived.sla_text, "In Progress");
        assert_eq!(derived.sla_class, SlaClass::Responded);
    }

    #[test]
    fn test_sla_violated_beats_countdown() {
        let now = Utc::now();
        let mut ticket = ticket_with(None, None);
        ticket.first_response_violated = true;
        ticket.fr_due_by_str = Some(iso(now + Duration::hours(4)));

        let derived = Derived::compute(&ticket, now);
        assert_eq!(derived.sla_text, "SLA Violated");
        assert_eq!(derived.sla_class, SlaClass::Overdue);
    }

    #[test]
    fn test_responded_but_resolution_violated_is_violated() {
        let now = Utc::now();
        let mut ticket = ticket_with(None, None);
        ticket.first_responded_at_iso = Some(iso(now - Duration::hours(2)));
        ticket.resolution_violated = true;

        let derived = Derived::compute(&ticket, now);
        assert_eq!(derived.sla_text, "SLA Violated");
        assert_eq!(derived.sla_class, SlaClass::Overdue);
    }

    #[test]
    fn test_first_response_countdown_buckets() {
        let now = Utc::now();

        let cases = [
            (Duration::minutes(-5), "FR Overdue", SlaClass::Overdue),
            (Duration::minutes(20), "FR Critical", SlaClass::Critical),
            (Duration::minutes(90), "FR Warning", SlaClass::Warning),
            (Duration::hours(4), "FR OK", SlaClass::Normal),
        ];

        for (remaining, text, class) in cases {
            let mut ticket = ticket_with(None, None);
            ticket.fr_due_by_str = Some(iso(now + remaining));

            let derived = Derived::compute(&ticket, now);
            assert_eq!(derived.sla_text, text, "remaining {:?}", remaining);
            assert_eq!(derived.sla_class, class);
        }
    }

    #[test]
    fn test_no_deadline_falls_back_to_status() {
        let now = Utc::now();
        let mut ticket = ticket_with(None, None);
        ticket.status_text = "Pending".to_string();

        let derived = Derived::compute(&ticket, now);
        assert_eq!(derived.sla_text, "Pending");
        assert_eq!(derived.sla_class, SlaClass::None);
    }
}
