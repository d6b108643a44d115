//! Beacon engine - the cache-and-classify core behind The Beacon dashboard
//!
//! A read-through caching layer in front of the SuperOps helpdesk API plus
//! the deterministic classification that turns tickets into the four
//! dashboard sections. The web layer constructs a [`CacheManager`] over a
//! [`SuperOpsClient`] at startup, then per request: fetch tickets, narrow
//! with the view/agent filters, and classify.
//!
//! Everything the web layer calls is total: remote failures resolve to stale
//! or empty data, malformed timestamps render as "N/A", and malformed filter
//! input degrades to a no-op filter.

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod sections;

pub use cache::CacheManager;
pub use client::{SuperOpsClient, TicketSource};
pub use config::Config;
pub use error::{ApiError, ConfigError, Error, Result};
pub use models::{Derived, SlaClass, TechnicianMap, Ticket};
pub use sections::{SectionRules, Sections, classify, filter_by_agent, filter_by_view};
