//! Engine-facing ticket model
//!
//! [`Ticket`] is the fixed record the rest of the engine works with: raw wire
//! records are normalized into it exactly once, and the [`Derived`] display
//! fields are recomputed from the raw timestamp strings on every
//! classification pass.

pub mod display;
pub mod ticket;

pub use display::parse_datetime;
pub use ticket::{Derived, SlaClass, TechnicianMap, Ticket};
