//! Helpers: the four message-handling strategies the router dispatches to.
//!
//! Each helper consumes the user message plus a mutable borrow of the
//! [`Blackboard`](crate::blackboard::Blackboard) and produces a response
//! string. Missing-context and not-found conditions are soft (an
//! explanatory `Ok(String)`); only internal faults surface as `Err`, which
//! the router converts into a soft error at its boundary.

pub mod document;
pub mod general;
pub mod tabular;
pub mod web;

pub use document::DocumentHelper;
pub use general::GeneralHelper;
pub use tabular::TabularHelper;
pub use web::WebHelper;
