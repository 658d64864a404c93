//! Plan domain types
//!
//! Request fields, response splitting, and single-submission session state.

mod request;
mod session;
mod splitter;

pub use request::PlanRequest;
pub use session::PlanSession;
pub use splitter::{ParsedPlans, SESSION_PLANS_MARKER, SplitWarning, split_response};
