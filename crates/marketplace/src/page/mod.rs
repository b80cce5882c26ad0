//! Headless pages.
//!
//! A page owns its view-model and reports everything the user should see on
//! an event channel; rendering is left to the caller.

mod events;
mod profile_page;
mod scope;

pub use events::{Notice, Operation, PageError, PageEvent};
pub use profile_page::{ProfilePage, SubmitOutcome};
pub use scope::{ScopeHandle, ViewScope};
