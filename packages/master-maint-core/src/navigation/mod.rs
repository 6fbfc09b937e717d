//! Confirmation-gated tab switching.

mod confirmation;
mod guard;

pub use confirmation::{ConfirmResponse, Confirmation};
pub use guard::{NavigationGuard, SwitchAttempt, SwitchOutcome, SwitchState};
