//! Browser panel orchestration: turns user actions into remote requests and
//! applies replies to the address bar and listing.

mod effect;
mod orchestrator;

pub use effect::{BrowserEffect, BrowserPhase, ConfirmationPrompt, TransferJob};
pub use orchestrator::BrowserOrchestrator;
