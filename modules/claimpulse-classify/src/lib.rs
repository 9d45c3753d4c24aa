//! OpenRouter-backed implementation of the `ClaimClassifier` trait.
//!
//! One chat-completions call per claim, strict-JSON prompting, response
//! parsed into `ClaimEnrichment`. The graph layer never sees HTTP; it
//! talks to the trait defined in claimpulse-common.

mod client;
mod prompt;

pub use client::OpenRouterClassifier;
