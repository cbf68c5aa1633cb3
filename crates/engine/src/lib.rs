//! Starfork verification engine.
//!
//! This crate provides the [`Verifier`], which runs the bulk query, scans the
//! returned edges, falls back to the paginated [`FallbackScanner`] when a
//! collection overflows the bulk window, and composes the final
//! [`verification::VerificationOutcome`].
//!
//! ## Architectural Layer
//!
//! **Orchestration layer.** The engine sequences calls between business logic
//! in the [`verification`] crate and the infrastructure traits it defines
//! (snapshot source, page source, account generator). The domain rules
//! themselves stay in [`verification`].
//!
//! ## Concurrency
//!
//! The bulk path is sequential. The fallback spawns one tokio task per page,
//! bounded by a semaphore, each fetch under its own timeout. Tasks share one
//! atomic result cell and a cancellation token that is fired on the first
//! match.

pub mod fallback;
pub mod verifier;

pub use fallback::{FallbackScanner, FallbackSettings, PageStatus, PageTask, SharedOutcome};
pub use verifier::{Verifier, VerifierSettings};
