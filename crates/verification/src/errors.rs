//! Error type for the verification domain.
//!
//! [`VerificationError`] covers both technical failures (transport, decoding,
//! remote API errors) and the two domain verdicts, [`VerificationError::NotStarred`]
//! and [`VerificationError::NotForked`]. Verdicts are the normal negative
//! outcome of a run, not faults; [`VerificationError::is_verdict`] lets the
//! top-level caller tell them apart when choosing an exit status.

use std::time::Duration;

use thiserror::Error;

use crate::{EdgeKind, Login, RepositoryRef};

/// Errors produced while verifying membership.
#[derive(Debug, Error)]
pub enum VerificationError {
    /// Caller input is missing or invalid (e.g. empty username).
    #[error("Invalid input: {message}")]
    Input { message: String },

    /// The transport failed before a response was received.
    #[error("Network error: {message}, please check that the GitHub API is reachable")]
    Network { message: String },

    /// A single remote call did not complete within its deadline.
    #[error("Request timed out after {after:?}")]
    Timeout { after: Duration },

    /// The response body could not be decoded.
    #[error("Decode error: {message}")]
    Decode { message: String },

    /// The remote reported an error instead of data.
    #[error("Query failed: {message}")]
    Api { message: String },

    /// An edge URL does not follow the expected structure for its kind.
    #[error("Malformed {kind} edge URL '{url}'")]
    MalformedEdge { kind: EdgeKind, url: String },

    /// The target is not a stargazer of the repository.
    #[error("{login}, please star and fork github.com/{repository}")]
    NotStarred {
        login: Login,
        repository: RepositoryRef,
    },

    /// The target starred but has not forked the repository.
    #[error("{login}, please fork github.com/{repository}")]
    NotForked {
        login: Login,
        repository: RepositoryRef,
    },

    /// Some fallback pages could not be read and no readable page contained
    /// the target, so membership is undetermined.
    #[error(
        "Could not read {} of {total_pages} {kind} pages (pages {failed_pages:?}); membership is undetermined",
        .failed_pages.len()
    )]
    PartialFailure {
        kind: EdgeKind,
        failed_pages: Vec<u64>,
        total_pages: u64,
    },

    /// The account generator failed to produce key material.
    #[error("Account generation failed: {message}")]
    AccountGeneration { message: String },
}

impl VerificationError {
    /// Returns `true` for the domain verdicts (`NotStarred`, `NotForked`).
    pub fn is_verdict(&self) -> bool {
        matches!(
            self,
            VerificationError::NotStarred { .. } | VerificationError::NotForked { .. }
        )
    }
}
