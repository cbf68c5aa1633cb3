//! Starfork GitHub infrastructure adapter.
//!
//! Implements the collection-facing traits defined in the [`verification`]
//! crate ([`verification::RepositorySnapshotSource`] and
//! [`verification::CollectionPageSource`]) over GitHub's public APIs:
//!
//! - the **GraphQL API** for the bulk query (`stargazers(last: N)` and
//!   `forks(last: N)` with their total counts);
//! - the **REST API** for paginated reads of the stargazer and fork lists
//!   used by the fallback scan.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** This crate must not contain domain rules. All GitHub
//! API details (endpoints, media types, authentication headers, response
//! shapes, error bodies) are handled here; the [`verification`] crate never
//! sees them.
//!
//! ## Error mapping
//!
//! | Condition | Error |
//! |-----------|-------|
//! | Connection failure | [`verification::VerificationError::Network`] |
//! | Client timeout elapsed | [`verification::VerificationError::Timeout`] |
//! | Body not valid JSON / wrong shape | [`verification::VerificationError::Decode`] |
//! | `message` field, GraphQL `errors`, or non-2xx status | [`verification::VerificationError::Api`] |

mod client;
mod wire;

pub use client::{GithubClient, GithubSettings};
