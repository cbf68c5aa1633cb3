//! Membership-verification domain for Starfork.
//!
//! This crate holds every domain concept used to decide whether a GitHub user
//! has starred and forked a repository: identifiers, value types, the error
//! type, the bulk query builder, the membership scanner, overflow and
//! pagination arithmetic, and the port traits that infrastructure crates
//! implement.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; the `github` and `account` crates define *how*
//! to supply it, and the `engine` crate sequences the calls.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`Login`, `PageNumber`, `RunId`, etc.) |
//! | [`types`] | Snapshot, request, verdict, and output record types |
//! | [`errors`] | [`VerificationError`] |
//! | [`query`] | Bulk GraphQL query builder |
//! | [`scanner`] | Edge URL parsing and first-match membership scan |
//! | [`pagination`] | Surplus detection and fallback page arithmetic |
//! | [`ports`] | Traits implemented by infrastructure crates |

pub mod errors;
pub mod identifiers;
pub mod pagination;
pub mod ports;
pub mod query;
pub mod scanner;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use errors::VerificationError;
pub use identifiers::{ContractAddress, Login, PageNumber, RepositoryRef, RunId};
pub use pagination::{fallback_pages, page_count, surplus};
pub use ports::{AccountGenerator, CollectionPageSource, RepositorySnapshotSource};
pub use query::build_bulk_query;
pub use scanner::{contains_target, extract_login};
pub use types::{
    AccountRecord, CollectionSnapshot, Edge, EdgeKind, ForkCheck, ForkCheckPolicy,
    GeneratedAccount, Membership, PageSize, RepositoryQuerySnapshot, VerdictSource,
    VerificationOutcome, VerificationRequest, WindowSize,
};
