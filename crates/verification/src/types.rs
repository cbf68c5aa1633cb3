//! Shared value types for the verification domain.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! values with invariants (window and page sizes are strictly positive) and
//! participate in the verification computation itself.

use serde::{Deserialize, Serialize};

use crate::{ContractAddress, Login, RunId, VerificationError};

// ---------------------------------------------------------------------------
// Sizes
// ---------------------------------------------------------------------------

/// Number of most-recent entries requested per collection by the bulk query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WindowSize(u64);

impl WindowSize {
    /// Creates a [`WindowSize`], returning `None` for zero.
    pub fn new(value: u64) -> Option<Self> {
        if value == 0 {
            None
        } else {
            Some(Self(value))
        }
    }

    /// Returns the underlying integer value.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for WindowSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Number of entries per page on the paginated collection transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PageSize(u64);

impl PageSize {
    /// Creates a [`PageSize`], returning `None` for zero.
    pub fn new(value: u64) -> Option<Self> {
        if value == 0 {
            None
        } else {
            Some(Self(value))
        }
    }

    /// Returns the underlying integer value.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for PageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Bulk snapshot
// ---------------------------------------------------------------------------

/// Which repository collection an edge or page belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Users who starred the repository.
    Stargazer,
    /// Users who forked the repository.
    Forker,
}

impl std::fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EdgeKind::Stargazer => f.write_str("stargazer"),
            EdgeKind::Forker => f.write_str("forker"),
        }
    }
}

/// One entry of a bulk collection, carrying the URL of the associated node.
///
/// Stargazer nodes are user profiles (`https://github.com/alice`); forker
/// nodes are the forked repositories (`https://github.com/bob/AnnChain`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub node_url: String,
}

impl Edge {
    pub fn new(node_url: impl Into<String>) -> Self {
        Self {
            node_url: node_url.into(),
        }
    }
}

/// The bulk view of one collection: its true size plus the most recent edges.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSnapshot {
    /// True population of the collection as reported by the remote.
    pub total_count: u64,
    /// Up to one window's worth of the most recent edges, in remote order.
    pub edges: Vec<Edge>,
}

/// Result of the single bulk query issued per run. Immutable once produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryQuerySnapshot {
    pub stargazers: CollectionSnapshot,
    pub forks: CollectionSnapshot,
}

impl RepositoryQuerySnapshot {
    /// Returns the collection matching `kind`.
    pub fn collection(&self, kind: EdgeKind) -> &CollectionSnapshot {
        match kind {
            EdgeKind::Stargazer => &self.stargazers,
            EdgeKind::Forker => &self.forks,
        }
    }
}

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Parameters of one verification run. Read-only once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationRequest {
    pub target: Login,
    pub bulk_window: WindowSize,
    pub page_size: PageSize,
}

impl VerificationRequest {
    /// Builds a request from caller input.
    ///
    /// # Errors
    ///
    /// Returns [`VerificationError::Input`] if `target` is empty or only
    /// whitespace.
    pub fn new(
        target: &str,
        bulk_window: WindowSize,
        page_size: PageSize,
    ) -> Result<Self, VerificationError> {
        let target = Login::new(target.trim()).ok_or_else(|| VerificationError::Input {
            message: "a GitHub username is required".to_string(),
        })?;
        Ok(Self {
            target,
            bulk_window,
            page_size,
        })
    }
}

// ---------------------------------------------------------------------------
// Verdicts
// ---------------------------------------------------------------------------

/// Which fetch strategy established a membership verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictSource {
    /// Decided from the bulk query's edges alone.
    BulkWindow,
    /// Decided by the paginated fallback over the surplus.
    Fallback,
}

/// Membership verdict for one collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub found: bool,
    pub source: VerdictSource,
}

/// How the forker requirement was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForkCheck {
    /// Forks were scanned and the target was found.
    Verified(Membership),
    /// Forks were not scanned because the stargazer verdict came from the
    /// fallback path (see [`ForkCheckPolicy::SkipAfterStargazerFallback`]).
    SkippedAfterStargazerFallback,
}

/// Whether the fork check runs after a stargazer verdict.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForkCheckPolicy {
    /// Skip the fork check and treat it as satisfied whenever the stargazer
    /// verdict needed the paginated fallback.
    ///
    /// Trades completeness for speed. Pending product-owner confirmation.
    #[default]
    SkipAfterStargazerFallback,
    /// Always scan forks.
    Always,
}

impl ForkCheckPolicy {
    /// Returns `true` if forks must be scanned given the stargazer verdict.
    pub fn requires_fork_check(self, stargazer: Membership) -> bool {
        match self {
            ForkCheckPolicy::Always => true,
            ForkCheckPolicy::SkipAfterStargazerFallback => {
                !(stargazer.found && stargazer.source == VerdictSource::Fallback)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Key material produced by an [`crate::AccountGenerator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedAccount {
    /// Hex-encoded private key, no `0x` prefix.
    pub private_key_hex: String,
    /// Hex-encoded address, no `0x` prefix.
    pub address_hex: String,
}

/// The record printed on successful verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub contract: ContractAddress,
    pub privkey: String,
    pub address: String,
}

impl AccountRecord {
    pub fn new(contract: ContractAddress, account: GeneratedAccount) -> Self {
        Self {
            contract,
            privkey: account.private_key_hex,
            address: account.address_hex,
        }
    }
}

/// Everything a successful run established.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationOutcome {
    pub run_id: RunId,
    pub stargazer: Membership,
    pub fork: ForkCheck,
    pub record: AccountRecord,
}
