//! Port traits implemented by infrastructure crates.
//!
//! The domain states *what* it needs from the outside world. The `github`
//! crate supplies both collection sources; the `account` crate supplies the
//! generator. Every implementation receives its configuration at
//! construction time.

use async_trait::async_trait;

use crate::{
    EdgeKind, GeneratedAccount, Login, PageNumber, PageSize, RepositoryQuerySnapshot,
    VerificationError,
};

/// Issues the bulk query and decodes the result.
#[async_trait]
pub trait RepositorySnapshotSource: Send + Sync {
    /// Sends `query` once and returns the decoded snapshot.
    ///
    /// # Errors
    ///
    /// - [`VerificationError::Network`] / [`VerificationError::Timeout`] on transport failure.
    /// - [`VerificationError::Decode`] on a malformed body.
    /// - [`VerificationError::Api`] when the remote reports an error instead of data.
    async fn fetch_snapshot(
        &self,
        query: &str,
    ) -> Result<RepositoryQuerySnapshot, VerificationError>;
}

/// Reads one page of a collection through the paginated transport.
#[async_trait]
pub trait CollectionPageSource: Send + Sync {
    /// Returns the logins on `page` of the `kind` collection, in remote order.
    ///
    /// # Errors
    ///
    /// Same classification as [`RepositorySnapshotSource::fetch_snapshot`].
    async fn fetch_page(
        &self,
        kind: EdgeKind,
        page: PageNumber,
        page_size: PageSize,
    ) -> Result<Vec<Login>, VerificationError>;
}

/// Produces fresh key material for a verified user.
pub trait AccountGenerator: Send + Sync {
    /// # Errors
    ///
    /// Returns [`VerificationError::AccountGeneration`] if no key could be produced.
    fn generate(&self) -> Result<GeneratedAccount, VerificationError>;
}
