//! Bulk verification and result composition.

use std::sync::Arc;

use tracing::Instrument;
use verification::{
    build_bulk_query, contains_target, surplus, AccountGenerator, AccountRecord, ContractAddress,
    EdgeKind, ForkCheck, ForkCheckPolicy, Membership, RepositoryQuerySnapshot, RepositoryRef,
    RepositorySnapshotSource, RunId, VerdictSource, VerificationError, VerificationOutcome,
    VerificationRequest,
};

use crate::FallbackScanner;

/// Static inputs of a [`Verifier`], fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifierSettings {
    pub repository: RepositoryRef,
    pub contract: ContractAddress,
    pub fork_check: ForkCheckPolicy,
}

/// Decides whether a user starred and forked the configured repository and,
/// if so, issues them a fresh account.
pub struct Verifier {
    snapshots: Arc<dyn RepositorySnapshotSource>,
    fallback: FallbackScanner,
    accounts: Arc<dyn AccountGenerator>,
    settings: VerifierSettings,
}

impl Verifier {
    pub fn new(
        snapshots: Arc<dyn RepositorySnapshotSource>,
        fallback: FallbackScanner,
        accounts: Arc<dyn AccountGenerator>,
        settings: VerifierSettings,
    ) -> Self {
        Self {
            snapshots,
            fallback,
            accounts,
            settings,
        }
    }

    /// Runs one verification.
    ///
    /// The stargazer verdict is decided first; forks are only consulted once
    /// the target is known to be a stargazer, and not at all when the
    /// configured [`ForkCheckPolicy`] skips them.
    ///
    /// # Errors
    ///
    /// - [`VerificationError::NotStarred`] / [`VerificationError::NotForked`]
    ///   for a negative verdict.
    /// - Any bulk-path error unchanged; the fallback never covers a failed
    ///   bulk call.
    /// - [`VerificationError::PartialFailure`] from the fallback scan.
    /// - [`VerificationError::AccountGeneration`] from the generator.
    pub async fn verify(
        &self,
        request: &VerificationRequest,
    ) -> Result<VerificationOutcome, VerificationError> {
        let run_id = RunId::new_random();
        let span = tracing::info_span!(
            "verify",
            %run_id,
            repository = %self.settings.repository,
            target = %request.target,
        );
        self.run(run_id, request).instrument(span).await
    }

    async fn run(
        &self,
        run_id: RunId,
        request: &VerificationRequest,
    ) -> Result<VerificationOutcome, VerificationError> {
        let query = build_bulk_query(&self.settings.repository, request.bulk_window);
        let snapshot = self.snapshots.fetch_snapshot(&query).await?;
        tracing::info!(
            stargazers = snapshot.stargazers.total_count,
            forks = snapshot.forks.total_count,
            window = request.bulk_window.as_u64(),
            "Bulk snapshot received"
        );

        let stargazer = self
            .membership(&snapshot, EdgeKind::Stargazer, request)
            .await?;
        if !stargazer.found {
            return Err(VerificationError::NotStarred {
                login: request.target.clone(),
                repository: self.settings.repository.clone(),
            });
        }

        let fork = if self.settings.fork_check.requires_fork_check(stargazer) {
            let forker = self.membership(&snapshot, EdgeKind::Forker, request).await?;
            if !forker.found {
                return Err(VerificationError::NotForked {
                    login: request.target.clone(),
                    repository: self.settings.repository.clone(),
                });
            }
            ForkCheck::Verified(forker)
        } else {
            tracing::info!("Stargazer verdict came from the fallback scan, skipping fork check");
            ForkCheck::SkippedAfterStargazerFallback
        };

        let account = self.accounts.generate()?;
        let record = AccountRecord::new(self.settings.contract.clone(), account);
        tracing::info!(address = %record.address, "Verification succeeded");

        Ok(VerificationOutcome {
            run_id,
            stargazer,
            fork,
            record,
        })
    }

    async fn membership(
        &self,
        snapshot: &RepositoryQuerySnapshot,
        kind: EdgeKind,
        request: &VerificationRequest,
    ) -> Result<Membership, VerificationError> {
        let collection = snapshot.collection(kind);
        if contains_target(&collection.edges, &request.target, kind)? {
            return Ok(Membership {
                found: true,
                source: VerdictSource::BulkWindow,
            });
        }

        let remaining = surplus(collection.total_count, request.bulk_window);
        if remaining == 0 {
            return Ok(Membership {
                found: false,
                source: VerdictSource::BulkWindow,
            });
        }

        let found = self
            .fallback
            .scan(kind, &request.target, remaining, request.page_size)
            .await?;
        Ok(Membership {
            found,
            source: VerdictSource::Fallback,
        })
    }
}
