//! Paginated fallback scanning.
//!
//! When a collection's true total exceeds the bulk window and the bulk edges
//! did not contain the target, the remaining population is enumerated page by
//! page. A task is spawned per page only once a semaphore permit is free, so
//! at most `max_concurrent_pages` tasks exist at any time. The first task to
//! see the target sets the [`SharedOutcome`] and cancels the rest; pages not
//! yet spawned by then are never fetched. The scan joins every spawned task
//! before returning, so the verdict is the logical OR over all readable pages
//! regardless of completion order.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use verification::{
    fallback_pages, page_count, CollectionPageSource, EdgeKind, Login, PageNumber, PageSize,
    VerificationError,
};

/// Tuning for [`FallbackScanner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallbackSettings {
    /// Upper bound on concurrently running page fetches. Zero is treated as one.
    pub max_concurrent_pages: usize,
    /// Deadline for a single page fetch.
    pub page_timeout: Duration,
}

impl Default for FallbackSettings {
    fn default() -> Self {
        Self {
            max_concurrent_pages: 8,
            page_timeout: Duration::from_secs(15),
        }
    }
}

// ---------------------------------------------------------------------------
// Shared result cell
// ---------------------------------------------------------------------------

/// Boolean result cell contended by concurrent page tasks.
///
/// Starts `false` and moves to `true` at most once; it is never reset.
#[derive(Debug, Default)]
pub struct SharedOutcome(AtomicBool);

impl SharedOutcome {
    /// Records a match. Returns `true` only for the first caller.
    pub fn mark_found(&self) -> bool {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn is_found(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

// ---------------------------------------------------------------------------
// Page tasks
// ---------------------------------------------------------------------------

/// How a single page task ended.
#[derive(Debug)]
pub enum PageStatus {
    /// The page was read and scanned.
    Scanned { found: bool },
    /// The page could not be read.
    Failed(VerificationError),
    /// Another task found the target first.
    Cancelled,
}

/// Result of one fallback page task.
#[derive(Debug)]
pub struct PageTask {
    pub page: PageNumber,
    pub status: PageStatus,
}

/// Everything a spawned page task needs, owned so the task is `'static`.
struct PageContext {
    source: Arc<dyn CollectionPageSource>,
    kind: EdgeKind,
    target: Login,
    page_size: PageSize,
    page_timeout: Duration,
    outcome: Arc<SharedOutcome>,
    cancel: CancellationToken,
}

async fn run_page(
    ctx: PageContext,
    page: PageNumber,
    _permit: OwnedSemaphorePermit,
) -> PageTask {
    let status = tokio::select! {
        biased;
        _ = ctx.cancel.cancelled() => PageStatus::Cancelled,
        status = fetch_and_scan(&ctx, page) => status,
    };
    if let PageStatus::Cancelled = status {
        tracing::trace!("Page task cancelled");
    }
    PageTask { page, status }
}

async fn fetch_and_scan(ctx: &PageContext, page: PageNumber) -> PageStatus {
    let fetch = ctx.source.fetch_page(ctx.kind, page, ctx.page_size);
    match tokio::time::timeout(ctx.page_timeout, fetch).await {
        Err(_) => PageStatus::Failed(VerificationError::Timeout {
            after: ctx.page_timeout,
        }),
        Ok(Err(error)) => PageStatus::Failed(error),
        Ok(Ok(logins)) => {
            let found = logins.iter().any(|login| *login == ctx.target);
            tracing::debug!(entries = logins.len(), found, "Page scanned");
            if found && ctx.outcome.mark_found() {
                ctx.cancel.cancel();
            }
            PageStatus::Scanned { found }
        }
    }
}

// ---------------------------------------------------------------------------
// Scanner
// ---------------------------------------------------------------------------

/// Enumerates the surplus of a collection through a [`CollectionPageSource`].
pub struct FallbackScanner {
    source: Arc<dyn CollectionPageSource>,
    settings: FallbackSettings,
}

impl FallbackScanner {
    pub fn new(source: Arc<dyn CollectionPageSource>, settings: FallbackSettings) -> Self {
        Self { source, settings }
    }

    /// Searches the `surplus` entries of the `kind` collection for `target`.
    ///
    /// Returns `Ok(true)` if any page contained the target, even if other pages
    /// failed.
    ///
    /// # Errors
    ///
    /// Returns [`VerificationError::PartialFailure`] if no readable page
    /// contained the target and at least one page failed or timed out.
    pub async fn scan(
        &self,
        kind: EdgeKind,
        target: &Login,
        surplus: u64,
        page_size: PageSize,
    ) -> Result<bool, VerificationError> {
        let total_pages = page_count(surplus, page_size);
        if total_pages == 0 {
            return Ok(false);
        }
        tracing::info!(
            %kind,
            surplus,
            total_pages,
            "Bulk window incomplete, scanning remaining pages"
        );

        let outcome = Arc::new(SharedOutcome::default());
        let cancel = CancellationToken::new();
        let permits = Arc::new(Semaphore::new(self.settings.max_concurrent_pages.max(1)));

        let mut tasks = FuturesUnordered::new();
        for page in fallback_pages(surplus, page_size) {
            let permit = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                permit = Arc::clone(&permits).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };
            let ctx = PageContext {
                source: Arc::clone(&self.source),
                kind,
                target: target.clone(),
                page_size,
                page_timeout: self.settings.page_timeout,
                outcome: Arc::clone(&outcome),
                cancel: cancel.clone(),
            };
            let span = tracing::debug_span!("fallback_page", %kind, page = page.as_u64());
            let handle = tokio::spawn(run_page(ctx, page, permit).instrument(span));
            tasks.push(handle.map(move |joined| (page, joined)));
        }

        // Join barrier: every spawned task is awaited, cancelled or not.
        let mut failed_pages = Vec::new();
        while let Some((page, joined)) = tasks.next().await {
            match joined {
                Ok(PageTask {
                    status: PageStatus::Failed(error),
                    ..
                }) => {
                    tracing::warn!(%kind, page = page.as_u64(), error = %error, "Fallback page unreadable");
                    failed_pages.push(page.as_u64());
                }
                Ok(_) => {}
                Err(join_error) => {
                    tracing::error!(%kind, page = page.as_u64(), error = %join_error, "Fallback page task aborted");
                    failed_pages.push(page.as_u64());
                }
            }
        }

        if outcome.is_found() {
            tracing::info!(%kind, "Target found by fallback scan");
            return Ok(true);
        }
        if !failed_pages.is_empty() {
            failed_pages.sort_unstable();
            return Err(VerificationError::PartialFailure {
                kind,
                failed_pages,
                total_pages,
            });
        }
        tracing::info!(%kind, total_pages, "Target absent from all fallback pages");
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_outcome_has_exactly_one_winner() {
        let outcome = SharedOutcome::default();
        assert!(!outcome.is_found());
        assert!(outcome.mark_found());
        assert!(!outcome.mark_found());
        assert!(outcome.is_found());
    }

    #[test]
    fn test_shared_outcome_under_contention() {
        let outcome = Arc::new(SharedOutcome::default());
        let winners: usize = (0..16)
            .map(|_| {
                let outcome = Arc::clone(&outcome);
                std::thread::spawn(move || outcome.mark_found())
            })
            .collect::<Vec<_>>()
            .into_iter()
            .map(|h| usize::from(h.join().unwrap()))
            .sum();
        assert_eq!(winners, 1);
        assert!(outcome.is_found());
    }
}
