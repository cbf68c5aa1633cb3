//! In-memory fakes of the verification port traits.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use engine::{FallbackScanner, FallbackSettings, Verifier, VerifierSettings};
use verification::{
    AccountGenerator, CollectionPageSource, CollectionSnapshot, ContractAddress, Edge, EdgeKind,
    ForkCheckPolicy, GeneratedAccount, Login, PageNumber, PageSize, RepositoryQuerySnapshot,
    RepositoryRef, RepositorySnapshotSource, VerificationError, VerificationRequest, WindowSize,
};

pub const CONTRACT: &str = "0x04d7a824b3301e67ef34024e9dc79445e54d5af7";

pub fn login(s: &str) -> Login {
    Login::new(s).unwrap()
}

pub fn repository() -> RepositoryRef {
    RepositoryRef::new("dappledger", "AnnChain").unwrap()
}

pub fn request(target: &str) -> VerificationRequest {
    VerificationRequest::new(
        target,
        WindowSize::new(100).unwrap(),
        PageSize::new(30).unwrap(),
    )
    .unwrap()
}

/// `count` stargazer edges named `user0..`, with `target` at `position`.
pub fn stargazer_edges(count: usize, target: Option<(&str, usize)>) -> Vec<Edge> {
    (0..count)
        .map(|i| match target {
            Some((name, position)) if position == i => {
                Edge::new(format!("https://github.com/{name}"))
            }
            _ => Edge::new(format!("https://github.com/user{i}")),
        })
        .collect()
}

/// `count` fork edges owned by `forker0..`, with `target` at `position`.
pub fn fork_edges(count: usize, target: Option<(&str, usize)>) -> Vec<Edge> {
    (0..count)
        .map(|i| match target {
            Some((name, position)) if position == i => {
                Edge::new(format!("https://github.com/{name}/AnnChain"))
            }
            _ => Edge::new(format!("https://github.com/forker{i}/AnnChain")),
        })
        .collect()
}

pub fn snapshot(
    stargazer_total: u64,
    stargazers: Vec<Edge>,
    fork_total: u64,
    forks: Vec<Edge>,
) -> RepositoryQuerySnapshot {
    RepositoryQuerySnapshot {
        stargazers: CollectionSnapshot {
            total_count: stargazer_total,
            edges: stargazers,
        },
        forks: CollectionSnapshot {
            total_count: fork_total,
            edges: forks,
        },
    }
}

// ---------------------------------------------------------------------------
// Snapshot source
// ---------------------------------------------------------------------------

pub enum SnapshotBehavior {
    Returns(RepositoryQuerySnapshot),
    ApiError(String),
}

pub struct FakeSnapshotSource {
    behavior: SnapshotBehavior,
    pub queries: Mutex<Vec<String>>,
}

impl FakeSnapshotSource {
    pub fn returning(snapshot: RepositoryQuerySnapshot) -> Arc<Self> {
        Arc::new(Self {
            behavior: SnapshotBehavior::Returns(snapshot),
            queries: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            behavior: SnapshotBehavior::ApiError(message.to_string()),
            queries: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl RepositorySnapshotSource for FakeSnapshotSource {
    async fn fetch_snapshot(
        &self,
        query: &str,
    ) -> Result<RepositoryQuerySnapshot, VerificationError> {
        self.queries.lock().unwrap().push(query.to_string());
        match &self.behavior {
            SnapshotBehavior::Returns(snapshot) => Ok(snapshot.clone()),
            SnapshotBehavior::ApiError(message) => Err(VerificationError::Api {
                message: message.clone(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Page source
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub enum PageBehavior {
    Logins(Vec<String>),
    Fails,
    Hangs,
}

/// Serves pages from a table. Unlisted pages are empty. Each page may be
/// delayed to control completion order.
#[derive(Default)]
pub struct FakePageSource {
    pages: HashMap<(EdgeKind, u64), PageBehavior>,
    delays: HashMap<u64, Duration>,
    pub calls: Mutex<Vec<(EdgeKind, u64)>>,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl FakePageSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, kind: EdgeKind, page: u64, behavior: PageBehavior) -> Self {
        self.pages.insert((kind, page), behavior);
        self
    }

    pub fn with_logins(self, kind: EdgeKind, page: u64, logins: &[&str]) -> Self {
        let logins = logins.iter().map(|s| s.to_string()).collect();
        self.with_page(kind, page, PageBehavior::Logins(logins))
    }

    pub fn with_delay(mut self, page: u64, delay: Duration) -> Self {
        self.delays.insert(page, delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl CollectionPageSource for FakePageSource {
    async fn fetch_page(
        &self,
        kind: EdgeKind,
        page: PageNumber,
        _page_size: PageSize,
    ) -> Result<Vec<Login>, VerificationError> {
        self.calls.lock().unwrap().push((kind, page.as_u64()));
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delays.get(&page.as_u64()) {
            tokio::time::sleep(*delay).await;
        }

        let result = match self.pages.get(&(kind, page.as_u64())) {
            None => Ok(Vec::new()),
            Some(PageBehavior::Logins(logins)) => {
                Ok(logins.iter().filter_map(|s| Login::new(s.as_str())).collect())
            }
            Some(PageBehavior::Fails) => Err(VerificationError::Network {
                message: format!("page {page} connection reset"),
            }),
            Some(PageBehavior::Hangs) => {
                std::future::pending::<()>().await;
                Ok(Vec::new())
            }
        };
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

// ---------------------------------------------------------------------------
// Account generator
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeAccounts {
    issued: AtomicUsize,
}

impl FakeAccounts {
    pub fn issued(&self) -> usize {
        self.issued.load(Ordering::SeqCst)
    }
}

impl AccountGenerator for FakeAccounts {
    fn generate(&self) -> Result<GeneratedAccount, VerificationError> {
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(GeneratedAccount {
            private_key_hex: format!("{n:064x}"),
            address_hex: format!("{n:040x}"),
        })
    }
}

// ---------------------------------------------------------------------------
// Wiring
// ---------------------------------------------------------------------------

pub fn settings(fork_check: ForkCheckPolicy) -> VerifierSettings {
    VerifierSettings {
        repository: repository(),
        contract: ContractAddress::new(CONTRACT).unwrap(),
        fork_check,
    }
}

pub fn fallback_settings() -> FallbackSettings {
    FallbackSettings {
        max_concurrent_pages: 4,
        page_timeout: Duration::from_secs(5),
    }
}

pub fn verifier(
    snapshots: Arc<FakeSnapshotSource>,
    pages: Arc<FakePageSource>,
    accounts: Arc<FakeAccounts>,
    fork_check: ForkCheckPolicy,
) -> Verifier {
    Verifier::new(
        snapshots,
        FallbackScanner::new(pages, fallback_settings()),
        accounts,
        settings(fork_check),
    )
}
