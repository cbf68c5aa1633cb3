//! Wire formats of the GitHub GraphQL and REST responses.
//!
//! Only the fields the verifier reads are modelled; everything else in the
//! payloads is ignored by serde.

use serde::{Deserialize, Serialize};
use verification::{CollectionSnapshot, Edge, RepositoryQuerySnapshot};

// ---------------------------------------------------------------------------
// GraphQL (bulk query)
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub(crate) struct GraphqlRequest<'a> {
    pub query: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphqlResponse {
    #[serde(default)]
    pub data: Option<GraphqlData>,
    /// Set instead of `data` on authentication and similar failures.
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub errors: Option<Vec<GraphqlError>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphqlError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphqlData {
    pub repository: Option<GraphqlRepository>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphqlRepository {
    pub stargazers: GraphqlConnection,
    pub forks: GraphqlConnection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GraphqlConnection {
    pub total_count: u64,
    #[serde(default)]
    pub edges: Vec<GraphqlEdge>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphqlEdge {
    pub node: GraphqlNode,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphqlNode {
    pub url: String,
}

impl From<GraphqlConnection> for CollectionSnapshot {
    fn from(connection: GraphqlConnection) -> Self {
        Self {
            total_count: connection.total_count,
            edges: connection
                .edges
                .into_iter()
                .map(|edge| Edge::new(edge.node.url))
                .collect(),
        }
    }
}

impl From<GraphqlRepository> for RepositoryQuerySnapshot {
    fn from(repository: GraphqlRepository) -> Self {
        Self {
            stargazers: repository.stargazers.into(),
            forks: repository.forks.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// REST (paginated fallback)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct Account {
    pub login: String,
}

/// One entry of `GET /repos/{owner}/{repo}/stargazers` with the
/// `star+json` media type.
#[derive(Debug, Deserialize)]
pub(crate) struct StarEntry {
    pub user: Account,
}

/// One entry of `GET /repos/{owner}/{repo}/forks`.
#[derive(Debug, Deserialize)]
pub(crate) struct ForkEntry {
    pub owner: Account,
}

/// Body of a REST error response.
#[derive(Debug, Deserialize)]
pub(crate) struct RestError {
    pub message: String,
}
