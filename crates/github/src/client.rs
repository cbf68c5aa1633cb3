//! [`GithubClient`]: GraphQL bulk fetcher and REST page fetcher.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use verification::{
    CollectionPageSource, EdgeKind, Login, PageNumber, PageSize, RepositoryQuerySnapshot,
    RepositoryRef, RepositorySnapshotSource, VerificationError,
};

use crate::wire::{ForkEntry, GraphqlRequest, GraphqlResponse, RestError, StarEntry};

const STAR_MEDIA_TYPE: &str = "application/vnd.github.v3.star+json";
const JSON_MEDIA_TYPE: &str = "application/vnd.github+json";

/// Upper bound on how much of an undecodable body is echoed into an error.
const BODY_EXCERPT_CHARS: usize = 200;

/// Connection settings for [`GithubClient`].
#[derive(Debug, Clone)]
pub struct GithubSettings {
    /// GraphQL endpoint, e.g. `https://api.github.com/graphql`.
    pub graphql_url: String,
    /// REST API root, e.g. `https://api.github.com`.
    pub rest_url: String,
    pub repository: RepositoryRef,
    /// Bearer credential sent with every request.
    pub token: String,
    /// GitHub rejects requests without a `User-Agent`.
    pub user_agent: String,
    pub request_timeout: Duration,
}

/// Reads the configured repository's stargazer and fork collections.
pub struct GithubClient {
    http: reqwest::Client,
    settings: GithubSettings,
}

impl GithubClient {
    /// # Errors
    ///
    /// Returns [`VerificationError::Network`] if the HTTP client cannot be
    /// built (e.g. TLS backend initialisation failure).
    pub fn new(settings: GithubSettings) -> Result<Self, VerificationError> {
        let http = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .user_agent(settings.user_agent.clone())
            .build()
            .map_err(|e| VerificationError::Network {
                message: e.to_string(),
            })?;
        Ok(Self { http, settings })
    }

    fn page_url(&self, kind: EdgeKind) -> String {
        let collection = match kind {
            EdgeKind::Stargazer => "stargazers",
            EdgeKind::Forker => "forks",
        };
        format!(
            "{}/repos/{}/{}/{}",
            self.settings.rest_url.trim_end_matches('/'),
            self.settings.repository.owner(),
            self.settings.repository.name(),
            collection
        )
    }

    fn transport_error(&self, error: reqwest::Error) -> VerificationError {
        if error.is_timeout() {
            VerificationError::Timeout {
                after: self.settings.request_timeout,
            }
        } else {
            VerificationError::Network {
                message: error.to_string(),
            }
        }
    }

    async fn read_body(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<(StatusCode, String), VerificationError> {
        let response = request
            .bearer_auth(&self.settings.token)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        Ok((status, body))
    }
}

fn excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT_CHARS).collect()
}

/// Turns a GraphQL response body into a snapshot.
fn decode_snapshot(
    status: StatusCode,
    body: &str,
) -> Result<RepositoryQuerySnapshot, VerificationError> {
    let parsed: GraphqlResponse = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(_) if !status.is_success() => {
            return Err(VerificationError::Api {
                message: format!("HTTP {status}: {}", excerpt(body)),
            })
        }
        Err(e) => {
            return Err(VerificationError::Decode {
                message: e.to_string(),
            })
        }
    };

    if let Some(message) = parsed.message.filter(|m| !m.is_empty()) {
        return Err(VerificationError::Api { message });
    }
    if let Some(errors) = parsed.errors.filter(|e| !e.is_empty()) {
        let message = errors
            .into_iter()
            .map(|e| e.message)
            .collect::<Vec<_>>()
            .join("; ");
        return Err(VerificationError::Api { message });
    }

    match parsed.data.and_then(|data| data.repository) {
        Some(repository) => Ok(repository.into()),
        None if !status.is_success() => Err(VerificationError::Api {
            message: format!("HTTP {status}"),
        }),
        None => Err(VerificationError::Decode {
            message: "response carries no repository data".to_string(),
        }),
    }
}

/// Turns a REST page body into the logins it lists, in order.
fn decode_page(kind: EdgeKind, body: &str) -> Result<Vec<Login>, VerificationError> {
    let decode_error = |e: serde_json::Error| VerificationError::Decode {
        message: format!("{kind} page: {e}"),
    };
    let logins: Vec<String> = match kind {
        EdgeKind::Stargazer => serde_json::from_str::<Vec<StarEntry>>(body)
            .map_err(decode_error)?
            .into_iter()
            .map(|entry| entry.user.login)
            .collect(),
        EdgeKind::Forker => serde_json::from_str::<Vec<ForkEntry>>(body)
            .map_err(decode_error)?
            .into_iter()
            .map(|entry| entry.owner.login)
            .collect(),
    };
    Ok(logins.into_iter().filter_map(Login::new).collect())
}

#[async_trait]
impl RepositorySnapshotSource for GithubClient {
    async fn fetch_snapshot(
        &self,
        query: &str,
    ) -> Result<RepositoryQuerySnapshot, VerificationError> {
        let request = self
            .http
            .post(&self.settings.graphql_url)
            .json(&GraphqlRequest { query });
        let (status, body) = self.read_body(request).await?;
        tracing::debug!(%status, bytes = body.len(), "GraphQL response received");
        decode_snapshot(status, &body)
    }
}

#[async_trait]
impl CollectionPageSource for GithubClient {
    async fn fetch_page(
        &self,
        kind: EdgeKind,
        page: PageNumber,
        page_size: PageSize,
    ) -> Result<Vec<Login>, VerificationError> {
        let mut query = vec![
            ("page", page.as_u64().to_string()),
            ("per_page", page_size.as_u64().to_string()),
        ];
        // Forks list newest first by default; the bulk window already holds those.
        let media_type = match kind {
            EdgeKind::Stargazer => STAR_MEDIA_TYPE,
            EdgeKind::Forker => {
                query.push(("sort", "oldest".to_string()));
                JSON_MEDIA_TYPE
            }
        };
        let request = self
            .http
            .get(self.page_url(kind))
            .header(ACCEPT, media_type)
            .query(&query);
        let (status, body) = self.read_body(request).await?;
        tracing::debug!(%kind, page = page.as_u64(), %status, "Collection page received");

        if !status.is_success() {
            let message = serde_json::from_str::<RestError>(&body)
                .map(|e| e.message)
                .unwrap_or_else(|_| excerpt(&body));
            return Err(VerificationError::Api {
                message: format!("HTTP {status}: {message}"),
            });
        }
        decode_page(kind, &body)
    }
}
