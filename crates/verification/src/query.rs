//! Bulk query construction.

use crate::{RepositoryRef, WindowSize};

/// Builds the GraphQL query that fetches the most recent `window` stargazer
/// and fork edges of `repository`, together with each collection's true total.
pub fn build_bulk_query(repository: &RepositoryRef, window: WindowSize) -> String {
    format!(
        r#"query {{ repository(owner: "{owner}", name: "{name}") {{ stargazers(last: {window}) {{ totalCount edges {{ node {{ url }} }} }} forks(last: {window}) {{ totalCount edges {{ node {{ url }} }} }} }} }}"#,
        owner = repository.owner(),
        name = repository.name(),
        window = window.as_u64(),
    )
}
