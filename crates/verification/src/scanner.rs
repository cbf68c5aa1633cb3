//! Membership scanning over bulk edges.
//!
//! The login is located structurally: it is the first path segment of the
//! edge's node URL. Stargazer nodes are user profiles and carry exactly one
//! segment; forker nodes are repositories and carry exactly two (owner, then
//! repository name). Anything else is a [`VerificationError::MalformedEdge`].

use url::Url;

use crate::{Edge, EdgeKind, Login, VerificationError};

fn expected_segments(kind: EdgeKind) -> usize {
    match kind {
        EdgeKind::Stargazer => 1,
        EdgeKind::Forker => 2,
    }
}

/// Extracts the user login referenced by `edge`.
///
/// # Errors
///
/// Returns [`VerificationError::MalformedEdge`] if the URL does not parse, has
/// no host, or does not have the segment count required by `kind`.
pub fn extract_login(edge: &Edge, kind: EdgeKind) -> Result<String, VerificationError> {
    let malformed = || VerificationError::MalformedEdge {
        kind,
        url: edge.node_url.clone(),
    };

    let url = Url::parse(&edge.node_url).map_err(|_| malformed())?;
    if url.host_str().is_none() {
        return Err(malformed());
    }

    let segments: Vec<&str> = url
        .path_segments()
        .ok_or_else(malformed)?
        .filter(|s| !s.is_empty())
        .collect();
    if segments.len() != expected_segments(kind) {
        return Err(malformed());
    }

    Ok(segments[0].to_string())
}

/// Returns `true` if any edge references `target`.
///
/// Edges are scanned in order and scanning stops at the first match, so a
/// malformed edge after the match is never inspected.
///
/// # Errors
///
/// Propagates [`VerificationError::MalformedEdge`] from [`extract_login`].
pub fn contains_target(
    edges: &[Edge],
    target: &Login,
    kind: EdgeKind,
) -> Result<bool, VerificationError> {
    for (position, edge) in edges.iter().enumerate() {
        if *target == *extract_login(edge, kind)? {
            tracing::debug!(%kind, position, "Target found in bulk edges");
            return Ok(true);
        }
    }
    Ok(false)
}
