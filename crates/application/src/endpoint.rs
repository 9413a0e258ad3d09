//! URL resolution for the client facades.

use crate::error::{ClientError, ClientResult};

/// Joins a base URL and a request path with exactly one `/` between them.
///
/// Absolute `http(s)://` paths are returned unchanged. An empty path yields
/// the base URL itself.
///
/// # Errors
///
/// Returns [`ClientError::InvalidUrl`] if the base URL is not an absolute
/// http(s) URL.
pub fn join_url(base: &str, path: &str) -> ClientResult<String> {
    if is_absolute(path) {
        return Ok(path.to_string());
    }

    let base = base.trim().trim_end_matches('/');
    if !is_absolute(base) {
        return Err(ClientError::InvalidUrl(format!(
            "base URL must start with http:// or https://: {base:?}"
        )));
    }

    let path = path.trim().trim_start_matches('/');
    if path.is_empty() {
        Ok(base.to_string())
    } else {
        Ok(format!("{base}/{path}"))
    }
}

/// Returns the single GraphQL endpoint for a base URL.
///
/// The endpoint is `{base}/graphql` unless the base already points at it.
#[must_use]
pub fn graphql_endpoint(base: &str) -> String {
    let base = base.trim().trim_end_matches('/');
    if base.ends_with("/graphql") {
        base.to_string()
    } else {
        format!("{base}/graphql")
    }
}

fn is_absolute(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_join_normalises_slashes() {
        let expected = "https://pokeapi.co/api/v2/pokemon/pikachu";
        assert_eq!(join_url("https://pokeapi.co/api/v2", "/pokemon/pikachu").unwrap(), expected);
        assert_eq!(join_url("https://pokeapi.co/api/v2/", "pokemon/pikachu").unwrap(), expected);
        assert_eq!(join_url("https://pokeapi.co/api/v2//", "//pokemon/pikachu").unwrap(), expected);
    }

    #[test]
    fn test_join_keeps_absolute_paths() {
        let url = join_url("https://pokeapi.co/api/v2", "https://cms.example.com/posts").unwrap();
        assert_eq!(url, "https://cms.example.com/posts");
    }

    #[test]
    fn test_join_empty_path_is_base() {
        assert_eq!(join_url("http://localhost:3000/", "").unwrap(), "http://localhost:3000");
    }

    #[test]
    fn test_join_rejects_relative_base() {
        let result = join_url("pokeapi.co", "/pokemon");
        assert!(matches!(result, Err(ClientError::InvalidUrl(_))));
    }

    #[test]
    fn test_graphql_endpoint() {
        assert_eq!(graphql_endpoint("https://cms.example.com/"), "https://cms.example.com/graphql");
        assert_eq!(
            graphql_endpoint("https://cms.example.com/graphql/"),
            "https://cms.example.com/graphql"
        );
    }
}
