//! Translation of raw HTTP responses into payloads or structured errors.
//!
//! Every adapter funnels its responses through these functions so that error
//! shapes do not depend on the transport in use.

use pokefetch_application::{ClientError, ClientResult};
use pokefetch_domain::{ApiError, GraphqlResponse, StatusCode};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Translates a REST response.
///
/// - 2xx with a JSON body: the decoded body.
/// - 2xx with an empty or non-JSON body: an empty object.
/// - anything else: [`ApiError`] with the status, the server's `message`
///   field (or the status text) and the parsed body as details.
///
/// # Errors
///
/// Returns [`ClientError::Http`]
/// for non-success statuses.
pub fn translate_response(status: u16, status_text: Option<&str>, body: &[u8]) -> ClientResult<Value> {
    if !StatusCode(status).is_success() {
        return Err(failure(status, status_text, body));
    }

    match serde_json::from_slice(body) {
        Ok(value) => Ok(value),
        Err(e) => {
            if !body.is_empty() {
                debug!(status, error = %e, "successful response is not JSON, using empty object");
            }
            Ok(Value::Object(Map::new()))
        }
    }
}

/// Translates a GraphQL response.
///
/// A 2xx body that is not a `{ data, errors }` envelope becomes an empty
/// envelope; non-2xx statuses fail as in [`translate_response`].
///
/// # Errors
///
/// Returns [`ClientError::Http`]
/// for non-success statuses.
pub fn translate_graphql_response(
    status: u16,
    status_text: Option<&str>,
    body: &[u8],
) -> ClientResult<GraphqlResponse<Value>> {
    if !StatusCode(status).is_success() {
        return Err(failure(status, status_text, body));
    }

    Ok(serde_json::from_slice(body).unwrap_or_else(|e| {
        debug!(status, error = %e, "successful GraphQL response is not an envelope");
        GraphqlResponse::empty()
    }))
}

fn failure(status: u16, status_text: Option<&str>, body: &[u8]) -> ClientError {
    let details = if body.is_empty() {
        None
    } else {
        Some(serde_json::from_slice(body).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(body).into_owned())
        }))
    };

    let error = ApiError::from_response(status, status_text, details);
    warn!(status, message = %error.message, "upstream returned an error status");
    error.into()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn api_error(result: ClientResult<Value>) -> ApiError {
        match result {
            Err(ClientError::Http(error)) => error,
            other => panic!("expected an HTTP error, got {other:?}"),
        }
    }

    #[test]
    fn test_success_returns_decoded_body() {
        let body = br#"{"id":25,"name":"pikachu"}"#;
        let value = translate_response(200, Some("OK"), body).unwrap();
        assert_eq!(value, json!({ "id": 25, "name": "pikachu" }));
    }

    #[test]
    fn test_unparseable_success_is_empty_object() {
        for body in [&b"<html>hi</html>"[..], b"", b"{truncated"] {
            let value = translate_response(200, Some("OK"), body).unwrap();
            assert_eq!(value, json!({}));
        }
        assert_eq!(translate_response(204, None, b"").unwrap(), json!({}));
    }

    #[test]
    fn test_error_uses_server_message_and_details() {
        let body = br#"{"message":"Pokemon not found","code":404}"#;
        let error = api_error(translate_response(404, Some("Not Found"), body));

        assert_eq!(error.status, 404);
        assert_eq!(error.message, "Pokemon not found");
        assert_eq!(error.details, Some(json!({ "message": "Pokemon not found", "code": 404 })));
    }

    #[test]
    fn test_error_without_message_uses_status_text() {
        let error = api_error(translate_response(502, Some("Bad Gateway"), br#"{"error":"x"}"#));

        assert_eq!(error.status, 502);
        assert_eq!(error.message, "Bad Gateway");
    }

    #[test]
    fn test_error_with_text_body_keeps_it_as_details() {
        let error = api_error(translate_response(500, Some("Internal Server Error"), b"oops"));

        assert_eq!(error.message, "Internal Server Error");
        assert_eq!(error.details, Some(json!("oops")));
    }

    #[test]
    fn test_error_with_empty_body_has_no_details() {
        let error = api_error(translate_response(401, None, b""));

        assert_eq!(error.message, "Unauthorized");
        assert_eq!(error.details, None);
    }

    #[test]
    fn test_graphql_envelope() {
        let body = br#"{"data":{"posts":[]},"errors":[{"message":"partial"}]}"#;
        let response = translate_graphql_response(200, Some("OK"), body).unwrap();

        assert_eq!(response.data, Some(json!({ "posts": [] })));
        assert_eq!(response.error_message().as_deref(), Some("partial"));
    }

    #[test]
    fn test_graphql_unparseable_success_is_empty_envelope() {
        let response = translate_graphql_response(200, Some("OK"), b"not json").unwrap();
        assert_eq!(response, GraphqlResponse::empty());
    }

    #[test]
    fn test_graphql_error_status() {
        let result = translate_graphql_response(400, Some("Bad Request"), br#"{"errors":[{"message":"syntax"}]}"#);
        assert_eq!(result.unwrap_err().status(), Some(400));
    }
}
