use axum::{
    body::Body,
    extract::{FromRequestParts, Path, Query},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::errors::ApiError;

pub const INVALID_PAYLOAD: &str = "invalid payload format";

/// Upper bound on accepted request bodies.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Decode a request into `T`.
///
/// The JSON body (empty counts as `{}`) is merged with query parameters and
/// then path parameters; later sources win, so the path always has the last
/// word. Keys listed in `path_fields` are taken from the path alone: body
/// and query values for them are dropped, even when the route has no such
/// parameter. Path and query values are strings, so numeric fields should
/// accept both forms (see [`number_or_string`](super::de::number_or_string)).
pub async fn decode_request<T, S>(
    parts: &mut Parts,
    body: Body,
    state: &S,
    path_fields: &[&str],
) -> Result<T, ApiError>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    let bytes = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| invalid_payload(&e))?;

    let mut fields = parse_body(&bytes)?;

    let path_params = Path::<HashMap<String, String>>::from_request_parts(parts, state)
        .await
        .map(|Path(params)| params)
        .unwrap_or_default();

    let query_params = Query::<HashMap<String, String>>::try_from_uri(&parts.uri)
        .map(|Query(params)| params)
        .map_err(|e| invalid_payload(&e))?;

    for (key, value) in query_params {
        fields.insert(key, Value::String(value));
    }
    for key in path_fields {
        fields.remove(*key);
    }
    for (key, value) in path_params {
        fields.insert(key, Value::String(value));
    }

    serde_json::from_value(Value::Object(fields)).map_err(|e| invalid_payload(&e))
}

fn parse_body(bytes: &[u8]) -> Result<Map<String, Value>, ApiError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }

    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ApiError::bad_request(INVALID_PAYLOAD)),
        Err(e) => Err(invalid_payload(&e)),
    }
}

fn invalid_payload(cause: &dyn std::fmt::Display) -> ApiError {
    tracing::debug!(error = %cause, "Failed to decode request");
    ApiError::bad_request(INVALID_PAYLOAD)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use axum::{Json, Router, http::Request, routing::put};
    use serde::{Deserialize, Serialize};
    use tower::ServiceExt;

    #[derive(Debug, Deserialize, Serialize, PartialEq)]
    struct Fields {
        #[serde(default)]
        id: String,
        #[serde(default)]
        name: String,
        #[serde(default)]
        page: Option<String>,
    }

    async fn decode(uri: &str, body: &str) -> Result<Fields, ApiError> {
        let request = Request::builder()
            .uri(uri)
            .body(Body::from(body.to_owned()))
            .unwrap();
        let (mut parts, body) = request.into_parts();
        decode_request::<Fields, ()>(&mut parts, body, &(), &[]).await
    }

    async fn decode_routed(
        template: &'static str,
        uri: &str,
        body: &str,
        path_fields: &'static [&'static str],
    ) -> Fields {
        let app = Router::new().route(
            template,
            put(move |request: Request<Body>| async move {
                let (mut parts, body) = request.into_parts();
                let fields: Fields = decode_request(&mut parts, body, &(), path_fields)
                    .await
                    .unwrap();
                Json(fields)
            }),
        );
        let response = app
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri(uri)
                    .body(Body::from(body.to_owned()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let bytes = axum::body::to_bytes(response.into_body(), MAX_BODY_BYTES)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_empty_body_is_empty_object() {
        let fields = decode("/", "").await.unwrap();
        assert_eq!(fields.id, "");
        assert_eq!(fields.name, "");
    }

    #[tokio::test]
    async fn test_query_overrides_body() {
        let fields = decode("/?name=query&page=2", r#"{"name":"body","id":"x"}"#)
            .await
            .unwrap();
        assert_eq!(fields.name, "query");
        assert_eq!(fields.id, "x");
        assert_eq!(fields.page.as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn test_path_overrides_query_and_body() {
        let decoded = decode_routed("/items/{id}", "/items/a?id=b", r#"{"id":"c"}"#, &[]).await;
        assert_eq!(decoded.id, "a");
    }

    #[tokio::test]
    async fn test_path_fields_ignore_body_and_query_without_path_param() {
        let decoded = decode_routed(
            "/items",
            "/items?id=b&name=query",
            r#"{"id":"c","name":"body"}"#,
            &["id"],
        )
        .await;
        assert_eq!(decoded.id, "");
        assert_eq!(decoded.name, "query");
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let err = decode("/", "{not json").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadRequest);
        assert_eq!(err.message(), INVALID_PAYLOAD);
    }

    #[tokio::test]
    async fn test_non_object_body_is_bad_request() {
        let err = decode("/", "[1,2,3]").await.unwrap_err();
        assert_eq!(err.message(), INVALID_PAYLOAD);
    }

    #[tokio::test]
    async fn test_type_mismatch_is_bad_request() {
        let err = decode("/", r#"{"name": 42}"#).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadRequest);
    }
}
