//! Stock interceptors
//!
//! The default composed chain is body serializer → error-status elevator →
//! JSON parser, assembled by [`HttpClient::standard`](crate::client::HttpClient::standard).

use crate::error::ApiError;
use crate::interceptor::Interceptor;
use crate::request::Reply;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use serde_json::{json, Value};
use tracing::warn;

/// Status threshold applied when no `error_code` is configured
const DEFAULT_ERROR_THRESHOLD: u64 = 400;

/// Attach a JSON-encoded body when the per-call options carry a payload.
///
/// Does nothing when `data` is absent or null. Unless `append_content_type`
/// is configured off, the JSON content type replaces whatever the request
/// carried.
#[must_use]
pub fn body_serializer() -> Interceptor {
    Interceptor::new()
        .with_default_config(json!({ "append_content_type": true }))
        .on_pre_request(|mut request, config, options| {
            let Some(data) = options.data.as_ref().filter(|data| !data.is_null()) else {
                return Ok(request);
            };

            request.body = Some(serde_json::to_string(data)?);
            if config.get("append_content_type").and_then(Value::as_bool) == Some(true) {
                request
                    .headers
                    .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            }
            Ok(request)
        })
}

/// Map a raw response to its parsed JSON body; already-parsed replies pass
/// through untouched.
#[must_use]
pub fn json_parser() -> Interceptor {
    Interceptor::new().on_post_request(|inner, _config| {
        Box::pin(async move {
            match inner.await? {
                Reply::Http(response) => Ok(Reply::Json(response.json()?)),
                parsed @ Reply::Json(_) => Ok(parsed),
            }
        })
    })
}

/// Reject replies whose status code reaches the configured `error_code`
/// threshold, carrying the response's status text as the failure message.
#[must_use]
pub fn error_status() -> Interceptor {
    Interceptor::new()
        .with_default_config(json!({ "error_code": DEFAULT_ERROR_THRESHOLD }))
        .on_post_request(|inner, config| {
            Box::pin(async move {
                let reply = inner.await?;
                if let Some(response) = reply.as_http() {
                    let threshold = config
                        .get("error_code")
                        .and_then(Value::as_u64)
                        .unwrap_or(DEFAULT_ERROR_THRESHOLD);
                    if u64::from(response.status) >= threshold {
                        warn!(
                            status = response.status,
                            status_text = %response.status_text,
                            "response status elevated to error"
                        );
                        return Err(ApiError::status(
                            response.status,
                            response.status_text.clone(),
                        ));
                    }
                }
                Ok(reply)
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::HttpClient;
    use crate::request::{record_of, HttpRequest, HttpResponse, RequestOptions, RequestTarget};
    use crate::transport::DispatchFuture;
    use reqwest::header::HeaderMap;
    use std::sync::{Arc, Mutex};
    use tokio_test::block_on;

    fn http_reply(status: u16, status_text: &str, body: &str) -> Reply {
        Reply::Http(HttpResponse {
            status,
            status_text: status_text.to_string(),
            headers: HeaderMap::new(),
            body: body.to_string(),
        })
    }

    fn fixed(reply: Reply) -> HttpClient {
        HttpClient::new(move |_target: RequestTarget, _options: RequestOptions| -> DispatchFuture {
            let reply = reply.clone();
            Box::pin(async move { Ok(reply) })
        })
    }

    fn capture() -> (HttpClient, Arc<Mutex<Option<HttpRequest>>>) {
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        let client =
            HttpClient::new(move |target: RequestTarget, options: RequestOptions| -> DispatchFuture {
                let request = target.into_request(&options);
                *sink.lock().unwrap() = Some(request);
                Box::pin(async { Ok(Reply::Json(Value::Null)) })
            });
        (client, seen)
    }

    #[test]
    fn serializes_payload_and_appends_content_type() {
        let (client, seen) = capture();
        let client = client.wrap(body_serializer());

        block_on(client.call(
            "http://localhost/test",
            RequestOptions::new().with_data(json!({"a": 174})),
        ))
        .unwrap();

        let request = seen.lock().unwrap().take().unwrap();
        assert_eq!(request.body.as_deref(), Some(r#"{"a":174}"#));
        assert_eq!(
            request.headers.get(CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }

    #[test]
    fn content_type_can_be_suppressed() {
        let (client, seen) = capture();
        let client = client.wrap_with(
            body_serializer(),
            record_of(json!({"append_content_type": false})),
        );

        block_on(client.call(
            "http://localhost/test",
            RequestOptions::new().with_data(json!({"a": 1})),
        ))
        .unwrap();

        let request = seen.lock().unwrap().take().unwrap();
        assert_eq!(request.body.as_deref(), Some(r#"{"a":1}"#));
        assert!(request.headers.get(CONTENT_TYPE).is_none());
    }

    #[test]
    fn absent_or_null_payload_leaves_request_untouched() {
        let (client, seen) = capture();
        let client = client.wrap(body_serializer());

        block_on(client.call("http://localhost/test", RequestOptions::new())).unwrap();
        let request = seen.lock().unwrap().take().unwrap();
        assert!(request.body.is_none());
        assert!(request.headers.get(CONTENT_TYPE).is_none());

        block_on(client.call(
            "http://localhost/test",
            RequestOptions::new().with_data(Value::Null),
        ))
        .unwrap();
        let request = seen.lock().unwrap().take().unwrap();
        assert!(request.body.is_none());
    }

    #[test]
    fn parses_json_from_response() {
        let client = fixed(http_reply(200, "OK", r#"{"hello":"world"}"#)).wrap(json_parser());
        let reply = block_on(client.call("http://localhost/", RequestOptions::new())).unwrap();
        assert_eq!(reply.into_json().unwrap(), json!({"hello": "world"}));
    }

    #[test]
    fn parser_passes_parsed_values_through() {
        let client = fixed(Reply::Json(json!([1, 2]))).wrap(json_parser());
        let reply = block_on(client.call("http://localhost/", RequestOptions::new())).unwrap();
        assert_eq!(reply.into_json().unwrap(), json!([1, 2]));
    }

    #[test]
    fn elevates_error_status_with_status_text() {
        let client = fixed(http_reply(400, "Bad Request", "")).wrap(error_status());
        let err = block_on(client.call("http://localhost/", RequestOptions::new())).unwrap_err();
        assert_eq!(err.to_string(), "Bad Request");
        assert!(err.is_client_error());
    }

    #[test]
    fn redirects_pass_the_default_threshold() {
        let client = fixed(http_reply(301, "Moved Permanently", "")).wrap(error_status());
        assert!(block_on(client.call("http://localhost/", RequestOptions::new())).is_ok());
    }

    #[test]
    fn threshold_is_configurable() {
        let strict = fixed(http_reply(301, "Moved Permanently", ""))
            .wrap_with(error_status(), record_of(json!({"error_code": 300})));
        let err = block_on(strict.call("http://localhost/", RequestOptions::new())).unwrap_err();
        assert_eq!(err.to_string(), "Moved Permanently");

        let lenient = fixed(http_reply(404, "Not Found", ""))
            .wrap_with(error_status(), record_of(json!({"error_code": 500})));
        assert!(block_on(lenient.call("http://localhost/", RequestOptions::new())).is_ok());
    }
}
