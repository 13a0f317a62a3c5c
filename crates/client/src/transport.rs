//! Transport abstraction and the reqwest-backed default
//!
//! A transport is the terminal function that actually performs a network call.
//! Identity is structural: any conforming callable is a valid transport, which
//! is what the blanket impl below provides.

use crate::error::ApiResult;
use crate::request::{HttpResponse, Reply, RequestOptions, RequestTarget};
use reqwest::Client;
use std::future::Future;
use std::pin::Pin;
use tracing::debug;

/// A boxed, sendable future
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// The deferred result every transport produces
pub type DispatchFuture = BoxFuture<ApiResult<Reply>>;

/// A function from (request descriptor, request options) to a deferred reply
pub trait Transport: Send + Sync {
    /// Perform the call described by `target` and `options`
    fn dispatch(&self, target: RequestTarget, options: RequestOptions) -> DispatchFuture;
}

impl<F> Transport for F
where
    F: Fn(RequestTarget, RequestOptions) -> DispatchFuture + Send + Sync,
{
    fn dispatch(&self, target: RequestTarget, options: RequestOptions) -> DispatchFuture {
        self(target, options)
    }
}

/// Base transport over a `reqwest` client, the platform network primitive
#[derive(Debug, Clone)]
pub struct FetchTransport {
    client: Client,
}

impl FetchTransport {
    /// Create a transport over a pre-configured `reqwest` client
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl Default for FetchTransport {
    fn default() -> Self {
        Self::new(Client::new())
    }
}

impl Transport for FetchTransport {
    fn dispatch(&self, target: RequestTarget, options: RequestOptions) -> DispatchFuture {
        let request = target.into_request(&options);
        let client = self.client.clone();

        Box::pin(async move {
            debug!(method = %request.method, url = %request.url, "dispatching request");

            let mut builder = client
                .request(request.method.into(), &request.url)
                .headers(request.headers);
            if let Some(body) = request.body {
                builder = builder.body(body);
            }
            if let Some(timeout) = options.timeout {
                builder = builder.timeout(timeout);
            }

            let response = builder.send().await?;
            let status = response.status();
            let headers = response.headers().clone();
            let body = response.text().await?;

            Ok(Reply::Http(HttpResponse {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
                headers,
                body,
            }))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn closures_are_transports() {
        let transport = |target: RequestTarget, options: RequestOptions| -> DispatchFuture {
            let request = target.into_request(&options);
            Box::pin(async move { Ok(Reply::Json(json!({ "url": request.url }))) })
        };

        let reply = tokio_test::block_on(
            transport.dispatch(RequestTarget::from("http://localhost/x"), RequestOptions::new()),
        )
        .unwrap();

        assert_eq!(
            reply.into_json().unwrap(),
            json!({"url": "http://localhost/x"})
        );
    }
}
