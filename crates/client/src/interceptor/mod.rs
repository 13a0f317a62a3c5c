//! Interceptors: composable request/response transformation units
//!
//! An interceptor carries up to three optional hooks plus an immutable default
//! configuration. `init` derives the effective static configuration once, at
//! wrap time. `pre_request` may replace the outgoing request and runs with the
//! per-call configuration; a returned error rejects the call before the inner
//! transport is reached. `post_request` receives the still-deferred inner
//! result and may transform it, including recovering from a rejection.

mod builtin;

pub use builtin::{body_serializer, error_status, json_parser};

use crate::error::ApiResult;
use crate::request::{record_of, ConfigMap, HttpRequest, RequestOptions};
use crate::transport::DispatchFuture;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Hook deriving the effective static configuration at wrap time
pub type InitHook = Arc<dyn Fn(ConfigMap) -> ConfigMap + Send + Sync>;

/// Hook transforming the outgoing request with the per-call configuration
pub type PreRequestHook =
    Arc<dyn Fn(HttpRequest, &ConfigMap, &RequestOptions) -> ApiResult<HttpRequest> + Send + Sync>;

/// Hook transforming the deferred inner result with the per-call configuration
pub type PostRequestHook = Arc<dyn Fn(DispatchFuture, ConfigMap) -> DispatchFuture + Send + Sync>;

/// A request/response transformation unit, immutable once constructed
#[derive(Clone, Default)]
pub struct Interceptor {
    pub(crate) init: Option<InitHook>,
    pub(crate) pre_request: Option<PreRequestHook>,
    pub(crate) post_request: Option<PostRequestHook>,
    pub(crate) default_config: ConfigMap,
}

impl Interceptor {
    /// Create an interceptor with no hooks and an empty default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the wrap-time configuration hook
    #[must_use]
    pub fn on_init(mut self, hook: impl Fn(ConfigMap) -> ConfigMap + Send + Sync + 'static) -> Self {
        self.init = Some(Arc::new(hook));
        self
    }

    /// Set the request hook
    #[must_use]
    pub fn on_pre_request(
        mut self,
        hook: impl Fn(HttpRequest, &ConfigMap, &RequestOptions) -> ApiResult<HttpRequest>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        self.pre_request = Some(Arc::new(hook));
        self
    }

    /// Set the result hook
    #[must_use]
    pub fn on_post_request(
        mut self,
        hook: impl Fn(DispatchFuture, ConfigMap) -> DispatchFuture + Send + Sync + 'static,
    ) -> Self {
        self.post_request = Some(Arc::new(hook));
        self
    }

    /// Set the default configuration. Non-object values are treated as empty.
    #[must_use]
    pub fn with_default_config(mut self, config: Value) -> Self {
        self.default_config = record_of(config);
        self
    }
}

impl fmt::Debug for Interceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interceptor")
            .field("init", &self.init.is_some())
            .field("pre_request", &self.pre_request.is_some())
            .field("post_request", &self.post_request.is_some())
            .field("default_config", &self.default_config)
            .finish()
    }
}
