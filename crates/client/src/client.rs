//! The composable HTTP client
//!
//! `HttpClient` pairs an invoke operation with a compose operation: `call`
//! dispatches through the current chain, `wrap` produces a new client whose
//! invocation delegates inward through one more interceptor layer. Wrapping is
//! onion-ordered: the layer applied last runs its request hook first and its
//! result hook last.

use crate::interceptor::{body_serializer, error_status, json_parser, Interceptor};
use crate::request::{merge_maps, ConfigMap, RequestOptions, RequestTarget};
use crate::transport::{DispatchFuture, FetchTransport, Transport};
use std::sync::Arc;

/// A transport with a compose operation
///
/// Cloning is cheap and yields a client sharing the same immutable chain;
/// in-flight calls never share mutable state.
#[derive(Clone)]
pub struct HttpClient {
    transport: Arc<dyn Transport>,
}

impl HttpClient {
    /// Create a client over the given base transport
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self {
            transport: Arc::new(transport),
        }
    }

    /// Create a client over the platform network primitive
    #[must_use]
    pub fn fetch() -> Self {
        Self::new(FetchTransport::default())
    }

    /// Create the standard composed chain over the platform network primitive:
    /// body serializer → error-status elevator → JSON parser
    #[must_use]
    pub fn standard() -> Self {
        Self::standard_over(FetchTransport::default())
    }

    /// Wrap an arbitrary base transport in the standard chain
    pub fn standard_over(transport: impl Transport + 'static) -> Self {
        Self::new(transport)
            .wrap(body_serializer())
            .wrap(error_status())
            .wrap(json_parser())
    }

    /// Compose with an interceptor using its default configuration alone
    #[must_use]
    pub fn wrap(&self, interceptor: Interceptor) -> Self {
        self.wrap_with(interceptor, ConfigMap::new())
    }

    /// Compose with an interceptor, merging `config` over the interceptor's
    /// default configuration. The `init` hook, if any, derives the effective
    /// static configuration here — exactly once, not per call.
    #[must_use]
    pub fn wrap_with(&self, interceptor: Interceptor, config: ConfigMap) -> Self {
        let static_config = merge_maps(&interceptor.default_config, &config);
        let static_config = match &interceptor.init {
            Some(init) => init(static_config),
            None => static_config,
        };

        Self {
            transport: Arc::new(Wrapped {
                parent: Arc::clone(&self.transport),
                interceptor,
                static_config,
            }),
        }
    }

    /// Invoke the chain
    pub fn call(&self, target: impl Into<RequestTarget>, options: RequestOptions) -> DispatchFuture {
        self.transport.dispatch(target.into(), options)
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient").finish_non_exhaustive()
    }
}

/// One interceptor layer around an inner transport
struct Wrapped {
    parent: Arc<dyn Transport>,
    interceptor: Interceptor,
    static_config: ConfigMap,
}

impl Transport for Wrapped {
    fn dispatch(&self, target: RequestTarget, options: RequestOptions) -> DispatchFuture {
        // Both request forms are normalized before the request hook runs.
        let request = target.into_request(&options);
        let call_config = merge_maps(&self.static_config, &options.config);

        let request = match &self.interceptor.pre_request {
            Some(hook) => match hook(request, &call_config, &options) {
                Ok(request) => request,
                Err(err) => return Box::pin(std::future::ready(Err(err))),
            },
            None => request,
        };

        let inner = self
            .parent
            .dispatch(RequestTarget::Request(request), options);

        match &self.interceptor.post_request {
            Some(hook) => hook(inner, call_config),
            None => inner,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{record_of, Reply};
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    type Log = Arc<Mutex<Vec<String>>>;

    fn logging_base(log: Log) -> HttpClient {
        HttpClient::new(move |_target: RequestTarget, _options: RequestOptions| -> DispatchFuture {
            log.lock().unwrap().push("base".to_string());
            Box::pin(async { Ok(Reply::Json(Value::Null)) })
        })
    }

    fn logging_interceptor(name: &'static str, log: Log) -> Interceptor {
        let pre_log = Arc::clone(&log);
        Interceptor::new()
            .on_pre_request(move |request, _config, _options| {
                pre_log.lock().unwrap().push(format!("{name}-pre"));
                Ok(request)
            })
            .on_post_request(move |inner, _config| {
                let post_log = Arc::clone(&log);
                Box::pin(async move {
                    let reply = inner.await;
                    post_log.lock().unwrap().push(format!("{name}-post"));
                    reply
                })
            })
    }

    #[tokio::test]
    async fn chained_interceptors_run_onion_ordered() {
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let client = logging_base(Arc::clone(&log))
            .wrap(logging_interceptor("A", Arc::clone(&log)))
            .wrap(logging_interceptor("B", Arc::clone(&log)));

        client
            .call("http://localhost/test", RequestOptions::new())
            .await
            .unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            vec!["B-pre", "A-pre", "base", "A-post", "B-post"]
        );
    }

    #[tokio::test]
    async fn per_call_config_merges_default_wrap_and_call_layers() {
        let observed = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&observed);

        let interceptor = Interceptor::new()
            .with_default_config(json!({"a": 0, "c": 3}))
            .on_pre_request(move |request, config, _options| {
                *sink.lock().unwrap() = Some(config.clone());
                Ok(request)
            });

        let base = HttpClient::new(
            |_target: RequestTarget, _options: RequestOptions| -> DispatchFuture {
                Box::pin(async { Ok(Reply::Json(Value::Null)) })
            },
        );
        let client = base.wrap_with(interceptor, record_of(json!({"a": 1})));

        client
            .call(
                "http://localhost/foo",
                RequestOptions::new().with_config(json!({"b": 2})),
            )
            .await
            .unwrap();

        let config = observed.lock().unwrap().take().unwrap();
        assert_eq!(Value::Object(config), json!({"a": 1, "c": 3, "b": 2}));
    }

    #[tokio::test]
    async fn init_runs_once_at_wrap_time_with_merged_config() {
        let runs = Arc::new(AtomicUsize::new(0));
        let seen = Arc::new(Mutex::new(None));
        let counter = Arc::clone(&runs);
        let sink = Arc::clone(&seen);

        let interceptor = Interceptor::new()
            .with_default_config(json!({"debug": false, "depth": 2}))
            .on_init(move |config| {
                counter.fetch_add(1, Ordering::SeqCst);
                *sink.lock().unwrap() = Some(config.clone());
                config
            });

        let base = HttpClient::new(
            |_target: RequestTarget, _options: RequestOptions| -> DispatchFuture {
                Box::pin(async { Ok(Reply::Json(Value::Null)) })
            },
        );
        let client = base.wrap_with(interceptor, record_of(json!({"debug": true})));
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        client
            .call("http://localhost/x", RequestOptions::new())
            .await
            .unwrap();
        client
            .call("http://localhost/x", RequestOptions::new())
            .await
            .unwrap();

        assert_eq!(runs.load(Ordering::SeqCst), 1);
        let config = seen.lock().unwrap().take().unwrap();
        assert_eq!(Value::Object(config), json!({"debug": true, "depth": 2}));
    }

    #[tokio::test]
    async fn init_derived_config_feeds_later_hooks() {
        let observed = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&observed);

        let interceptor = Interceptor::new()
            .on_init(|mut config| {
                config.insert("derived".to_string(), json!(true));
                config
            })
            .on_pre_request(move |request, config, _options| {
                *sink.lock().unwrap() = Some(config.clone());
                Ok(request)
            });

        let base = HttpClient::new(
            |_target: RequestTarget, _options: RequestOptions| -> DispatchFuture {
                Box::pin(async { Ok(Reply::Json(Value::Null)) })
            },
        );
        base.wrap(interceptor)
            .call("http://localhost/x", RequestOptions::new())
            .await
            .unwrap();

        let config = observed.lock().unwrap().take().unwrap();
        assert_eq!(Value::Object(config), json!({"derived": true}));
    }

    #[tokio::test]
    async fn pre_request_error_rejects_before_inner_transport() {
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let failing = Interceptor::new().on_pre_request(|_request, _config, _options| {
            Err(crate::error::ApiError::config("rejected by hook"))
        });

        let client = logging_base(Arc::clone(&log)).wrap(failing);
        let err = client
            .call("http://localhost/x", RequestOptions::new())
            .await
            .unwrap_err();

        assert!(err.to_string().contains("rejected by hook"));
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn pre_request_replacement_reaches_the_base() {
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        let base = HttpClient::new(
            move |target: RequestTarget, options: RequestOptions| -> DispatchFuture {
                *sink.lock().unwrap() = Some(target.into_request(&options).url);
                Box::pin(async { Ok(Reply::Json(Value::Null)) })
            },
        );

        let rewriting = Interceptor::new().on_pre_request(|mut request, _config, _options| {
            request.url.push_str("?intercepted=true");
            Ok(request)
        });

        base.wrap(rewriting)
            .call("http://localhost/data", RequestOptions::new())
            .await
            .unwrap();

        assert_eq!(
            seen.lock().unwrap().take().unwrap(),
            "http://localhost/data?intercepted=true"
        );
    }

    #[tokio::test]
    async fn post_request_can_recover_a_rejection() {
        let base = HttpClient::new(
            |_target: RequestTarget, _options: RequestOptions| -> DispatchFuture {
                Box::pin(async { Err(crate::error::ApiError::status(500, "Internal Server Error")) })
            },
        );

        let recovering = Interceptor::new().on_post_request(|inner, _config| {
            Box::pin(async move {
                match inner.await {
                    Ok(reply) => Ok(reply),
                    Err(_) => Ok(Reply::Json(json!({"recovered": true}))),
                }
            })
        });

        let reply = base
            .wrap(recovering)
            .call("http://localhost/x", RequestOptions::new())
            .await
            .unwrap();
        assert_eq!(reply.into_json().unwrap(), json!({"recovered": true}));
    }

    #[tokio::test]
    async fn wrapping_leaves_the_original_client_usable() {
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let plain = logging_base(Arc::clone(&log));
        let wrapped = plain.wrap(logging_interceptor("A", Arc::clone(&log)));

        plain
            .call("http://localhost/x", RequestOptions::new())
            .await
            .unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["base"]);

        log.lock().unwrap().clear();
        wrapped
            .call("http://localhost/x", RequestOptions::new())
            .await
            .unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["A-pre", "base", "A-post"]);
    }
}
