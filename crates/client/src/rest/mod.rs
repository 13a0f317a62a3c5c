//! Declarative REST surface
//!
//! [`RestClient`] is the construction surface: it carries the base address,
//! the composed transport, and the two pluggable functions (argument
//! serialization and path substitution), and compiles declaration trees into
//! invocable [`Api`] values.

pub mod builder;
pub mod compile;
pub mod path;

pub use builder::{Definition, Dsl, MemberDef, MemberOpts, NamespaceDef, Schema, TransformFn};
pub use compile::{Api, ApiNode, BoundMethod, SerializeArgsFn, SubstituteFn};

use crate::client::HttpClient;
use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};
use crate::request::ArgMap;
use crate::transport::FetchTransport;
use compile::{compile_tree, CompilerContext};
use std::sync::Arc;
use tracing::debug;

/// Factory for compiled APIs
///
/// Cloning shares the composed transport; every compiled tree is
/// independently owned.
#[derive(Clone)]
pub struct RestClient {
    config: ClientConfig,
    http: HttpClient,
    serialize_args: SerializeArgsFn,
    substitute: SubstituteFn,
}

impl RestClient {
    /// Create a client for the given base address with the standard
    /// interceptor chain and default serialization functions
    pub fn new(base_url: impl Into<String>) -> ApiResult<Self> {
        Self::with_config(ClientConfig::new(base_url))
    }

    /// Create a client from a full configuration
    pub fn with_config(config: ClientConfig) -> ApiResult<Self> {
        config.validate()?;

        let inner = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(ApiError::Request)?;
        let http = HttpClient::standard_over(FetchTransport::new(inner));

        Ok(Self {
            config,
            http,
            serialize_args: Arc::new(path::serialize_args),
            substitute: Arc::new(path::substitute_params),
        })
    }

    /// Current configuration
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Builder-style method to replace the composed transport
    #[must_use]
    pub fn with_http(mut self, http: HttpClient) -> Self {
        self.http = http;
        self
    }

    /// Builder-style method to replace the argument-serialization function
    #[must_use]
    pub fn with_serialize_args(
        mut self,
        serialize: impl Fn(&ArgMap) -> String + Send + Sync + 'static,
    ) -> Self {
        self.serialize_args = Arc::new(serialize);
        self
    }

    /// Builder-style method to replace the path-substitution function
    #[must_use]
    pub fn with_substitute(
        mut self,
        substitute: impl Fn(&str, &ArgMap) -> (String, ArgMap) + Send + Sync + 'static,
    ) -> Self {
        self.substitute = Arc::new(substitute);
        self
    }

    /// Declare and compile a resource in one step
    pub fn resource(
        &self,
        prefix: &str,
        define: impl FnOnce(&Dsl) -> Vec<Definition>,
    ) -> Api {
        let defs = define(&Dsl);
        self.compile(prefix, &defs)
    }

    /// Compile an existing definition tree under the given path prefix.
    ///
    /// The tree is borrowed, so the same definitions can be compiled again;
    /// each compilation yields a structurally independent [`Api`].
    pub fn compile(&self, prefix: &str, defs: &[Definition]) -> Api {
        let parent_path = path::join_paths("", prefix);
        debug!(prefix = %parent_path, entries = defs.len(), "compiling resource tree");

        let ctx = CompilerContext {
            base_url: self.config.base_url.clone(),
            http: self.http.clone(),
            serialize_args: Arc::clone(&self.serialize_args),
            substitute: Arc::clone(&self.substitute),
        };
        compile_tree(defs, &parent_path, &ctx)
    }
}

impl std::fmt::Debug for RestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
