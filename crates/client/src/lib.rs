//! Declarative REST client
//!
//! This crate turns a tree of resource/method declarations into a callable
//! API surface backed by a composable HTTP transport.
//!
//! # Features
//!
//! - **Interceptor chain**: compose request/response transformers around a
//!   base transport, onion-ordered, with layered configuration merging
//! - **Declarative resources**: describe members and namespaces once, get
//!   bound callables with path templating and method-aware argument placement
//! - **Pluggable everything**: the transport, the query serializer, and the
//!   path substitution function are all replaceable at construction time
//!
//! # Example
//!
//! ```rust,no_run
//! use declarest_client::prelude::*;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let rest = RestClient::new("https://api.example.com")?;
//!
//!     let api = rest.resource("v1", |r| {
//!         vec![
//!             r.get("profile", MemberOpts::new().path("/users/:id")),
//!             r.namespace("teams", |r| {
//!                 vec![r.post("create", MemberOpts::new().path("/"))]
//!             }),
//!         ]
//!     });
//!
//!     if let Some(profile) = api.method("profile") {
//!         let reply = profile
//!             .call(record_of(json!({"id": 7})), RequestOptions::new())
//!             .await?;
//!         println!("{}", reply.into_json()?);
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod error;
pub mod interceptor;
pub mod request;
pub mod rest;
pub mod transport;

pub use client::HttpClient;
pub use config::ClientConfig;
pub use error::{ApiError, ApiResult};
pub use rest::RestClient;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::client::HttpClient;
    pub use crate::config::ClientConfig;
    pub use crate::error::{ApiError, ApiResult};
    pub use crate::interceptor::{body_serializer, error_status, json_parser, Interceptor};
    pub use crate::request::{
        record_of, ArgMap, ConfigMap, HttpRequest, HttpResponse, Method, Reply, RequestOptions,
        RequestTarget,
    };
    pub use crate::rest::{
        Api, ApiNode, BoundMethod, Definition, Dsl, MemberDef, MemberOpts, NamespaceDef,
        RestClient, Schema,
    };
    pub use crate::transport::{DispatchFuture, FetchTransport, Transport};
}
