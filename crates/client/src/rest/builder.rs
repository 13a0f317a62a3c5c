//! Declaration surface: the definition tree and its building DSL
//!
//! Definitions are pure data. A resource callback receives a [`Dsl`] handle
//! and returns an ordered list of member and namespace definitions; the
//! compiler in [`compile`](crate::rest::compile) turns that list into bound
//! callables. Trees clone freely so the same declarations can be compiled
//! more than once.

use crate::error::ApiResult;
use crate::request::{record_of, ArgMap, ConfigMap, Method};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// A runtime response transform
pub type TransformFn = Arc<dyn Fn(Value) -> ApiResult<Value> + Send + Sync>;

/// Response schema attached to a member
#[derive(Clone)]
pub enum Schema {
    /// A plain value standing in for the response shape; a runtime no-op
    Marker(Value),
    /// A transform applied to the reply after the transport resolves
    Transform(TransformFn),
}

impl Schema {
    /// A shape marker with no runtime behavior
    #[must_use]
    pub fn marker(value: Value) -> Self {
        Self::Marker(value)
    }

    /// An infallible transform
    pub fn map(transform: impl Fn(Value) -> Value + Send + Sync + 'static) -> Self {
        Self::Transform(Arc::new(move |value| Ok(transform(value))))
    }

    /// A fallible transform; errors reject the overall call
    pub fn try_map(transform: impl Fn(Value) -> ApiResult<Value> + Send + Sync + 'static) -> Self {
        Self::Transform(Arc::new(transform))
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Marker(value) => f.debug_tuple("Marker").field(value).finish(),
            Self::Transform(_) => f.write_str("Transform(..)"),
        }
    }
}

/// A single declared API operation
#[derive(Debug, Clone)]
pub struct MemberDef {
    /// Name the compiled callable is recorded under
    pub name: String,
    /// HTTP method
    pub method: Method,
    /// Path template relative to the enclosing namespace
    pub path: String,
    /// Default argument record, merged under caller arguments
    pub args: ArgMap,
    /// Default per-member configuration, merged under per-call configuration
    pub config: ConfigMap,
    /// Optional response schema
    pub schema: Option<Schema>,
}

/// A named grouping of members and sub-namespaces sharing a path prefix
#[derive(Debug, Clone)]
pub struct NamespaceDef {
    /// Name the compiled sub-tree is recorded under; also the path segment
    pub name: String,
    /// Child definitions, unbounded depth
    pub children: Vec<Definition>,
}

/// One node of the declarative tree
#[derive(Debug, Clone)]
pub enum Definition {
    /// A single operation
    Member(MemberDef),
    /// A nested grouping
    Namespace(NamespaceDef),
}

/// Per-member options accepted by the DSL method factories
#[derive(Debug, Clone, Default)]
pub struct MemberOpts {
    path: Option<String>,
    args: ArgMap,
    config: ConfigMap,
    schema: Option<Schema>,
}

impl MemberOpts {
    /// Create empty options
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the path template; defaults to `/<name>` when omitted
    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Set the default argument record. Non-object values are treated as empty.
    #[must_use]
    pub fn args(mut self, args: Value) -> Self {
        self.args = record_of(args);
        self
    }

    /// Set the default per-member configuration. Non-object values are
    /// treated as empty.
    #[must_use]
    pub fn config(mut self, config: Value) -> Self {
        self.config = record_of(config);
        self
    }

    /// Attach a response schema
    #[must_use]
    pub fn schema(mut self, schema: Schema) -> Self {
        self.schema = Some(schema);
        self
    }
}

/// Factory handle passed to resource callbacks
#[derive(Debug, Clone, Copy, Default)]
pub struct Dsl;

impl Dsl {
    /// Declare a member from a complete definition
    #[must_use]
    pub fn member(&self, def: MemberDef) -> Definition {
        Definition::Member(def)
    }

    /// Declare a GET member
    #[must_use]
    pub fn get(&self, name: &str, opts: MemberOpts) -> Definition {
        self.method_member(Method::Get, name, opts)
    }

    /// Declare a POST member
    #[must_use]
    pub fn post(&self, name: &str, opts: MemberOpts) -> Definition {
        self.method_member(Method::Post, name, opts)
    }

    /// Declare a PUT member
    #[must_use]
    pub fn put(&self, name: &str, opts: MemberOpts) -> Definition {
        self.method_member(Method::Put, name, opts)
    }

    /// Declare a PATCH member
    #[must_use]
    pub fn patch(&self, name: &str, opts: MemberOpts) -> Definition {
        self.method_member(Method::Patch, name, opts)
    }

    /// Declare a DELETE member
    #[must_use]
    pub fn delete(&self, name: &str, opts: MemberOpts) -> Definition {
        self.method_member(Method::Delete, name, opts)
    }

    /// Shorthand for [`Dsl::delete`]
    #[must_use]
    pub fn del(&self, name: &str, opts: MemberOpts) -> Definition {
        self.delete(name, opts)
    }

    /// Declare a nested namespace
    #[must_use]
    pub fn namespace(
        &self,
        name: &str,
        define: impl FnOnce(&Dsl) -> Vec<Definition>,
    ) -> Definition {
        Definition::Namespace(NamespaceDef {
            name: name.to_string(),
            children: define(self),
        })
    }

    fn method_member(&self, method: Method, name: &str, opts: MemberOpts) -> Definition {
        Definition::Member(MemberDef {
            name: name.to_string(),
            method,
            path: opts.path.unwrap_or_else(|| format!("/{name}")),
            args: opts.args,
            config: opts.config,
            schema: opts.schema,
        })
    }
}
