//! Compilation of definition trees into bound, invocable methods

use crate::client::HttpClient;
use crate::error::ApiResult;
use crate::request::{merge_maps, ArgMap, Reply, RequestOptions};
use crate::rest::builder::{Definition, MemberDef, Schema};
use crate::rest::path::join_paths;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::ops::Index;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Argument-serialization function: record → query string
pub type SerializeArgsFn = Arc<dyn Fn(&ArgMap) -> String + Send + Sync>;

/// Path-substitution function: (template, args) → (resolved path, residual)
pub type SubstituteFn = Arc<dyn Fn(&str, &ArgMap) -> (String, ArgMap) + Send + Sync>;

/// Shared immutable state every bound method closes over
#[derive(Clone)]
pub(crate) struct CompilerContext {
    pub(crate) base_url: String,
    pub(crate) http: HttpClient,
    pub(crate) serialize_args: SerializeArgsFn,
    pub(crate) substitute: SubstituteFn,
}

/// A compiled tree: a mapping of names to bound methods or nested trees
#[derive(Clone, Default)]
pub struct Api {
    nodes: HashMap<String, ApiNode>,
}

/// One compiled node
#[derive(Clone)]
pub enum ApiNode {
    /// A bound, invocable method
    Method(BoundMethod),
    /// A nested mapping
    Namespace(Api),
}

impl Api {
    /// Look up a node by name
    #[must_use]
    pub fn node(&self, name: &str) -> Option<&ApiNode> {
        self.nodes.get(name)
    }

    /// Look up a bound method by name
    #[must_use]
    pub fn method(&self, name: &str) -> Option<&BoundMethod> {
        match self.nodes.get(name) {
            Some(ApiNode::Method(method)) => Some(method),
            _ => None,
        }
    }

    /// Look up a nested namespace by name
    #[must_use]
    pub fn namespace(&self, name: &str) -> Option<&Api> {
        match self.nodes.get(name) {
            Some(ApiNode::Namespace(api)) => Some(api),
            _ => None,
        }
    }

    /// Iterate the names recorded at this level
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    /// Number of nodes at this level
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether this level is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl Index<&str> for Api {
    type Output = ApiNode;

    fn index(&self, name: &str) -> &Self::Output {
        self.nodes
            .get(name)
            .unwrap_or_else(|| panic!("no api node named `{name}`"))
    }
}

impl fmt::Debug for Api {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.nodes.iter()).finish()
    }
}

impl fmt::Debug for ApiNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Method(method) => write!(f, "{} {}", method.method(), method.template),
            Self::Namespace(api) => api.fmt(f),
        }
    }
}

/// A compiled member: a callable closed over the member definition, the
/// resolved template, and the composed transport
#[derive(Clone)]
pub struct BoundMethod {
    member: MemberDef,
    template: String,
    ctx: CompilerContext,
}

impl BoundMethod {
    /// Name the method was declared under
    #[must_use]
    pub fn name(&self) -> &str {
        &self.member.name
    }

    /// Declared HTTP method
    #[must_use]
    pub fn method(&self) -> crate::request::Method {
        self.member.method
    }

    /// Invoke the member.
    ///
    /// Caller arguments merge over the member's declared defaults; the path
    /// template is resolved against the merged record, and the record rides
    /// as a query string (GET/DELETE) or as the request payload
    /// (POST/PUT/PATCH). The per-call configuration is the member default
    /// merged under the caller's fragment.
    #[instrument(
        level = "debug",
        skip_all,
        fields(member = %self.member.name, method = %self.member.method)
    )]
    pub async fn call(&self, args: ArgMap, options: RequestOptions) -> ApiResult<Reply> {
        let merged = merge_maps(&self.member.args, &args);
        let (resolved, _residual) = (self.ctx.substitute)(&self.template, &merged);
        let mut url = join_paths(&self.ctx.base_url, &resolved);

        let mut options = options;
        options.method = Some(self.member.method);
        options.config = merge_maps(&self.member.config, &options.config);

        if self.member.method.has_request_body() {
            // The payload keeps path-consumed keys; serialization is the
            // body-serializer interceptor's job, not the compiler's.
            if !options.headers.contains_key(CONTENT_TYPE) {
                options
                    .headers
                    .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            }
            options.data = Some(Value::Object(merged));
        } else {
            let query = (self.ctx.serialize_args)(&merged);
            if !query.is_empty() {
                url.push('?');
                url.push_str(&query);
            }
        }

        debug!(url = %url, "invoking member");
        let reply = self.ctx.http.call(url, options).await?;

        match &self.member.schema {
            Some(Schema::Transform(transform)) => {
                let value = reply.into_json()?;
                Ok(Reply::Json(transform(value)?))
            }
            _ => Ok(reply),
        }
    }
}

/// Walk a definition list and produce the compiled tree. Duplicate sibling
/// names follow last-write-wins.
pub(crate) fn compile_tree(defs: &[Definition], parent_path: &str, ctx: &CompilerContext) -> Api {
    let mut nodes = HashMap::with_capacity(defs.len());

    for def in defs {
        match def {
            Definition::Member(member) => {
                let template = join_paths(parent_path, &member.path);
                nodes.insert(
                    member.name.clone(),
                    ApiNode::Method(BoundMethod {
                        member: member.clone(),
                        template,
                        ctx: ctx.clone(),
                    }),
                );
            }
            Definition::Namespace(namespace) => {
                let child_path = join_paths(parent_path, &namespace.name);
                nodes.insert(
                    namespace.name.clone(),
                    ApiNode::Namespace(compile_tree(&namespace.children, &child_path, ctx)),
                );
            }
        }
    }

    Api { nodes }
}
