//! Verb-keyed handler tables. One table per endpoint; unmatched methods are a 400.

use crate::error::AppError;
use crate::response::Reply;
use crate::store::Store;
use axum::body::Bytes;
use axum::http::Method;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verb {
    Get,
    Post,
    Patch,
    Delete,
}

impl Verb {
    pub fn from_method(method: &Method) -> Option<Self> {
        match *method {
            Method::GET => Some(Verb::Get),
            Method::POST => Some(Verb::Post),
            Method::PATCH => Some(Verb::Patch),
            Method::DELETE => Some(Verb::Delete),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
            Verb::Patch => "PATCH",
            Verb::Delete => "DELETE",
        }
    }
}

/// Everything a handler gets from the request: the store, integer path ids in path order, and the raw body.
pub struct Call {
    pub store: Arc<dyn Store>,
    pub ids: Vec<i64>,
    pub body: Bytes,
}

impl Call {
    /// The `n`th path id.
    pub fn id(&self, n: usize) -> Result<i64, AppError> {
        self.ids
            .get(n)
            .copied()
            .ok_or_else(|| AppError::BadRequest(format!("missing path id #{}", n + 1)))
    }

    /// Parse the body as a JSON object.
    pub fn json_object(&self) -> Result<Map<String, Value>, AppError> {
        let value: Value = serde_json::from_slice(&self.body)
            .map_err(|_| AppError::Malformed("JSON did not parse".into()))?;
        match value {
            Value::Object(map) => Ok(map),
            _ => Err(AppError::Malformed("JSON object expected".into())),
        }
    }
}

pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<Reply, AppError>> + Send>>;
pub type Handler = fn(Call) -> HandlerFuture;

#[derive(Clone)]
struct Route {
    handler: Handler,
    summary: String,
}

#[derive(Clone, Default)]
pub struct MethodTable {
    routes: BTreeMap<Verb, Route>,
}

impl MethodTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `verb`. `summary` is what the endpoint index says the verb does.
    pub fn on(mut self, verb: Verb, summary: impl Into<String>, handler: Handler) -> Self {
        self.routes.insert(
            verb,
            Route {
                handler,
                summary: summary.into(),
            },
        );
        self
    }

    /// Merge another table's handlers into this one; the other table wins on clashes.
    pub fn with(mut self, other: MethodTable) -> Self {
        self.routes.extend(other.routes);
        self
    }

    /// Registered verbs, in GET, POST, PATCH, DELETE order.
    pub fn verbs(&self) -> Vec<&'static str> {
        self.routes.keys().map(|v| v.as_str()).collect()
    }

    /// `{"GET": summary, ...}` in verb order.
    pub fn describe(&self) -> Map<String, Value> {
        self.routes
            .iter()
            .map(|(verb, route)| (verb.as_str().to_string(), Value::String(route.summary.clone())))
            .collect()
    }

    pub async fn dispatch(&self, method: &Method, call: Call) -> Result<Reply, AppError> {
        let route = Verb::from_method(method)
            .and_then(|verb| self.routes.get(&verb))
            .ok_or_else(|| AppError::MethodNotSupported(method.to_string()))?;
        (route.handler)(call).await
    }
}
