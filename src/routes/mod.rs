pub mod catalog;
pub mod common;

pub use catalog::{catalog_routes, endpoints};
pub use common::common_routes;

use crate::error::AppError;
use crate::state::AppState;
use axum::{
    http::{Method, StatusCode, Uri},
    middleware::map_response,
    response::{IntoResponse, Response},
    Router,
};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// The full application: catalog routes, common routes, request tracing and a body size limit.
pub fn app(state: AppState, body_limit: usize) -> Router {
    catalog_routes(state.clone())
        .merge(common_routes(state))
        .fallback(no_such_endpoint)
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(map_response(json_rejections))
        .layer(TraceLayer::new_for_http())
}

async fn no_such_endpoint(uri: Uri) -> AppError {
    AppError::NotFound(format!("no endpoint at {}", uri.path()))
}

/// The body limit and method routing reject with plain-text bodies; give those the `{"message"}` shape.
async fn json_rejections(method: Method, response: Response) -> Response {
    match response.status() {
        StatusCode::PAYLOAD_TOO_LARGE => AppError::PayloadTooLarge.into_response(),
        StatusCode::METHOD_NOT_ALLOWED => AppError::MethodNotSupported(method.to_string()).into_response(),
        _ => response,
    }
}
