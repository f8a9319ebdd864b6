//! Generic request pipeline.
//!
//! Every endpoint runs the same sequence:
//!
//! 1. decode the request into a typed input (body, then query, then path)
//! 2. validate it
//! 3. run the business operation under the request timeout
//! 4. serialize the result with the operation's success status, or map the
//!    error onto [`ApiError`]
//!
//! ```ignore
//! use axum::{Router, http::StatusCode, routing::post};
//! use axum_helpers::pipeline::{ApiRequest, HandlerResult, RequestContext, serve};
//!
//! async fn create(state: AppState, ctx: RequestContext, req: CreateUser) -> HandlerResult<User> {
//!     let user = state.users.create(req).await?;
//!     Ok((StatusCode::CREATED, user))
//! }
//!
//! let router = Router::new().route("/users", post(serve(create))).with_state(state);
//! ```

mod context;
pub mod de;
mod decode;
mod validation;

pub use context::{DEFAULT_REQUEST_TIMEOUT, REQUEST_ID_HEADER, RequestContext, RequestTimeout};
pub use decode::{INVALID_PAYLOAD, MAX_BODY_BYTES, decode_request};
pub use validation::{MESSAGE_SEPARATOR, Violations};

use axum::{
    Json,
    extract::Request,
    handler::Handler,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use tracing::Instrument;

use crate::errors::{ApiError, BoxError};

/// Outcome of a business operation: success status and body, or any error.
pub type HandlerResult<T> = Result<(StatusCode, T), BoxError>;

/// A decodable, self-validating request.
pub trait ApiRequest: DeserializeOwned + Send + 'static {
    /// Fields bound to route parameters. Values for them in the body or
    /// query string are dropped, so a route without the parameter decodes
    /// them as absent.
    const PATH_FIELDS: &'static [&'static str] = &[];

    /// Check field-level rules. Failures are reported as bad requests.
    fn validate(&self) -> Result<(), ApiError>;
}

/// Handler produced by [`serve`].
pub struct Pipeline<F, I, O> {
    operation: F,
    _types: PhantomData<fn(I) -> O>,
}

impl<F: Clone, I, O> Clone for Pipeline<F, I, O> {
    fn clone(&self) -> Self {
        Self {
            operation: self.operation.clone(),
            _types: PhantomData,
        }
    }
}

/// Wrap a business operation into an axum handler.
///
/// The operation receives the router state, a [`RequestContext`] and the
/// decoded, validated input.
pub fn serve<S, I, O, F, Fut>(operation: F) -> Pipeline<F, I, O>
where
    F: Fn(S, RequestContext, I) -> Fut,
    Fut: Future<Output = HandlerResult<O>>,
{
    Pipeline {
        operation,
        _types: PhantomData,
    }
}

impl<S, I, O, F, Fut> Handler<(), S> for Pipeline<F, I, O>
where
    S: Clone + Send + Sync + 'static,
    I: ApiRequest,
    O: Serialize + Send + 'static,
    F: Fn(S, RequestContext, I) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult<O>> + Send + 'static,
{
    type Future = Pin<Box<dyn Future<Output = Response> + Send>>;

    fn call(self, req: Request, state: S) -> Self::Future {
        Box::pin(async move { run(self.operation, req, state).await })
    }
}

async fn run<S, I, O, F, Fut>(operation: F, req: Request, state: S) -> Response
where
    S: Send + Sync,
    I: ApiRequest,
    O: Serialize,
    F: Fn(S, RequestContext, I) -> Fut,
    Fut: Future<Output = HandlerResult<O>>,
{
    let (mut parts, body) = req.into_parts();
    let ctx = RequestContext::from_parts(&parts);
    let span = tracing::info_span!(
        "pipeline",
        request_id = %ctx.request_id(),
        method = %parts.method,
        path = %parts.uri.path(),
    );

    async move {
        let input: I = match decode_request(&mut parts, body, &state, I::PATH_FIELDS).await {
            Ok(input) => input,
            Err(err) => return err.into_response(),
        };

        if let Err(err) = input.validate() {
            return ApiError::bad_request(err.message().to_owned()).into_response();
        }

        // Decoding already spent part of the budget.
        let timeout = ctx.timeout();
        let outcome = tokio::time::timeout(ctx.remaining(), operation(state, ctx, input)).await;

        match outcome {
            Ok(Ok((status, body))) => success(status, &body),
            Ok(Err(err)) => ApiError::from_boxed(err).into_response(),
            Err(elapsed) => {
                tracing::warn!(?timeout, "Operation exceeded request timeout");
                ApiError::internal(elapsed).into_response()
            }
        }
    }
    .instrument(span)
    .await
}

fn success<O: Serialize>(status: StatusCode, body: &O) -> Response {
    match serde_json::to_value(body) {
        Ok(Value::Null) => (status, Json(Value::Object(Default::default()))).into_response(),
        Ok(value) => (status, Json(value)).into_response(),
        Err(e) => ApiError::internal(e).into_response(),
    }
}
