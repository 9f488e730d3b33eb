use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use axum::extract::Request;
use axum::response::{IntoResponse, Response};
use http_body_util::LengthLimitError;
use notes_core::ServiceError;

use crate::method::RestMethod;
use crate::request::{bind, FromRestRequest, RestRequest};

/// Largest request body the dispatcher will buffer.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// A boxed, `Send`-able future returned by request handlers.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// What every handler eventually produces.
pub type HandlerResult = Result<Response, ServiceError>;

/// Type-erased handler stored in the endpoint. Binding of the handler's
/// parameter set happens inside, so the map holds one uniform type.
type ErasedHandler<S> = Box<dyn Fn(Arc<S>, RestRequest) -> BoxFuture<HandlerResult> + Send + Sync>;

/// One URL pattern's handlers, keyed by verb.
///
/// The map is filled while the endpoint is built and never changes after it
/// is registered on a router. A verb with no entry answers 405.
///
/// ```ignore
/// let endpoint = Endpoint::new(state)
///     .get(|svc, ()| async move { ... })
///     .post(|svc, JsonBody(note): JsonBody<Note>| async move { ... });
/// ```
pub struct Endpoint<S> {
    state: Arc<S>,
    handlers: BTreeMap<RestMethod, ErasedHandler<S>>,
}

impl<S: Send + Sync + 'static> Endpoint<S> {
    pub fn new(state: Arc<S>) -> Self {
        Self {
            state,
            handlers: BTreeMap::new(),
        }
    }

    /// Register `handler` for `method`, replacing any earlier registration.
    ///
    /// `P` is the handler's parameter set; it is bound from each request
    /// before the handler runs.
    pub fn on<P, F, Fut>(mut self, method: RestMethod, handler: F) -> Self
    where
        P: FromRestRequest,
        F: Fn(Arc<S>, P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        let erased: ErasedHandler<S> = Box::new(
            move |state: Arc<S>, req: RestRequest| -> BoxFuture<HandlerResult> {
                match bind::<P>(&req) {
                    Ok(params) => Box::pin(handler(state, params)),
                    Err(e) => Box::pin(std::future::ready(Err(e))),
                }
            },
        );
        self.handlers.insert(method, erased);
        self
    }

    pub fn get<P, F, Fut>(self, handler: F) -> Self
    where
        P: FromRestRequest,
        F: Fn(Arc<S>, P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.on(RestMethod::Get, handler)
    }

    pub fn post<P, F, Fut>(self, handler: F) -> Self
    where
        P: FromRestRequest,
        F: Fn(Arc<S>, P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.on(RestMethod::Post, handler)
    }

    pub fn put<P, F, Fut>(self, handler: F) -> Self
    where
        P: FromRestRequest,
        F: Fn(Arc<S>, P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.on(RestMethod::Put, handler)
    }

    pub fn delete<P, F, Fut>(self, handler: F) -> Self
    where
        P: FromRestRequest,
        F: Fn(Arc<S>, P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.on(RestMethod::Delete, handler)
    }

    /// Verbs this endpoint implements, in declaration order of [`RestMethod`].
    pub fn methods(&self) -> Vec<RestMethod> {
        self.handlers.keys().copied().collect()
    }

    /// Route a request to the handler for its verb and return the handler's
    /// response unchanged. Errors become their status-echo responses.
    pub async fn dispatch(&self, path_params: HashMap<String, String>, request: Request) -> Response {
        match self.try_dispatch(path_params, request).await {
            Ok(resp) => resp,
            Err(e) => e.into_response(),
        }
    }

    async fn try_dispatch(
        &self,
        path_params: HashMap<String, String>,
        request: Request,
    ) -> HandlerResult {
        let verb = RestMethod::from_http(request.method());
        let Some((method, handler)) = verb.and_then(|m| self.handlers.get(&m).map(|h| (m, h))) else {
            return Err(ServiceError::MethodNotAllowed {
                allowed: RestMethod::default_names(),
            });
        };

        tracing::debug!(%method, ?path_params, "dispatching");

        let (parts, body) = request.into_parts();
        let body = axum::body::to_bytes(body, MAX_BODY_BYTES)
            .await
            .map_err(body_read_error)?;

        let req = RestRequest {
            method,
            path_params,
            headers: parts.headers,
            body,
        };
        handler(Arc::clone(&self.state), req).await
    }
}

fn body_read_error(err: axum::Error) -> ServiceError {
    let inner = err.into_inner();
    if inner.downcast_ref::<LengthLimitError>().is_some() {
        tracing::debug!(limit = MAX_BODY_BYTES, "request body over limit");
        return ServiceError::PayloadTooLarge(format!(
            "request body exceeds {} bytes",
            MAX_BODY_BYTES
        ));
    }
    ServiceError::Validation(format!("failed to read body: {}", inner))
}
