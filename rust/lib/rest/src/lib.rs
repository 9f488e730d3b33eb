//! Generic REST resource adapter.
//!
//! A resource is two endpoints on an axum router:
//!
//! - the collection endpoint at `/{name}`
//! - the instance endpoint at `/{name}/{instance_id}`
//!
//! Each endpoint maps the verbs it implements to handlers. A handler names
//! the parameters it needs through its argument type (see
//! [`FromRestRequest`]); the dispatcher binds them from the path and the
//! request, or rejects the request before the handler runs.

pub mod endpoint;
pub mod method;
pub mod request;
pub mod resource;

pub use endpoint::{Endpoint, HandlerResult};
pub use method::{RestMethod, DEFAULT_METHODS};
pub use request::{FromRestRequest, InstanceId, JsonBody, RestRequest, INSTANCE_ID};
pub use resource::RestResource;
