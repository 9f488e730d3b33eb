use std::collections::HashMap;

use axum::body::Bytes;
use axum::http::HeaderMap;
use notes_core::ServiceError;
use serde::de::DeserializeOwned;

use crate::method::RestMethod;

/// Path parameter carrying the identifier on instance routes.
pub const INSTANCE_ID: &str = "instance_id";

/// Everything a handler can bind its parameters from: the matched path
/// parameters plus the request itself, with the body already read.
#[derive(Debug, Clone)]
pub struct RestRequest {
    pub method: RestMethod,
    pub path_params: HashMap<String, String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RestRequest {
    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params.get(name).map(|s| s.as_str())
    }
}

/// A statically declared handler parameter set.
///
/// Implementors list the path parameters they consume and build themselves
/// from a [`RestRequest`]. The dispatcher refuses to call a handler whose
/// declared path parameters differ from the ones the route matched.
pub trait FromRestRequest: Sized + Send + 'static {
    /// Names of the path parameters this parameter set consumes.
    fn path_params() -> Vec<&'static str> {
        Vec::new()
    }

    fn from_rest_request(req: &RestRequest) -> Result<Self, ServiceError>;
}

/// Check the route's path parameters against what `P` declares, then build `P`.
pub(crate) fn bind<P: FromRestRequest>(req: &RestRequest) -> Result<P, ServiceError> {
    let declared = P::path_params();

    if let Some(missing) = declared.iter().find(|name| !req.path_params.contains_key(**name)) {
        return Err(ServiceError::Validation(format!(
            "handler expects path parameter '{}' which the route does not provide",
            missing
        )));
    }
    if let Some(extra) = req
        .path_params
        .keys()
        .find(|name| !declared.iter().any(|d| *d == name.as_str()))
    {
        return Err(ServiceError::Validation(format!(
            "route provides path parameter '{}' which the handler does not take",
            extra
        )));
    }

    P::from_rest_request(req)
}

impl FromRestRequest for () {
    fn from_rest_request(_req: &RestRequest) -> Result<Self, ServiceError> {
        Ok(())
    }
}

/// The raw request, for handlers that read headers or the body themselves.
impl FromRestRequest for RestRequest {
    fn from_rest_request(req: &RestRequest) -> Result<Self, ServiceError> {
        Ok(req.clone())
    }
}

/// Integer identifier taken from the `instance_id` path parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstanceId(pub i64);

impl FromRestRequest for InstanceId {
    fn path_params() -> Vec<&'static str> {
        vec![INSTANCE_ID]
    }

    fn from_rest_request(req: &RestRequest) -> Result<Self, ServiceError> {
        let raw = req.path_param(INSTANCE_ID).ok_or_else(|| {
            ServiceError::Validation(format!("missing path parameter '{}'", INSTANCE_ID))
        })?;
        raw.parse::<i64>().map(InstanceId).map_err(|_| {
            ServiceError::Validation(format!("'{}' is not an integer identifier", raw))
        })
    }
}

/// Request body parsed as JSON into `T`.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

impl<T: DeserializeOwned + Send + 'static> FromRestRequest for JsonBody<T> {
    fn from_rest_request(req: &RestRequest) -> Result<Self, ServiceError> {
        serde_json::from_slice(&req.body)
            .map(JsonBody)
            .map_err(|e| ServiceError::Validation(format!("invalid JSON body: {}", e)))
    }
}

impl<A: FromRestRequest, B: FromRestRequest> FromRestRequest for (A, B) {
    fn path_params() -> Vec<&'static str> {
        let mut names = A::path_params();
        for name in B::path_params() {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    fn from_rest_request(req: &RestRequest) -> Result<Self, ServiceError> {
        Ok((A::from_rest_request(req)?, B::from_rest_request(req)?))
    }
}
