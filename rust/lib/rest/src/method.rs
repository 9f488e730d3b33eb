use std::fmt;

use axum::http::Method;

/// The verbs a REST endpoint can implement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RestMethod {
    Get,
    Post,
    Put,
    Delete,
}

/// Every verb the adapter understands, in the order they are reported
/// to clients.
pub const DEFAULT_METHODS: [RestMethod; 4] = [
    RestMethod::Get,
    RestMethod::Post,
    RestMethod::Put,
    RestMethod::Delete,
];

impl RestMethod {
    /// Map an HTTP method onto a REST verb. Anything else (PATCH, HEAD,
    /// OPTIONS, extension methods) has no handler slot.
    pub fn from_http(method: &Method) -> Option<Self> {
        match *method {
            Method::GET => Some(RestMethod::Get),
            Method::POST => Some(RestMethod::Post),
            Method::PUT => Some(RestMethod::Put),
            Method::DELETE => Some(RestMethod::Delete),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RestMethod::Get => "GET",
            RestMethod::Post => "POST",
            RestMethod::Put => "PUT",
            RestMethod::Delete => "DELETE",
        }
    }

    /// Names of [`DEFAULT_METHODS`], as listed in a 405 response.
    pub fn default_names() -> Vec<&'static str> {
        DEFAULT_METHODS.iter().map(|m| m.as_str()).collect()
    }
}

impl fmt::Display for RestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_supported_verbs() {
        assert_eq!(RestMethod::from_http(&Method::GET), Some(RestMethod::Get));
        assert_eq!(RestMethod::from_http(&Method::POST), Some(RestMethod::Post));
        assert_eq!(RestMethod::from_http(&Method::PUT), Some(RestMethod::Put));
        assert_eq!(RestMethod::from_http(&Method::DELETE), Some(RestMethod::Delete));
    }

    #[test]
    fn rejects_other_verbs() {
        assert_eq!(RestMethod::from_http(&Method::PATCH), None);
        assert_eq!(RestMethod::from_http(&Method::HEAD), None);
        assert_eq!(RestMethod::from_http(&Method::OPTIONS), None);
    }

    #[test]
    fn default_names_in_order() {
        assert_eq!(RestMethod::default_names(), vec!["GET", "POST", "PUT", "DELETE"]);
    }
}
