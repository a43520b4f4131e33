//! The request capability consumed by predicates.

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PredicateError;

/// HTTP request methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Method {
    /// GET method
    #[serde(rename = "GET")]
    Get,
    /// POST method
    #[serde(rename = "POST")]
    Post,
    /// PUT method
    #[serde(rename = "PUT")]
    Put,
    /// PATCH method
    #[serde(rename = "PATCH")]
    Patch,
    /// DELETE method
    #[serde(rename = "DELETE")]
    Delete,
    /// HEAD method
    #[serde(rename = "HEAD")]
    Head,
    /// OPTIONS method
    #[serde(rename = "OPTIONS")]
    Options,
}

impl Method {
    /// Returns the method as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        }
    }
}

impl FromStr for Method {
    type Err = PredicateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            "HEAD" => Ok(Self::Head),
            "OPTIONS" => Ok(Self::Options),
            _ => Err(PredicateError::UnknownMethod(s.to_string())),
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HTTP protocol versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Version {
    /// HTTP/1.0
    #[serde(rename = "HTTP/1.0")]
    Http10,
    /// HTTP/1.1
    #[serde(rename = "HTTP/1.1")]
    Http11,
    /// HTTP/2
    #[serde(rename = "HTTP/2")]
    Http2,
    /// HTTP/3
    #[serde(rename = "HTTP/3")]
    Http3,
}

impl Version {
    /// Returns the version as it appears on the request line.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Http10 => "HTTP/1.0",
            Self::Http11 => "HTTP/1.1",
            Self::Http2 => "HTTP/2",
            Self::Http3 => "HTTP/3",
        }
    }
}

impl FromStr for Version {
    type Err = PredicateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "HTTP/1.0" => Ok(Self::Http10),
            "HTTP/1.1" => Ok(Self::Http11),
            "HTTP/2" | "HTTP/2.0" => Ok(Self::Http2),
            "HTTP/3" | "HTTP/3.0" => Ok(Self::Http3),
            _ => Err(PredicateError::UnknownVersion(s.to_string())),
        }
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Variables extracted from a request.
///
/// Values are optional because a query string may name a key without
/// assigning it (`?debug`). Path captures always carry a value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Variables {
    vars: HashMap<String, Option<String>>,
}

impl Variables {
    /// Creates an empty set of variables.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a variable, replacing any previous value for the key.
    pub fn insert(&mut self, key: impl Into<String>, value: Option<String>) {
        self.vars.insert(key.into(), value);
    }

    /// Gets a variable's value.
    ///
    /// Returns `None` both when the key is absent and when it has no value;
    /// use [`Variables::value`] to tell the two apart.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.value(key).flatten()
    }

    /// Gets a variable, distinguishing a valueless key (`Some(None)`) from an
    /// absent one (`None`).
    #[must_use]
    pub fn value(&self, key: &str) -> Option<Option<&str>> {
        self.vars.get(key).map(Option::as_deref)
    }

    /// Returns true if the key is present, with or without a value.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    /// Number of variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Returns true if no variables were extracted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Returns an iterator over the variables.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }
}

impl<K: Into<String>> FromIterator<(K, Option<String>)> for Variables {
    fn from_iter<I: IntoIterator<Item = (K, Option<String>)>>(iter: I) -> Self {
        let mut vars = Self::new();
        for (key, value) in iter {
            vars.insert(key, value);
        }
        vars
    }
}

/// The minimum a transport's request type must expose to be routed.
///
/// Predicates only ever read these three accessors, so any server can plug
/// its own request type in without depending on this crate's [`Request`].
pub trait RouteRequest {
    /// The raw request target, including any query string.
    fn uri(&self) -> &str;

    /// The request method.
    fn method(&self) -> Method;

    /// The protocol version of the request line.
    fn protocol(&self) -> Version;
}

/// A plain request head.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// HTTP method.
    pub method: Method,
    /// Raw request target.
    pub uri: String,
    /// Protocol version.
    pub protocol: Version,
}

impl Request {
    /// Creates a new HTTP/1.1 request.
    pub fn new(method: Method, uri: impl Into<String>) -> Self {
        Self {
            method,
            uri: uri.into(),
            protocol: Version::Http11,
        }
    }

    /// Creates a GET request.
    pub fn get(uri: impl Into<String>) -> Self {
        Self::new(Method::Get, uri)
    }

    /// Creates a POST request.
    pub fn post(uri: impl Into<String>) -> Self {
        Self::new(Method::Post, uri)
    }

    /// Creates a PUT request.
    pub fn put(uri: impl Into<String>) -> Self {
        Self::new(Method::Put, uri)
    }

    /// Creates a DELETE request.
    pub fn delete(uri: impl Into<String>) -> Self {
        Self::new(Method::Delete, uri)
    }

    /// Sets the protocol version.
    #[must_use]
    pub fn with_protocol(mut self, protocol: Version) -> Self {
        self.protocol = protocol;
        self
    }
}

impl RouteRequest for Request {
    fn uri(&self) -> &str {
        &self.uri
    }

    fn method(&self) -> Method {
        self.method
    }

    fn protocol(&self) -> Version {
        self.protocol
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_parsing() {
        assert_eq!("GET".parse::<Method>().unwrap(), Method::Get);
        assert_eq!("post".parse::<Method>().unwrap(), Method::Post);
        assert!(matches!(
            "INVALID".parse::<Method>(),
            Err(PredicateError::UnknownMethod(m)) if m == "INVALID"
        ));
    }

    #[test]
    fn test_version_parsing() {
        assert_eq!("HTTP/1.1".parse::<Version>().unwrap(), Version::Http11);
        assert_eq!("http/2.0".parse::<Version>().unwrap(), Version::Http2);
        assert!("SPDY/3".parse::<Version>().is_err());
        assert_eq!(Version::Http10.to_string(), "HTTP/1.0");
    }

    #[test]
    fn test_request_builder() {
        let req = Request::delete("/users/1").with_protocol(Version::Http2);

        assert_eq!(req.method(), Method::Delete);
        assert_eq!(req.uri(), "/users/1");
        assert_eq!(req.protocol(), Version::Http2);
    }

    #[test]
    fn test_variables() {
        let mut vars = Variables::new();
        vars.insert("id", Some("123".to_string()));
        vars.insert("debug", None);

        assert_eq!(vars.get("id"), Some("123"));
        assert_eq!(vars.get("debug"), None);
        assert_eq!(vars.value("debug"), Some(None));
        assert!(vars.contains_key("debug"));
        assert_eq!(vars.value("missing"), None);
        assert_eq!(vars.len(), 2);

        let mut pairs: Vec<_> = vars.iter().collect();
        pairs.sort_unstable();
        assert_eq!(pairs, [("debug", None), ("id", Some("123"))]);
    }

    #[test]
    fn test_method_serde_names() {
        let m: Method = serde_json::from_str("\"PUT\"").unwrap();
        assert_eq!(m, Method::Put);
        let v: Version = serde_json::from_str("\"HTTP/1.0\"").unwrap();
        assert_eq!(v, Version::Http10);
    }
}
