//! Request predicates.
//!
//! [`HttpPredicate`] combines an optional protocol, method and URI template.
//! [`PrefixPredicate`] is a cheaper method + string prefix test that never
//! compiles a template.

use std::borrow::Cow;
use std::sync::Arc;

use http::Uri;
use tracing::warn;

use crate::error::Result;
use crate::query::{decode, parse_query};
use crate::request::{Method, RouteRequest, Variables, Version};
use crate::template::UriPathTemplate;

/// A boolean test over an incoming request.
///
/// Predicates are built once at route registration and then shared by every
/// thread dispatching requests, so implementations must be `Send + Sync`.
pub trait RequestPredicate: Send + Sync + std::fmt::Debug {
    /// Returns true if the request satisfies this predicate.
    fn test(&self, request: &dyn RouteRequest) -> bool;

    /// Extracts variables for a request.
    ///
    /// Returns `None` when there is nothing to extract. The default
    /// implementation never extracts anything.
    fn extract_variables(&self, _request: &dyn RouteRequest) -> Option<Arc<Variables>> {
        None
    }
}

/// Parses a raw request target, logging instead of failing.
fn parse_uri(raw: &str) -> Option<Uri> {
    match raw.parse::<Uri>() {
        Ok(uri) => Some(uri),
        Err(e) => {
            warn!(uri = raw, error = %e, "could not parse request uri");
            None
        }
    }
}

/// A predicate on protocol, method and URI template.
///
/// Every part is optional; a predicate with none of them matches every
/// request.
///
/// GET predicates match the template against the percent-decoded path
/// component only, and prefer query string variables over path variables.
/// Other methods match the raw request target as-is, query string included.
///
/// # Example
///
/// ```
/// use oxide_predicate::{HttpPredicate, Request, RequestPredicate};
///
/// let predicate = HttpPredicate::get("/users/{id}").unwrap();
/// let request = Request::get("/users/42");
/// assert!(predicate.test(&request));
///
/// let vars = predicate.extract_variables(&request).unwrap();
/// assert_eq!(vars.get("id"), Some("42"));
/// ```
#[derive(Debug)]
pub struct HttpPredicate {
    protocol: Option<Version>,
    method: Option<Method>,
    template: Option<UriPathTemplate>,
}

impl HttpPredicate {
    /// Creates a predicate from its optional parts.
    ///
    /// # Errors
    ///
    /// Fails if the template does not compile.
    pub fn new(
        template: Option<&str>,
        protocol: Option<Version>,
        method: Option<Method>,
    ) -> Result<Self> {
        let template = template.map(UriPathTemplate::new).transpose()?;
        Ok(Self {
            protocol,
            method,
            template,
        })
    }

    /// Creates a predicate that accepts any method and protocol.
    ///
    /// # Errors
    ///
    /// Fails if the template does not compile.
    pub fn any(template: &str) -> Result<Self> {
        Self::new(Some(template), None, None)
    }

    /// Creates a GET predicate.
    ///
    /// # Errors
    ///
    /// Fails if the template does not compile.
    pub fn get(template: &str) -> Result<Self> {
        Self::new(Some(template), None, Some(Method::Get))
    }

    /// Creates a POST predicate.
    ///
    /// # Errors
    ///
    /// Fails if the template does not compile.
    pub fn post(template: &str) -> Result<Self> {
        Self::new(Some(template), None, Some(Method::Post))
    }

    /// Creates a PUT predicate.
    ///
    /// # Errors
    ///
    /// Fails if the template does not compile.
    pub fn put(template: &str) -> Result<Self> {
        Self::new(Some(template), None, Some(Method::Put))
    }

    /// Creates a DELETE predicate.
    ///
    /// # Errors
    ///
    /// Fails if the template does not compile.
    pub fn delete(template: &str) -> Result<Self> {
        Self::new(Some(template), None, Some(Method::Delete))
    }

    /// Returns the protocol constraint.
    #[must_use]
    pub const fn protocol(&self) -> Option<Version> {
        self.protocol
    }

    /// Returns the method constraint.
    #[must_use]
    pub const fn method(&self) -> Option<Method> {
        self.method
    }

    /// Returns the compiled template, if any.
    #[must_use]
    pub const fn template(&self) -> Option<&UriPathTemplate> {
        self.template.as_ref()
    }

    fn is_get(&self) -> bool {
        self.method == Some(Method::Get)
    }

    /// The string the template is matched against.
    fn effective_path<'a>(&self, raw: &'a str) -> Cow<'a, str> {
        if self.is_get() {
            if let Some(uri) = parse_uri(raw) {
                return Cow::Owned(decode(uri.path()));
            }
        }
        Cow::Borrowed(raw)
    }

    /// Extracts variables from a raw request target.
    ///
    /// For GET predicates a non-empty query string wins: it is parsed and
    /// returned without consulting the template. Otherwise the template's
    /// path variables are returned, or `None` if there are none.
    #[must_use]
    pub fn extract_uri(&self, raw: &str) -> Option<Arc<Variables>> {
        let mut path = Cow::Borrowed(raw);

        if self.is_get() {
            if let Some(uri) = parse_uri(raw) {
                if let Some(vars) = uri.query().and_then(parse_query) {
                    return Some(Arc::new(vars));
                }
                path = Cow::Owned(decode(uri.path()));
            }
        }

        let vars = self.template.as_ref()?.match_path(&path);
        (!vars.is_empty()).then_some(vars)
    }
}

impl RequestPredicate for HttpPredicate {
    fn test(&self, request: &dyn RouteRequest) -> bool {
        self.protocol.is_none_or(|p| p == request.protocol())
            && self.method.is_none_or(|m| m == request.method())
            && self
                .template
                .as_ref()
                .is_none_or(|t| t.matches(&self.effective_path(request.uri())))
    }

    fn extract_variables(&self, request: &dyn RouteRequest) -> Option<Arc<Variables>> {
        self.extract_uri(request.uri())
    }
}

/// A predicate on method and a literal prefix of the request target.
///
/// The prefix is not anchored to a segment boundary: `/api` matches both
/// `/api/v1` and `/apix`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixPredicate {
    method: Option<Method>,
    prefix: String,
}

impl PrefixPredicate {
    /// Creates a prefix predicate. A missing leading `/` is added.
    ///
    /// # Example
    ///
    /// ```
    /// use oxide_predicate::{Method, PrefixPredicate, Request, RequestPredicate};
    ///
    /// let predicate = PrefixPredicate::new("static", Some(Method::Get));
    /// assert_eq!(predicate.prefix(), "/static");
    /// assert!(predicate.test(&Request::get("/static/app.js")));
    /// ```
    pub fn new(prefix: &str, method: Option<Method>) -> Self {
        let prefix = if prefix.starts_with('/') {
            prefix.to_string()
        } else {
            format!("/{prefix}")
        };
        Self { method, prefix }
    }

    /// Creates a GET prefix predicate, handy for mapping a directory tree.
    pub fn get(prefix: &str) -> Self {
        Self::new(prefix, Some(Method::Get))
    }

    /// Returns the prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the method constraint.
    #[must_use]
    pub const fn method(&self) -> Option<Method> {
        self.method
    }
}

impl RequestPredicate for PrefixPredicate {
    fn test(&self, request: &dyn RouteRequest) -> bool {
        self.method.is_none_or(|m| m == request.method()) && request.uri().starts_with(&self.prefix)
    }
}
