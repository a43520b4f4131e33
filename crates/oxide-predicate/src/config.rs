//! Route declarations.
//!
//! Route tables can be declared as data and turned into predicates at
//! startup. A declaration is either a template route or a prefix route:
//!
//! ```json
//! [
//!     { "template": "/users/{id}", "method": "GET" },
//!     { "template": "/upload", "method": "POST", "protocol": "HTTP/1.1" },
//!     { "prefix": "/static" },
//!     { "prefix": "/proxy", "method": null }
//! ]
//! ```
//!
//! A prefix route without a `method` only accepts GET; set it to `null` to
//! accept every method.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::predicate::{HttpPredicate, PrefixPredicate, RequestPredicate};
use crate::request::{Method, Version};

fn default_prefix_method() -> Option<Method> {
    Some(Method::Get)
}

/// A single route declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RouteSpec {
    /// A literal prefix route.
    Prefix {
        /// Literal prefix of the request target.
        prefix: String,
        /// Method constraint, GET when omitted.
        #[serde(default = "default_prefix_method")]
        method: Option<Method>,
    },
    /// A template route. Every field is optional.
    Template {
        /// URI template.
        #[serde(default)]
        template: Option<String>,
        /// Method constraint.
        #[serde(default)]
        method: Option<Method>,
        /// Protocol constraint.
        #[serde(default)]
        protocol: Option<Version>,
    },
}

impl RouteSpec {
    /// Parses a JSON array of route declarations.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PredicateError::Config`] on malformed JSON.
    pub fn from_json(json: &str) -> Result<Vec<Self>> {
        Ok(serde_json::from_str(json)?)
    }

    /// Builds the predicate this declaration describes.
    ///
    /// # Errors
    ///
    /// Fails if a template does not compile.
    pub fn build(&self) -> Result<Box<dyn RequestPredicate>> {
        debug!(route = ?self, "building route predicate");
        match self {
            Self::Prefix { prefix, method } => Ok(Box::new(PrefixPredicate::new(prefix, *method))),
            Self::Template {
                template,
                method,
                protocol,
            } => Ok(Box::new(HttpPredicate::new(
                template.as_deref(),
                *protocol,
                *method,
            )?)),
        }
    }
}

/// Parses and builds a whole route table.
///
/// Stops at the first declaration that fails to build, so a bad template
/// aborts registration instead of leaving a partial table behind.
///
/// # Errors
///
/// Returns the first parse or build error.
pub fn load_routes(json: &str) -> Result<Vec<Box<dyn RequestPredicate>>> {
    RouteSpec::from_json(json)?
        .iter()
        .map(RouteSpec::build)
        .collect()
}
