//! # oxide-predicate
//!
//! Request predicates for HTTP routing, built on URI path templates.
//!
//! This crate provides:
//! - URI path templates with named segments and wildcards
//! - Per-path memoization of extracted variables, safe to share across threads
//! - Protocol/method/template predicates with variable extraction
//! - Literal prefix predicates
//! - Query string parsing
//! - Route declarations loaded from JSON
//!
//! It does not own requests or dispatch them. A server hands its request
//! type to a predicate through the [`RouteRequest`] trait.
//!
//! ## Quick Start
//!
//! ```
//! use oxide_predicate::{HttpPredicate, Request, RequestPredicate};
//!
//! let predicate = HttpPredicate::get("/users/{id}").unwrap();
//!
//! let request = Request::get("/users/123");
//! assert!(predicate.test(&request));
//!
//! let vars = predicate.extract_variables(&request).unwrap();
//! assert_eq!(vars.get("id"), Some("123"));
//! ```
//!
//! ## Template Syntax
//!
//! | Construct   | Matches                                        |
//! |-------------|------------------------------------------------|
//! | `literal`   | itself, verbatim                               |
//! | `{name}`    | one path segment, captured as `name`           |
//! | `{name}**`  | the rest of the path, captured as `name`       |
//! | `**`        | the rest of the path, not captured             |
//!
//! ```
//! use oxide_predicate::UriPathTemplate;
//!
//! let template = UriPathTemplate::new("/files/{path}**").unwrap();
//! let vars = template.match_path("/files/docs/readme.md");
//! assert_eq!(vars.get("path"), Some("docs/readme.md"));
//! ```
//!
//! ## Query Variables
//!
//! GET predicates return query string variables when the request has any,
//! in place of path variables:
//!
//! ```
//! use oxide_predicate::{HttpPredicate, Request, RequestPredicate};
//!
//! let predicate = HttpPredicate::get("/search").unwrap();
//! let vars = predicate
//!     .extract_variables(&Request::get("/search?q=cats&safe"))
//!     .unwrap();
//! assert_eq!(vars.get("q"), Some("cats"));
//! assert_eq!(vars.value("safe"), Some(None));
//! ```
//!
//! ## Prefix Predicates
//!
//! ```
//! use oxide_predicate::{PrefixPredicate, Request, RequestPredicate};
//!
//! let assets = PrefixPredicate::get("/assets");
//! assert!(assets.test(&Request::get("/assets/app.js")));
//! ```
//!
//! ## Route Declarations
//!
//! ```
//! use oxide_predicate::{load_routes, Request, RequestPredicate};
//!
//! let routes = load_routes(r#"[{ "template": "/users/{id}", "method": "GET" }]"#).unwrap();
//! assert!(routes[0].test(&Request::get("/users/1")));
//! ```

mod config;
mod error;
mod predicate;
mod query;
mod request;
mod template;

pub use config::{load_routes, RouteSpec};
pub use error::{PredicateError, Result};
pub use predicate::{HttpPredicate, PrefixPredicate, RequestPredicate};
pub use query::parse_query;
pub use request::{Method, Request, RouteRequest, Variables, Version};
pub use template::UriPathTemplate;
