//! URI path templates.
//!
//! A template is a path with placeholders:
//!
//! - `/users` - literal path, matched verbatim
//! - `/users/{id}` - captures one path segment as `id`
//! - `/files/{path}**` - captures the rest of the path, separators included
//! - `/static/**` - matches the rest of the path without capturing it
//!
//! Templates compile to an anchored regex. Constructs are rewritten in a
//! fixed order: named wildcards first, then named segments, then anonymous
//! wildcards. `{name}**` has to go first since `{name}` is a prefix of it.

use std::sync::{Arc, LazyLock};

use dashmap::DashMap;
use regex::{Captures, Regex};
use tracing::{debug, trace};

use crate::error::{PredicateError, Result};
use crate::request::Variables;

static NAME_SPLAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^/]+?)\}\*\*").expect("valid name splat regex"));

static NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^/]+?)\}").expect("valid name regex"));

static FULL_SPLAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*").expect("valid full splat regex"));

/// A piece of a template after rewriting.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Fragment {
    /// Text matched verbatim.
    Literal(String),
    /// `{name}**`
    NameSplat(String),
    /// `{name}`
    Name(String),
    /// `**`
    FullSplat,
}

impl Fragment {
    fn variable(&self) -> Option<&str> {
        match self {
            Self::NameSplat(name) | Self::Name(name) => Some(name),
            Self::Literal(_) | Self::FullSplat => None,
        }
    }

    fn push_regex(&self, out: &mut String) {
        match self {
            Self::Literal(text) => out.push_str(&regex::escape(text)),
            Self::NameSplat(name) => {
                out.push_str("(?P<");
                out.push_str(name);
                out.push_str(">.*)");
            }
            Self::Name(name) => {
                out.push_str("(?P<");
                out.push_str(name);
                out.push_str(">[^/]*)");
            }
            Self::FullSplat => out.push_str(".*"),
        }
    }
}

/// Applies one rewrite rule to every literal fragment.
///
/// Fragments produced by earlier rules are left alone, so a later rule
/// never sees syntax an earlier one consumed.
fn rewrite(
    fragments: Vec<Fragment>,
    rule: &Regex,
    make: impl Fn(&Captures<'_>) -> Fragment,
) -> Vec<Fragment> {
    let mut out = Vec::with_capacity(fragments.len());

    for fragment in fragments {
        let Fragment::Literal(text) = fragment else {
            out.push(fragment);
            continue;
        };

        let mut last = 0;
        for caps in rule.captures_iter(&text) {
            let whole = caps.get(0).expect("group 0 is always present");
            if whole.start() > last {
                out.push(Fragment::Literal(text[last..whole.start()].to_string()));
            }
            out.push(make(&caps));
            last = whole.end();
        }
        if last < text.len() {
            out.push(Fragment::Literal(text[last..].to_string()));
        }
    }

    out
}

/// Compiles a template into its fragments, rule by rule.
fn parse(template: &str) -> Vec<Fragment> {
    let fragments = vec![Fragment::Literal(template.to_string())];
    let fragments = rewrite(fragments, &NAME_SPLAT, |c| {
        Fragment::NameSplat(c[1].to_string())
    });
    let fragments = rewrite(fragments, &NAME, |c| Fragment::Name(c[1].to_string()));
    rewrite(fragments, &FULL_SPLAT, |_| Fragment::FullSplat)
}

/// A compiled URI path template.
///
/// Matching results are memoized per distinct path string. The memo only
/// grows; it lives as long as the template does. A template is meant to be
/// shared across threads (usually behind the predicate that owns it).
#[derive(Debug)]
pub struct UriPathTemplate {
    /// The original template string.
    source: String,
    /// Anchored pattern.
    pattern: Regex,
    /// Variable names, in capture group order.
    variables: Vec<String>,
    /// Path -> extracted variables.
    cache: DashMap<String, Arc<Variables>>,
}

impl UriPathTemplate {
    /// Compiles a template.
    ///
    /// # Errors
    ///
    /// Returns [`PredicateError::InvalidTemplate`] if the rewritten template
    /// is not a valid pattern, e.g. when a variable name is not a valid
    /// identifier or appears twice.
    ///
    /// # Example
    ///
    /// ```
    /// use oxide_predicate::UriPathTemplate;
    ///
    /// let template = UriPathTemplate::new("/posts/{id}/comments/{comment_id}").unwrap();
    /// let vars = template.match_path("/posts/123/comments/456");
    /// assert_eq!(vars.get("id"), Some("123"));
    /// assert_eq!(vars.get("comment_id"), Some("456"));
    /// ```
    pub fn new(template: &str) -> Result<Self> {
        let fragments = parse(template);

        let mut regex_str = String::from("^");
        for fragment in &fragments {
            fragment.push_regex(&mut regex_str);
        }
        regex_str.push('$');

        let pattern = Regex::new(&regex_str).map_err(|source| PredicateError::InvalidTemplate {
            template: template.to_string(),
            source,
        })?;

        let variables: Vec<String> = fragments
            .iter()
            .filter_map(Fragment::variable)
            .map(str::to_string)
            .collect();
        debug_assert_eq!(pattern.captures_len(), variables.len() + 1);

        debug!(template, pattern = pattern.as_str(), ?variables, "compiled uri template");

        Ok(Self {
            source: template.to_string(),
            pattern,
            variables,
            cache: DashMap::new(),
        })
    }

    /// Returns true if the whole path matches the template.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        self.pattern.is_match(path)
    }

    /// Extracts the template's variables from a path.
    ///
    /// If the path does not match, or the template declares no variables,
    /// the result is empty. Results are memoized: calling this again with
    /// the same path returns the same `Arc`.
    pub fn match_path(&self, path: &str) -> Arc<Variables> {
        if let Some(hit) = self.cache.get(path) {
            return Arc::clone(hit.value());
        }

        trace!(template = %self.source, path, "template match cache miss");
        let vars = Arc::new(self.capture(path));

        // A racing thread may have published first; keep its value.
        Arc::clone(self.cache.entry(path.to_string()).or_insert(vars).value())
    }

    fn capture(&self, path: &str) -> Variables {
        let Some(caps) = self.pattern.captures(path) else {
            return Variables::new();
        };

        self.variables
            .iter()
            .enumerate()
            .filter_map(|(i, name)| {
                caps.get(i + 1)
                    .map(|m| (name.as_str(), Some(m.as_str().to_string())))
            })
            .collect()
    }

    /// Returns the original template string.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the compiled, anchored pattern.
    #[must_use]
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Returns the variable names in the order they appear in the template.
    #[must_use]
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Number of distinct paths memoized so far.
    #[must_use]
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_path() {
        let template = UriPathTemplate::new("/users").unwrap();
        assert!(template.matches("/users"));
        assert!(!template.matches("/users/"));
        assert!(!template.matches("/api/users"));
        assert!(template.variables().is_empty());
    }

    #[test]
    fn test_named_segment() {
        let template = UriPathTemplate::new("/users/{id}").unwrap();
        assert!(template.matches("/users/42"));
        assert!(!template.matches("/users/42/edit"));

        let vars = template.match_path("/users/42");
        assert_eq!(vars.len(), 1);
        assert_eq!(vars.get("id"), Some("42"));
        assert!(template.match_path("/users/42/edit").is_empty());
    }

    #[test]
    fn test_named_wildcard_spans_separators() {
        let template = UriPathTemplate::new("/files/{path}**").unwrap();
        assert_eq!(template.variables(), ["path"]);

        let vars = template.match_path("/files/a/b/c");
        assert_eq!(vars.get("path"), Some("a/b/c"));
    }

    #[test]
    fn test_anonymous_wildcard() {
        let template = UriPathTemplate::new("/**").unwrap();
        assert!(template.matches("/anything/at/all"));
        assert!(template.match_path("/anything/at/all").is_empty());

        let template = UriPathTemplate::new("/static/**/index.html").unwrap();
        assert!(template.matches("/static/a/b/index.html"));
        assert!(!template.matches("/static/a/b/main.js"));
    }

    #[test]
    fn test_variables_follow_source_order() {
        let template = UriPathTemplate::new("/{bucket}/{key}**").unwrap();
        assert_eq!(template.variables(), ["bucket", "key"]);

        let vars = template.match_path("/photos/2024/june/beach.jpg");
        assert_eq!(vars.get("bucket"), Some("photos"));
        assert_eq!(vars.get("key"), Some("2024/june/beach.jpg"));
    }

    #[test]
    fn test_mixed_constructs() {
        let template = UriPathTemplate::new("/repos/{owner}/{repo}/**").unwrap();
        assert_eq!(template.variables(), ["owner", "repo"]);

        let vars = template.match_path("/repos/rust-lang/rust/tree/master");
        assert_eq!(vars.get("owner"), Some("rust-lang"));
        assert_eq!(vars.get("repo"), Some("rust"));
    }

    #[test]
    fn test_literals_are_escaped() {
        let template = UriPathTemplate::new("/v1.0/items+{id}").unwrap();
        assert!(template.matches("/v1.0/items+7"));
        assert!(!template.matches("/v1x0/items+7"));
        assert!(!template.matches("/v1.0/itemss7"));
    }

    #[test]
    fn test_capture_groups_line_up_with_variables() {
        for source in ["/a", "/{a}", "/{a}**", "/{a}/{b}/**", "/x/{a}/y/{b}**"] {
            let template = UriPathTemplate::new(source).unwrap();
            let pattern = Regex::new(template.pattern()).unwrap();
            assert_eq!(pattern.captures_len() - 1, template.variables().len());
        }
    }

    #[test]
    fn test_pattern_is_anchored() {
        let template = UriPathTemplate::new("/users/{id}").unwrap();
        assert!(template.pattern().starts_with('^'));
        assert!(template.pattern().ends_with('$'));
        assert!(!template.matches("/api/users/1"));
    }

    #[test]
    fn test_invalid_variable_name_fails_at_construction() {
        let err = UriPathTemplate::new("/users/{user id}").unwrap_err();
        assert!(matches!(
            err,
            PredicateError::InvalidTemplate { ref template, .. } if template == "/users/{user id}"
        ));
    }

    #[test]
    fn test_duplicate_variable_fails_at_construction() {
        assert!(UriPathTemplate::new("/{id}/{id}").is_err());
    }

    #[test]
    fn test_match_is_memoized() {
        let template = UriPathTemplate::new("/users/{id}").unwrap();
        let first = template.match_path("/users/42");
        let second = template.match_path("/users/42");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(template.cached_len(), 1);

        // Misses are memoized too, and paths are not normalized.
        template.match_path("/nope");
        template.match_path("/users/42/");
        assert_eq!(template.cached_len(), 3);
    }

    #[test]
    fn test_matches_does_not_touch_cache() {
        let template = UriPathTemplate::new("/users/{id}").unwrap();
        assert!(template.matches("/users/1"));
        assert_eq!(template.cached_len(), 0);
    }

    #[test]
    fn test_empty_segment_capture() {
        let template = UriPathTemplate::new("/users/{id}").unwrap();
        let vars = template.match_path("/users/");
        assert_eq!(vars.value("id"), Some(Some("")));
    }
}
