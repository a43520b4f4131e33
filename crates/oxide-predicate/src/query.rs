//! Query string parsing.

use std::borrow::Cow;

use crate::request::Variables;

/// Parses a query string (without the leading `?`) into variables.
///
/// Pairs are separated by `&` and split on the first `=` only. A pair with
/// no `=` yields a key without a value, so an empty pair between two `&`
/// yields the key `""`. Trailing empty pairs are dropped. When a key
/// repeats, the last occurrence wins. Keys and values are percent-decoded.
///
/// Returns `None` for an empty query string, so callers can tell "no query"
/// apart from a query that yielded nothing.
///
/// # Example
///
/// ```
/// use oxide_predicate::parse_query;
///
/// let vars = parse_query("a=1&b&c=3").unwrap();
/// assert_eq!(vars.get("a"), Some("1"));
/// assert_eq!(vars.value("b"), Some(None));
/// assert!(parse_query("").is_none());
/// ```
#[must_use]
pub fn parse_query(query: &str) -> Option<Variables> {
    if query.is_empty() {
        return None;
    }

    let mut pairs: Vec<&str> = query.split('&').collect();
    while pairs.last().is_some_and(|pair| pair.is_empty()) {
        pairs.pop();
    }

    let vars = pairs
        .into_iter()
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) => (decode(key), Some(decode(value))),
            None => (decode(pair), None),
        })
        .collect();

    Some(vars)
}

/// Percent-decodes `s`, keeping it raw if the result is not UTF-8.
pub(crate) fn decode(s: &str) -> String {
    urlencoding::decode(s).map_or_else(|_| s.to_string(), Cow::into_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pairs_and_valueless_keys() {
        let vars = parse_query("a=1&b&c=3").unwrap();
        assert_eq!(vars.len(), 3);
        assert_eq!(vars.value("a"), Some(Some("1")));
        assert_eq!(vars.value("b"), Some(None));
        assert_eq!(vars.value("c"), Some(Some("3")));
        assert_eq!(vars.value("d"), None);
    }

    #[test]
    fn test_last_occurrence_wins() {
        let vars = parse_query("a=1&a=2").unwrap();
        assert_eq!(vars.len(), 1);
        assert_eq!(vars.get("a"), Some("2"));

        let vars = parse_query("a=1&a").unwrap();
        assert_eq!(vars.value("a"), Some(None));
    }

    #[test]
    fn test_splits_on_first_equals_only() {
        let vars = parse_query("expr=x=y&empty=").unwrap();
        assert_eq!(vars.get("expr"), Some("x=y"));
        assert_eq!(vars.value("empty"), Some(Some("")));
    }

    #[test]
    fn test_empty_query_is_absent() {
        assert!(parse_query("").is_none());
    }

    #[test]
    fn test_empty_pairs() {
        let vars = parse_query("a=1&&b").unwrap();
        assert_eq!(vars.len(), 3);
        assert_eq!(vars.value(""), Some(None));
        assert_eq!(vars.get("b"), None);
        assert!(vars.contains_key("b"));

        let vars = parse_query("=x").unwrap();
        assert_eq!(vars.get(""), Some("x"));
    }

    #[test]
    fn test_trailing_empty_pairs_are_dropped() {
        let vars = parse_query("a=1&b=2&&").unwrap();
        assert_eq!(vars.len(), 2);
        assert!(!vars.contains_key(""));

        let vars = parse_query("&").unwrap();
        assert!(vars.is_empty());
    }

    #[test]
    fn test_percent_decoding() {
        let vars = parse_query("city=New%20York&q=caf%C3%A9&bad=%FF").unwrap();
        assert_eq!(vars.get("city"), Some("New York"));
        assert_eq!(vars.get("q"), Some("café"));
        assert_eq!(vars.get("bad"), Some("%FF"));
    }
}
