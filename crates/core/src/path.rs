//! Target path resolution against raw response mappings.
//!
//! A target is a ':'-separated sequence of keys into a nested JSON
//! mapping (`cumulativeVotes:stars`). Segments are literal object keys;
//! reaktor keys frequently contain dots
//! (`com.bookpac.user.settings.shop.country` is ONE key), so dots are
//! never separators.

use serde_json::Value;

/// Resolve a target path against a raw mapping.
///
/// Returns `None` when any intermediate or terminal key is absent, or
/// when an intermediate value is not an object. Never mutates the input.
pub fn resolve<'a>(raw: &'a Value, target: &str) -> Option<&'a Value> {
    let mut current = raw;
    for segment in target.split(':') {
        current = current.get(segment)?;
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resolves_top_level_key() {
        let raw = json!({"documentID": "42"});
        assert_eq!(resolve(&raw, "documentID"), Some(&json!("42")));
    }

    #[test]
    fn resolves_nested_segments() {
        let raw = json!({"cumulativeVotes": {"stars": 4}});
        assert_eq!(resolve(&raw, "cumulativeVotes:stars"), Some(&json!(4)));
    }

    #[test]
    fn dots_are_literal_key_characters() {
        let raw = json!({"settings": {"com.bookpac.user.settings.locale": "de_DE"}});
        assert_eq!(
            resolve(&raw, "settings:com.bookpac.user.settings.locale"),
            Some(&json!("de_DE"))
        );
    }

    #[test]
    fn missing_terminal_key_is_none() {
        let raw = json!({"a": {"b": 1}});
        assert_eq!(resolve(&raw, "a:c"), None);
    }

    #[test]
    fn missing_intermediate_key_is_none() {
        let raw = json!({"a": {"b": 1}});
        assert_eq!(resolve(&raw, "x:b"), None);
    }

    #[test]
    fn non_object_intermediate_is_none() {
        let raw = json!({"a": "scalar"});
        assert_eq!(resolve(&raw, "a:b"), None);
    }

    #[test]
    fn explicit_null_resolves_to_null() {
        let raw = json!({"a": null});
        assert_eq!(resolve(&raw, "a"), Some(&Value::Null));
    }
}
