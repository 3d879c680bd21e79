//! Bound path parameters.
//!
//! Values are the raw path segments exactly as they appeared in the request
//! path: no percent-decoding, no trimming, and an empty segment binds as an
//! empty string.

use smallvec::SmallVec;

/// Parameters stored inline before spilling to the heap.
const INLINE_PARAMS: usize = 4;

/// Parameters bound by a matched route pattern, in pattern order.
///
/// # Example
///
/// ```rust
/// use netpath_router::Params;
///
/// let mut params = Params::new();
/// params.push("orgId", "acme");
/// params.push("userId", "");
///
/// assert_eq!(params.get("orgId"), Some("acme"));
/// assert_eq!(params.get("userId"), Some(""));
/// assert_eq!(params.get("unknown"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Params {
    bound: SmallVec<[(String, String); INLINE_PARAMS]>,
}

impl Params {
    /// Creates an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty parameter set sized for `capacity` bindings.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bound: SmallVec::with_capacity(capacity),
        }
    }

    /// Binds `name` to a raw segment value.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.bound.push((name.into(), value.into()));
    }

    /// Returns the raw value bound to `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.bound
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns true if `name` was bound, even to an empty segment.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.bound.iter().any(|(n, _)| n == name)
    }

    /// Returns true if nothing was bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bound.is_empty()
    }

    /// Number of bound parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bound.len()
    }

    /// Iterates `(name, value)` pairs in pattern order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.bound.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Iterates the bound parameter names in pattern order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bound.iter().map(|(n, _)| n.as_str())
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = (&'a str, &'a str);
    type IntoIter = std::iter::Map<
        std::slice::Iter<'a, (String, String)>,
        fn(&'a (String, String)) -> (&'a str, &'a str),
    >;

    fn into_iter(self) -> Self::IntoIter {
        self.bound.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for Params {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            bound: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_new() {
        let params = Params::new();
        assert!(params.is_empty());
        assert_eq!(params.len(), 0);
    }

    #[test]
    fn test_params_empty_value_is_bound() {
        let mut params = Params::new();
        params.push("id", "");

        assert!(params.contains("id"));
        assert_eq!(params.get("id"), Some(""));
        assert!(!params.contains("name"));
    }

    #[test]
    fn test_params_keeps_raw_encoding() {
        let mut params = Params::new();
        params.push("name", "a%20b");
        assert_eq!(params.get("name"), Some("a%20b"));
    }

    #[test]
    fn test_params_iter_in_pattern_order() {
        let mut params = Params::new();
        params.push("org", "acme");
        params.push("user", "7");

        let pairs: Vec<_> = params.iter().collect();
        assert_eq!(pairs, vec![("org", "acme"), ("user", "7")]);
        assert_eq!(params.names().collect::<Vec<_>>(), vec!["org", "user"]);
    }

    #[test]
    fn test_params_from_iterator() {
        let params: Params = vec![("a".to_string(), "1".to_string())].into_iter().collect();
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("a"), Some("1"));
    }

    #[test]
    fn test_params_spill_past_inline_capacity() {
        let mut params = Params::new();
        for i in 0..10 {
            params.push(format!("key{i}"), format!("value{i}"));
        }

        assert_eq!(params.len(), 10);
        assert_eq!(params.get("key5"), Some("value5"));
    }
}
