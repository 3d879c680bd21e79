//! Per-method ordered route lists.

use std::cmp::Ordering;
use std::collections::HashMap;

use http::Method;

use crate::pattern::Pattern;
use crate::RouteMatch;

/// A registered route: its pattern and the value stored for it.
#[derive(Debug, Clone)]
pub struct Route<T> {
    pattern: Pattern,
    value: T,
}

impl<T> Route<T> {
    /// The route's pattern.
    #[must_use]
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// The stored value.
    #[must_use]
    pub fn value(&self) -> &T {
        &self.value
    }
}

/// Routes grouped by HTTP method, each group kept in match order.
///
/// Within a method, routes are ordered by [`Pattern::cmp_specificity`];
/// routes of equal specificity keep their registration order. Lookup is a
/// linear scan that returns the first route whose pattern accepts the path.
///
/// # Example
///
/// ```rust
/// use netpath_router::{Pattern, RouteTable};
/// use http::Method;
///
/// let mut table = RouteTable::new();
/// table.insert(Method::GET, Pattern::parse("/health").unwrap(), 1);
///
/// assert_eq!(table.lookup(&Method::GET, "/health").map(|m| *m.value), Some(1));
/// assert!(table.lookup(&Method::POST, "/health").is_none());
/// ```
#[derive(Debug, Clone)]
pub struct RouteTable<T> {
    methods: HashMap<Method, Vec<Route<T>>>,
    route_count: usize,
}

impl<T> Default for RouteTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RouteTable<T> {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            methods: HashMap::new(),
            route_count: 0,
        }
    }

    /// Registers `value` under `method` and `pattern`.
    ///
    /// Registering the same method and verbatim pattern again replaces the
    /// stored value in place and returns the previous one.
    pub fn insert(&mut self, method: Method, pattern: Pattern, value: T) -> Option<T> {
        let routes = self.methods.entry(method).or_default();

        if let Some(existing) = routes
            .iter_mut()
            .find(|r| r.pattern.as_str() == pattern.as_str())
        {
            return Some(std::mem::replace(&mut existing.value, value));
        }

        let at = routes
            .partition_point(|r| r.pattern.cmp_specificity(&pattern) != Ordering::Greater);
        routes.insert(at, Route { pattern, value });
        self.route_count += 1;
        None
    }

    /// Finds the first route for `method` whose pattern accepts `path`.
    #[must_use]
    pub fn lookup(&self, method: &Method, path: &str) -> Option<RouteMatch<'_, T>> {
        self.methods.get(method)?.iter().find_map(|route| {
            route
                .pattern
                .matches(path)
                .map(|params| RouteMatch::new(&route.value, route.pattern.as_str(), params))
        })
    }

    /// Routes registered for `method`, in match order.
    pub fn routes(&self, method: &Method) -> impl Iterator<Item = &Route<T>> {
        self.methods.get(method).into_iter().flatten()
    }

    /// Methods that have at least one route.
    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.methods.keys()
    }

    /// Total number of distinct (method, pattern) routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.route_count
    }

    /// Returns true if no routes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.route_count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(raw: &str) -> Pattern {
        Pattern::parse(raw).unwrap()
    }

    #[test]
    fn test_reinsert_replaces_value() {
        let mut table = RouteTable::new();
        assert_eq!(table.insert(Method::GET, pattern("/users/:id"), "first"), None);
        assert_eq!(
            table.insert(Method::GET, pattern("/users/:id"), "second"),
            Some("first")
        );

        assert_eq!(table.len(), 1);
        assert_eq!(*table.lookup(&Method::GET, "/users/1").unwrap().value, "second");
    }

    #[test]
    fn test_equivalent_patterns_are_distinct() {
        let mut table = RouteTable::new();
        table.insert(Method::GET, pattern("/users/:id"), "by_id");
        table.insert(Method::GET, pattern("/users/:name"), "by_name");

        assert_eq!(table.len(), 2);
        let m = table.lookup(&Method::GET, "/users/x").unwrap();
        assert_eq!(*m.value, "by_id");
        assert_eq!(m.params.get("id"), Some("x"));
    }

    #[test]
    fn test_equal_specificity_keeps_registration_order() {
        let mut table = RouteTable::new();
        table.insert(Method::GET, pattern("/:a/x"), "first");
        table.insert(Method::GET, pattern("/:b/x"), "second");

        let order: Vec<_> = table
            .routes(&Method::GET)
            .map(|r| r.pattern().as_str())
            .collect();
        assert_eq!(order, vec!["/:a/x", "/:b/x"]);
    }

    #[test]
    fn test_routes_sorted_by_specificity() {
        let mut table = RouteTable::new();
        table.insert(Method::GET, pattern("/:kind/:id"), 0);
        table.insert(Method::GET, pattern("/users/:id"), 1);
        table.insert(Method::GET, pattern("/users/me"), 2);

        let order: Vec<_> = table.routes(&Method::GET).map(|r| *r.value()).collect();
        assert_eq!(order, vec![2, 1, 0]);
        assert_eq!(*table.lookup(&Method::GET, "/users/me").unwrap().value, 2);
        assert_eq!(*table.lookup(&Method::GET, "/teams/me").unwrap().value, 0);
    }

    #[test]
    fn test_unknown_method_misses() {
        let mut table = RouteTable::new();
        table.insert(Method::GET, pattern("/"), ());
        assert!(table.lookup(&Method::PUT, "/").is_none());
        assert!(table.routes(&Method::PUT).next().is_none());
    }

    #[test]
    fn test_empty_table() {
        let table: RouteTable<()> = RouteTable::default();
        assert!(table.is_empty());
        assert_eq!(table.methods().count(), 0);
    }
}
