//! Ordered route table for Netpath.
//!
//! Routes are stored per HTTP method in a list ordered by specificity and
//! matched by a linear scan. Patterns are split on `/` and compared segment by
//! segment: a segment starting with `:` binds whatever the request path holds
//! at that position, every other segment must match exactly.
//!
//! # Features
//!
//! - **Exact Arity**: `/users/:id` never matches `/users` or `/users/1/posts`
//! - **Path Parameters**: Extract named parameters from paths (`/users/:id`)
//! - **Literal Precedence**: `/users/active` wins over `/users/:id`
//! - **Method-Based Routing**: One ordered list per HTTP method
//!
//! # Example
//!
//! ```rust
//! use netpath_router::{Pattern, RouteTable};
//! use http::Method;
//!
//! let mut table = RouteTable::new();
//!
//! table.insert(Method::GET, Pattern::parse("/users/:id").unwrap(), "getUser");
//! table.insert(Method::GET, Pattern::parse("/users/active").unwrap(), "listActive");
//!
//! let m = table.lookup(&Method::GET, "/users/42").unwrap();
//! assert_eq!(*m.value, "getUser");
//! assert_eq!(m.params.get("id"), Some("42"));
//!
//! let m = table.lookup(&Method::GET, "/users/active").unwrap();
//! assert_eq!(*m.value, "listActive");
//! ```
//!
//! # Architecture
//!
//! ```text
//!   GET ──► [ /users/active ] ─► [ /users/:id ] ─► [ /:any/:id ]
//!            (literal first)      (param)           (all params)
//!
//!   POST ─► [ /users ]
//! ```
//!
//! Lookup walks the list for the request method and stops at the first
//! pattern that accepts the path.

mod error;
mod params;
mod pattern;
mod table;

pub use error::RouteError;
pub use params::Params;
pub use pattern::{match_pattern, Pattern, Segment, PARAM_SENTINEL};
pub use table::{Route, RouteTable};

/// A matched route with its stored value and extracted parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a, T> {
    /// The value registered for the matched route
    pub value: &'a T,
    /// The verbatim pattern that matched
    pub pattern: &'a str,
    /// Extracted path parameters
    pub params: Params,
}

impl<'a, T> RouteMatch<'a, T> {
    /// Creates a new route match.
    #[must_use]
    pub fn new(value: &'a T, pattern: &'a str, params: Params) -> Self {
        Self {
            value,
            pattern,
            params,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;

    fn table_with(routes: &[(Method, &str, &'static str)]) -> RouteTable<&'static str> {
        let mut table = RouteTable::new();
        for (method, pattern, op) in routes {
            table.insert(method.clone(), Pattern::parse(*pattern).unwrap(), *op);
        }
        table
    }

    #[test]
    fn test_basic_routing() {
        let table = table_with(&[
            (Method::GET, "/users", "listUsers"),
            (Method::GET, "/users/:id", "getUser"),
        ]);

        let m = table.lookup(&Method::GET, "/users").unwrap();
        assert_eq!(*m.value, "listUsers");
        assert!(m.params.is_empty());

        let m = table.lookup(&Method::GET, "/users/123").unwrap();
        assert_eq!(*m.value, "getUser");
        assert_eq!(m.pattern, "/users/:id");
        assert_eq!(m.params.get("id"), Some("123"));
    }

    #[test]
    fn test_method_routing() {
        let table = table_with(&[
            (Method::GET, "/users", "listUsers"),
            (Method::POST, "/users", "createUser"),
        ]);

        assert_eq!(*table.lookup(&Method::GET, "/users").unwrap().value, "listUsers");
        assert_eq!(*table.lookup(&Method::POST, "/users").unwrap().value, "createUser");
        assert!(table.lookup(&Method::DELETE, "/users").is_none());
    }

    #[test]
    fn test_no_match() {
        let table = table_with(&[(Method::GET, "/users", "listUsers")]);
        assert!(table.lookup(&Method::GET, "/posts").is_none());
    }

    #[test]
    fn test_multiple_params() {
        let table = table_with(&[(Method::GET, "/orgs/:orgId/users/:userId", "getOrgUser")]);

        let m = table.lookup(&Method::GET, "/orgs/acme/users/123").unwrap();
        assert_eq!(*m.value, "getOrgUser");
        assert_eq!(m.params.get("orgId"), Some("acme"));
        assert_eq!(m.params.get("userId"), Some("123"));
    }

    #[test]
    fn test_literal_outranks_param_regardless_of_order() {
        let table = table_with(&[
            (Method::GET, "/users/:id", "getUser"),
            (Method::GET, "/users/active", "listActive"),
        ]);

        assert_eq!(*table.lookup(&Method::GET, "/users/active").unwrap().value, "listActive");
        assert_eq!(*table.lookup(&Method::GET, "/users/7").unwrap().value, "getUser");
    }
}
