//! Typed sessions and the discriminator registry.
//!
//! A [`Session`] names its variant through [`Session::kind`]. The
//! [`SessionRegistry`] binds each kind to exactly one concrete type; typed
//! access through [`Context::session_as`](crate::Context::session_as)
//! consults that binding before downcasting, so a session can never be
//! viewed as a type other than the one registered for its kind.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

use parking_lot::RwLock;
use thiserror::Error;

/// Discriminator naming a session variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionKind(&'static str);

impl SessionKind {
    /// Creates a discriminator.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// The discriminator name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Access to the concrete type behind a trait object.
///
/// Implemented for every sized `Send + Sync + 'static` type.
pub trait AsAny: Any + Send + Sync {
    /// Borrows `self` as [`Any`].
    fn as_any(&self) -> &dyn Any;

    /// Name of the concrete type, for diagnostics.
    fn concrete_type_name(&self) -> &'static str;
}

impl<T: Any + Send + Sync> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn concrete_type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// An authenticated session attached to a request.
///
/// # Example
///
/// ```
/// use netpath_core::{Session, SessionKind};
///
/// #[derive(Debug)]
/// struct UserSession { user_id: String }
///
/// impl UserSession {
///     const KIND: SessionKind = SessionKind::new("user");
/// }
///
/// impl Session for UserSession {
///     fn id(&self) -> &str { &self.user_id }
///     fn kind(&self) -> SessionKind { Self::KIND }
/// }
/// ```
pub trait Session: AsAny + fmt::Debug {
    /// Session identifier.
    fn id(&self) -> &str;

    /// Discriminator for this session variant.
    fn kind(&self) -> SessionKind;
}

/// Identity of a concrete session type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionType {
    id: TypeId,
    name: &'static str,
}

impl SessionType {
    /// The identity of `S`.
    #[must_use]
    pub fn of<S: Session>() -> Self {
        Self {
            id: TypeId::of::<S>(),
            name: std::any::type_name::<S>(),
        }
    }

    /// The identity of the concrete type behind `session`.
    #[must_use]
    pub fn of_session(session: &dyn Session) -> Self {
        Self {
            id: Any::type_id(session.as_any()),
            name: session.concrete_type_name(),
        }
    }

    /// Returns true if this identifies `S`.
    #[must_use]
    pub fn is<S: Session>(&self) -> bool {
        self.id == TypeId::of::<S>()
    }

    /// Concrete type name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

/// Session registration and access errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Registration was attempted without a session value.
    #[error("cannot register an absent session")]
    Absent,

    /// The kind is already bound to a different concrete type.
    #[error("session kind '{kind}' is bound to {registered}, cannot register {attempted}")]
    Conflict {
        /// The contested kind
        kind: SessionKind,
        /// The type bound first
        registered: &'static str,
        /// The type that lost
        attempted: &'static str,
    },

    /// No session is attached to the request.
    #[error("no session attached to the request")]
    Missing,

    /// The session's kind was never registered.
    #[error("session kind '{0}' is not registered")]
    Unregistered(SessionKind),

    /// The requested or attached type differs from the registered one.
    #[error("session kind '{kind}' is registered as {expected}, not {actual}")]
    TypeMismatch {
        /// The session's kind
        kind: SessionKind,
        /// The registered type
        expected: &'static str,
        /// The type that was requested or attached
        actual: &'static str,
    },
}

/// Binds session kinds to concrete types.
///
/// The first registration for a kind wins. Registering the same type again
/// is a no-op; registering a different type is a [`SessionError::Conflict`].
///
/// ```
/// use netpath_core::{Session, SessionKind, SessionRegistry, SessionError};
///
/// #[derive(Debug)]
/// struct Admin;
/// impl Session for Admin {
///     fn id(&self) -> &str { "root" }
///     fn kind(&self) -> SessionKind { SessionKind::new("admin") }
/// }
///
/// let registry = SessionRegistry::new();
/// registry.register(Some(&Admin)).unwrap();
/// registry.register(Some(&Admin)).unwrap();
/// assert_eq!(registry.register(None), Err(SessionError::Absent));
/// ```
#[derive(Debug, Default)]
pub struct SessionRegistry {
    bindings: RwLock<HashMap<SessionKind, SessionType>>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds the session's kind to its concrete type.
    pub fn register(&self, session: Option<&dyn Session>) -> Result<(), SessionError> {
        let session = session.ok_or(SessionError::Absent)?;
        self.bind(session.kind(), SessionType::of_session(session))
    }

    /// Binds `kind` to `S` without needing an instance.
    pub fn register_type<S: Session>(&self, kind: SessionKind) -> Result<(), SessionError> {
        self.bind(kind, SessionType::of::<S>())
    }

    fn bind(&self, kind: SessionKind, ty: SessionType) -> Result<(), SessionError> {
        let mut bindings = self.bindings.write();
        match bindings.get(&kind) {
            Some(existing) if *existing == ty => Ok(()),
            Some(existing) => Err(SessionError::Conflict {
                kind,
                registered: existing.name,
                attempted: ty.name,
            }),
            None => {
                tracing::debug!(kind = %kind, session_type = ty.name, "registered session type");
                bindings.insert(kind, ty);
                Ok(())
            }
        }
    }

    /// The type bound to `kind`, if any.
    #[must_use]
    pub fn expected_type(&self, kind: SessionKind) -> Option<SessionType> {
        self.bindings.read().get(&kind).copied()
    }

    /// Checks that `session`'s concrete type is the one bound to its kind.
    pub fn check(&self, session: &dyn Session) -> Result<(), SessionError> {
        let kind = session.kind();
        let expected = self
            .expected_type(kind)
            .ok_or(SessionError::Unregistered(kind))?;
        let actual = SessionType::of_session(session);
        if expected == actual {
            Ok(())
        } else {
            Err(SessionError::TypeMismatch {
                kind,
                expected: expected.name,
                actual: actual.name,
            })
        }
    }

    /// Number of bound kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.read().len()
    }

    /// Returns true if nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    const USER: SessionKind = SessionKind::new("user");

    #[derive(Debug)]
    struct UserSession(String);

    impl Session for UserSession {
        fn id(&self) -> &str {
            &self.0
        }
        fn kind(&self) -> SessionKind {
            USER
        }
    }

    #[derive(Debug)]
    struct ImpostorSession;

    impl Session for ImpostorSession {
        fn id(&self) -> &str {
            "impostor"
        }
        fn kind(&self) -> SessionKind {
            USER
        }
    }

    #[test]
    fn test_register_is_idempotent() {
        let registry = SessionRegistry::new();
        registry.register(Some(&UserSession("a".into()))).unwrap();
        registry.register(Some(&UserSession("b".into()))).unwrap();

        assert_eq!(registry.len(), 1);
        assert!(registry.expected_type(USER).unwrap().is::<UserSession>());
    }

    #[test]
    fn test_conflicting_type_is_rejected() {
        let registry = SessionRegistry::new();
        registry.register(Some(&UserSession("a".into()))).unwrap();

        let err = registry.register(Some(&ImpostorSession)).unwrap_err();
        assert!(matches!(err, SessionError::Conflict { kind, .. } if kind == USER));
        assert!(registry.expected_type(USER).unwrap().is::<UserSession>());
    }

    #[test]
    fn test_absent_session_is_rejected() {
        let registry = SessionRegistry::new();
        assert_eq!(registry.register(None), Err(SessionError::Absent));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_check_detects_mismatch() {
        let registry = SessionRegistry::new();
        assert_eq!(
            registry.check(&UserSession("a".into())),
            Err(SessionError::Unregistered(USER))
        );

        registry.register_type::<UserSession>(USER).unwrap();
        assert!(registry.check(&UserSession("a".into())).is_ok());
        assert!(matches!(
            registry.check(&ImpostorSession),
            Err(SessionError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_concurrent_registration_binds_one_type() {
        let registry = Arc::new(SessionRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    if i % 2 == 0 {
                        registry.register(Some(&UserSession("u".into())))
                    } else {
                        registry.register(Some(&ImpostorSession))
                    }
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let winner = registry.expected_type(USER).unwrap();
        for (i, result) in results.iter().enumerate() {
            let is_user = i % 2 == 0;
            let won = winner.is::<UserSession>() == is_user;
            assert_eq!(result.is_ok(), won);
        }
    }

    mod properties {
        use super::{ImpostorSession, UserSession};
        use crate::session::{SessionError, SessionKind, SessionRegistry};
        use proptest::prelude::*;
        use std::collections::HashMap;

        const KINDS: [SessionKind; 3] = [
            SessionKind::new("user"),
            SessionKind::new("admin"),
            SessionKind::new("service"),
        ];

        proptest! {
            #[test]
            fn first_type_per_kind_wins(
                ops in prop::collection::vec((0..KINDS.len(), any::<bool>()), 1..32)
            ) {
                let registry = SessionRegistry::new();
                let mut bound: HashMap<usize, bool> = HashMap::new();

                for (slot, as_user) in ops {
                    let kind = KINDS[slot];
                    let result = if as_user {
                        registry.register_type::<UserSession>(kind)
                    } else {
                        registry.register_type::<ImpostorSession>(kind)
                    };

                    let winner = *bound.entry(slot).or_insert(as_user);
                    if winner == as_user {
                        prop_assert!(result.is_ok());
                    } else {
                        let is_conflict = matches!(result, Err(SessionError::Conflict { .. }));
                        prop_assert!(is_conflict);
                    }
                    let expected = registry.expected_type(kind).unwrap();
                    prop_assert_eq!(expected.is::<UserSession>(), winner);
                }

                prop_assert_eq!(registry.len(), bound.len());
            }
        }
    }
}
