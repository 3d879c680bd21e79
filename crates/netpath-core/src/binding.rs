//! Hooks shared by the body binders.

use serde::{Deserialize, Serialize};

use crate::fault::Faults;

/// Validation run after a request body has been decoded.
///
/// The default implementation accepts everything: typed decoding already
/// enforced the structure, so types only override this to add rules.
///
/// ```
/// use netpath_core::{Fault, Faults, Validate};
///
/// struct Signup { email: String }
///
/// impl Validate for Signup {
///     fn validate(&self) -> Result<(), Faults> {
///         let mut faults = Faults::new();
///         if !self.email.contains('@') {
///             faults.add("email", Fault::new("INVALID_EMAIL", "email is invalid"));
///         }
///         faults.into_result()
///     }
/// }
///
/// assert!(Signup { email: "a@b.c".into() }.validate().is_ok());
/// ```
pub trait Validate {
    /// Checks the decoded value.
    fn validate(&self) -> Result<(), Faults> {
        Ok(())
    }
}

/// How form values that fail to parse as their declared kind are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormCoercion {
    /// Every unparsable field is reported and binding fails.
    #[default]
    Strict,
    /// Unparsable fields take their zero value.
    Lenient,
}
