//! JSON body binding.

use netpath_core::Validate;
use serde::de::DeserializeOwned;

use crate::BindError;

/// Default maximum body size for JSON binding (10 MB).
pub const DEFAULT_MAX_JSON_SIZE: usize = 10 * 1024 * 1024;

/// Decodes `body` as JSON into `T`, then validates it.
///
/// ```rust
/// use netpath_core::Validate;
/// use netpath_extract::decode_json;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct CreateUser { name: String }
/// impl Validate for CreateUser {}
///
/// let user: CreateUser = decode_json(br#"{"name":"alice"}"#).unwrap();
/// assert_eq!(user.name, "alice");
/// ```
pub fn decode_json<T>(body: &[u8]) -> Result<T, BindError>
where
    T: DeserializeOwned + Validate,
{
    if body.is_empty() {
        return Err(BindError::EmptyBody);
    }
    if body.len() > DEFAULT_MAX_JSON_SIZE {
        return Err(BindError::PayloadTooLarge {
            max: DEFAULT_MAX_JSON_SIZE,
            actual: body.len(),
        });
    }

    let value: T = serde_json::from_slice(body)?;
    value.validate().map_err(BindError::Validation)?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use netpath_core::{Fault, Faults};
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Signup {
        email: String,
        age: u32,
    }

    impl Validate for Signup {
        fn validate(&self) -> Result<(), Faults> {
            let mut faults = Faults::new();
            if !self.email.contains('@') {
                faults.add("email", Fault::new("INVALID_EMAIL", "email is invalid"));
            }
            if self.age < 18 {
                faults.add("age", Fault::new("TOO_YOUNG", "age must be at least 18"));
            }
            faults.into_result()
        }
    }

    #[test]
    fn test_decodes_and_validates() {
        let signup: Signup = decode_json(br#"{"email":"a@b.c","age":30}"#).unwrap();
        assert_eq!(signup.age, 30);
    }

    #[test]
    fn test_validation_failure_carries_faults() {
        let err = decode_json::<Signup>(br#"{"email":"nope","age":3}"#).unwrap_err();
        let faults = err.faults().unwrap();
        assert_eq!(faults.len(), 2);
        assert_eq!(faults.get("age").unwrap().code(), "TOO_YOUNG");
    }

    #[test]
    fn test_structural_mismatch_is_json_error() {
        let err = decode_json::<Signup>(br#"{"email":"a@b.c"}"#).unwrap_err();
        assert!(matches!(err, BindError::Json(_)));
    }

    #[test]
    fn test_empty_body() {
        assert!(matches!(
            decode_json::<Signup>(b""),
            Err(BindError::EmptyBody)
        ));
    }
}
