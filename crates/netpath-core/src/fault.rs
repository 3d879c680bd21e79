//! Localized, coded faults.
//!
//! A [`Fault`] carries an application code and a message per [`Locale`].
//! When a handler reports an error whose source chain contains a `Fault`,
//! the response envelope uses the fault's code and the message for the
//! request's locale instead of the error text. [`Faults`] does the same for
//! per-field failures, typically from validation.

use std::collections::BTreeMap;
use std::fmt;

use crate::locale::Locale;

/// A coded error with per-locale messages.
///
/// # Example
///
/// ```
/// use netpath_core::{Fault, Locale};
///
/// let fault = Fault::new("USER_NOT_FOUND", "user not found")
///     .with_message(Locale::Bahasa, "pengguna tidak ditemukan");
///
/// assert_eq!(fault.code(), "USER_NOT_FOUND");
/// assert_eq!(fault.localized(Locale::Bahasa), "pengguna tidak ditemukan");
/// assert_eq!(fault.to_string(), "user not found");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    code: String,
    messages: BTreeMap<Locale, String>,
}

impl Fault {
    /// Creates a fault with its English message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        let mut messages = BTreeMap::new();
        messages.insert(Locale::English, message.into());
        Self {
            code: code.into(),
            messages,
        }
    }

    /// Adds or replaces the message for `locale`.
    pub fn with_message(mut self, locale: Locale, message: impl Into<String>) -> Self {
        self.messages.insert(locale, message.into());
        self
    }

    /// The application code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// The message for `locale`, falling back to English.
    #[must_use]
    pub fn localized(&self, locale: Locale) -> &str {
        self.messages
            .get(&locale)
            .or_else(|| self.messages.get(&Locale::English))
            .map_or("", String::as_str)
    }
}

/// Faults keyed by the field they concern.
///
/// # Example
///
/// ```
/// use netpath_core::{Fault, Faults, Locale};
///
/// let mut faults = Faults::new();
/// faults.add("email", Fault::new("REQUIRED", "email is required"));
///
/// let rendered = faults.localized(Locale::English);
/// assert_eq!(rendered["email"], "email is required");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Faults {
    entries: Vec<(String, Fault)>,
}

impl Faults {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a fault for `field`.
    pub fn add(&mut self, field: impl Into<String>, fault: Fault) {
        self.entries.push((field.into(), fault));
    }

    /// Builder form of [`Faults::add`].
    pub fn with(mut self, field: impl Into<String>, fault: Fault) -> Self {
        self.add(field, fault);
        self
    }

    /// Returns true if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of recorded faults.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// The first fault recorded for `field`.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Fault> {
        self.entries
            .iter()
            .find(|(f, _)| f == field)
            .map(|(_, fault)| fault)
    }

    /// Iterates `(field, fault)` pairs in recording order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Fault)> {
        self.entries.iter().map(|(f, fault)| (f.as_str(), fault))
    }

    /// Field to message map for `locale`; the first fault per field wins.
    #[must_use]
    pub fn localized(&self, locale: Locale) -> BTreeMap<String, String> {
        let mut rendered = BTreeMap::new();
        for (field, fault) in &self.entries {
            rendered
                .entry(field.clone())
                .or_insert_with(|| fault.localized(locale).to_owned());
        }
        rendered
    }

    /// `Ok(())` when empty, otherwise `Err(self)`.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.localized(Locale::English))
    }
}

impl std::error::Error for Fault {}

impl fmt::Display for Faults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, fault)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {fault}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Faults {}
