//! Response languages.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Language used to render fault messages.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Locale {
    /// English (`en`), the fallback for every fault.
    #[default]
    #[serde(rename = "en")]
    English,
    /// Bahasa Indonesia (`id`).
    #[serde(rename = "id")]
    Bahasa,
}

impl Locale {
    /// Every supported locale.
    pub const ALL: [Self; 2] = [Self::English, Self::Bahasa];

    /// The language tag (`en`, `id`).
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Bahasa => "id",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A language tag that maps to no supported [`Locale`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported locale '{0}'")]
pub struct UnsupportedLocale(pub String);

impl FromStr for Locale {
    type Err = UnsupportedLocale;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|locale| locale.tag() == tag)
            .ok_or_else(|| UnsupportedLocale(tag.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tags() {
        assert_eq!("en".parse::<Locale>(), Ok(Locale::English));
        assert_eq!("id".parse::<Locale>(), Ok(Locale::Bahasa));
        assert_eq!("ID".parse::<Locale>(), Err(UnsupportedLocale("ID".to_owned())));
        assert_eq!("En".parse::<Locale>(), Err(UnsupportedLocale("En".to_owned())));
        assert_eq!(
            "fr".parse::<Locale>(),
            Err(UnsupportedLocale("fr".to_owned()))
        );
    }

    #[test]
    fn test_default_is_english() {
        assert_eq!(Locale::default(), Locale::English);
    }

    #[test]
    fn test_serde_uses_tags() {
        assert_eq!(serde_json::to_string(&Locale::Bahasa).unwrap(), "\"id\"");
        let locale: Locale = serde_json::from_str("\"en\"").unwrap();
        assert_eq!(locale, Locale::English);
    }
}
