//! Form binding through explicit field descriptors.
//!
//! A bindable type lists its fields once in [`FromForm::FIELDS`] and
//! receives parsed values through [`FromForm::assign`]. Values come from the
//! URL-encoded body followed by the query string; for each field the first
//! value wins and absent fields are left at their defaults.

use http::header::CONTENT_TYPE;
use http::Method;
use netpath_core::{Context, Fault, FormCoercion, Locale};
use netpath_core::{Faults, Validate};

use crate::BindError;

/// Default maximum body size for form binding (10 MB).
pub const DEFAULT_MAX_FORM_SIZE: usize = 10 * 1024 * 1024;

/// Fault code for a value that does not parse as its field's kind.
pub const INVALID_FORM_VALUE: &str = "INVALID_FORM_VALUE";

/// The kind a form value is parsed as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Taken verbatim.
    Text,
    /// Signed 64-bit integer.
    Integer,
    /// 64-bit float.
    Float,
    /// `1 t T TRUE true True` or `0 f F FALSE false False`.
    Boolean,
}

impl FieldKind {
    /// Parses `raw` as this kind.
    #[must_use]
    pub fn parse(self, raw: &str) -> Option<FormValue> {
        match self {
            Self::Text => Some(FormValue::Text(raw.to_owned())),
            Self::Integer => raw.parse().ok().map(FormValue::Integer),
            Self::Float => raw.parse().ok().map(FormValue::Float),
            Self::Boolean => parse_bool(raw).map(FormValue::Boolean),
        }
    }

    /// The value a field of this kind takes when lenient parsing fails.
    #[must_use]
    pub fn zero(self) -> FormValue {
        match self {
            Self::Text => FormValue::Text(String::new()),
            Self::Integer => FormValue::Integer(0),
            Self::Float => FormValue::Float(0.0),
            Self::Boolean => FormValue::Boolean(false),
        }
    }

    fn describe(self, locale: Locale) -> &'static str {
        match (self, locale) {
            (Self::Text, Locale::English) => "text",
            (Self::Text, Locale::Bahasa) => "teks",
            (Self::Integer, Locale::English) => "an integer",
            (Self::Integer, Locale::Bahasa) => "bilangan bulat",
            (Self::Float, Locale::English) => "a number",
            (Self::Float, Locale::Bahasa) => "angka",
            (Self::Boolean, _) => "boolean",
        }
    }
}

/// Describes one bindable form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormField {
    /// Form key
    pub key: &'static str,
    /// Kind the value is parsed as
    pub kind: FieldKind,
    /// Whether an empty value is skipped instead of parsed (strict coercion)
    pub optional: bool,
}

impl FormField {
    /// A field whose value is always parsed.
    #[must_use]
    pub const fn required(key: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            kind,
            optional: false,
        }
    }

    /// A field left unset when its value is empty under strict coercion.
    #[must_use]
    pub const fn optional(key: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            kind,
            optional: true,
        }
    }
}

/// A parsed form value.
#[derive(Debug, Clone, PartialEq)]
pub enum FormValue {
    /// From [`FieldKind::Text`]
    Text(String),
    /// From [`FieldKind::Integer`]
    Integer(i64),
    /// From [`FieldKind::Float`]
    Float(f64),
    /// From [`FieldKind::Boolean`]
    Boolean(bool),
}

impl FormValue {
    /// The text, if this is a text value.
    #[must_use]
    pub fn into_text(self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// The integer, if this is an integer value.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// The float, if this is a float value.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(value) => Some(*value),
            _ => None,
        }
    }

    /// The boolean, if this is a boolean value.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(value) => Some(*value),
            _ => None,
        }
    }
}

/// A type that can be bound from form data.
///
/// # Example
///
/// ```rust
/// use netpath_extract::{FieldKind, FormField, FormValue, FromForm};
///
/// #[derive(Default)]
/// struct Search {
///     q: String,
///     page: i64,
///     exact: Option<bool>,
/// }
///
/// impl FromForm for Search {
///     const FIELDS: &'static [FormField] = &[
///         FormField::required("q", FieldKind::Text),
///         FormField::required("page", FieldKind::Integer),
///         FormField::optional("exact", FieldKind::Boolean),
///     ];
///
///     fn assign(&mut self, key: &str, value: FormValue) {
///         match key {
///             "q" => self.q = value.into_text().unwrap_or_default(),
///             "page" => self.page = value.as_i64().unwrap_or_default(),
///             "exact" => self.exact = value.as_bool(),
///             _ => {}
///         }
///     }
/// }
/// ```
pub trait FromForm: Default {
    /// The bindable fields.
    const FIELDS: &'static [FormField];

    /// Stores the parsed value for `key`.
    fn assign(&mut self, key: &str, value: FormValue);
}

/// Parses the boolean spellings accepted for [`FieldKind::Boolean`].
#[must_use]
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// Binds `T` from already-decoded `pairs`.
///
/// Under [`FormCoercion::Strict`] every value that fails to parse becomes a
/// fault and binding fails with [`BindError::Coercion`]; under
/// [`FormCoercion::Lenient`] the field takes its kind's zero value instead.
/// Strict binding leaves optional fields unset when their value is empty.
pub fn decode_form<T: FromForm>(
    pairs: &[(String, String)],
    coercion: FormCoercion,
) -> Result<T, BindError> {
    let mut target = T::default();
    let mut faults = Faults::new();

    for field in T::FIELDS {
        let Some(raw) = pairs
            .iter()
            .find_map(|(key, value)| (key == field.key).then_some(value.as_str()))
        else {
            continue;
        };

        let skip_empty = coercion == FormCoercion::Strict && field.kind != FieldKind::Text;
        if field.optional && raw.is_empty() && skip_empty {
            continue;
        }

        match (field.kind.parse(raw), coercion) {
            (Some(value), _) => target.assign(field.key, value),
            (None, FormCoercion::Lenient) => target.assign(field.key, field.kind.zero()),
            (None, FormCoercion::Strict) => faults.add(field.key, invalid_value(field)),
        }
    }

    faults.into_result().map_err(BindError::Coercion)?;
    Ok(target)
}

fn invalid_value(field: &FormField) -> Fault {
    Fault::new(
        INVALID_FORM_VALUE,
        format!("{} must be {}", field.key, field.kind.describe(Locale::English)),
    )
    .with_message(
        Locale::Bahasa,
        format!("{} harus berupa {}", field.key, field.kind.describe(Locale::Bahasa)),
    )
}

/// Collects form pairs from the request: body first, then query string.
///
/// The body is read only for `POST`, `PUT` and `PATCH` requests sent as
/// `application/x-www-form-urlencoded`.
pub fn form_pairs(ctx: &Context) -> Result<Vec<(String, String)>, BindError> {
    let mut pairs: Vec<(String, String)> = Vec::new();

    if carries_form_body(ctx) {
        let body = ctx.body();
        if body.len() > DEFAULT_MAX_FORM_SIZE {
            return Err(BindError::PayloadTooLarge {
                max: DEFAULT_MAX_FORM_SIZE,
                actual: body.len(),
            });
        }
        pairs.extend(serde_urlencoded::from_bytes::<Vec<(String, String)>>(body)?);
    }

    if let Some(query) = ctx.uri().query() {
        pairs.extend(serde_urlencoded::from_str::<Vec<(String, String)>>(query)?);
    }

    Ok(pairs)
}

fn carries_form_body(ctx: &Context) -> bool {
    let method = ctx.method();
    if method != Method::POST && method != Method::PUT && method != Method::PATCH {
        return false;
    }

    ctx.headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<mime::Mime>().ok())
        .is_some_and(|media: mime::Mime| {
            media.essence_str() == mime::APPLICATION_WWW_FORM_URLENCODED.essence_str()
        })
}

/// Binds and validates `T` from the request's form data.
pub fn bind_form<T: FromForm + Validate>(ctx: &Context) -> Result<T, BindError> {
    let pairs = form_pairs(ctx)?;
    let value: T = decode_form(&pairs, ctx.form_coercion())?;
    value.validate().map_err(BindError::Validation)?;
    Ok(value)
}
