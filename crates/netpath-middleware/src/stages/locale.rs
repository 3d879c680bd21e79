//! Locale selection from the query string.

use netpath_core::Locale;

use crate::Middleware;

/// Query parameter holding the requested locale tag.
pub const LANG_QUERY_PARAM: &str = "lang";

/// Switches the request's locale when `?lang=` names a supported one.
///
/// Unknown tags are ignored and the default locale stays in effect.
pub fn locale() -> Middleware {
    Middleware::around("locale", |ctx, next| {
        Box::pin(async move {
            if let Some(locale) = ctx
                .query(LANG_QUERY_PARAM)
                .and_then(|tag| tag.parse::<Locale>().ok())
            {
                ctx.use_locale(locale);
            }
            next.call(ctx).await
        })
    })
}
