//! CORS policy construction.

use axum::http::HeaderValue;
use tower_http::cors::AllowOrigin;

/// Builds a CORS policy from a list of configured allowed origins. A bare
/// `*` allows any origin; otherwise each entry is matched exactly, except
/// that an entry starting with `*.` matches any subdomain of the remainder.
pub fn build_cors_allowed_origin<'a, I>(allowed: I) -> AllowOrigin
where
    I: IntoIterator<Item = &'a HeaderValue>,
{
    let allowed: Vec<HeaderValue> = allowed.into_iter().cloned().collect();
    if allowed.iter().any(|o| o.as_bytes() == b"*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::predicate(move |origin: &HeaderValue, _request_parts: _| {
            allowed.iter().any(|val| {
                (val.as_bytes().starts_with(b"*.") && origin.as_bytes().ends_with(&val.as_bytes()[1..]))
                    || origin == val
            })
        })
    }
}
