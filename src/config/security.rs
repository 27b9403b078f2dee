use axum::http::header::{HeaderName, HeaderValue};
use axum::Router;
use std::env;
use tower_http::set_header::SetResponseHeaderLayer;

const X_CONTENT_TYPE_OPTIONS: &str = "x-content-type-options";
const X_FRAME_OPTIONS: &str = "x-frame-options";
const STRICT_TRANSPORT_SECURITY: &str = "strict-transport-security";
const CONTENT_SECURITY_POLICY: &str = "content-security-policy";
const REFERRER_POLICY: &str = "referrer-policy";

const NOSNIFF: &str = "nosniff";
const DENY: &str = "DENY";
const HSTS_VALUE: &str = "max-age=31536000; includeSubDomains";
const CSP_API_VALUE: &str = "default-src 'none'; frame-ancestors 'none'";
const REFERRER_POLICY_VALUE: &str = "strict-origin-when-cross-origin";

/// Response headers applied to every route. HSTS is only meaningful behind
/// HTTPS, so it is gated on `RUST_ENV=production`.
fn security_headers(include_hsts: bool) -> Vec<(HeaderName, HeaderValue)> {
    let mut headers = vec![
        (
            HeaderName::from_static(X_CONTENT_TYPE_OPTIONS),
            HeaderValue::from_static(NOSNIFF),
        ),
        (
            HeaderName::from_static(X_FRAME_OPTIONS),
            HeaderValue::from_static(DENY),
        ),
        (
            HeaderName::from_static(CONTENT_SECURITY_POLICY),
            HeaderValue::from_static(CSP_API_VALUE),
        ),
        (
            HeaderName::from_static(REFERRER_POLICY),
            HeaderValue::from_static(REFERRER_POLICY_VALUE),
        ),
    ];

    if include_hsts {
        headers.push((
            HeaderName::from_static(STRICT_TRANSPORT_SECURITY),
            HeaderValue::from_static(HSTS_VALUE),
        ));
    }

    headers
}

fn hsts_enabled_from_env() -> bool {
    let is_production = env::var("RUST_ENV")
        .map(|v| v.to_lowercase() == "production")
        .unwrap_or(false);

    if is_production {
        tracing::info!("Security: HSTS header enabled (production mode)");
    } else {
        tracing::info!("Security: HSTS header disabled (development mode)");
    }

    is_production
}

pub fn apply_security_headers(router: Router) -> Router {
    security_headers(hsts_enabled_from_env())
        .into_iter()
        .fold(router, |router, (name, value)| {
            router.layer(SetResponseHeaderLayer::overriding(name, value))
        })
}
