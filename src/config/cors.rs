use axum::http::{header, HeaderValue, Method};
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Local frontends used when `CORS_ALLOWED_ORIGINS` is unset.
const DEV_ORIGINS: &str = "http://localhost:3000,http://localhost:5173";

/// Which browser origins may call the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OriginPolicy {
    /// `*`: any origin. Safe here because no cookies are involved.
    Any,
    List(Vec<HeaderValue>),
}

impl OriginPolicy {
    /// Parses a comma-separated origin list. Invalid entries are skipped;
    /// if nothing usable remains the dev origins are used instead.
    pub fn parse(configured: Option<&str>) -> Self {
        let raw = configured.unwrap_or(DEV_ORIGINS);
        if raw.trim() == "*" {
            return OriginPolicy::Any;
        }

        let origins = origin_list(raw);
        if origins.is_empty() {
            tracing::warn!(configured = raw, "No valid CORS origins; falling back to dev origins");
            return OriginPolicy::List(origin_list(DEV_ORIGINS));
        }
        OriginPolicy::List(origins)
    }
}

fn origin_list(raw: &str) -> Vec<HeaderValue> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin, error = %e, "Skipping invalid CORS origin");
                None
            }
        })
        .collect()
}

pub fn create_cors_layer(configured: Option<&str>) -> CorsLayer {
    let allow_origin = match OriginPolicy::parse(configured) {
        OriginPolicy::Any => AllowOrigin::any(),
        OriginPolicy::List(origins) => {
            tracing::info!(count = origins.len(), "CORS origins configured");
            AllowOrigin::list(origins)
        }
    };

    // Bearer tokens travel in a header, so credentials mode is not needed.
    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(60 * 60))
}
