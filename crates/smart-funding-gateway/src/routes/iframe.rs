use actix_web::cookie::{time::Duration, Cookie, SameSite};
use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse};
use funding::CookieMap;

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::iframe::RememberQuery;
use crate::metrics::{FUNDING_REMEMBERED, IFRAME_REQUESTS};
use crate::state::AppState;

/// Cookies sent with the request. An unparseable `Cookie` header reads as
/// no cookies at all.
pub fn request_cookies(req: &HttpRequest) -> CookieMap {
    match req.cookies() {
        Ok(cookies) => cookies
            .iter()
            .map(|c| (c.name().to_string(), c.value().to_string()))
            .collect(),
        Err(e) => {
            tracing::debug!(error = %e, "ignoring unparseable cookie header");
            CookieMap::new()
        }
    }
}

/// The iframe is always third-party to the merchant page, so cookies must be
/// `SameSite=None; Secure` to be stored at all.
fn response_cookie(name: &str, value: &str, config: &GatewayConfig) -> Cookie<'static> {
    let mut builder = Cookie::build(name.to_string(), value.to_string())
        .path("/")
        .secure(true)
        .same_site(SameSite::None)
        .max_age(Duration::days(config.cookie_max_age_days));
    if let Some(ref domain) = config.cookie_domain {
        builder = builder.domain(domain.clone());
    }
    builder.finish()
}

async fn handle_remember(req: &HttpRequest, state: &AppState) -> Result<HttpResponse, GatewayError> {
    let query = web::Query::<RememberQuery>::from_query(req.query_string())
        .map_err(|e| GatewayError::InvalidQuery(e.to_string()))?
        .into_inner();

    let outcome = state.gateway.handle(&request_cookies(req), &query)?;

    let mut response = HttpResponse::Ok();
    response
        .content_type("text/html; charset=utf-8")
        .insert_header(("Content-Security-Policy", outcome.csp.to_header_value()))
        .insert_header((header::ACCESS_CONTROL_ALLOW_ORIGIN, outcome.allow_origin.clone()))
        .insert_header((header::CACHE_CONTROL, "no-store"));

    for (name, value) in outcome.cookies.iter() {
        response.cookie(response_cookie(name, value, &state.config));
    }

    for source in &outcome.funding_sources {
        FUNDING_REMEMBERED
            .with_label_values(&[source.as_str()])
            .inc();
    }

    tracing::info!(
        client_id = %outcome.client_id,
        domain = %outcome.allow_origin,
        funding_sources = ?outcome.funding_sources,
        "remembered funding sources"
    );

    Ok(response.body(outcome.html))
}

/// GET /smart/funding/remember
pub async fn remember_funding(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, GatewayError> {
    match handle_remember(&req, &state).await {
        Ok(resp) => {
            IFRAME_REQUESTS.with_label_values(&["accepted"]).inc();
            Ok(resp)
        }
        Err(e) => {
            IFRAME_REQUESTS.with_label_values(&[e.reason()]).inc();
            tracing::warn!(reason = e.reason(), "rejected remember-funding request: {}", e);
            Err(e)
        }
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/smart/funding/remember", web::get().to(remember_funding));
}
