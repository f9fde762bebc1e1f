use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse};

use crate::routes::iframe::request_cookies;
use crate::state::AppState;

/// GET /funding/remembered - funding sources the browser has remembered.
///
/// First-party only: no CORS headers, so merchant pages cannot read it.
pub async fn remembered_funding(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    let gateway = &state.gateway;
    let remembered = gateway
        .memory()
        .remembered_funding(&request_cookies(&req), gateway.now(), None);

    HttpResponse::Ok()
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .json(serde_json::json!({ "rememberedFunding": remembered }))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/funding/remembered", web::get().to(remembered_funding));
}
