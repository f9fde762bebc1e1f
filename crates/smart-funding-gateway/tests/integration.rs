use actix_web::cookie::Cookie;
use actix_web::{test, web, App};
use base64::Engine;

use funding::{FixedClock, FundingMemory, FundingSource, SdkCookie};
use funding_gateway::allowlist::{AllowList, ClientConfig};
use funding_gateway::config::GatewayConfig;
use funding_gateway::iframe::IframeGateway;
use funding_gateway::meta::ProviderMetaUnpacker;
use funding_gateway::nonce::FixedNonce;
use funding_gateway::routes;
use funding_gateway::state::AppState;

const NOW: i64 = 1_700_000_000;
const CLIENT_ID: &str = "merchant-client";
const DOMAIN: &str = "https://shop.example.com";

fn make_state() -> web::Data<AppState> {
    let allow_list = AllowList::new().with_client(
        CLIENT_ID,
        ClientConfig {
            allowed_funding: [
                FundingSource::Venmo,
                FundingSource::Card,
                FundingSource::Itau,
            ]
            .into_iter()
            .collect(),
            allowed_domains: [DOMAIN.to_string()].into_iter().collect(),
        },
    );

    let config = GatewayConfig::from_lookup(|_| None).unwrap();
    let gateway = IframeGateway::new(
        allow_list,
        FundingMemory::with_defaults(config.sdk_cookie_name.clone()),
        Box::new(ProviderMetaUnpacker::new("paypal.com")),
        Box::new(FixedNonce("test-nonce".to_string())),
        Box::new(FixedClock(NOW)),
        "paypal.com",
        "paypal",
    );

    web::Data::new(AppState::with_gateway(config, gateway))
}

fn sdk_meta() -> String {
    let meta = r#"{"url":"https://www.paypal.com/sdk/js?client-id=merchant-client"}"#;
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(meta)
}

fn remember_uri(params: &[(&str, &str)]) -> String {
    let query: Vec<String> = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, encode(v)))
        .collect();
    format!("/smart/funding/remember?{}", query.join("&"))
}

fn encode(v: &str) -> String {
    v.replace(':', "%3A").replace('/', "%2F").replace(',', "%2C")
}

fn full_params(funding: &str) -> Vec<(&'static str, String)> {
    vec![
        ("fundingSources", funding.to_string()),
        ("sdkMeta", sdk_meta()),
        ("clientID", CLIENT_ID.to_string()),
        ("domain", DOMAIN.to_string()),
    ]
}

fn uri_for(params: &[(&'static str, String)]) -> String {
    let borrowed: Vec<(&str, &str)> = params.iter().map(|(k, v)| (*k, v.as_str())).collect();
    remember_uri(&borrowed)
}

macro_rules! app {
    () => {
        test::init_service(
            App::new()
                .app_data(make_state())
                .configure(routes::iframe::configure)
                .configure(routes::remembered::configure)
                .configure(routes::health::configure),
        )
        .await
    };
}

async fn body_text(resp: actix_web::dev::ServiceResponse) -> String {
    let bytes = test::read_body(resp).await;
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[actix_rt::test]
async fn test_success_sets_headers_cookie_and_body() {
    let app = app!();
    let req = test::TestRequest::get()
        .uri(&uri_for(&full_params("venmo,card")))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);
    let headers = resp.headers();
    assert_eq!(headers.get("access-control-allow-origin").unwrap(), DOMAIN);
    let csp = headers
        .get("content-security-policy")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(csp.contains(&format!("frame-ancestors {};", DOMAIN)));
    assert!(csp.contains("'nonce-test-nonce'"));
    assert!(csp.contains("object-src 'none'"));

    let cookies: Vec<Cookie<'static>> = resp
        .response()
        .cookies()
        .map(|c| c.into_owned())
        .collect();
    let sdk = cookies.iter().find(|c| c.name() == "sdk_state").unwrap();
    assert_eq!(sdk.secure(), Some(true));
    let stored = SdkCookie::decode(sdk.value());
    assert!(stored.entry(FundingSource::Venmo).remembered);
    assert!(stored.entry(FundingSource::Card).remembered);
    let legacy = cookies.iter().find(|c| c.name() == "pwv").unwrap();
    assert_eq!(legacy.value(), "1");

    let body = body_text(resp).await;
    assert!(body.contains(r#"paypal.rememberFunding(["venmo","card"]);"#));
    assert!(body.contains(r#"src="https://www.paypal.com/sdk/js?client-id=merchant-client""#));
    assert!(body.contains(r#"<script nonce="test-nonce">"#));
}

#[actix_rt::test]
async fn test_missing_params_are_named() {
    let app = app!();
    for missing in ["fundingSources", "sdkMeta", "clientID", "domain"] {
        let params: Vec<(&'static str, String)> = full_params("card")
            .into_iter()
            .filter(|(k, _)| *k != missing)
            .collect();
        let req = test::TestRequest::get().uri(&uri_for(&params)).to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), 400);
        assert!(resp.response().cookies().next().is_none());
        let body = body_text(resp).await;
        assert_eq!(body, format!("Expected {} query param", missing));
    }
}

#[actix_rt::test]
async fn test_malformed_domain_rejected() {
    let app = app!();
    let mut params = full_params("card");
    params[3].1 = "https://shop.example.com/checkout".to_string();
    let req = test::TestRequest::get().uri(&uri_for(&params)).to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
    assert!(body_text(resp).await.contains("domain"));
}

#[actix_rt::test]
async fn test_unknown_client_rejected() {
    let app = app!();
    let mut params = full_params("card");
    params[2].1 = "someone-else".to_string();
    let req = test::TestRequest::get().uri(&uri_for(&params)).to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
    assert_eq!(body_text(resp).await, "Invalid client id: someone-else");
}

#[actix_rt::test]
async fn test_funding_not_allowed_for_client_rejected() {
    let app = app!();
    // paypal is a known funding source but not in this client's allowedFunding
    let req = test::TestRequest::get()
        .uri(&uri_for(&full_params("card,paypal")))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
    assert!(resp.response().cookies().next().is_none());
    assert!(body_text(resp).await.ends_with("paypal"));
}

#[actix_rt::test]
async fn test_unknown_funding_rejected() {
    let app = app!();
    let req = test::TestRequest::get()
        .uri(&uri_for(&full_params("card,cash")))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
    assert_eq!(body_text(resp).await, "Invalid funding source: cash");
}

#[actix_rt::test]
async fn test_domain_not_allowed_rejected() {
    let app = app!();
    let mut params = full_params("card");
    params[3].1 = "https://evil.example.com".to_string();
    let req = test::TestRequest::get().uri(&uri_for(&params)).to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
    assert_eq!(
        body_text(resp).await,
        "Invalid domain: https://evil.example.com"
    );
}

#[actix_rt::test]
async fn test_invalid_sdk_meta_rejected() {
    let app = app!();
    let mut params = full_params("card");
    params[1].1 = "bm90LWpzb24".to_string();
    let req = test::TestRequest::get().uri(&uri_for(&params)).to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
    assert_eq!(body_text(resp).await, "Invalid sdkMeta: bm90LWpzb24");
}

#[actix_rt::test]
async fn test_existing_funding_is_preserved() {
    let app = app!();

    let mut existing = SdkCookie::default();
    existing.entry_mut(FundingSource::Paypal).remembered = true;

    let req = test::TestRequest::get()
        .uri(&uri_for(&full_params("itau")))
        .cookie(Cookie::new("sdk_state", existing.encode()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let sdk = resp
        .response()
        .cookies()
        .find(|c| c.name() == "sdk_state")
        .map(|c| c.value().to_string())
        .unwrap();
    let stored = SdkCookie::decode(&sdk);
    assert!(stored.entry(FundingSource::Paypal).remembered);
    assert!(stored.entry(FundingSource::Itau).remembered);
    assert_eq!(
        stored.entry(FundingSource::Itau).expiry,
        Some(NOW + 30 * 24 * 60 * 60)
    );
}

#[actix_rt::test]
async fn test_remembered_endpoint_reads_cookie() {
    let app = app!();

    let mut existing = SdkCookie::default();
    existing.entry_mut(FundingSource::Card).remembered = true;
    let expired = existing.entry_mut(FundingSource::Itau);
    expired.remembered = true;
    expired.expiry = Some(NOW - 1);

    let req = test::TestRequest::get()
        .uri("/funding/remembered")
        .cookie(Cookie::new("sdk_state", existing.encode()))
        .cookie(Cookie::new("pwv", "1"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);
    assert!(resp.headers().get("access-control-allow-origin").is_none());
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["rememberedFunding"], serde_json::json!(["venmo", "card"]));
}

#[actix_rt::test]
async fn test_health() {
    let app = app!();
    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "funding-gateway");
}
