mod common;

use chat_relay::app_state::AppState;
use chat_relay::types::ErrorResponse;
use common::{client_with, test_figment, RecordingEngine, Script, MODEL, SYSTEM_PROMPT};
use rocket::http::{ContentType, Header, Status};
use rocket::local::asynchronous::Client;

const ORIGIN: &str = "http://localhost:3000";

#[rocket::async_test]
async fn simple_request_echoes_origin_with_credentials() {
    let client = client_with(RecordingEngine::new(Script::Reply("hi"))).await;

    let response = client
        .post("/chat")
        .header(ContentType::JSON)
        .header(Header::new("Origin", ORIGIN))
        .body(r#"{"prompt": "hello"}"#)
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::Ok);
    let headers = response.headers();
    assert_eq!(headers.get_one("Access-Control-Allow-Origin"), Some(ORIGIN));
    assert_eq!(headers.get_one("Access-Control-Allow-Credentials"), Some("true"));
    assert_eq!(headers.get_one("Vary"), Some("Origin"));
}

#[rocket::async_test]
async fn error_responses_carry_cors_headers() {
    let client = client_with(RecordingEngine::new(Script::Fail {
        status: 500,
        message: "boom",
    }))
    .await;

    let response = client
        .post("/chat")
        .header(ContentType::JSON)
        .header(Header::new("Origin", ORIGIN))
        .body(r#"{"prompt": "hello"}"#)
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::InternalServerError);
    assert_eq!(
        response.headers().get_one("Access-Control-Allow-Origin"),
        Some(ORIGIN)
    );
}

#[rocket::async_test]
async fn no_origin_means_no_cors_headers() {
    let client = client_with(RecordingEngine::new(Script::Reply("hi"))).await;

    let response = client.get("/health").dispatch().await;

    assert_eq!(response.status(), Status::Ok);
    assert!(response
        .headers()
        .get_one("Access-Control-Allow-Origin")
        .is_none());
}

#[rocket::async_test]
async fn preflight_allows_everything_by_default() {
    let client = client_with(RecordingEngine::new(Script::Reply("hi"))).await;

    let response = client
        .options("/chat")
        .header(Header::new("Origin", ORIGIN))
        .header(Header::new("Access-Control-Request-Method", "POST"))
        .header(Header::new(
            "Access-Control-Request-Headers",
            "content-type, x-requested-with",
        ))
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::Ok);
    let headers = response.headers();
    assert_eq!(headers.get_one("Access-Control-Allow-Origin"), Some(ORIGIN));
    assert_eq!(
        headers.get_one("Access-Control-Allow-Methods"),
        Some("DELETE, GET, HEAD, OPTIONS, PATCH, POST, PUT")
    );
    assert_eq!(
        headers.get_one("Access-Control-Allow-Headers"),
        Some("content-type, x-requested-with")
    );
    assert_eq!(headers.get_one("Access-Control-Max-Age"), Some("600"));
}

#[rocket::async_test]
async fn restricted_origin_is_refused() {
    let figment = test_figment()
        .merge(("cors.allow_origins", vec![ORIGIN]))
        .merge(("cors.allow_credentials", false));
    let state = AppState::new(RecordingEngine::new(Script::Reply("hi")), MODEL, SYSTEM_PROMPT);
    let client = Client::tracked(chat_relay::build_with_state(figment, state))
        .await
        .expect("valid rocket instance");

    let allowed = client
        .options("/chat")
        .header(Header::new("Origin", ORIGIN))
        .header(Header::new("Access-Control-Request-Method", "POST"))
        .dispatch()
        .await;
    assert_eq!(allowed.status(), Status::Ok);
    assert_eq!(
        allowed.headers().get_one("Access-Control-Allow-Origin"),
        Some(ORIGIN)
    );
    assert!(allowed
        .headers()
        .get_one("Access-Control-Allow-Credentials")
        .is_none());

    let refused = client
        .options("/chat")
        .header(Header::new("Origin", "https://elsewhere.example"))
        .header(Header::new("Access-Control-Request-Method", "POST"))
        .dispatch()
        .await;
    assert_eq!(refused.status(), Status::BadRequest);
    assert!(refused
        .headers()
        .get_one("Access-Control-Allow-Origin")
        .is_none());
}

#[rocket::async_test]
async fn plain_options_is_not_a_preflight() {
    let client = client_with(RecordingEngine::new(Script::Reply("hi"))).await;

    let response = client.options("/whatever").dispatch().await;
    assert_eq!(response.status(), Status::NotFound);
    let body: ErrorResponse = response.into_json().await.unwrap();
    assert_eq!(body.detail, "Not Found");

    let response = client
        .options("/chat")
        .header(Header::new("Origin", ORIGIN))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::NotFound);
    assert!(response
        .headers()
        .get_one("Access-Control-Allow-Methods")
        .is_none());
}
