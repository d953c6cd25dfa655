use std::sync::Arc;

use rocket::http::Status;
use rocket::outcome::Outcome;
use rocket::request::{self, FromRequest};
use rocket::response::status;
use rocket::serde::json::Json;
use rocket::{catch, get, options, post, Request, State};
use tracing::info;

use crate::app_state::AppState;
use crate::error::RelayError;
use crate::types::{ChatRequest, ChatResponse, ErrorResponse, HealthResponse};

#[get("/health")]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

#[post("/chat", data = "<req>")]
pub async fn chat(
    state: &State<Arc<AppState>>,
    req: Json<ChatRequest>,
) -> Result<Json<ChatResponse>, RelayError> {
    info!(prompt = %req.prompt, "received chat prompt");

    let resp = state
        .chat(&req.prompt, req.system_prompt.as_deref())
        .await?;

    Ok(Json(resp))
}

/// 只有带 Access-Control-Request-Method 的 OPTIONS 才算预检，其余转发成 404
pub struct Preflight;

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Preflight {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        match req.headers().get_one("Access-Control-Request-Method") {
            Some(_) => Outcome::Success(Preflight),
            None => Outcome::Forward(Status::NotFound),
        }
    }
}

/// CORS 预检：真正的响应头由 Cors fairing 填
#[options("/<_..>")]
pub fn preflight(_preflight: Preflight) -> Status {
    Status::Ok
}

/// 框架层面的错误（JSON 解析失败、404 等）也用 {"detail": ...} 返回
#[catch(default)]
pub fn default_catcher(code: Status, _req: &Request<'_>) -> status::Custom<Json<ErrorResponse>> {
    let detail = code.reason().unwrap_or("Unknown Error").to_string();
    status::Custom(code, Json(ErrorResponse { detail }))
}
