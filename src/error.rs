use rocket::http::Status;
use rocket::response::{self, status, Responder};
use rocket::serde::json::Json;
use rocket::Request;
use thiserror::Error;
use tracing::error;

use crate::engine::EngineError;
use crate::types::ErrorResponse;

/// 启动阶段的致命错误，出现即不对外提供服务
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid relay configuration: {0}")]
    Config(String),

    #[error("failed to read system prompt from `{path}`: {source}")]
    SystemPrompt {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// 请求处理中的错误。不区分子类型，对外统一 500 + detail。
#[derive(Debug, Error)]
pub enum RelayError {
    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl<'r> Responder<'r, 'static> for RelayError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        let detail = self.to_string();
        error!(uri = %req.uri(), %detail, "chat request failed");

        status::Custom(Status::InternalServerError, Json(ErrorResponse { detail }))
            .respond_to(req)
    }
}
