use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::types::{BackendReply, ChatMessage, Role};

/// 调用推理后端时可能出现的错误。
/// 到了 HTTP 边界一律折叠成 500，这里只保留原始文本。
#[derive(Debug, Error)]
pub enum EngineError {
    /// 连接失败、超时、响应解析失败等；消息里带上完整的 source 链
    #[error("{}", error_chain(.0))]
    Request(#[from] reqwest::Error),

    /// 后端返回了非 2xx 状态码
    #[error("{message} (status code: {status})")]
    Status { status: u16, message: String },
}

/// 把 source 链拼成 `a: b: c`，相邻重复的消息只保留一次
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut current = Some(err);
    while let Some(e) = current {
        let msg = e.to_string();
        if parts.last() != Some(&msg) {
            parts.push(msg);
        }
        current = e.source();
    }
    parts.join(": ")
}

/// 统一的推理后端抽象
#[async_trait]
pub trait InferenceEngine: Send + Sync {
    /// 非流式对话：一次请求拿到完整回复
    async fn chat(&self, model: &str, messages: &[ChatMessage])
        -> Result<BackendReply, EngineError>;
}

#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

#[derive(Deserialize)]
struct OllamaErrorBody {
    error: String,
}

/// 本地 Ollama 服务：POST {base_url}/api/chat
pub struct OllamaEngine {
    client: reqwest::Client,
    base_url: String,
}

impl OllamaEngine {
    pub fn new(base_url: &str) -> Arc<Self> {
        Arc::new(Self {
            // 不设超时，后端卡住请求就一直等
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url)
    }
}

#[async_trait]
impl InferenceEngine for OllamaEngine {
    async fn chat(
        &self,
        model: &str,
        messages: &[ChatMessage],
    ) -> Result<BackendReply, EngineError> {
        let url = self.chat_url();
        debug!(%url, model, messages = messages.len(), "sending chat request");

        let resp = self
            .client
            .post(&url)
            .json(&OllamaChatRequest {
                model,
                messages,
                stream: false,
            })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = match resp.text().await {
                Ok(body) => body,
                Err(e) => {
                    debug!(%status, error = %error_chain(&e), "failed to read error body");
                    String::new()
                }
            };
            let message = match serde_json::from_str::<OllamaErrorBody>(&body) {
                Ok(parsed) => parsed.error,
                Err(_) if body.trim().is_empty() => status.to_string(),
                Err(_) => body,
            };
            return Err(EngineError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let reply = resp.json::<BackendReply>().await?;
        Ok(reply)
    }
}

/// Echo 实现：不连模型，只把用户消息转成大写返回，方便离线跑通链路
#[derive(Default)]
pub struct EchoEngine;

impl EchoEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self)
    }
}

#[async_trait]
impl InferenceEngine for EchoEngine {
    async fn chat(
        &self,
        model: &str,
        messages: &[ChatMessage],
    ) -> Result<BackendReply, EngineError> {
        let prompt = messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or_default();

        Ok(BackendReply::with_content(format!(
            "[{} ECHO] {}",
            model,
            prompt.to_uppercase()
        )))
    }
}
