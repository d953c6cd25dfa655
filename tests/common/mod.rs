#![allow(dead_code)]

use std::io::Write;
use std::sync::Arc;

use async_trait::async_trait;
use chat_relay::app_state::AppState;
use chat_relay::engine::{EngineError, InferenceEngine};
use chat_relay::types::{BackendReply, ChatMessage};
use parking_lot::Mutex;
use rocket::figment::Figment;
use rocket::local::asynchronous::Client;
use tempfile::NamedTempFile;

pub const SYSTEM_PROMPT: &str = "You are a friendly assistant.\nKeep answers short.\n";
pub const MODEL: &str = "gemma2:2b";

/// 测试用的后端行为
pub enum Script {
    Reply(&'static str),
    Empty,
    Fail { status: u16, message: &'static str },
}

/// 记录每次收到的 (model, messages)，按脚本返回
pub struct RecordingEngine {
    script: Script,
    pub calls: Mutex<Vec<(String, Vec<ChatMessage>)>>,
}

impl RecordingEngine {
    pub fn new(script: Script) -> Arc<Self> {
        Arc::new(Self {
            script,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<(String, Vec<ChatMessage>)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl InferenceEngine for RecordingEngine {
    async fn chat(
        &self,
        model: &str,
        messages: &[ChatMessage],
    ) -> Result<BackendReply, EngineError> {
        self.calls
            .lock()
            .push((model.to_string(), messages.to_vec()));

        match &self.script {
            Script::Reply(text) => Ok(BackendReply::with_content(*text)),
            Script::Empty => Ok(BackendReply::default()),
            Script::Fail { status, message } => Err(EngineError::Status {
                status: *status,
                message: message.to_string(),
            }),
        }
    }
}

pub fn test_figment() -> Figment {
    chat_relay::config::figment().merge(("log_level", "off"))
}

pub async fn client_with(engine: Arc<RecordingEngine>) -> Client {
    let state = AppState::new(engine, MODEL, SYSTEM_PROMPT);
    let rocket = chat_relay::build_with_state(test_figment(), state);
    Client::tracked(rocket)
        .await
        .expect("valid rocket instance")
}

pub fn system_prompt_file(text: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(text.as_bytes()).expect("write system prompt");
    file
}
