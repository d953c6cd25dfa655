use std::sync::Arc;

use tracing::warn;

use crate::config::{EngineKind, RelayConfig};
use crate::engine::{EchoEngine, EngineError, InferenceEngine, OllamaEngine};
use crate::types::{build_conversation, ChatMessage, ChatResponse, FALLBACK_REPLY};

/// 全局共享状态，启动后只读：
/// - engine: 推理后端
/// - model: 每次请求固定使用的模型名
/// - system_prompt: 启动时读入的默认 system prompt
pub struct AppState {
    pub engine: Arc<dyn InferenceEngine>,
    pub model: String,
    pub system_prompt: Arc<str>,
}

impl AppState {
    pub fn new(
        engine: Arc<dyn InferenceEngine>,
        model: impl Into<String>,
        system_prompt: impl Into<Arc<str>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            engine,
            model: model.into(),
            system_prompt: system_prompt.into(),
        })
    }

    /// 根据配置里的 EngineKind 创建对应 Engine
    pub fn from_config(config: &RelayConfig, system_prompt: Arc<str>) -> Arc<Self> {
        let engine: Arc<dyn InferenceEngine> = match config.backend {
            EngineKind::Ollama => OllamaEngine::new(&config.backend_url),
            EngineKind::Echo => EchoEngine::new(),
        };

        Self::new(engine, config.model.clone(), system_prompt)
    }

    /// 没有显式 system prompt 时用启动时缓存的那份
    pub fn conversation(&self, prompt: &str, system_prompt: Option<&str>) -> Vec<ChatMessage> {
        let system_prompt = system_prompt.unwrap_or(&*self.system_prompt);
        build_conversation(system_prompt, prompt)
    }

    /// 调一次后端。后端成功但没有内容时返回固定的道歉文本，不当作错误。
    pub async fn chat(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
    ) -> Result<ChatResponse, EngineError> {
        let messages = self.conversation(prompt, system_prompt);
        let reply = self.engine.chat(&self.model, &messages).await?;

        let response = match reply.into_content() {
            Some(content) => content,
            None => {
                warn!(model = %self.model, "backend returned no content, using fallback reply");
                FALLBACK_REPLY.to_string()
            }
        };

        Ok(ChatResponse { response })
    }
}
