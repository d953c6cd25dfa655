use serde::{Deserialize, Serialize};

/// 后端没有返回内容时给用户的固定回复
pub const FALLBACK_REPLY: &str =
    "I'm sorry, I'm having trouble understanding you. Please try again.";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub prompt: String,
    #[serde(default)]
    pub system_prompt: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// 构造发给后端的对话：system 消息永远在 user 消息之前
pub fn build_conversation(system_prompt: &str, prompt: &str) -> Vec<ChatMessage> {
    vec![ChatMessage::system(system_prompt), ChatMessage::user(prompt)]
}

/// 后端返回的一条消息，content 可能为空
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReplyMessage {
    #[serde(default)]
    pub content: Option<String>,
}

/// 后端一次非流式调用的结果
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BackendReply {
    #[serde(default)]
    pub message: Option<ReplyMessage>,
}

impl BackendReply {
    pub fn with_content(content: impl Into<String>) -> Self {
        Self {
            message: Some(ReplyMessage {
                content: Some(content.into()),
            }),
        }
    }

    /// message 或 content 缺失时返回 None
    pub fn into_content(self) -> Option<String> {
        self.message.and_then(|m| m.content)
    }
}
