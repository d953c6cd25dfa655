use std::path::{Path, PathBuf};
use std::sync::Arc;

use rocket::figment::providers::{Env, Format, Serialized, Toml};
use rocket::figment::{Figment, Profile};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::StartupError;

pub const DEFAULT_ADDRESS: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "gemma2:2b";
pub const DEFAULT_SYSTEM_PROMPT_PATH: &str = "system_prompt.txt";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    Ollama,
    Echo,
}

/// 跨域配置。默认值是全放开的开发模式，生产环境应在 Rocket.toml 里收紧。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub allow_methods: Vec<String>,
    pub allow_headers: Vec<String>,
    pub allow_credentials: bool,
    /// 预检结果缓存秒数
    pub max_age: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_origins: vec!["*".to_string()],
            allow_methods: vec!["*".to_string()],
            allow_headers: vec!["*".to_string()],
            allow_credentials: true,
            max_age: 600,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub backend: EngineKind,
    pub backend_url: String,
    pub model: String,
    pub system_prompt_path: PathBuf,
    pub cors: CorsConfig,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            backend: EngineKind::Ollama,
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            system_prompt_path: PathBuf::from(DEFAULT_SYSTEM_PROMPT_PATH),
            cors: CorsConfig::default(),
        }
    }
}

impl RelayConfig {
    pub fn from_figment(figment: &Figment) -> Result<Self, StartupError> {
        figment
            .extract::<RelayConfig>()
            .map_err(|e| StartupError::Config(e.to_string()))
    }
}

/// 配置来源，优先级从低到高：
/// Rocket 内置默认 -> relay 默认 (0.0.0.0:8000, ollama) -> Rocket.toml -> ROCKET_* 环境变量
pub fn figment() -> Figment {
    Figment::from(rocket::Config::default())
        .merge(Serialized::defaults(RelayConfig::default()))
        .merge(Serialized::default("address", DEFAULT_ADDRESS))
        .merge(Serialized::default("port", DEFAULT_PORT))
        .merge(Toml::file(Env::var_or("ROCKET_CONFIG", "Rocket.toml")).nested())
        .merge(Env::prefixed("ROCKET_").ignore(&["PROFILE"]).global())
        .select(Profile::from_env_or(
            "ROCKET_PROFILE",
            rocket::Config::DEFAULT_PROFILE,
        ))
}

/// 启动时读取一次 system prompt，之后所有请求共用。
/// 文件缺失或不可读直接报错，不退化成空字符串。
pub async fn load_system_prompt(path: &Path) -> Result<Arc<str>, StartupError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| StartupError::SystemPrompt {
            path: path.display().to_string(),
            source,
        })?;

    if text.trim().is_empty() {
        warn!(path = %path.display(), "system prompt file is empty");
    }

    Ok(Arc::from(text))
}
