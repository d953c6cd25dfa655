pub mod api;
pub mod app_state;
pub mod config;
pub mod cors;
pub mod engine;
pub mod error;
pub mod types;

use std::sync::Arc;

use rocket::fairing::AdHoc;
use rocket::figment::Figment;
use rocket::{catchers, routes, Build, Rocket};
use tracing::{error, info};

use api::{chat, default_catcher, health, preflight};
use app_state::AppState;
use config::RelayConfig;
use cors::Cors;

/// 使用默认配置来源（Rocket.toml + ROCKET_* 环境变量）
pub fn rocket() -> Rocket<Build> {
    build(config::figment())
}

/// 启动时读取配置与 system prompt，任何一步失败都会中止 ignite
pub fn build(figment: Figment) -> Rocket<Build> {
    base(figment).attach(AdHoc::try_on_ignite("Relay State", |rocket| async move {
        let extracted = RelayConfig::from_figment(rocket.figment());
        let relay = match extracted {
            Ok(relay) => relay,
            Err(e) => {
                error!(error = %e, "relay configuration rejected");
                return Err(rocket);
            }
        };

        let system_prompt = match config::load_system_prompt(&relay.system_prompt_path).await {
            Ok(prompt) => prompt,
            Err(e) => {
                error!(error = %e, "cannot start without a system prompt");
                return Err(rocket);
            }
        };

        info!(
            backend = ?relay.backend,
            backend_url = %relay.backend_url,
            model = %relay.model,
            system_prompt_path = %relay.system_prompt_path.display(),
            "relay state initialised"
        );

        let state = AppState::from_config(&relay, system_prompt);
        Ok(rocket.manage(relay.cors).manage(state))
    }))
}

/// 直接注入状态，跳过文件读取；测试里替换 engine 用。
/// 这里只从配置里取 CORS 部分。
pub fn build_with_state(figment: Figment, state: Arc<AppState>) -> Rocket<Build> {
    base(figment)
        .attach(AdHoc::try_on_ignite("CORS Config", |rocket| async move {
            let extracted = RelayConfig::from_figment(rocket.figment());
            match extracted {
                Ok(relay) => Ok(rocket.manage(relay.cors)),
                Err(e) => {
                    error!(error = %e, "invalid CORS configuration");
                    Err(rocket)
                }
            }
        }))
        .manage(state)
}

fn base(figment: Figment) -> Rocket<Build> {
    rocket::custom(figment)
        .attach(Cors)
        .mount("/", routes![health, chat, preflight])
        .register("/", catchers![default_catcher])
}
