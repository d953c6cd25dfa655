use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::{Header, Method, Status};
use rocket::{Request, Response};

use crate::config::CorsConfig;

const WILDCARD: &str = "*";
const ALL_METHODS: &str = "DELETE, GET, HEAD, OPTIONS, PATCH, POST, PUT";

/// 响应阶段统一加 CORS 头；预检请求由 api::preflight 兜底返回 200。
/// 配置从 managed state 里的 CorsConfig 读取。
pub struct Cors;

impl CorsConfig {
    fn allows_any(list: &[String]) -> bool {
        list.iter().any(|v| v == WILDCARD)
    }

    fn allows_origin(&self, origin: &str) -> bool {
        Self::allows_any(&self.allow_origins)
            || self.allow_origins.iter().any(|o| o == origin)
    }

    fn allows_method(&self, method: &str) -> bool {
        Self::allows_any(&self.allow_methods)
            || self
                .allow_methods
                .iter()
                .any(|m| m.eq_ignore_ascii_case(method))
    }

    /// 带凭证时浏览器不接受 `*`，只能回显请求的 Origin
    fn origin_value<'a>(&self, origin: &'a str) -> (&'a str, bool) {
        if Self::allows_any(&self.allow_origins) && !self.allow_credentials {
            (WILDCARD, false)
        } else {
            (origin, true)
        }
    }

    fn allowed_methods(&self) -> String {
        if Self::allows_any(&self.allow_methods) {
            ALL_METHODS.to_string()
        } else {
            self.allow_methods.join(", ")
        }
    }

    fn allowed_headers(&self, requested: Option<&str>) -> Option<String> {
        if Self::allows_any(&self.allow_headers) {
            requested.map(str::to_string)
        } else if self.allow_headers.is_empty() {
            None
        } else {
            Some(self.allow_headers.join(", "))
        }
    }
}

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "CORS",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, req: &'r Request<'_>, res: &mut Response<'r>) {
        let Some(config) = req.rocket().state::<CorsConfig>() else {
            return;
        };
        let Some(origin) = req.headers().get_one("Origin") else {
            return;
        };

        let requested_method = req.headers().get_one("Access-Control-Request-Method");
        let preflight = req.method() == Method::Options && requested_method.is_some();

        if !config.allows_origin(origin) {
            if preflight {
                res.set_status(Status::BadRequest);
            }
            return;
        }

        let (value, echoed) = config.origin_value(origin);
        res.set_header(Header::new("Access-Control-Allow-Origin", value.to_string()));
        if echoed {
            res.set_header(Header::new("Vary", "Origin"));
        }
        if config.allow_credentials {
            res.set_header(Header::new("Access-Control-Allow-Credentials", "true"));
        }

        if !preflight {
            return;
        }

        if !requested_method.is_some_and(|m| config.allows_method(m)) {
            res.set_status(Status::BadRequest);
            return;
        }

        res.set_header(Header::new(
            "Access-Control-Allow-Methods",
            config.allowed_methods(),
        ));
        let requested_headers = req.headers().get_one("Access-Control-Request-Headers");
        if let Some(headers) = config.allowed_headers(requested_headers) {
            res.set_header(Header::new("Access-Control-Allow-Headers", headers));
        }
        res.set_header(Header::new(
            "Access-Control-Max-Age",
            config.max_age.to_string(),
        ));
    }
}
