use crate::server::api;
use crate::server::CardRegistry;

pub struct HttpResponse {
    pub status_code: u16,
    pub status_text: &'static str,
    pub content_type: &'static str,
    pub body: String,
}

impl HttpResponse {
    pub fn to_http_string(&self) -> String {
        format!(
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            self.status_code,
            self.status_text,
            self.content_type,
            self.body.len(),
            self.body
        )
    }

    fn ok_json(body: String) -> HttpResponse {
        HttpResponse {
            status_code: 200,
            status_text: "OK",
            content_type: "application/json",
            body,
        }
    }

    fn ok_text(body: String) -> HttpResponse {
        HttpResponse {
            status_code: 200,
            status_text: "OK",
            content_type: "text/plain; charset=utf-8",
            body,
        }
    }
}

pub fn route_request(registry: &CardRegistry, method: &str, path: &str) -> HttpResponse {
    let (route, query) = path.split_once('?').unwrap_or((path, ""));
    match (method, route) {
        ("GET", "/api/health") => match api::health_payload() {
            Ok(payload) => HttpResponse::ok_json(payload),
            Err(err) => error_response(500, "Internal Server Error", &err.to_string()),
        },
        ("GET", "/api/battle") => match api::battle_log_payload(registry, query) {
            Ok(payload) => HttpResponse::ok_text(payload),
            Err(err) => battle_error_response(err),
        },
        ("GET", "/api/battle/summary") => match api::battle_summary_payload(registry, query) {
            Ok(payload) => HttpResponse::ok_text(payload),
            Err(err) => battle_error_response(err),
        },
        ("GET", "/api/battle/tracker") => match api::battle_tracker_payload(registry, query) {
            Ok(payload) => HttpResponse::ok_text(payload),
            Err(err) => battle_error_response(err),
        },
        ("GET", route) if route.starts_with("/api/chests/") => {
            let tier = route.trim_start_matches("/api/chests/");
            match api::chest_payload(tier, query) {
                Ok(payload) => HttpResponse::ok_json(payload),
                Err(err) => battle_error_response(err),
            }
        }
        _ => error_response(404, "Not Found", "Route not found"),
    }
}

fn battle_error_response(err: api::PayloadError) -> HttpResponse {
    match err {
        api::PayloadError::MissingParam(name) => {
            error_response(400, "Bad Request", &format!("missing query parameter '{name}'"))
        }
        api::PayloadError::BadParam(message) => error_response(400, "Bad Request", &message),
        api::PayloadError::Upstream(message) => error_response(502, "Bad Gateway", &message),
        api::PayloadError::Internal(message) => {
            error_response(500, "Internal Server Error", &message)
        }
    }
}

fn error_response(status_code: u16, status_text: &'static str, message: &str) -> HttpResponse {
    let body = serde_json::json!({ "error": message }).to_string();
    HttpResponse {
        status_code,
        status_text,
        content_type: "application/json",
        body,
    }
}
