//! HTTP surface: the `POST /api/ldd-rules` action endpoint and a health check.

use std::net::TcpListener;

use actix_web::dev::Server;
use actix_web::http::StatusCode;
use actix_web::{App, HttpResponse, HttpServer, Responder, ResponseError, get, post, web};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::config::ServerConfig;
use crate::error::{Result, RulesError};
use crate::rules_engine::{RulesRequest, dispatch};

impl ResponseError for RulesError {
    fn status_code(&self) -> StatusCode {
        if let RulesError::Payload { status, .. } = self {
            return StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_REQUEST);
        }
        if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}

/// Parse a request body and run its action, wrapping the payload in the
/// `{ success: true, .. }` envelope.
pub fn handle_body(body: &[u8]) -> Result<Value> {
    let request: RulesRequest = serde_json::from_slice(body)
        .map_err(|e| RulesError::InvalidRequest(format!("malformed JSON body: {e}")))?;
    let payload = dispatch(&request)?;

    Ok(match payload {
        Value::Object(mut fields) => {
            fields.insert("success".to_string(), Value::Bool(true));
            Value::Object(fields)
        }
        other => json!({ "success": true, "result": other }),
    })
}

/// Rules action endpoint.
///
/// Body extraction failures (including the size limit) are answered with
/// the same `{ error }` envelope as every other failure.
#[post("/api/ldd-rules")]
pub async fn ldd_rules(
    body: std::result::Result<web::Bytes, actix_web::Error>,
) -> std::result::Result<HttpResponse, RulesError> {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("ldd_rules", %request_id);

    span.in_scope(|| {
        let outcome = body
            .map_err(|e| RulesError::Payload {
                status: e.as_response_error().status_code().as_u16(),
                message: e.to_string(),
            })
            .and_then(|body| {
                tracing::debug!(bytes = body.len(), "received request");
                handle_body(&body)
            });

        match outcome {
            Ok(payload) => Ok(HttpResponse::Ok().json(payload)),
            Err(e) => {
                if e.is_client_error() {
                    tracing::info!(error = %e, "rejected request");
                } else {
                    tracing::error!(error = %e, "request failed");
                }
                Err(e)
            }
        }
    })
}

#[get("/health")]
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().body("OK")
}

/// Register routes and the body limit on an actix service config.
pub fn configure(max_body_bytes: usize) -> impl Fn(&mut web::ServiceConfig) + Clone {
    move |cfg: &mut web::ServiceConfig| {
        cfg.app_data(web::PayloadConfig::new(max_body_bytes))
            .service(ldd_rules)
            .service(health_check);
    }
}

/// Build a server on an already-bound listener.
pub fn build_server(listener: TcpListener, config: &ServerConfig, workers: usize) -> std::io::Result<Server> {
    let routes = configure(config.max_body_bytes);
    tracing::info!(address = ?listener.local_addr().ok(), workers, "starting HTTP server");

    Ok(HttpServer::new(move || App::new().configure(routes.clone()))
        .workers(workers)
        .listen(listener)?
        .run())
}
