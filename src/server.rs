//! HTTP endpoint: `POST /parse-email`

use std::io::Read;

use serde_json::{Value, json};
use tiny_http::{Header, Method, Request, Response, Server};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::{ExtractError, Result};
use crate::pipeline::Extractor;
use crate::upload::{UploadRules, read_upload};

/// Route served by [`EmailService`]
pub const PARSE_EMAIL_PATH: &str = "/parse-email";

static JSON_CONTENT_TYPE: std::sync::LazyLock<Header> = std::sync::LazyLock::new(|| {
    Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap()
});

/// Status and JSON body of a reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    #[must_use]
    pub const fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    #[must_use]
    pub fn error(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({ "error": message.into() }),
        }
    }
}

impl From<ExtractError> for ApiResponse {
    fn from(e: ExtractError) -> Self {
        Self::error(e.status(), e.to_string())
    }
}

/// Request handling, independent of the socket layer
#[derive(Debug, Clone)]
pub struct EmailService {
    extractor: Extractor,
    rules: UploadRules,
    max_upload_bytes: usize,
}

impl EmailService {
    #[must_use]
    pub const fn new(extractor: Extractor, rules: UploadRules, max_upload_bytes: usize) -> Self {
        Self {
            extractor,
            rules,
            max_upload_bytes,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            Extractor::from_config(config)?,
            UploadRules::from(&config.intake),
            config.server.max_upload_bytes,
        ))
    }

    /// Route a request and produce its reply
    #[must_use]
    pub fn handle(
        &self,
        method: &Method,
        url: &str,
        content_type: Option<&str>,
        body: &[u8],
    ) -> ApiResponse {
        let path = url.split(['?', '#']).next().unwrap_or(url);
        if path != PARSE_EMAIL_PATH {
            return ApiResponse::error(404, "Not found");
        }
        if *method != Method::Post {
            return ApiResponse::error(405, "Method not allowed");
        }

        match self.parse_email(content_type, body) {
            Ok(payload) => ApiResponse::ok(payload),
            Err(e) => ApiResponse::from(e),
        }
    }

    fn parse_email(&self, content_type: Option<&str>, body: &[u8]) -> Result<Value> {
        if body.len() > self.max_upload_bytes {
            return Err(ExtractError::PayloadTooLarge {
                limit: self.max_upload_bytes,
            });
        }

        let upload = read_upload(content_type, body, self.rules)?;
        let extraction = self.extractor.extract_bytes(&upload.bytes)?;
        Ok(extraction.payload)
    }

    /// Serve requests one at a time until the listener closes
    pub fn serve(&self, server: &Server) {
        for request in server.incoming_requests() {
            self.respond(request);
        }
    }

    fn respond(&self, mut request: Request) {
        let method = request.method().clone();
        let url = request.url().to_string();
        let content_type = request
            .headers()
            .iter()
            .find(|h| h.field.equiv("Content-Type"))
            .map(|h| h.value.as_str().to_string());

        let reply = match read_body(&mut request, self.max_upload_bytes) {
            Ok(body) => self.handle(&method, &url, content_type.as_deref(), &body),
            Err(e) => ApiResponse::from(e),
        };

        if reply.status >= 500 {
            error!(%method, url = %url, status = reply.status, body = %reply.body, "Request failed");
        } else {
            info!(%method, url = %url, status = reply.status, "Handled request");
        }

        let response = Response::from_string(reply.body.to_string())
            .with_status_code(reply.status)
            .with_header(JSON_CONTENT_TYPE.clone());
        if let Err(e) = request.respond(response) {
            warn!(error = %e, "Failed to send response");
        }
    }
}

fn read_body(request: &mut Request, limit: usize) -> Result<Vec<u8>> {
    if request.body_length().is_some_and(|len| len > limit) {
        return Err(ExtractError::PayloadTooLarge { limit });
    }

    let mut body = Vec::new();
    request
        .as_reader()
        .take(limit as u64 + 1)
        .read_to_end(&mut body)
        .map_err(|e| ExtractError::InvalidUpload(format!("Failed to read request body: {e}")))?;

    if body.len() > limit {
        return Err(ExtractError::PayloadTooLarge { limit });
    }
    Ok(body)
}

/// Bind the configured address and serve until the process exits
pub fn run(config: &Config) -> Result<()> {
    let service = EmailService::from_config(config)?;
    let server = Server::http(&config.server.bind)
        .map_err(|e| ExtractError::Config(format!("cannot bind {}: {e}", config.server.bind)))?;

    info!(
        bind = %config.server.bind,
        pattern = %service.extractor.matcher().pattern(),
        "Listening for {PARSE_EMAIL_PATH}"
    );
    service.serve(&server);
    Ok(())
}
