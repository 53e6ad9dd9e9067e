#![allow(dead_code)]

use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;

use eml_json_extract::config::FetchConfig;
use eml_json_extract::{Extractor, LinkFetcher, LinkMatcher, LinkPattern};
use tiny_http::{Header, Response, Server};

/// Local HTTP server standing in for a remote JSON host
pub struct StubServer {
    pub base: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl StubServer {
    /// Serve fixed `(path with query, status, body)` routes; anything else is 404
    pub fn start(routes: Vec<(&str, u16, &str)>) -> Self {
        let port = free_port();
        let server = Server::http(("127.0.0.1", port)).unwrap();
        let routes: Vec<(String, u16, String)> = routes
            .into_iter()
            .map(|(p, s, b)| (p.to_string(), s, b.to_string()))
            .collect();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&requests);

        thread::spawn(move || {
            for request in server.incoming_requests() {
                let url = request.url().to_string();
                seen.lock().unwrap().push(url.clone());

                let (status, body) = routes
                    .iter()
                    .find(|(path, _, _)| *path == url)
                    .map_or((404, "missing".to_string()), |(_, s, b)| (*s, b.clone()));

                let header =
                    Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap();
                let _ = request.respond(
                    Response::from_string(body)
                        .with_status_code(status)
                        .with_header(header),
                );
            }
        });

        Self {
            base: format!("http://127.0.0.1:{port}"),
            requests,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    /// Request targets received so far, in arrival order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

pub fn free_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

pub fn test_fetch_config() -> FetchConfig {
    FetchConfig {
        timeout_secs: 5,
        connect_timeout_secs: 2,
        ..FetchConfig::default()
    }
}

/// Extractor that accepts "file view" links on the loopback stub
pub fn test_extractor(pattern: LinkPattern) -> Extractor {
    let matcher = LinkMatcher::new(pattern).with_drive_hosts(["drive.google.com", "127.0.0.1"]);
    Extractor::new(matcher, LinkFetcher::new(&test_fetch_config()).unwrap())
}

/// A MIME part of a test email
pub struct Part<'a> {
    pub content_type: &'a str,
    pub filename: Option<&'a str>,
    pub body: &'a str,
}

pub fn attachment<'a>(content_type: &'a str, filename: &'a str, body: &'a str) -> Part<'a> {
    Part {
        content_type,
        filename: Some(filename),
        body,
    }
}

pub fn html(body: &str) -> Part<'_> {
    Part {
        content_type: "text/html; charset=utf-8",
        filename: None,
        body,
    }
}

/// Build a multipart/mixed email from parts in order
pub fn build_email(parts: &[Part<'_>]) -> Vec<u8> {
    let mut raw = String::from(
        "From: sender@example.com\r\n\
         To: inbox@example.com\r\n\
         Subject: Data export\r\n\
         MIME-Version: 1.0\r\n\
         Content-Type: multipart/mixed; boundary=\"MIXED\"\r\n\
         \r\n",
    );

    for part in parts {
        raw.push_str("--MIXED\r\n");
        raw.push_str(&format!("Content-Type: {}\r\n", part.content_type));
        if let Some(name) = part.filename {
            raw.push_str(&format!(
                "Content-Disposition: attachment; filename=\"{name}\"\r\n"
            ));
        }
        raw.push_str("\r\n");
        raw.push_str(part.body);
        raw.push_str("\r\n");
    }
    raw.push_str("--MIXED--\r\n");

    raw.into_bytes()
}

pub const FORM_BOUNDARY: &str = "----FormBoundary7MA4YWxkTrZu0gW";

pub fn form_content_type() -> String {
    format!("multipart/form-data; boundary={FORM_BOUNDARY}")
}

/// Build a multipart/form-data body carrying one file field
pub fn form_data(field: &str, filename: Option<&str>, content: &[u8]) -> Vec<u8> {
    let disposition = match filename {
        Some(name) => format!("form-data; name=\"{field}\"; filename=\"{name}\""),
        None => format!("form-data; name=\"{field}\""),
    };

    let mut body = format!(
        "--{FORM_BOUNDARY}\r\n\
         Content-Disposition: {disposition}\r\n\
         Content-Type: message/rfc822\r\n\
         \r\n"
    )
    .into_bytes();
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{FORM_BOUNDARY}--\r\n").as_bytes());
    body
}
