// crates/client/src/transport.rs
//! Authenticated HTTP transport with uniform response classification.
//!
//! One contract for every endpoint: always raise a typed failure on
//! non-success, classify success by declared content type. A `401`
//! additionally clears the session store before surfacing
//! [`Error::Unauthorized`] — callers redirect to re-authentication, they
//! never retry silently.

use std::sync::Arc;

use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::Form;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::session::SessionStore;

/// Longest slice of an unparseable error body we relay to the user.
const RAW_BODY_PREVIEW: usize = 160;

/// A successful response, classified by declared content type.
#[derive(Debug)]
pub enum Payload {
    Json(Value),
    Binary(Bytes),
    Text(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyKind {
    Json,
    Binary,
    Text,
}

impl BodyKind {
    fn from_content_type(content_type: &str) -> Self {
        let ct = content_type
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase();
        if ct.contains("json") {
            Self::Json
        } else if ct.is_empty() || ct.starts_with("text/") {
            Self::Text
        } else {
            // octet-stream and concrete media types: conversion results
            Self::Binary
        }
    }
}

/// HTTP client bound to one API base and one session store.
pub struct Transport {
    http: reqwest::Client,
    base_url: String,
    session: Arc<SessionStore>,
}

impl Transport {
    pub fn new(config: &ClientConfig, session: Arc<SessionStore>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: config.trimmed_base_url().to_string(),
            session,
        })
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Request builder with the `Authorization` header applied when a
    /// session exists; unauthenticated requests go out bare.
    fn builder(&self, method: Method, path: &str) -> RequestBuilder {
        let mut rb = self.http.request(method, self.url(path));
        if let Some(session) = self.session.get() {
            rb = rb.bearer_auth(session.access);
        }
        rb
    }

    /// Send, handle auth failure, raise on non-success, classify the rest.
    async fn dispatch(&self, path: &str, rb: RequestBuilder) -> Result<(BodyKind, Bytes)> {
        let resp = rb.send().await?;
        let status = resp.status();
        tracing::debug!(%path, status = status.as_u16(), "api response");

        if status == StatusCode::UNAUTHORIZED {
            self.session.clear();
            return Err(Error::Unauthorized);
        }

        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !status.is_success() {
            let raw = resp.text().await.unwrap_or_default();
            return Err(Error::Request {
                status,
                message: error_message(status, &content_type, &raw),
            });
        }

        let kind = BodyKind::from_content_type(&content_type);
        let bytes = resp.bytes().await?;
        Ok((kind, bytes))
    }

    /// Untyped request returning the classified payload.
    pub async fn request(&self, method: Method, path: &str, body: Option<Value>) -> Result<Payload> {
        let mut rb = self.builder(method, path);
        if let Some(body) = body {
            rb = rb.json(&body);
        }
        let (kind, bytes) = self.dispatch(path, rb).await?;
        Ok(match kind {
            BodyKind::Json => {
                Payload::Json(serde_json::from_slice(&bytes).map_err(|e| Error::decode(path_context(path), e))?)
            }
            BodyKind::Binary => Payload::Binary(bytes),
            BodyKind::Text => Payload::Text(String::from_utf8_lossy(&bytes).into_owned()),
        })
    }

    /// GET a JSON endpoint into a typed value.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let mut rb = self.builder(Method::GET, path);
        if !query.is_empty() {
            rb = rb.query(query);
        }
        let (kind, bytes) = self.dispatch(path, rb).await?;
        decode_json(path, kind, &bytes)
    }

    /// POST a JSON body, expect a typed JSON response.
    pub async fn post_json<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<T> {
        let rb = self.builder(Method::POST, path).json(body);
        let (kind, bytes) = self.dispatch(path, rb).await?;
        decode_json(path, kind, &bytes)
    }

    /// POST with an empty body (actions such as cancel).
    pub async fn post<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let rb = self.builder(Method::POST, path);
        let (kind, bytes) = self.dispatch(path, rb).await?;
        decode_json(path, kind, &bytes)
    }

    /// POST a multipart form (file upload), expect a typed JSON response.
    pub async fn post_multipart<T: DeserializeOwned>(&self, path: &str, form: Form) -> Result<T> {
        let rb = self.builder(Method::POST, path).multipart(form);
        let (kind, bytes) = self.dispatch(path, rb).await?;
        decode_json(path, kind, &bytes)
    }

    /// GET a binary result. A non-binary body is a decode failure, never
    /// silently reinterpreted — misclassification corrupts downloads.
    pub async fn get_bytes(&self, path: &str) -> Result<Bytes> {
        let rb = self.builder(Method::GET, path);
        let (kind, bytes) = self.dispatch(path, rb).await?;
        match kind {
            BodyKind::Binary => Ok(bytes),
            BodyKind::Json | BodyKind::Text => Err(Error::Decode {
                context: "binary result",
                message: "server returned a non-binary body".into(),
            }),
        }
    }
}

fn decode_json<T: DeserializeOwned>(path: &str, kind: BodyKind, bytes: &[u8]) -> Result<T> {
    if kind != BodyKind::Json {
        return Err(Error::Decode {
            context: path_context(path),
            message: "expected a JSON body".into(),
        });
    }
    serde_json::from_slice(bytes).map_err(|e| Error::decode(path_context(path), e))
}

/// Static context label for decode errors, by endpoint family.
fn path_context(path: &str) -> &'static str {
    if path.starts_with("/auth") {
        "auth response"
    } else if path.starts_with("/conversions/formats") {
        "format catalog"
    } else if path.starts_with("/conversions") {
        "upload response"
    } else if path.starts_with("/jobs") {
        "job response"
    } else {
        "response"
    }
}

/// Best message we can honestly relay for a non-2xx response.
///
/// Structured bodies give us the server's own words; unparseable JSON
/// falls back to a generic line plus a truncated body; non-JSON bodies
/// yield only the status line — we never fabricate a server message.
fn error_message(status: StatusCode, content_type: &str, raw: &str) -> String {
    if BodyKind::from_content_type(content_type) == BodyKind::Json {
        if let Ok(v) = serde_json::from_str::<Value>(raw) {
            if let Some(msg) = v
                .get("detail")
                .and_then(Value::as_str)
                .or_else(|| v.get("message").and_then(Value::as_str))
            {
                return msg.to_string();
            }
        }
        let preview: String = raw.chars().take(RAW_BODY_PREVIEW).collect();
        if preview.trim().is_empty() {
            return status_line(status);
        }
        return format!("request failed: {preview}");
    }
    status_line(status)
}

fn status_line(status: StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_string()
}
