//! HTTP plumbing shared by every facade.
//!
//! Response mapping:
//! - 401 → [`PanelError::Unauthorized`]
//! - 404 → [`PanelError::NotFound`]
//! - other non-2xx → [`PanelError::Remote`] with the body's `error` field
//! - 2xx with `"success": false` → [`PanelError::Remote`]
//! - connection or decoding failure → [`PanelError::Transport`]

use std::time::Duration;

use reqwest::{RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::errors::PanelError;
use crate::session::Session;

const USER_AGENT: &str = concat!("odoo-panel/", env!("CARGO_PKG_VERSION"));

/// Typed client for the panel backend.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct PanelClient {
    http: reqwest::Client,
    base_url: String,
    session: Option<Session>,
}

impl PanelClient {
    /// Build a client for `base_url`. `timeout` bounds each request when set.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, PanelError> {
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            session: None,
        })
    }

    /// Attach the session whose token authenticates every later request.
    pub fn with_session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.session {
            Some(session) => request.bearer_auth(&session.access_token),
            None => request,
        }
    }

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, PanelError> {
        let request = self.authorize(self.http.get(self.url(path)).query(query));
        let (status, body) = self.execute("GET", path, request).await?;
        decode(status, &body, path)
    }

    pub(crate) async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, PanelError> {
        let request = self.authorize(self.http.post(self.url(path)).json(body));
        let (status, text) = self.execute("POST", path, request).await?;
        decode(status, &text, path)
    }

    /// POST with no request body.
    pub(crate) async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, PanelError> {
        let request = self.authorize(self.http.post(self.url(path)));
        let (status, text) = self.execute("POST", path, request).await?;
        decode(status, &text, path)
    }

    /// GET a non-JSON body, such as an HTML page.
    pub(crate) async fn get_text(&self, path: &str) -> Result<String, PanelError> {
        let request = self.authorize(self.http.get(self.url(path)));
        let (status, body) = self.execute("GET", path, request).await?;
        check_status(status, &body, path)?;
        Ok(body)
    }

    /// Send and read the whole body, without interpreting the status.
    pub(crate) async fn execute(
        &self,
        method: &str,
        path: &str,
        request: RequestBuilder,
    ) -> Result<(StatusCode, String), PanelError> {
        debug!(method, path, "Sending request");
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(method, path, status = status.as_u16(), bytes = body.len(), "Received response");
        Ok((status, body))
    }

    /// Raw request builder for facades that need custom status handling.
    pub(crate) fn post_request<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> RequestBuilder {
        self.authorize(self.http.post(self.url(path)).json(body))
    }
}

/// Pull the backend's `error` (or `message`) text out of a JSON body.
pub(crate) fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["error", "message"]
        .iter()
        .find_map(|key| value.get(key).and_then(Value::as_str))
        .map(str::to_string)
}

fn check_status(status: StatusCode, body: &str, path: &str) -> Result<(), PanelError> {
    match status {
        StatusCode::UNAUTHORIZED => Err(PanelError::Unauthorized),
        StatusCode::NOT_FOUND => Err(PanelError::NotFound(path.to_string())),
        s if !s.is_success() => Err(PanelError::Remote {
            status: s.as_u16(),
            message: error_message(body),
        }),
        _ => Ok(()),
    }
}

/// Map a status and JSON body to `T`, honoring the `success` envelope flag.
pub(crate) fn decode<T: DeserializeOwned>(
    status: StatusCode,
    body: &str,
    path: &str,
) -> Result<T, PanelError> {
    check_status(status, body, path)?;

    let value: Value = serde_json::from_str(body)?;
    if value.get("success").and_then(Value::as_bool) == Some(false) {
        return Err(PanelError::Remote {
            status: status.as_u16(),
            message: value
                .get("error")
                .and_then(Value::as_str)
                .map(str::to_string),
        });
    }
    Ok(serde_json::from_value(value)?)
}

/// Body of endpoints that only report success.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub message: Option<String>,
}
