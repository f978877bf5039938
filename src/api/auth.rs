use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use super::client::{PanelClient, decode, error_message};
use crate::errors::PanelError;
use crate::session::Session;
use panel_common::PanelUser;

const LOGIN_PATH: &str = "/api/auth/login";

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    access_token: String,
    user: PanelUser,
}

impl PanelClient {
    /// Exchange credentials for a [`Session`].
    ///
    /// Wrong credentials come back as [`PanelError::Remote`] with status 401
    /// so that they are not confused with an expired session.
    pub async fn login(&self, username: &str, password: &str) -> Result<Session, PanelError> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(PanelError::Validation(
                "Username and password are required".to_string(),
            ));
        }

        let request = self.post_request(LOGIN_PATH, &LoginRequest { username, password });
        let (status, body) = self.execute("POST", LOGIN_PATH, request).await?;
        if status == StatusCode::UNAUTHORIZED {
            return Err(PanelError::Remote {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let response: LoginResponse = decode(status, &body, LOGIN_PATH)?;
        Ok(Session::new(
            self.base_url(),
            response.access_token,
            response.user,
        ))
    }

    /// The account the current token belongs to.
    pub async fn current_user(&self) -> Result<PanelUser, PanelError> {
        self.get("/api/auth/me", &[]).await
    }
}
