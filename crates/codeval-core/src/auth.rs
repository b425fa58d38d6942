//! Console login, used once at startup to obtain the bearer token for the
//! code generation API.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::types::ConsoleConfig;
use crate::errors::EvalError;

pub const LOGIN_PATH: &str = "/console/api/login";

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
    language: &'a str,
    remember_me: bool,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    result: String,
    #[serde(default)]
    data: Option<LoginTokens>,
}

#[derive(Debug, Deserialize)]
struct LoginTokens {
    access_token: String,
}

pub struct ConsoleAuthClient {
    client: Client,
    base_url: String,
}

impl ConsoleAuthClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<String, EvalError> {
        if email.is_empty() || password.is_empty() {
            return Err(EvalError::ConfigError(
                "Console email and password are required to log in".to_string(),
            ));
        }

        let url = format!("{}{}", self.base_url, LOGIN_PATH);
        log::debug!("Logging in to {} as {}", url, email);

        let payload = LoginRequest {
            email,
            password,
            language: "en-US",
            remember_me: true,
        };

        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| EvalError::AuthError(format!("Login request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|_| {
                "Unknown error while reading error response body".to_string()
            });
            return Err(EvalError::AuthError(format!(
                "Login failed with status {}: {}",
                status, error_text
            )));
        }

        let login: LoginResponse = response
            .json()
            .await
            .map_err(|e| EvalError::AuthError(format!("Failed to parse login response: {}", e)))?;

        match login.data {
            Some(tokens) if login.result == "success" && !tokens.access_token.is_empty() => {
                log::info!("Logged in to console as {}", email);
                Ok(tokens.access_token)
            }
            _ => Err(EvalError::AuthError(format!(
                "Login was not successful (result: {})",
                login.result
            ))),
        }
    }

    pub async fn login_with(&self, console: &ConsoleConfig) -> Result<String, EvalError> {
        self.login(&console.email, console.password()).await
    }
}
