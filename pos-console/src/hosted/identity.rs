//! Hosted identity service over the Identity Toolkit REST API

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{AuthSession, HostedError, HostedResult, IdentityProvider};

const DEFAULT_ENDPOINT: &str = "https://identitytoolkit.googleapis.com/v1";

/// Vendor error codes that mean "wrong email or password"
const CREDENTIAL_ERRORS: &[&str] = &[
    "EMAIL_NOT_FOUND",
    "INVALID_PASSWORD",
    "INVALID_LOGIN_CREDENTIALS",
    "USER_DISABLED",
];

#[derive(Clone)]
pub struct RestIdentity {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PasswordResponse {
    local_id: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    id_token: String,
}

impl RestIdentity {
    pub fn new(client: reqwest::Client, api_key: &str) -> Self {
        Self {
            client,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: api_key.to_string(),
        }
    }

    async fn call(&self, method: &str, email: &str, password: &str) -> HostedResult<PasswordResponse> {
        let url = format!("{}/accounts:{method}", self.endpoint);
        let resp = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&PasswordRequest {
                email,
                password,
                return_secure_token: true,
            })
            .send()
            .await?;

        match super::check_status(resp).await {
            Ok(resp) => Ok(resp.json().await?),
            // Vendor messages look like "INVALID_PASSWORD" or "TOO_MANY_ATTEMPTS_TRY_LATER : ..."
            Err(HostedError::Status { status: 400, message }) => {
                let code = message.split([' ', ':']).next().unwrap_or_default();
                if CREDENTIAL_ERRORS.contains(&code) {
                    Err(HostedError::Auth(code.to_string()))
                } else {
                    Err(HostedError::Status {
                        status: 400,
                        message,
                    })
                }
            }
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl IdentityProvider for RestIdentity {
    async fn sign_in(&self, email: &str, password: &str) -> HostedResult<AuthSession> {
        let resp = self.call("signInWithPassword", email, password).await?;
        Ok(AuthSession {
            uid: resp.local_id,
            email: if resp.email.is_empty() {
                email.to_string()
            } else {
                resp.email
            },
            id_token: resp.id_token,
        })
    }

    async fn create_account(&self, email: &str, password: &str) -> HostedResult<String> {
        let resp = self.call("signUp", email, password).await?;
        Ok(resp.local_id)
    }
}
