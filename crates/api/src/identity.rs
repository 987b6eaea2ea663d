//! Identity provider: organisations and dashboard logins.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::ClerkConfig;

/// Errors from the identity provider.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("identity provider unreachable: {0}")]
    Network(String),

    #[error("identity provider rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("unexpected identity provider response: {0}")]
    InvalidResponse(String),
}

/// A login to create at the identity provider.
#[derive(Debug, Clone)]
pub struct NewIdentityUser<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    /// Organisation the user joins as admin.
    pub organization_id: &'a str,
}

/// Provisions organisations and users. Returns the provider's ids.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn create_organization(&self, name: &str) -> Result<String, IdentityError>;

    async fn create_user(&self, user: NewIdentityUser<'_>) -> Result<String, IdentityError>;

    fn name(&self) -> &str;
}

/// Generates ids locally. Used when no provider is configured.
#[derive(Debug, Clone, Default)]
pub struct LocalIdentity;

#[async_trait]
impl IdentityProvider for LocalIdentity {
    async fn create_organization(&self, _name: &str) -> Result<String, IdentityError> {
        Ok(format!("org_{}", uuid::Uuid::new_v4().simple()))
    }

    async fn create_user(&self, _user: NewIdentityUser<'_>) -> Result<String, IdentityError> {
        Ok(format!("user_{}", uuid::Uuid::new_v4().simple()))
    }

    fn name(&self) -> &str {
        "local"
    }
}

#[derive(Debug, Deserialize)]
struct Created {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ClerkErrors {
    errors: Vec<ClerkErrorItem>,
}

#[derive(Debug, Deserialize)]
struct ClerkErrorItem {
    message: String,
    #[serde(default)]
    long_message: Option<String>,
}

/// Clerk backend API client.
pub struct ClerkIdentity {
    client: Client,
    config: ClerkConfig,
}

impl ClerkIdentity {
    pub fn new(config: ClerkConfig) -> Result<Self, IdentityError> {
        let client = Client::builder()
            .build()
            .map_err(|e| IdentityError::Network(format!("Failed to create HTTP client: {}", e)))?;

        info!("Using Clerk identity provider at {}", config.api_url);
        Ok(Self { client, config })
    }

    async fn post(&self, path: &str, body: serde_json::Value) -> Result<Created, IdentityError> {
        let url = format!("{}/v1/{}", self.config.api_url.trim_end_matches('/'), path);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.secret_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| IdentityError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<ClerkErrors>(&text) {
                Ok(parsed) => parsed
                    .errors
                    .into_iter()
                    .map(|e| e.long_message.unwrap_or(e.message))
                    .collect::<Vec<_>>()
                    .join("; "),
                Err(_) => text,
            };
            return Err(IdentityError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| IdentityError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl IdentityProvider for ClerkIdentity {
    async fn create_organization(&self, name: &str) -> Result<String, IdentityError> {
        let created = self.post("organizations", json!({ "name": name })).await?;
        info!("Created organisation {}", created.id);
        Ok(created.id)
    }

    async fn create_user(&self, user: NewIdentityUser<'_>) -> Result<String, IdentityError> {
        let created = self
            .post(
                "users",
                json!({
                    "email_address": [user.email],
                    "password": user.password,
                    "first_name": user.first_name,
                    "last_name": user.last_name,
                }),
            )
            .await?;

        self.post(
            &format!("organizations/{}/memberships", user.organization_id),
            json!({ "user_id": created.id, "role": "org:admin" }),
        )
        .await?;

        info!("Created user {} in organisation {}", created.id, user.organization_id);
        Ok(created.id)
    }

    fn name(&self) -> &str {
        "clerk"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn clerk_for(server: &MockServer) -> ClerkIdentity {
        ClerkIdentity::new(ClerkConfig {
            secret_key: "sk_test".to_string(),
            api_url: server.uri(),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_organization() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/organizations"))
            .and(header("authorization", "Bearer sk_test"))
            .and(body_partial_json(json!({"name": "Acme"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "org_1"})))
            .expect(1)
            .mount(&server)
            .await;

        let id = clerk_for(&server).create_organization("Acme").await.unwrap();
        assert_eq!(id, "org_1");
    }

    #[tokio::test]
    async fn test_create_user_joins_organisation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/users"))
            .and(body_partial_json(json!({"email_address": ["dana@acme.com"]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "user_1"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/organizations/org_1/memberships"))
            .and(body_partial_json(json!({"user_id": "user_1", "role": "org:admin"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "orgmem_1"})))
            .expect(1)
            .mount(&server)
            .await;

        let id = clerk_for(&server)
            .create_user(NewIdentityUser {
                email: "dana@acme.com",
                password: "hunter22!",
                first_name: "Dana",
                last_name: "Silva",
                organization_id: "org_1",
            })
            .await
            .unwrap();
        assert_eq!(id, "user_1");
    }

    #[tokio::test]
    async fn test_rejection_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/organizations"))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({
                "errors": [{
                    "message": "is invalid",
                    "long_message": "name is invalid",
                    "code": "form_param_format_invalid"
                }]
            })))
            .mount(&server)
            .await;

        let err = clerk_for(&server).create_organization("").await.unwrap_err();
        match err {
            IdentityError::Rejected { status, message } => {
                assert_eq!(status, 422);
                assert_eq!(message, "name is invalid");
            }
            other => panic!("expected Rejected, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_local_identity_ids() {
        let org = LocalIdentity.create_organization("Acme").await.unwrap();
        assert!(org.starts_with("org_"));
    }
}
