use crate::sheets::error::{Result, SheetsError};
use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::sync::Mutex;

pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const TOKEN_LIFETIME_SECS: i64 = 3600;
const EXPIRY_MARGIN_SECS: i64 = 60;

#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<String>;
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// The parts of a Google service-account key file the bot needs.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default)]
    pub project_id: Option<String>,
}

impl ServiceAccountKey {
    pub fn from_json(json: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(json)?)
    }

    pub fn from_base64(encoded: &str) -> Result<Self> {
        let decoded = STANDARD.decode(encoded.trim())?;
        Self::from_json(&decoded)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read(path).map_err(|e| SheetsError::CredentialsError {
            message: format!("cannot read {}: {}", path.display(), e),
        })?;
        Self::from_json(&contents)
    }

    /// Base64 credentials take precedence over the key file.
    pub fn load(base64_credentials: Option<&str>, file: &str) -> Result<Self> {
        match base64_credentials {
            Some(encoded) => {
                tracing::info!("Using base64 service-account credentials");
                Self::from_base64(encoded)
            }
            None => {
                tracing::info!("Using service-account credentials from {}", file);
                Self::from_file(file)
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: i64,
}

/// OAuth2 JWT-bearer flow for a service account, caching the access token.
pub struct ServiceAccountAuth {
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    http: reqwest::Client,
    cached: Mutex<Option<CachedToken>>,
}

impl ServiceAccountAuth {
    pub fn new(key: ServiceAccountKey, http: reqwest::Client) -> Result<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())?;
        Ok(Self {
            key,
            encoding_key,
            http,
            cached: Mutex::new(None),
        })
    }

    fn signed_assertion(&self, now: i64) -> Result<String> {
        let claims = Claims {
            iss: &self.key.client_email,
            scope: SHEETS_SCOPE,
            aud: &self.key.token_uri,
            iat: now,
            exp: now + TOKEN_LIFETIME_SECS,
        };
        Ok(jsonwebtoken::encode(
            &Header::new(Algorithm::RS256),
            &claims,
            &self.encoding_key,
        )?)
    }

    async fn request_token(&self, now: i64) -> Result<CachedToken> {
        let assertion = self.signed_assertion(now)?;

        tracing::debug!("Requesting access token from {}", self.key.token_uri);
        let response = self
            .http
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SheetsError::CredentialsError {
                message: format!("token endpoint returned {}: {}", status.as_u16(), body),
            });
        }

        let token: TokenResponse = response.json().await?;
        Ok(CachedToken {
            token: token.access_token,
            expires_at: now + token.expires_in.unwrap_or(TOKEN_LIFETIME_SECS),
        })
    }
}

#[async_trait]
impl TokenProvider for ServiceAccountAuth {
    async fn access_token(&self) -> Result<String> {
        let now = chrono::Utc::now().timestamp();
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref() {
            if token.expires_at - EXPIRY_MARGIN_SECS > now {
                return Ok(token.token.clone());
            }
        }

        let fresh = self.request_token(now).await?;
        let token = fresh.token.clone();
        *cached = Some(fresh);
        Ok(token)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use httpmock::prelude::*;

    pub(crate) const TEST_PRIVATE_KEY: &str =
        include_str!("../../tests/fixtures/test_service_account.pem");

    /// Fixed token used by client tests.
    pub(crate) struct StaticToken(pub &'static str);

    #[async_trait]
    impl TokenProvider for StaticToken {
        async fn access_token(&self) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    fn key_json(token_uri: &str) -> String {
        serde_json::json!({
            "type": "service_account",
            "project_id": "log-bot",
            "client_email": "bot@log-bot.iam.gserviceaccount.com",
            "private_key": TEST_PRIVATE_KEY,
            "token_uri": token_uri,
        })
        .to_string()
    }

    #[test]
    fn decodes_base64_credentials() {
        let encoded = STANDARD.encode(key_json("https://oauth2.googleapis.com/token"));
        let key = ServiceAccountKey::load(Some(format!("{}\n", encoded).as_str()), "missing.json").unwrap();
        assert_eq!(key.client_email, "bot@log-bot.iam.gserviceaccount.com");
        assert_eq!(key.project_id.as_deref(), Some("log-bot"));
    }

    #[test]
    fn reads_credentials_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, key_json("https://example.test/token")).unwrap();

        let key = ServiceAccountKey::load(None, path.to_str().unwrap()).unwrap();
        assert_eq!(key.token_uri, "https://example.test/token");
    }

    #[test]
    fn missing_file_is_a_credentials_error() {
        let err = ServiceAccountKey::load(None, "/nonexistent/credentials.json").unwrap_err();
        assert!(matches!(err, SheetsError::CredentialsError { .. }));
    }

    #[test]
    fn token_uri_defaults_to_google() {
        let json = serde_json::json!({
            "client_email": "a@b.c",
            "private_key": "k",
        })
        .to_string();
        let key = ServiceAccountKey::from_json(json.as_bytes()).unwrap();
        assert_eq!(key.token_uri, DEFAULT_TOKEN_URI);
    }

    #[test]
    fn rejects_invalid_private_key() {
        let key = ServiceAccountKey {
            client_email: "a@b.c".into(),
            private_key: "not a key".into(),
            token_uri: DEFAULT_TOKEN_URI.into(),
            project_id: None,
        };
        assert!(ServiceAccountAuth::new(key, reqwest::Client::new()).is_err());
    }

    #[tokio::test]
    async fn exchanges_jwt_and_caches_token() {
        let server = MockServer::start();
        let token_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/token")
                .body_contains("grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer")
                .body_contains("assertion=");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "access_token": "ya29.test",
                    "expires_in": 3599,
                    "token_type": "Bearer"
                }));
        });

        let key = ServiceAccountKey::from_json(key_json(&server.url("/token")).as_bytes()).unwrap();
        let auth = ServiceAccountAuth::new(key, reqwest::Client::new()).unwrap();

        assert_eq!(auth.access_token().await.unwrap(), "ya29.test");
        assert_eq!(auth.access_token().await.unwrap(), "ya29.test");
        token_mock.assert_hits(1);
    }

    #[tokio::test]
    async fn token_endpoint_failure_is_reported() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/token");
            then.status(400).body(r#"{"error":"invalid_grant"}"#);
        });

        let key = ServiceAccountKey::from_json(key_json(&server.url("/token")).as_bytes()).unwrap();
        let auth = ServiceAccountAuth::new(key, reqwest::Client::new()).unwrap();

        let err = auth.access_token().await.unwrap_err();
        assert!(err.to_string().contains("invalid_grant"));
    }
}
