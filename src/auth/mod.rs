use std::collections::HashMap;
use std::time::Duration;

use axum::http::{header, HeaderMap, HeaderValue};
use jsonwebtoken::{decode, decode_header, jwk::JwkSet, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::AuthConfig;

/// Authenticated principal behind the current-user reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub uid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// ID token claims issued by the hosted auth service
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub aud: String,
    pub iss: String,
    pub exp: i64,
    pub iat: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl From<Claims> for Principal {
    fn from(claims: Claims) -> Self {
        Self {
            uid: claims.sub,
            email: claims.email,
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Auth handle is not initialized")]
    NotConfigured,

    #[error("Missing ID token")]
    MissingToken,

    #[error("Authorization header must use Bearer token format")]
    MalformedHeader,

    #[error("Token algorithm {0:?} is not accepted")]
    UnsupportedAlgorithm(Algorithm),

    #[error("RS256 token carries no key id")]
    MissingKeyId,

    #[error("No signing key with id '{0}'")]
    UnknownKeyId(String),

    #[error("Invalid ID token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("Failed to fetch signing keys: {0}")]
    KeyFetch(#[from] reqwest::Error),
}

/// Issuer the hosted auth service stamps on ID tokens for a project
pub fn token_issuer(project_id: &str) -> String {
    format!("https://securetoken.google.com/{}", project_id)
}

/// Download the published signing key set (JWKS) for RS256 ID tokens
pub async fn fetch_key_set(url: &str) -> Result<JwkSet, AuthError> {
    let client = reqwest::Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(10))
        .build()?;

    let key_set = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .json::<JwkSet>()
        .await?;

    info!(url, keys = key_set.keys.len(), "Fetched token signing keys");
    Ok(key_set)
}

/// Fill `config.key_set` from `config.key_set_url` when a URL is configured.
/// Keys are read once; a restart picks up rotated keys.
pub async fn load_remote_keys(config: &mut AuthConfig) -> Result<(), AuthError> {
    if let Some(url) = config.key_set_url.clone() {
        config.key_set = Some(fetch_key_set(&url).await?);
    }
    Ok(())
}

struct TokenVerifier {
    /// HS256 secret (emulator and local testing)
    shared: Option<DecodingKey>,
    /// RS256 public keys by `kid`
    published: HashMap<String, DecodingKey>,
    validation: Validation,
}

impl TokenVerifier {
    fn verify(&self, token: &str) -> Result<Principal, AuthError> {
        let header = decode_header(token)?;
        let key = match header.alg {
            Algorithm::HS256 => self
                .shared
                .as_ref()
                .ok_or(AuthError::UnsupportedAlgorithm(header.alg))?,
            Algorithm::RS256 => {
                let kid = header.kid.as_deref().ok_or(AuthError::MissingKeyId)?;
                self.published
                    .get(kid)
                    .ok_or_else(|| AuthError::UnknownKeyId(kid.to_string()))?
            }
            other => return Err(AuthError::UnsupportedAlgorithm(other)),
        };

        let mut validation = self.validation.clone();
        validation.algorithms = vec![header.alg];
        let data = decode::<Claims>(token, key, &validation)?;
        Ok(data.claims.into())
    }
}

fn published_keys(key_set: Option<&JwkSet>) -> HashMap<String, DecodingKey> {
    let mut keys = HashMap::new();
    for jwk in key_set.into_iter().flat_map(|set| set.keys.iter()) {
        let Some(kid) = jwk.common.key_id.clone() else {
            warn!("Skipping signing key without a key id");
            continue;
        };
        match DecodingKey::from_jwk(jwk) {
            Ok(key) => {
                keys.insert(kid, key);
            }
            Err(e) => warn!("Skipping signing key '{}': {}", kid, e),
        }
    }
    keys
}

/// Read-only accessor for the current-user reference.
///
/// Tokens verify against the published RS256 key set, or against the shared
/// HS256 secret when one is configured. With neither the handle is
/// uninitialized and [`AuthHandle::current_user`] always returns `None`.
pub struct AuthHandle {
    verifier: Option<TokenVerifier>,
    session_cookie: String,
}

impl AuthHandle {
    pub fn new(config: &AuthConfig, project_id: &str) -> Self {
        let shared = config
            .token_secret
            .as_ref()
            .map(|secret| DecodingKey::from_secret(secret.as_bytes()));
        let published = published_keys(config.key_set.as_ref());

        let verifier = if shared.is_some() || !published.is_empty() {
            let mut validation = Validation::new(Algorithm::RS256);
            validation.set_audience(&[project_id]);
            validation.set_issuer(&[token_issuer(project_id)]);
            validation.leeway = config.leeway_secs;
            Some(TokenVerifier {
                shared,
                published,
                validation,
            })
        } else {
            None
        };

        Self {
            verifier,
            session_cookie: config.session_cookie.clone(),
        }
    }

    /// Handle that never reports a current user
    pub fn uninitialized() -> Self {
        Self {
            verifier: None,
            session_cookie: "session".to_string(),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.verifier.is_some()
    }

    /// Current user for a request, or `None` if the request is anonymous or
    /// its token does not verify
    pub fn current_user(&self, headers: &HeaderMap) -> Option<Principal> {
        match self.authenticate(headers) {
            Ok(principal) => Some(principal),
            Err(AuthError::MissingToken) => None,
            Err(e) => {
                debug!("Treating request as anonymous: {}", e);
                None
            }
        }
    }

    /// Current user for a raw ID token
    pub fn current_user_from_token(&self, token: &str) -> Option<Principal> {
        let verifier = self.verifier.as_ref()?;
        match verifier.verify(token) {
            Ok(principal) => Some(principal),
            Err(e) => {
                debug!("Treating token as anonymous: {}", e);
                None
            }
        }
    }

    fn authenticate(&self, headers: &HeaderMap) -> Result<Principal, AuthError> {
        let verifier = self.verifier.as_ref().ok_or(AuthError::NotConfigured)?;
        let token = extract_token(headers, &self.session_cookie)?;
        verifier.verify(&token)
    }
}

/// Pull the ID token from a Bearer Authorization header, falling back to the
/// session cookie when the header is absent or uses another scheme
fn extract_token(headers: &HeaderMap, cookie_name: &str) -> Result<String, AuthError> {
    let authorization = headers.get(header::AUTHORIZATION);
    if let Some(token) = authorization.and_then(bearer_token) {
        return Ok(token.to_string());
    }

    let cookie = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == cookie_name && !value.is_empty())
        .map(|(_, value)| value.to_string());

    match cookie {
        Some(token) => Ok(token),
        None if authorization.is_some() => Err(AuthError::MalformedHeader),
        None => Err(AuthError::MissingToken),
    }
}

/// Token of a `Bearer` credential; the scheme is matched case-insensitively
fn bearer_token(value: &HeaderValue) -> Option<&str> {
    let (scheme, token) = value.to_str().ok()?.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
