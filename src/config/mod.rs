use jsonwebtoken::jwk::JwkSet;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use thiserror::Error;

/// Errors raised while assembling configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in backend config file '{path}': {source}")]
    InvalidJson {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid YAML in backend config file '{path}': {source}")]
    InvalidYaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid signing key set in '{path}': {source}")]
    InvalidKeySet {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// JWKS of the hosted auth service's ID-token signing keys
pub const HOSTED_KEY_SET_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub endpoints: EndpointConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_logging: bool,
    /// Empty means any origin is allowed
    pub cors_origins: Vec<String>,
}

/// Client configuration record handed out by the hosted backend console.
///
/// Every field is an opaque string; nothing is validated locally. The serde
/// names match the console's camelCase JSON so a downloaded config file can be
/// used as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendConfig {
    pub api_key: String,
    pub auth_domain: String,
    pub project_id: String,
    pub storage_bucket: String,
    pub messaging_sender_id: String,
    pub app_id: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            api_key: "YOUR_API_KEY".to_string(),
            auth_domain: "YOUR_PROJECT.firebaseapp.com".to_string(),
            project_id: "YOUR_PROJECT".to_string(),
            storage_bucket: "YOUR_PROJECT.appspot.com".to_string(),
            messaging_sender_id: "123456789".to_string(),
            app_id: "YOUR_APP_ID".to_string(),
        }
    }
}

/// Base URLs of the hosted REST endpoints (overridable for local emulators)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub database: String,
    pub storage: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            database: "https://firestore.googleapis.com/v1/".to_string(),
            storage: "https://firebasestorage.googleapis.com/v0/".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Shared HS256 secret, for emulator-issued and locally signed tokens
    pub token_secret: Option<String>,
    /// Published RS256 signing keys of the hosted auth service
    pub key_set: Option<JwkSet>,
    /// Where to download `key_set` from at startup
    pub key_set_url: Option<String>,
    pub session_cookie: String,
    pub leeway_secs: u64,
}

impl AppConfig {
    /// Build configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_source<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_overrides(&lookup)
    }

    fn with_overrides<F>(mut self, lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server overrides
        if let Some(v) = lookup("SERVER_HOST") {
            self.server.host = v;
        }
        if let Some(v) = lookup("JEWELRY_PORT").or_else(|| lookup("PORT")) {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }
        if let Some(v) = lookup("SERVER_REQUEST_LOGGING") {
            self.server.request_logging = v.parse().unwrap_or(self.server.request_logging);
        }
        if let Some(v) = lookup("SECURITY_CORS_ORIGINS") {
            self.server.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        // Backend record: file first, then individual variables
        if let Some(path) = lookup("BACKEND_CONFIG_FILE") {
            self.backend = load_backend_file(Path::new(&path))?;
        }
        let backend = &mut self.backend;
        for (key, field) in [
            ("FIREBASE_API_KEY", &mut backend.api_key),
            ("FIREBASE_AUTH_DOMAIN", &mut backend.auth_domain),
            ("FIREBASE_PROJECT_ID", &mut backend.project_id),
            ("FIREBASE_STORAGE_BUCKET", &mut backend.storage_bucket),
            ("FIREBASE_MESSAGING_SENDER_ID", &mut backend.messaging_sender_id),
            ("FIREBASE_APP_ID", &mut backend.app_id),
        ] {
            if let Some(v) = lookup(key) {
                *field = v;
            }
        }

        if let Some(v) = lookup("BACKEND_DATABASE_ENDPOINT") {
            self.endpoints.database = v;
        }
        if let Some(v) = lookup("BACKEND_STORAGE_ENDPOINT") {
            self.endpoints.storage = v;
        }

        // Auth overrides
        if let Some(v) = lookup("AUTH_TOKEN_SECRET") {
            self.auth.token_secret = Some(v).filter(|s| !s.is_empty());
        }
        if let Some(path) = lookup("AUTH_JWKS_FILE") {
            self.auth.key_set = Some(load_key_set_file(Path::new(&path))?);
        }
        if let Some(v) = lookup("AUTH_JWKS_URL") {
            self.auth.key_set_url = Some(v).filter(|s| !s.is_empty());
        }
        if let Some(v) = lookup("AUTH_SESSION_COOKIE") {
            self.auth.session_cookie = v;
        }
        if let Some(v) = lookup("AUTH_LEEWAY_SECS") {
            self.auth.leeway_secs = v.parse().unwrap_or(self.auth.leeway_secs);
        }

        Ok(self)
    }

    /// Socket address string the server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Copy suitable for display, with secrets masked
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        copy.backend.api_key = mask(&copy.backend.api_key);
        copy.auth.token_secret = copy.auth.token_secret.as_deref().map(mask);
        copy
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
                request_logging: true,
                cors_origins: Vec::new(),
            },
            backend: BackendConfig::default(),
            endpoints: EndpointConfig::default(),
            auth: AuthConfig {
                token_secret: None,
                key_set: None,
                key_set_url: None,
                session_cookie: "session".to_string(),
                leeway_secs: 60,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                request_logging: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
            backend: BackendConfig::default(),
            endpoints: EndpointConfig::default(),
            auth: AuthConfig {
                token_secret: None,
                key_set: None,
                key_set_url: Some(HOSTED_KEY_SET_URL.to_string()),
                session_cookie: "session".to_string(),
                leeway_secs: 30,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                request_logging: false,
                cors_origins: vec!["https://app.example.com".to_string()],
            },
            backend: BackendConfig::default(),
            endpoints: EndpointConfig::default(),
            auth: AuthConfig {
                token_secret: None,
                key_set: None,
                key_set_url: Some(HOSTED_KEY_SET_URL.to_string()),
                session_cookie: "__session".to_string(),
                leeway_secs: 5,
            },
        }
    }
}

fn load_backend_file(path: &Path) -> Result<BackendConfig, ConfigError> {
    let display = path.display().to_string();
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: display.clone(),
        source,
    })?;

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml") | Some("yml") => serde_yaml::from_str(&raw)
            .map_err(|source| ConfigError::InvalidYaml { path: display, source }),
        _ => serde_json::from_str(&raw)
            .map_err(|source| ConfigError::InvalidJson { path: display, source }),
    }
}

fn load_key_set_file(path: &Path) -> Result<JwkSet, ConfigError> {
    let display = path.display().to_string();
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: display.clone(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ConfigError::InvalidKeySet { path: display, source })
}

fn mask(secret: &str) -> String {
    if secret.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = secret.chars().rev().take(4).collect::<Vec<_>>().into_iter().rev().collect();
    format!("****{}", tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::from_source(lookup(&[])).unwrap();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.server.port, 3000);
        assert!(config.server.cors_origins.is_empty());
        assert!(config.auth.token_secret.is_none());
        assert!(config.auth.key_set_url.is_none());
        assert_eq!(config.backend, BackendConfig::default());
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::from_source(lookup(&[("APP_ENV", "prod")])).unwrap();
        assert_eq!(config.environment, Environment::Production);
        assert!(!config.server.request_logging);
        assert_eq!(config.auth.session_cookie, "__session");
        assert_eq!(config.auth.key_set_url.as_deref(), Some(HOSTED_KEY_SET_URL));
    }

    #[test]
    fn env_overrides_backend_record() {
        let config = AppConfig::from_source(lookup(&[
            ("FIREBASE_PROJECT_ID", "gems"),
            ("FIREBASE_STORAGE_BUCKET", "gems.appspot.com"),
            ("JEWELRY_PORT", "4100"),
            ("PORT", "9999"),
        ]))
        .unwrap();
        assert_eq!(config.backend.project_id, "gems");
        assert_eq!(config.backend.storage_bucket, "gems.appspot.com");
        assert_eq!(config.backend.api_key, "YOUR_API_KEY");
        assert_eq!(config.server.port, 4100);
    }

    #[test]
    fn unparseable_override_keeps_preset() {
        let config = AppConfig::from_source(lookup(&[
            ("PORT", "not-a-port"),
            ("AUTH_LEEWAY_SECS", "soon"),
        ]))
        .unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.auth.leeway_secs, 60);
    }

    #[test]
    fn empty_token_secret_leaves_auth_uninitialized() {
        let config = AppConfig::from_source(lookup(&[("AUTH_TOKEN_SECRET", "")])).unwrap();
        assert!(config.auth.token_secret.is_none());
    }

    #[test]
    fn cors_origins_are_split_and_trimmed() {
        let config = AppConfig::from_source(lookup(&[(
            "SECURITY_CORS_ORIGINS",
            "https://a.example.com, https://b.example.com,",
        )]))
        .unwrap();
        assert_eq!(
            config.server.cors_origins,
            vec!["https://a.example.com", "https://b.example.com"]
        );
    }

    #[test]
    fn backend_file_is_read_then_overridden() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("jewelry-backend-{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"{
                "apiKey": "key-from-file",
                "authDomain": "shop.firebaseapp.com",
                "projectId": "shop",
                "storageBucket": "shop.appspot.com",
                "messagingSenderId": "42",
                "appId": "1:42:web:abc"
            }"#,
        )
        .unwrap();

        let path_str = path.to_string_lossy().to_string();
        let config = AppConfig::from_source(lookup(&[
            ("BACKEND_CONFIG_FILE", path_str.as_str()),
            ("FIREBASE_APP_ID", "1:42:web:override"),
        ]))
        .unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.backend.api_key, "key-from-file");
        assert_eq!(config.backend.project_id, "shop");
        assert_eq!(config.backend.app_id, "1:42:web:override");
    }

    #[test]
    fn backend_yaml_file_is_supported() {
        let path = std::env::temp_dir().join(format!("jewelry-backend-{}.yaml", std::process::id()));
        std::fs::write(
            &path,
            "apiKey: k\nauthDomain: d\nprojectId: p\nstorageBucket: b\nmessagingSenderId: m\nappId: a\n",
        )
        .unwrap();

        let path_str = path.to_string_lossy().to_string();
        let config = AppConfig::from_source(lookup(&[("BACKEND_CONFIG_FILE", path_str.as_str())])).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.backend.project_id, "p");
        assert_eq!(config.backend.storage_bucket, "b");
    }

    #[test]
    fn missing_backend_file_is_an_error() {
        let err = AppConfig::from_source(lookup(&[(
            "BACKEND_CONFIG_FILE",
            "/definitely/not/here/backend.json",
        )]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }

    #[test]
    fn signing_keys_load_from_file() {
        let path = std::env::temp_dir().join(format!("jewelry-jwks-{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"{"keys":[{"kty":"RSA","alg":"RS256","use":"sig","kid":"k1","n":"sXch","e":"AQAB"}]}"#,
        )
        .unwrap();

        let path_str = path.to_string_lossy().to_string();
        let config = AppConfig::from_source(lookup(&[
            ("AUTH_JWKS_FILE", path_str.as_str()),
            ("AUTH_JWKS_URL", "https://keys.example.com/jwks"),
        ]))
        .unwrap();
        std::fs::remove_file(&path).ok();

        let key_set = config.auth.key_set.unwrap();
        assert_eq!(key_set.keys.len(), 1);
        assert!(key_set.find("k1").is_some());
        assert_eq!(config.auth.key_set_url.as_deref(), Some("https://keys.example.com/jwks"));
    }

    #[test]
    fn malformed_signing_key_file_is_an_error() {
        let path = std::env::temp_dir().join(format!("jewelry-bad-jwks-{}.json", std::process::id()));
        std::fs::write(&path, "not json").unwrap();

        let path_str = path.to_string_lossy().to_string();
        let err = AppConfig::from_source(lookup(&[("AUTH_JWKS_FILE", path_str.as_str())])).unwrap_err();
        std::fs::remove_file(&path).ok();

        assert!(matches!(err, ConfigError::InvalidKeySet { .. }));
    }

    #[test]
    fn redacted_masks_secrets() {
        let config = AppConfig::from_source(lookup(&[
            ("FIREBASE_API_KEY", "AIzaSyExample1234"),
            ("AUTH_TOKEN_SECRET", "s3cr3t-value"),
        ]))
        .unwrap()
        .redacted();
        assert_eq!(config.backend.api_key, "****1234");
        assert_eq!(config.auth.token_secret.as_deref(), Some("****alue"));
    }
}
