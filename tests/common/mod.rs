#![allow(dead_code)]

use std::net::TcpListener;
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::{extract::Request, ServiceExt};
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use jewelry_catalog::auth::{token_issuer, Claims};
use jewelry_catalog::{app, config::AppConfig, state::AppState};
use reqwest::StatusCode;

pub const TOKEN_SECRET: &str = "integration-test-secret";
pub const PROJECT_ID: &str = "integration-gems";

static SERVER: OnceLock<TestServer> = OnceLock::new();

/// Server running inside the test binary, so it ends when the binary exits
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
}

impl TestServer {
    fn start() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let config = AppConfig::from_source(|key| {
            let value = match key {
                "APP_ENV" => "development".to_string(),
                "SERVER_HOST" => "127.0.0.1".to_string(),
                "JEWELRY_PORT" => port.to_string(),
                "SERVER_REQUEST_LOGGING" => "false".to_string(),
                "FIREBASE_PROJECT_ID" => PROJECT_ID.to_string(),
                "AUTH_TOKEN_SECRET" => TOKEN_SECRET.to_string(),
                _ => return None,
            };
            Some(value)
        })?;
        let bind_addr = config.bind_addr();
        let state = AppState::from_config(config)?;

        let listener = TcpListener::bind(&bind_addr).with_context(|| format!("failed to bind {}", bind_addr))?;
        listener.set_nonblocking(true)?;

        // Each #[tokio::test] gets its own runtime that dies with the test, so
        // the shared server runs on a dedicated thread and runtime
        std::thread::Builder::new()
            .name("test-server".to_string())
            .spawn(move || {
                let runtime = tokio::runtime::Builder::new_multi_thread()
                    .worker_threads(2)
                    .enable_all()
                    .build()
                    .expect("failed to build server runtime");
                runtime.block_on(async move {
                    let listener = tokio::net::TcpListener::from_std(listener).expect("failed to adopt listener");
                    let service = app::service(state);
                    axum::serve(listener, ServiceExt::<Request>::into_make_service(service))
                        .await
                        .expect("test server stopped");
                });
            })
            .context("failed to spawn server thread")?;

        Ok(Self { port, base_url })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::start().expect("failed to start test server"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Client that reports redirects instead of following them
pub fn no_redirect_client() -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()?)
}

/// ID token the test server accepts
pub fn id_token(uid: &str) -> String {
    let now = Utc::now();
    let claims = Claims {
        sub: uid.to_string(),
        aud: PROJECT_ID.to_string(),
        iss: token_issuer(PROJECT_ID),
        exp: (now + chrono::Duration::hours(1)).timestamp(),
        iat: now.timestamp(),
        email: None,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(TOKEN_SECRET.as_bytes()))
        .expect("failed to sign test token")
}
