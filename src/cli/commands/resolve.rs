use crate::auth::{self, AuthHandle};
use crate::cli::{utils, OutputFormat};
use crate::config::AppConfig;
use crate::router::{self, NavigationState, Navigator};

pub fn handle(path: &str, token: Option<&str>, output_format: OutputFormat) -> anyhow::Result<()> {
    let mut config = AppConfig::from_env()?;
    if token.is_some() && config.auth.key_set_url.is_some() {
        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
        runtime.block_on(auth::load_remote_keys(&mut config.auth))?;
    }
    let auth = AuthHandle::new(&config.auth, &config.backend.project_id);

    if token.is_some() && !auth.is_initialized() {
        tracing::warn!("No token secret or signing keys configured; the token will be ignored");
    }
    let current_user = token.and_then(|token| auth.current_user_from_token(token));

    let outcome = Navigator::new(router::routes()).navigate(path, current_user.as_ref());

    utils::output(output_format, &outcome, |outcome| {
        for state in &outcome.trace {
            println!("  {}", describe(state));
        }
        match outcome.view {
            Some(view) => println!("→ {} mounts {} view", outcome.final_path, view.name()),
            None => println!("→ {} matches no route (404)", outcome.final_path),
        }
    })
}

fn describe(state: &NavigationState) -> String {
    match state {
        NavigationState::Requested(path) => format!("requested {}", path),
        NavigationState::Rewritten(path) => format!("rewritten to {}", path),
        NavigationState::Evaluated => "guard evaluated".to_string(),
        NavigationState::Proceed => "proceed".to_string(),
        NavigationState::Redirected(path) => format!("redirected to {}", path),
        NavigationState::Unmatched => "unmatched".to_string(),
    }
}
