use crate::cli::{utils, OutputFormat};
use crate::config::AppConfig;

pub fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let config = AppConfig::from_env()?.redacted();

    utils::output(output_format, &config, |config| {
        println!("environment:   {:?}", config.environment);
        println!("listen:        {}", config.bind_addr());
        println!("project:       {}", config.backend.project_id);
        println!("bucket:        {}", config.backend.storage_bucket);
        println!("api key:       {}", config.backend.api_key);
        println!(
            "token secret:  {}",
            config.auth.token_secret.as_deref().unwrap_or("not configured")
        );
        match (&config.auth.key_set, &config.auth.key_set_url) {
            (Some(set), _) => println!("signing keys:  {} from file", set.keys.len()),
            (None, Some(url)) => println!("signing keys:  fetched from {}", url),
            (None, None) => println!("signing keys:  not configured"),
        }
        println!("session cookie: {}", config.auth.session_cookie);
    })
}
