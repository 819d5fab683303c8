use std::time::Duration;

use actix_cors::Cors;

use crate::{api::error, ENV};

const USER_AGENT: &str = concat!("visual-tagging/", env!("CARGO_PKG_VERSION"));

/// Shared outbound HTTP client for the classification provider and the analysis store.
pub fn build_http_client(timeout_secs: u64) -> Result<reqwest::Client, error::SystemError> {
    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(timeout_secs))
        .build()?;
    Ok(client)
}

pub fn cors() -> Cors {
    Cors::default()
        .allowed_origin(ENV.frontend_url.as_str())
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
        .allow_any_header()
        .supports_credentials()
        .max_age(3600)
}
