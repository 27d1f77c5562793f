// fetcher.rs - HTTP Fetcher
// Purpose: Build the shared HTTP client and issue one GET per target.
//          Any HTTP status counts as a response; only transport failures are errors.

use crate::config::ScanConfig;
use reqwest::{Client, ClientBuilder, Response};
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("{0}")]
    Request(#[from] reqwest::Error),
}

/// Client settings shared by every worker
pub fn client_builder(config: &ScanConfig) -> ClientBuilder {
    Client::builder()
        .timeout(config.timeout)
        .user_agent(config.user_agent.clone())
        .danger_accept_invalid_certs(config.insecure)
}

pub fn build_client(config: &ScanConfig) -> reqwest::Result<Client> {
    client_builder(config).build()
}

/// GET `target` and hand back the response with its body unread.
///
/// Error pages are returned like any other response, they can leak as much
/// as a 200. The caller owns the response; dropping it closes the body.
pub async fn fetch(client: &Client, target: &str) -> Result<Response, FetchError> {
    let url = Url::parse(target)?;
    let response = client.get(url).send().await?;
    Ok(response)
}
