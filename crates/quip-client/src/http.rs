use std::time::Duration;

use quip_core::AppError;
use reqwest::Client;

pub(crate) const USER_AGENT: &str = "Quip/0.1 (joke aggregator)";

/// Upstream joke APIs give no latency guarantees; every client gets an
/// explicit request timeout so a hung upstream cannot stall a batch.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub(crate) fn build_client() -> Result<Client, AppError> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| AppError::Config(format!("failed to build HTTP client: {e}")))
}

/// Issue a GET and deserialize the JSON body, mapping transport, status, and
/// parse failures to [`AppError::Upstream`] tagged with the provider name.
pub(crate) async fn get_json<T: serde::de::DeserializeOwned>(
    client: &Client,
    provider: &str,
    url: &str,
) -> Result<T, AppError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| AppError::upstream(provider, format!("request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(AppError::upstream(
            provider,
            format!("HTTP {} for {url}", status.as_u16()),
        ));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| AppError::upstream(provider, format!("unexpected response shape: {e}")))
}
