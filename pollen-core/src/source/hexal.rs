use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::{
    model::{ForecastRequest, ForecastTable},
    source::{FetchError, ForecastSource, decode_envelope},
};

/// Hexal's "Pollenflugkalendar" endpoint.
pub const HEXAL_URL: &str = "https://allergie.hexal.de/pollenflug/vorhersage/load_pollendaten.php";

#[derive(Debug, Clone)]
pub struct HexalSource {
    endpoint: String,
    http: Client,
}

impl HexalSource {
    pub fn new() -> Self {
        Self::with_endpoint(HEXAL_URL)
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self { endpoint: endpoint.into(), http: Client::new() }
    }
}

impl Default for HexalSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Query parameters for a request; `historie` is only sent when history is asked for.
pub fn query_params(request: &ForecastRequest) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("datum", request.date.clone()),
        ("plz", request.postal_code.clone()),
    ];
    if request.history {
        params.push(("historie", "1".to_string()));
    }
    params
}

#[async_trait]
impl ForecastSource for HexalSource {
    async fn fetch(&self, request: &ForecastRequest) -> Result<ForecastTable, FetchError> {
        let params = query_params(request);
        debug!(endpoint = %self.endpoint, ?params, "requesting forecast");

        let res = self
            .http
            .post(&self.endpoint)
            .query(&params)
            .send()
            .await?
            .error_for_status()?;

        let body = res.text().await?;

        decode_envelope(&body).inspect_err(|err| {
            debug!(%err, body = %truncate_body(&body), "could not use forecast response");
        })
    }
}

fn truncate_body(body: &str) -> &str {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
