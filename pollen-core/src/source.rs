use crate::model::{ForecastRequest, ForecastTable};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::value::RawValue;
use std::fmt::Debug;
use thiserror::Error;

pub mod hexal;

pub use hexal::HexalSource;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed sending request")]
    RequestFailed(#[from] reqwest::Error),

    #[error("server rejected the request ({message}), check your arguments?")]
    ServerRejected { message: String },

    #[error("unexpected response from server")]
    InvalidResponse(#[from] serde_json::Error),
}

/// Something that can deliver pollen forecasts.
#[async_trait]
pub trait ForecastSource: Send + Sync + Debug {
    async fn fetch(&self, request: &ForecastRequest) -> Result<ForecastTable, FetchError>;
}

/// Value of `message` in a successful response.
pub const SUCCESS_MESSAGE: &str = "success";

#[derive(Debug, Deserialize)]
struct Envelope<'a> {
    message: String,
    /// Kept as raw text so the date rows are decoded in document order.
    #[serde(borrow, default)]
    content: Option<&'a RawValue>,
}

/// Decode a response body of the form `{"message": "success", "content": {...}}`.
///
/// The status message is checked before the content is looked at, since
/// rejected requests don't carry a usable table.
pub fn decode_envelope(body: &str) -> Result<ForecastTable, FetchError> {
    let envelope: Envelope = serde_json::from_str(body)?;

    if envelope.message != SUCCESS_MESSAGE {
        return Err(FetchError::ServerRejected { message: envelope.message });
    }

    let content = envelope.content.map_or("null", RawValue::get);
    Ok(serde_json::from_str(content)?)
}
