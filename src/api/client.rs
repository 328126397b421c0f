use crate::error::{ApiError, Result};
use reqwest::Client;
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::debug;

pub async fn get<T: DeserializeOwned>(
    client: Arc<Client>,
    header_map: HeaderMap,
    url: &str,
) -> Result<T> {
    debug!(url = %url, "GET");
    let response = client.get(url).headers(header_map).send().await?;

    if !response.status().is_success() {
        let status = response.status().as_u16();
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(ApiError::StatusError {
            status,
            message: error_text,
        }
        .into());
    }

    response
        .json::<T>()
        .await
        .map_err(|e| ApiError::InvalidResponse(e.to_string()).into())
}
