pub mod creatures;
pub mod movies;
pub mod weather;

use crate::errors::ClientError;
use serde::de::DeserializeOwned;

/// Sends a prepared GET request and decodes a JSON body, mapping non-success
/// statuses to `ClientError::Status`.
pub(crate) async fn get_json<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
) -> Result<T, ClientError> {
    let response = request.send().await?;
    if !response.status().is_success() {
        return Err(ClientError::from_response(response).await);
    }
    response
        .json()
        .await
        .map_err(ClientError::decode)
}
