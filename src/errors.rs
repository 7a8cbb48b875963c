use axum::http::StatusCode;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    /// A credential the requested feature needs was not configured.
    pub fn missing_credential(var: &str) -> Self {
        Self::bad_request(format!(
            "missing API key: set {var} or pass `api_key` in the request"
        ))
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}

/// Failure of an outbound call to a third-party API.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(reqwest::Error),
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("could not decode response: {0}")]
    Decode(String),
    #[error("response contained no text output")]
    EmptyOutput,
}

/// Drops the request URL, which carries API keys in its query string.
impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.without_url())
    }
}

impl ClientError {
    pub fn decode(err: reqwest::Error) -> Self {
        Self::Decode(err.without_url().to_string())
    }

    /// Turns a non-success response into `ClientError::Status`, keeping a
    /// bounded slice of the body for diagnostics.
    pub async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Self::Status {
            status,
            body: body.chars().take(300).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    #[test]
    fn missing_credential_is_a_bad_request_naming_the_variable() {
        let err = AppError::missing_credential("OPENAI_API_KEY");
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(err.message.contains("OPENAI_API_KEY"));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn status_error_displays_code_and_body() {
        let err = ClientError::Status {
            status: 429,
            body: "slow down".into(),
        };
        assert_eq!(err.to_string(), "unexpected status 429: slow down");
    }
}
