use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// 採集流程的失敗結果，以資料形式往上傳遞，由 web 層轉成 HTTP 回應
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Invalid response from server.")]
    InvalidContentType { details: String },
    #[error("Blocked by Cloudflare.")]
    BotChallenge { details: String },
    #[error("Stock grid not found.")]
    StructureNotFound { details: String },
    #[error("No stock data found.")]
    EmptyResult { details: String },
    #[error("Failed after multiple attempts.")]
    TransportFailure { details: String },
}

impl FetchError {
    pub fn status(&self) -> StatusCode {
        match self {
            FetchError::InvalidContentType { .. } => StatusCode::BAD_GATEWAY,
            FetchError::BotChallenge { .. } => StatusCode::FORBIDDEN,
            FetchError::StructureNotFound { .. } => StatusCode::NOT_FOUND,
            FetchError::EmptyResult { .. } => StatusCode::NO_CONTENT,
            FetchError::TransportFailure { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn details(&self) -> &str {
        match self {
            FetchError::InvalidContentType { details }
            | FetchError::BotChallenge { details }
            | FetchError::StructureNotFound { details }
            | FetchError::EmptyResult { details }
            | FetchError::TransportFailure { details } => details,
        }
    }

    /// 給呼叫端的補救建議
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            FetchError::InvalidContentType { .. } => {
                Some("Verify the stock page URL still serves HTML.")
            }
            FetchError::BotChallenge { .. } => {
                Some("Wait a few minutes before retrying so the protection layer cools down.")
            }
            FetchError::StructureNotFound { .. } => {
                Some("The page layout may have changed; review the locator patterns.")
            }
            FetchError::EmptyResult { .. } => None,
            FetchError::TransportFailure { .. } => {
                Some("Check network connectivity and retry later.")
            }
        }
    }
}

impl IntoResponse for FetchError {
    fn into_response(self) -> Response {
        let mut body = json!({
            "error": self.to_string(),
            "details": self.details(),
        });

        if let Some(suggestion) = self.suggestion() {
            body["suggestion"] = json!(suggestion);
        }

        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                FetchError::InvalidContentType {
                    details: String::new(),
                },
                StatusCode::BAD_GATEWAY,
            ),
            (
                FetchError::BotChallenge {
                    details: String::new(),
                },
                StatusCode::FORBIDDEN,
            ),
            (
                FetchError::StructureNotFound {
                    details: String::new(),
                },
                StatusCode::NOT_FOUND,
            ),
            (
                FetchError::EmptyResult {
                    details: String::new(),
                },
                StatusCode::NO_CONTENT,
            ),
            (
                FetchError::TransportFailure {
                    details: String::new(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(error.status(), status);
        }
    }

    #[test]
    fn test_error_body_shape() {
        let error = FetchError::BotChallenge {
            details: "Challenge marker detected in response body.".to_string(),
        };
        let body = json!({
            "error": error.to_string(),
            "details": error.details(),
            "suggestion": error.suggestion(),
        });

        assert_eq!(body["error"], "Blocked by Cloudflare.");
        assert_eq!(body["details"], "Challenge marker detected in response body.");
        assert!(body["suggestion"].as_str().is_some());
    }

    #[test]
    fn test_empty_result_has_no_suggestion() {
        let error = FetchError::EmptyResult {
            details: "Empty stock sections.".to_string(),
        };

        assert!(error.suggestion().is_none());
    }
}
