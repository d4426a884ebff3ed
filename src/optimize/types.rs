use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_REJECTION: &str = "optimization failed";

/// Request body for `POST /api/optimize`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OptimizeRequest {
    pub text: String,
}

/// Response body; every field but `success` is optional on the wire.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct OptimizeResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub optimized_text: Option<String>,
    #[serde(default)]
    pub improvements: Option<Vec<String>>,
    #[serde(default)]
    pub error: Option<String>,
}

/// `GET /api/health` body
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub service: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationResult {
    pub optimized_text: String,
    pub improvements: Vec<String>,
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "message", rename_all = "camelCase")]
pub enum OptimizationError {
    /// The service answered and declined; the message is shown as-is.
    #[error("{0}")]
    Rejected(String),
    #[error("transport error: {0}")]
    Transport(String),
}

impl OptimizationError {
    /// Text shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            OptimizationError::Rejected(message) => message.clone(),
            OptimizationError::Transport(_) => {
                "Network error, please check that the optimization service is running".to_string()
            }
        }
    }
}

impl From<reqwest::Error> for OptimizationError {
    fn from(err: reqwest::Error) -> Self {
        OptimizationError::Transport(err.to_string())
    }
}

/// Turns an HTTP status plus raw body into the client contract.
///
/// A 2xx body decides on `success`. A non-2xx body that still carries an
/// `error` string is a rejection; anything else is a transport failure.
pub fn interpret_response(
    status: u16,
    body: &str,
) -> Result<OptimizationResult, OptimizationError> {
    let is_success_status = (200..300).contains(&status);
    let parsed: Result<OptimizeResponse, _> = serde_json::from_str(body);

    match parsed {
        Ok(response) if is_success_status => {
            if response.success {
                let optimized_text = response.optimized_text.ok_or_else(|| {
                    OptimizationError::Transport("response missing optimized_text".to_string())
                })?;
                Ok(OptimizationResult {
                    optimized_text,
                    improvements: response.improvements.unwrap_or_default(),
                })
            } else {
                Err(OptimizationError::Rejected(
                    response
                        .error
                        .unwrap_or_else(|| DEFAULT_REJECTION.to_string()),
                ))
            }
        }
        Ok(OptimizeResponse {
            error: Some(message),
            ..
        }) => Err(OptimizationError::Rejected(message)),
        Ok(_) => Err(OptimizationError::Transport(format!("HTTP status {status}"))),
        Err(err) if is_success_status => Err(OptimizationError::Transport(format!(
            "malformed response body: {err}"
        ))),
        Err(_) => Err(OptimizationError::Transport(format!("HTTP status {status}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_body_maps_to_result() {
        let body = r#"{"success": true, "optimized_text": "better", "improvements": ["a", "b"]}"#;
        let result = interpret_response(200, body).unwrap();
        assert_eq!(result.optimized_text, "better");
        assert_eq!(result.improvements, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn missing_improvements_default_to_empty() {
        let body = r#"{"success": true, "optimized_text": "better"}"#;
        let result = interpret_response(200, body).unwrap();
        assert!(result.improvements.is_empty());
    }

    #[test]
    fn rejection_message_is_verbatim() {
        let body = r#"{"success": false, "error": "rate limited"}"#;
        let err = interpret_response(200, body).unwrap_err();
        assert_eq!(err, OptimizationError::Rejected("rate limited".into()));
        assert_eq!(err.user_message(), "rate limited");
    }

    #[test]
    fn rejection_without_message_uses_fallback() {
        let err = interpret_response(200, r#"{"success": false}"#).unwrap_err();
        assert_eq!(err.user_message(), DEFAULT_REJECTION);
    }

    #[test]
    fn error_status_with_message_is_a_rejection() {
        let body = r#"{"error": "text too short, at least 50 characters"}"#;
        let err = interpret_response(400, body).unwrap_err();
        assert_eq!(
            err,
            OptimizationError::Rejected("text too short, at least 50 characters".into())
        );
    }

    #[test]
    fn error_status_without_body_is_transport() {
        let err = interpret_response(502, "<html>bad gateway</html>").unwrap_err();
        assert!(matches!(err, OptimizationError::Transport(_)));
    }

    #[test]
    fn malformed_json_is_transport() {
        let err = interpret_response(200, "{not json").unwrap_err();
        assert!(matches!(err, OptimizationError::Transport(_)));
        assert!(err.user_message().contains("optimization service"));
    }

    #[test]
    fn request_serializes_text_only() {
        let body = serde_json::to_string(&OptimizeRequest { text: "hi".into() }).unwrap();
        assert_eq!(body, r#"{"text":"hi"}"#);
    }
}
