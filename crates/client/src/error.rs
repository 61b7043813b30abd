use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("decode error: {0}")]
    Decode(String),
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ClientError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Message suitable for showing to a user.
    ///
    /// For API errors this is the server-supplied message alone.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Extract the server-supplied message from an error response body.
///
/// Looks at the JSON fields `detail`, `message` and `error` (first string
/// wins), then falls back to the raw body, then to the reason phrase.
pub fn server_message(status: reqwest::StatusCode, body: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        for key in ["detail", "message", "error"] {
            if let Some(Value::String(msg)) = map.get(key) {
                if !msg.trim().is_empty() {
                    return msg.trim().to_string();
                }
            }
        }
    }

    let body = body.trim();
    if !body.is_empty() {
        return body.to_string();
    }

    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn prefers_detail_then_message_then_error() {
        let body = r#"{"error":"bad_request","message":"template not found"}"#;
        assert_eq!(server_message(StatusCode::BAD_REQUEST, body), "template not found");

        let body = r#"{"detail":"record 12 does not exist","message":"ignored"}"#;
        assert_eq!(
            server_message(StatusCode::NOT_FOUND, body),
            "record 12 does not exist"
        );

        let body = r#"{"error":"quota exceeded"}"#;
        assert_eq!(server_message(StatusCode::TOO_MANY_REQUESTS, body), "quota exceeded");
    }

    #[test]
    fn non_string_fields_fall_through_to_raw_body() {
        let body = r#"{"detail":[{"loc":["body"],"msg":"field required"}]}"#;
        assert_eq!(server_message(StatusCode::UNPROCESSABLE_ENTITY, body), body);
    }

    #[test]
    fn empty_body_uses_reason_phrase() {
        assert_eq!(
            server_message(StatusCode::SERVICE_UNAVAILABLE, "  "),
            "Service Unavailable"
        );
    }

    #[test]
    fn user_message_hides_status_for_api_errors() {
        let err = ClientError::api(422, "template not found");
        assert_eq!(err.user_message(), "template not found");
        assert_eq!(err.to_string(), "API error (422): template not found");
    }
}
