use rota_core::error::ErrorCode;
use rota_core::gateway::GatewayError;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// The request never produced an HTTP response.
    #[error("{method} {url}: {message}")]
    Transport {
        method: String,
        url: String,
        message: String,
    },

    /// The server answered with a non-success status.
    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("not logged in: {0}")]
    Unauthenticated(String),

    #[error("login rejected: {0}")]
    LoginRejected(String),
}

impl ClientError {
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::Unauthenticated(_) | Self::LoginRejected(_) => ErrorCode::Unauthenticated,
            Self::Status { status: 401, .. } => ErrorCode::Unauthenticated,
            Self::Transport { .. } => ErrorCode::ApiUnavailable,
            Self::Status { .. } => ErrorCode::RequestRejected,
            Self::Decode { .. } => ErrorCode::InternalUnexpected,
        }
    }
}

impl From<ClientError> for GatewayError {
    fn from(err: ClientError) -> Self {
        let status = err.status();
        let gateway = Self::new(err.to_string());
        match status {
            Some(code) => gateway.with_status(code),
            None => gateway,
        }
    }
}

/// Build an operator-facing message from an error response.
///
/// The server's `description` and `detail` fields, when present, are
/// appended to `base` as `": <text>"`. Structured details (validation
/// errors) are appended as compact JSON.
#[must_use]
pub fn format_api_error(base: &str, body: &str) -> String {
    let mut message = base.to_string();
    let Ok(json) = serde_json::from_str::<Value>(body) else {
        return message;
    };

    if let Some(description) = json.get("description").and_then(Value::as_str) {
        if !description.is_empty() {
            message.push_str(": ");
            message.push_str(description);
        }
    }

    match json.get("detail") {
        None | Some(Value::Null) => {}
        Some(Value::String(detail)) if detail.is_empty() => {}
        Some(Value::String(detail)) => {
            message.push_str(": ");
            message.push_str(detail);
        }
        Some(other) => {
            message.push_str(": ");
            message.push_str(&other.to_string());
        }
    }

    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_body_keeps_base_message() {
        assert_eq!(
            format_api_error("Request failed with status code 500", "Internal Server Error"),
            "Request failed with status code 500"
        );
    }

    #[test]
    fn description_and_detail_are_appended() {
        let body = r#"{"success": false, "description": "Day is locked", "detail": "try tomorrow"}"#;
        assert_eq!(
            format_api_error("Request failed with status code 400", body),
            "Request failed with status code 400: Day is locked: try tomorrow"
        );
    }

    #[test]
    fn structured_detail_is_rendered_as_json() {
        let body = r#"{"detail": [{"loc": ["body", "position_id"], "msg": "field required"}]}"#;
        let message = format_api_error("Request failed with status code 422", body);
        assert!(message.starts_with("Request failed with status code 422: ["));
        assert!(message.contains("field required"));
    }

    #[test]
    fn gateway_error_keeps_status() {
        let err = ClientError::Status {
            status: 404,
            message: "Request failed with status code 404: Not Found".into(),
        };
        assert_eq!(err.error_code(), ErrorCode::RequestRejected);
        let gateway = GatewayError::from(err);
        assert_eq!(gateway.status, Some(404));
        assert!(gateway.message.ends_with("Not Found"));
    }

    #[test]
    fn unauthorized_maps_to_unauthenticated_code() {
        let err = ClientError::Status {
            status: 401,
            message: "nope".into(),
        };
        assert_eq!(err.error_code(), ErrorCode::Unauthenticated);
    }
}
