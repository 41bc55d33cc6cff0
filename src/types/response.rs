//! Response envelopes shared by the presentation endpoints.

use serde::Serialize;

/// The `{status, message, id}` acknowledgment shape the form endpoints return
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}

impl StatusResponse {
    /// Bare `{"status":"success"}`
    pub fn success() -> Self {
        Self {
            status: "success",
            message: None,
            id: None,
        }
    }

    /// `{"status":"success","message":...}`
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            status: "success",
            message: Some(message.into()),
            id: None,
        }
    }

    /// `{"status":"success","message":...,"id":...}`
    pub fn with_id(message: impl Into<String>, id: i64) -> Self {
        Self {
            status: "success",
            message: Some(message.into()),
            id: Some(id),
        }
    }
}

/// Detail acknowledgment used by the REST custom actions
#[derive(Debug, Serialize)]
pub struct DetailResponse {
    pub detail: String,
}

impl DetailResponse {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_response_skips_absent_fields() {
        let body = serde_json::to_value(StatusResponse::success()).unwrap();
        assert_eq!(body, serde_json::json!({"status": "success"}));

        let body = serde_json::to_value(StatusResponse::with_id("Saved", 7)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"status": "success", "message": "Saved", "id": 7})
        );
    }
}
