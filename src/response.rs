use serde::Serialize;

use crate::pagination::PageMeta;

/// Uniform body shape returned by every endpoint, success or failure.
/// Optional fields are omitted from the JSON rather than serialized as null.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PageMeta>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            error: None,
            pagination: None,
        }
    }

    pub fn with_pagination(data: T, message: impl Into<String>, pagination: PageMeta) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            error: None,
            pagination: Some(pagination),
        }
    }
}

impl ApiResponse<()> {
    /// Success without a data payload (logout, soft-delete confirmations).
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
            error: None,
            pagination: None,
        }
    }

    pub fn failure(message: impl Into<String>, code: &'static str) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            error: Some(code),
            pagination: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_omits_error_and_pagination() {
        let body = serde_json::to_value(ApiResponse::success(vec![1, 2], "ok")).expect("serialize");
        assert_eq!(body["success"], true);
        assert_eq!(body["data"], serde_json::json!([1, 2]));
        assert!(body.get("error").is_none());
        assert!(body.get("pagination").is_none());
    }

    #[test]
    fn paginated_body_uses_camel_case_total_pages() {
        let meta = PageMeta::new(25, 2, 10);
        let body = serde_json::to_value(ApiResponse::with_pagination(vec!["a"], "ok", meta))
            .expect("serialize");
        assert_eq!(body["pagination"]["page"], 2);
        assert_eq!(body["pagination"]["totalPages"], 3);
    }

    #[test]
    fn failure_carries_error_code_and_no_data() {
        let body =
            serde_json::to_value(ApiResponse::failure("nope", "NOT_FOUND")).expect("serialize");
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "NOT_FOUND");
        assert!(body.get("data").is_none());
    }
}
