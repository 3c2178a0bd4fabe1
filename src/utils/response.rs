use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;

/// Success envelope. `data` and `message` are omitted from the JSON
/// when absent so bare confirmations stay compact.
#[derive(Serialize)]
pub struct ApiResponse<T>
where
    T: Serialize,
{
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub success: bool,
    pub error: ApiErrorBody,
}

pub fn success<T>(data: T, message: impl Into<String>) -> Response
where
    T: Serialize,
{
    let body = ApiResponse {
        success: true,
        data: Some(data),
        message: Some(message.into()),
    };
    (StatusCode::OK, Json(body)).into_response()
}

/// 200 with data only, for payloads that speak for themselves.
pub fn success_data<T>(data: T) -> Response
where
    T: Serialize,
{
    let body = ApiResponse {
        success: true,
        data: Some(data),
        message: None,
    };
    (StatusCode::OK, Json(body)).into_response()
}

pub fn created<T>(data: T, message: impl Into<String>) -> Response
where
    T: Serialize,
{
    let body = ApiResponse {
        success: true,
        data: Some(data),
        message: Some(message.into()),
    };
    (StatusCode::CREATED, Json(body)).into_response()
}

pub fn empty_success(message: impl Into<String>) -> Response {
    let body: ApiResponse<()> = ApiResponse {
        success: true,
        data: None,
        message: Some(message.into()),
    };
    (StatusCode::OK, Json(body)).into_response()
}

pub fn error(
    code: &str,
    message: impl Into<String>,
    details: Option<Value>,
    status: StatusCode,
) -> Response {
    let body = ApiErrorResponse {
        success: false,
        error: ApiErrorBody {
            code: code.to_string(),
            message: message.into(),
            details,
        },
    };

    (status, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_envelope_carries_data_and_message() {
        let body = ApiResponse {
            success: true,
            data: Some(vec![1, 2, 3]),
            message: Some("ok".to_string()),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"], serde_json::json!([1, 2, 3]));
        assert_eq!(json["message"], "ok");
    }

    #[test]
    fn absent_fields_are_omitted() {
        let body: ApiResponse<()> = ApiResponse {
            success: true,
            data: None,
            message: Some("done".to_string()),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("data").is_none());

        let body = ApiResponse {
            success: true,
            data: Some(serde_json::json!({"k": "v"})),
            message: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("message").is_none());
    }

    #[test]
    fn error_envelope_nests_code_and_message() {
        let body = ApiErrorResponse {
            success: false,
            error: ApiErrorBody {
                code: "NOT_FOUND".to_string(),
                message: "missing".to_string(),
                details: None,
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["code"], "NOT_FOUND");
        assert_eq!(json["error"]["message"], "missing");
        assert!(json["error"].get("details").is_none());
    }
}
