use data_model::{FunctionId, FunctionRecord, Language};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateFunctionRequest {
    pub language: Language,
    pub body: String,
}

/// Body of a successful create call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionResponse {
    pub id: String,
    pub language: Language,
    pub url: String,
    pub created_at: String,
}

impl TryFrom<FunctionResponse> for FunctionRecord {
    type Error = anyhow::Error;

    fn try_from(response: FunctionResponse) -> Result<Self, Self::Error> {
        if response.id.is_empty() {
            return Err(anyhow::anyhow!("function response is missing an id"));
        }
        Ok(FunctionRecord {
            id: FunctionId::new(response.id),
            language: response.language,
            created_at: data_model::parse_timestamp(&response.created_at)?,
            url: response.url,
        })
    }
}

/// Error body returned by the backend. `detail` is either a plain message
/// or a list of validation errors.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ValidationError {
    #[serde(default)]
    pub loc: Vec<Value>,
    pub msg: String,
}

impl ErrorBody {
    /// Extracts a human-readable message, if the body carries one.
    pub fn message(&self) -> Option<String> {
        if let Some(detail) = &self.detail {
            match detail {
                Value::String(msg) if !msg.is_empty() => return Some(msg.clone()),
                Value::Array(_) => {
                    let errors: Vec<ValidationError> =
                        serde_json::from_value(detail.clone()).ok()?;
                    let msgs: Vec<String> = errors
                        .into_iter()
                        .map(|e| match field_name(&e.loc) {
                            Some(field) => format!("{}: {}", field, e.msg),
                            None => e.msg,
                        })
                        .collect();
                    if !msgs.is_empty() {
                        return Some(msgs.join("; "));
                    }
                }
                _ => {}
            }
        }
        self.error.clone().filter(|e| !e.is_empty())
    }
}

// The last string segment of a validation location, e.g. `["body", "language"]`.
fn field_name(loc: &[Value]) -> Option<&str> {
    loc.iter().rev().find_map(|v| v.as_str())
}

/// Interprets a health response body. Only the literal `true` is healthy.
pub fn is_healthy_body(body: &[u8]) -> bool {
    matches!(serde_json::from_slice::<Value>(body), Ok(Value::Bool(true)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_wire_format() {
        let req = CreateFunctionRequest {
            language: Language::Go,
            body: "package main".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            serde_json::json!({"language": "go", "body": "package main"})
        );
    }

    #[test]
    fn test_function_response_into_record() {
        let response: FunctionResponse = serde_json::from_str(
            r#"{"id":"fn_123","language":"go","url":"https://fns.example/fn_123","created_at":"2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        let record = FunctionRecord::try_from(response).unwrap();
        assert_eq!(record.id.get(), "fn_123");
        assert_eq!(record.url, "https://fns.example/fn_123");
    }

    #[test]
    fn test_function_response_rejects_bad_timestamp() {
        let response = FunctionResponse {
            id: "fn_1".to_string(),
            language: Language::Python,
            url: "http://x".to_string(),
            created_at: "not a date".to_string(),
        };
        assert!(FunctionRecord::try_from(response).is_err());
    }

    #[test]
    fn test_error_body_plain_detail() {
        let body: ErrorBody = serde_json::from_str(r#"{"detail":"Not found"}"#).unwrap();
        assert_eq!(body.message().unwrap(), "Not found");
    }

    #[test]
    fn test_error_body_validation_detail() {
        let body: ErrorBody = serde_json::from_str(
            r#"{"detail":[{"loc":["body","language"],"msg":"field required","type":"value_error.missing"}]}"#,
        )
        .unwrap();
        assert_eq!(body.message().unwrap(), "language: field required");
    }

    #[test]
    fn test_error_body_without_message() {
        let body: ErrorBody = serde_json::from_str(r#"{"detail":null}"#).unwrap();
        assert!(body.message().is_none());
        let body: ErrorBody = serde_json::from_str(r#"{"error":"boom"}"#).unwrap();
        assert_eq!(body.message().unwrap(), "boom");
    }

    #[test]
    fn test_healthy_body_is_exact_true() {
        assert!(is_healthy_body(b"true"));
        assert!(is_healthy_body(b" true\n"));
        assert!(!is_healthy_body(b"false"));
        assert!(!is_healthy_body(b"null"));
        assert!(!is_healthy_body(b"\"true\""));
        assert!(!is_healthy_body(b"1"));
        assert!(!is_healthy_body(b"{\"healthy\":true}"));
        assert!(!is_healthy_body(b""));
    }
}
