use axum::http::HeaderMap;
use ppecheck_application::InspectionRequest;
use ppecheck_core::{AppError, AppResult};
use ppecheck_domain::{ComplianceVerdicts, ObjectLocation};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Storage object payload of an object-finalized event.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageObjectData {
    pub bucket: String,
    pub name: String,
    #[serde(default)]
    pub content_type: Option<String>,
}

/// Envelope attributes of the triggering CloudEvent, when present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CloudEventContext {
    pub id: Option<String>,
    pub event_type: Option<String>,
    pub source: Option<String>,
}

/// Decoded trigger: envelope context plus the object payload.
#[derive(Debug, Clone)]
pub struct StorageObjectEvent {
    pub context: CloudEventContext,
    pub data: StorageObjectData,
}

impl StorageObjectEvent {
    /// Decodes a binary-mode (`ce-*` headers) or structured-mode CloudEvent.
    pub fn decode(headers: &HeaderMap, body: &[u8]) -> AppResult<Self> {
        let payload: Value = serde_json::from_slice(body).map_err(|error| {
            AppError::Validation(format!("event body is not valid JSON: {error}"))
        })?;

        let (context, data) = match payload {
            Value::Object(mut envelope) if envelope.contains_key("specversion") => {
                let context = CloudEventContext {
                    id: string_field(&envelope, "id"),
                    event_type: string_field(&envelope, "type"),
                    source: string_field(&envelope, "source"),
                };
                let data = envelope.remove("data").ok_or_else(|| {
                    AppError::Validation("structured event has no data attribute".to_owned())
                })?;
                (context, data)
            }
            data => (
                CloudEventContext {
                    id: header_value(headers, "ce-id"),
                    event_type: header_value(headers, "ce-type"),
                    source: header_value(headers, "ce-source"),
                },
                data,
            ),
        };

        let data = serde_json::from_value::<StorageObjectData>(data).map_err(|error| {
            AppError::Validation(format!("event data is not a storage object: {error}"))
        })?;

        Ok(Self { context, data })
    }

    /// Converts the event into a pipeline request.
    pub fn into_request(self) -> AppResult<InspectionRequest> {
        let location = ObjectLocation::new(self.data.bucket, self.data.name)?;

        Ok(InspectionRequest {
            location,
            content_type_hint: self.data.content_type,
        })
    }
}

fn string_field(envelope: &serde_json::Map<String, Value>, key: &str) -> Option<String> {
    envelope
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_owned)
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}

/// Invocation response body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InvocationResponse {
    /// Verdicts of a completed inspection.
    Result(ComplianceVerdicts),
    /// Message of a failed invocation.
    Error(String),
}

/// Health response payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderMap, HeaderValue};
    use ppecheck_core::AppError;
    use ppecheck_domain::{ComplianceVerdicts, Verdict};
    use serde_json::json;

    use super::{InvocationResponse, StorageObjectEvent};

    #[test]
    fn binary_mode_event_uses_body_as_object() {
        let mut headers = HeaderMap::new();
        headers.insert("ce-id", HeaderValue::from_static("1234"));
        headers.insert(
            "ce-type",
            HeaderValue::from_static("google.cloud.storage.object.v1.finalized"),
        );
        let body = json!({
            "bucket": "camera-bucket",
            "name": "uploads/captured_photo.jpg",
            "contentType": "image/jpeg",
            "size": "48213"
        })
        .to_string();

        let event = StorageObjectEvent::decode(&headers, body.as_bytes());
        let Ok(event) = event else {
            panic!("binary event should decode");
        };

        assert_eq!(event.context.id.as_deref(), Some("1234"));
        assert_eq!(
            event.context.event_type.as_deref(),
            Some("google.cloud.storage.object.v1.finalized")
        );
        let Ok(request) = event.into_request() else {
            panic!("event should map to a request");
        };
        assert_eq!(request.location.container(), "camera-bucket");
        assert_eq!(request.location.object_key(), "uploads/captured_photo.jpg");
        assert_eq!(request.content_type_hint.as_deref(), Some("image/jpeg"));
    }

    #[test]
    fn structured_mode_event_unwraps_data() {
        let body = json!({
            "specversion": "1.0",
            "id": "abcd",
            "type": "google.cloud.storage.object.v1.finalized",
            "source": "//storage.googleapis.com/projects/_/buckets/camera-bucket",
            "data": { "bucket": "camera-bucket", "name": "worker.png" }
        })
        .to_string();

        let event = StorageObjectEvent::decode(&HeaderMap::new(), body.as_bytes());
        let Ok(event) = event else {
            panic!("structured event should decode");
        };

        assert_eq!(event.context.id.as_deref(), Some("abcd"));
        assert_eq!(event.data.name, "worker.png");
        assert_eq!(event.data.content_type, None);
    }

    #[test]
    fn malformed_events_are_validation_errors() {
        for body in [
            "not json".to_owned(),
            json!({ "name": "a.jpg" }).to_string(),
            json!({ "specversion": "1.0", "id": "x" }).to_string(),
        ] {
            assert!(
                matches!(
                    StorageObjectEvent::decode(&HeaderMap::new(), body.as_bytes()),
                    Err(AppError::Validation(_))
                ),
                "{body} should be rejected"
            );
        }
    }

    #[test]
    fn empty_object_name_is_rejected() {
        let body = json!({ "bucket": "camera-bucket", "name": "" }).to_string();
        let event = StorageObjectEvent::decode(&HeaderMap::new(), body.as_bytes());
        let Ok(event) = event else {
            panic!("payload shape is valid");
        };

        assert!(matches!(
            event.into_request(),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn response_body_shapes() {
        let result = InvocationResponse::Result(ComplianceVerdicts {
            helmet: Verdict::Yes,
            hair: Verdict::No,
            work_clothes: Verdict::Yes,
            safety_vest: Verdict::Uncertain,
        });

        assert_eq!(
            serde_json::to_value(&result).ok(),
            Some(json!({
                "result": {
                    "Helmet": "YES",
                    "Hair": "NO",
                    "WorkClothes": "YES",
                    "SafetyVest": "UNCERTAIN"
                }
            }))
        );
        assert_eq!(
            serde_json::to_value(InvocationResponse::Error("boom".to_owned())).ok(),
            Some(json!({ "error": "boom" }))
        );
    }
}
