//! Decoding of the `{status, payload | message}` envelope every page script answers with.

use serde::Deserialize;

use crate::JsonValue;
use crate::error::DecodeError;
use crate::statics;

/// A decoded envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    Ok(JsonValue),
    Missing,
    Error(String),
    Enabled,
    Disabled,
}

#[derive(Deserialize)]
struct RawEnvelope {
    status: Option<String>,
    #[serde(default)]
    payload: Option<JsonValue>,
    #[serde(default)]
    message: Option<JsonValue>,
}

impl Envelope {
    pub fn decode(text: &str) -> Result<Self, DecodeError> {
        let raw: RawEnvelope =
            serde_json::from_str(text).map_err(|e| DecodeError::Json(e.to_string()))?;

        match raw.status.as_deref() {
            Some("ok") => Ok(Envelope::Ok(raw.payload.unwrap_or_default())),
            Some("missing") => Ok(Envelope::Missing),
            Some("error") => Ok(Envelope::Error(error_message(raw.message))),
            Some("enabled") => Ok(Envelope::Enabled),
            Some("disabled") => Ok(Envelope::Disabled),
            _ => Err(DecodeError::UnknownStatus),
        }
    }
}

// Mirrors `message || "Unknown error"` on the page side.
fn error_message(message: Option<JsonValue>) -> String {
    match message {
        Some(JsonValue::String(s)) if !s.is_empty() => s,
        Some(JsonValue::Null) | Some(JsonValue::Bool(false)) | None => {
            statics::EN_UNKNOWN_ERROR.to_string()
        }
        Some(JsonValue::String(_)) => statics::EN_UNKNOWN_ERROR.to_string(),
        Some(other) => other.to_compact(),
    }
}

#[cfg(test)]
mod tests {
    use super::Envelope;
    use crate::JsonValue;
    use crate::error::DecodeError;

    #[test]
    fn ok_envelope_carries_payload() {
        let env = Envelope::decode(r#"{"status":"ok","payload":{"tr":{"a":"b"}}}"#).unwrap();
        let Envelope::Ok(payload) = env else {
            panic!("expected ok");
        };
        assert_eq!(payload.get("tr").and_then(|g| g.get("a")).and_then(JsonValue::as_str), Some("b"));
    }

    #[test]
    fn ok_without_payload_is_null() {
        assert_eq!(Envelope::decode(r#"{"status":"ok"}"#), Ok(Envelope::Ok(JsonValue::Null)));
    }

    #[test]
    fn error_message_defaults_when_absent_or_empty() {
        assert_eq!(
            Envelope::decode(r#"{"status":"error","message":"boom"}"#),
            Ok(Envelope::Error("boom".into()))
        );
        assert_eq!(
            Envelope::decode(r#"{"status":"error"}"#),
            Ok(Envelope::Error("Unknown error".into()))
        );
        assert_eq!(
            Envelope::decode(r#"{"status":"error","message":""}"#),
            Ok(Envelope::Error("Unknown error".into()))
        );
    }

    #[test]
    fn flag_statuses_decode() {
        assert_eq!(Envelope::decode(r#"{"status":"enabled"}"#), Ok(Envelope::Enabled));
        assert_eq!(Envelope::decode(r#"{"status":"disabled"}"#), Ok(Envelope::Disabled));
        assert_eq!(Envelope::decode(r#"{"status":"missing"}"#), Ok(Envelope::Missing));
    }

    #[test]
    fn garbage_and_unknown_status_are_decode_errors() {
        assert!(matches!(Envelope::decode("not json"), Err(DecodeError::Json(_))));
        assert!(matches!(Envelope::decode("true"), Err(DecodeError::Json(_))));
        assert_eq!(Envelope::decode(r#"{"status":"weird"}"#), Err(DecodeError::UnknownStatus));
        assert_eq!(Envelope::decode(r#"{}"#), Err(DecodeError::UnknownStatus));
    }
}
