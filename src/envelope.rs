//! The uniform JSON envelope placed around every controller result.
//!
//! ```text
//! success: {"timestamp":1760000000000,"status":"OK","data":{"id":1}}
//! error:   {"timestamp":1760000000000,"status":"ERROR","message":"user missing","error":"NOT_FOUND"}
//! ```
//!
//! An envelope starts out [pending](ResponseEnvelope::begin) and is finished
//! exactly once, by [`succeed`](ResponseEnvelope::succeed) or
//! [`fail`](ResponseEnvelope::fail). Both consume the pending envelope, so a
//! finished envelope is always either all-success or all-error.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

/// Outcome marker carried in the `status` field.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EnvelopeStatus {
    Ok,
    Error,
}

/// Envelope whose invocation has started but not yet finished.
#[derive(Clone, Copy, Debug)]
pub struct PendingEnvelope {
    timestamp: DateTime<Utc>,
}

impl PendingEnvelope {
    pub fn timestamp(&self) -> DateTime<Utc> { self.timestamp }

    /// Success envelope. A `null` value is replaced by `{}` so `data` is
    /// always present.
    pub fn succeed(self, data: Value) -> ResponseEnvelope {
        let data = match data {
            Value::Null => Value::Object(Map::new()),
            other => other,
        };
        ResponseEnvelope {
            timestamp: self.timestamp,
            status: EnvelopeStatus::Ok,
            data: Some(data),
            message: None,
            error: None,
        }
    }

    /// Error envelope with a human-readable `message` and an error `code`.
    pub fn fail(self, message: impl Into<String>, code: impl Into<String>) -> ResponseEnvelope {
        ResponseEnvelope {
            timestamp: self.timestamp,
            status: EnvelopeStatus::Error,
            data: None,
            message: Some(message.into()),
            error: Some(code.into()),
        }
    }
}

/// A finished envelope, ready to be serialized.
#[derive(Clone, Debug, Serialize)]
pub struct ResponseEnvelope {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    timestamp: DateTime<Utc>,
    status: EnvelopeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ResponseEnvelope {
    /// Starts an envelope stamped with the current time.
    pub fn begin() -> PendingEnvelope {
        Self::begin_at(Utc::now())
    }

    pub fn begin_at(timestamp: DateTime<Utc>) -> PendingEnvelope {
        PendingEnvelope { timestamp }
    }

    pub fn timestamp(&self) -> DateTime<Utc> { self.timestamp }
    pub fn status(&self) -> EnvelopeStatus { self.status }
    pub fn data(&self) -> Option<&Value> { self.data.as_ref() }
    pub fn message(&self) -> Option<&str> { self.message.as_deref() }
    pub fn error(&self) -> Option<&str> { self.error.as_deref() }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    fn at() -> PendingEnvelope {
        ResponseEnvelope::begin_at(Utc.timestamp_millis_opt(1_700_000_000_123).unwrap())
    }

    #[test]
    fn success_serializes_timestamp_status_data_in_order() {
        let body = serde_json::to_string(&at().succeed(json!({"id": 1}))).unwrap();
        assert_eq!(body, r#"{"timestamp":1700000000123,"status":"OK","data":{"id":1}}"#);
    }

    #[test]
    fn null_data_becomes_empty_object() {
        let envelope = at().succeed(Value::Null);
        assert_eq!(envelope.data(), Some(&json!({})));
        let body = serde_json::to_string(&envelope).unwrap();
        assert_eq!(body, r#"{"timestamp":1700000000123,"status":"OK","data":{}}"#);
    }

    #[test]
    fn falsy_but_present_values_are_kept() {
        assert_eq!(at().succeed(json!(0)).data(), Some(&json!(0)));
        assert_eq!(at().succeed(json!([])).data(), Some(&json!([])));
        assert_eq!(at().succeed(json!("")).data(), Some(&json!("")));
    }

    #[test]
    fn error_omits_data() {
        let envelope = at().fail("user missing", "NOT_FOUND");
        assert_eq!(envelope.status(), EnvelopeStatus::Error);
        assert!(envelope.data().is_none());
        let body = serde_json::to_string(&envelope).unwrap();
        assert_eq!(
            body,
            r#"{"timestamp":1700000000123,"status":"ERROR","message":"user missing","error":"NOT_FOUND"}"#,
        );
    }

    #[test]
    fn begin_stamps_current_time() {
        let before = Utc::now();
        let pending = ResponseEnvelope::begin();
        assert!(pending.timestamp() >= before && pending.timestamp() <= Utc::now());
    }
}
