use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One cached payload as stored on disk
///
/// Serialized as `{ key, payload, writtenAt, paramsFingerprint }` with
/// `writtenAt` in Unix milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry<T> {
    /// Cache key the entry was stored under
    pub key: String,
    /// The cached data
    pub payload: T,
    /// When the entry was written
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub written_at: DateTime<Utc>,
    /// Fingerprint of the request parameters that produced `payload`
    pub params_fingerprint: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_entry_json_shape() {
        let entry = CacheEntry {
            key: "weather".to_string(),
            payload: json!({"temp": 31}),
            written_at: Utc.timestamp_millis_opt(1_700_000_000_123).unwrap(),
            params_fingerprint: "abc".to_string(),
        };

        let value = serde_json::to_value(&entry).unwrap();

        assert_eq!(
            value,
            json!({
                "key": "weather",
                "payload": {"temp": 31},
                "writtenAt": 1_700_000_000_123_i64,
                "paramsFingerprint": "abc"
            })
        );
        let parsed: CacheEntry<serde_json::Value> = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, entry);
    }
}
