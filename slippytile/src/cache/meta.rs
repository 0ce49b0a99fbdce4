//! Cache-validation metadata stored beside each raster tile.
//!
//! The sidecar is a small JSON object:
//!
//! ```text
//! {
//!   "etag": "\"abcd1234\"",
//!   "lastModified": "Mon, 21 Aug 2025 12:34:56 GMT",
//!   "contentType": "image/png",
//!   "contentLength": 10342,
//!   "lastAccessUnixSec": 1692600000
//! }
//! ```
//!
//! Decoding is lenient: malformed input, a non-object top level or a field of
//! the wrong type never fails, the affected values simply fall back to their
//! defaults.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::net::ResponseHeaders;

/// HTTP validators and bookkeeping for a cached tile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_encoding: Option<String>,
    pub content_length: u64,
    pub last_access_unix_sec: u64,
}

impl CacheMeta {
    /// Returns true if the metadata carries at least one HTTP validator.
    pub fn has_validators(&self) -> bool {
        self.etag.is_some() || self.last_modified.is_some()
    }

    /// Captures the validators of a fresh response, stamped with `now`.
    ///
    /// A missing `Content-Length` is recorded as 0.
    pub fn from_headers(headers: &ResponseHeaders, now_unix_sec: u64) -> Self {
        Self {
            etag: headers.etag.clone(),
            last_modified: headers.last_modified.clone(),
            content_type: headers.content_type.clone(),
            content_encoding: headers.content_encoding.clone(),
            content_length: headers.content_length.unwrap_or(0),
            last_access_unix_sec: now_unix_sec,
        }
    }

    /// Encodes the metadata as a compact JSON object.
    pub fn to_json(&self) -> String {
        // Serializing a struct of strings and integers cannot fail
        serde_json::to_string(self).unwrap_or_else(|_| String::from("{}"))
    }

    /// Decodes metadata, degrading to defaults instead of failing.
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str::<Value>(json) {
            Ok(Value::Object(map)) => Self::from_object(&map),
            _ => Self::default(),
        }
    }

    fn from_object(map: &Map<String, Value>) -> Self {
        let string = |key: &str| map.get(key).and_then(Value::as_str).map(str::to_owned);
        let unsigned = |key: &str| map.get(key).and_then(Value::as_u64).unwrap_or(0);

        Self {
            etag: string("etag"),
            last_modified: string("lastModified"),
            content_type: string("contentType"),
            content_encoding: string("contentEncoding"),
            content_length: unsigned("contentLength"),
            last_access_unix_sec: unsigned("lastAccessUnixSec"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn populated() -> CacheMeta {
        CacheMeta {
            etag: Some("\"abcd1234\"".to_string()),
            last_modified: Some("Mon, 21 Aug 2025 12:34:56 GMT".to_string()),
            content_type: Some("image/png".to_string()),
            content_encoding: Some("gzip".to_string()),
            content_length: 10342,
            last_access_unix_sec: 1_692_600_000,
        }
    }

    #[test]
    fn test_from_headers() {
        let headers = ResponseHeaders::from_pairs([
            ("ETag", "\"v7\""),
            ("content-type", "image/png"),
            ("Content-Length", "512"),
            ("X-Cache", "HIT"),
        ]);

        let meta = CacheMeta::from_headers(&headers, 42);

        assert_eq!(meta.etag.as_deref(), Some("\"v7\""));
        assert_eq!(meta.last_modified, None);
        assert_eq!(meta.content_type.as_deref(), Some("image/png"));
        assert_eq!(meta.content_length, 512);
        assert_eq!(meta.last_access_unix_sec, 42);
    }

    #[test]
    fn test_from_headers_without_length() {
        let meta = CacheMeta::from_headers(&ResponseHeaders::default(), 1);
        assert_eq!(meta.content_length, 0);
        assert!(!meta.has_validators());
    }

    #[test]
    fn test_roundtrip_all_fields() {
        let meta = populated();
        assert_eq!(CacheMeta::from_json(&meta.to_json()), meta);
    }

    #[test]
    fn test_roundtrip_all_absent() {
        let meta = CacheMeta::default();
        assert_eq!(CacheMeta::from_json(&meta.to_json()), meta);
    }

    #[test]
    fn test_unset_fields_are_omitted() {
        let json = CacheMeta::default().to_json();
        let value: Value = serde_json::from_str(&json).unwrap();
        let obj = value.as_object().unwrap();

        assert_eq!(obj.len(), 2);
        assert_eq!(obj["contentLength"], 0);
        assert_eq!(obj["lastAccessUnixSec"], 0);
    }

    #[test]
    fn test_camel_case_keys() {
        let json = populated().to_json();
        for key in [
            "etag",
            "lastModified",
            "contentType",
            "contentEncoding",
            "contentLength",
            "lastAccessUnixSec",
        ] {
            assert!(json.contains(&format!("\"{}\"", key)), "missing {}", key);
        }
    }

    #[test]
    fn test_invalid_json_yields_default() {
        assert_eq!(CacheMeta::from_json("{not json"), CacheMeta::default());
        assert_eq!(CacheMeta::from_json(""), CacheMeta::default());
    }

    #[test]
    fn test_non_object_yields_default() {
        assert_eq!(CacheMeta::from_json("[1, 2, 3]"), CacheMeta::default());
        assert_eq!(CacheMeta::from_json("\"etag\""), CacheMeta::default());
    }

    #[test]
    fn test_wrong_types_are_treated_as_absent() {
        let json = r#"{
            "etag": 42,
            "lastModified": "Tue, 01 Jan 2030 00:00:00 GMT",
            "contentType": null,
            "contentLength": -5,
            "lastAccessUnixSec": "yesterday"
        }"#;
        let meta = CacheMeta::from_json(json);

        assert_eq!(meta.etag, None);
        assert_eq!(
            meta.last_modified.as_deref(),
            Some("Tue, 01 Jan 2030 00:00:00 GMT")
        );
        assert_eq!(meta.content_type, None);
        assert_eq!(meta.content_length, 0);
        assert_eq!(meta.last_access_unix_sec, 0);
    }

    #[test]
    fn test_explicit_null_content_encoding() {
        let meta = CacheMeta::from_json(r#"{"contentEncoding": null, "contentLength": 7}"#);
        assert_eq!(meta.content_encoding, None);
        assert_eq!(meta.content_length, 7);
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let meta = CacheMeta::from_json(r#"{"etag": "\"x\"", "expires": "never", "n": 1}"#);
        assert_eq!(meta.etag.as_deref(), Some("\"x\""));
    }

    #[test]
    fn test_has_validators() {
        assert!(!CacheMeta::default().has_validators());
        assert!(populated().has_validators());
    }

    proptest! {
        #[test]
        fn prop_roundtrip(
            etag in proptest::option::of(".*"),
            last_modified in proptest::option::of(".*"),
            content_type in proptest::option::of(".*"),
            content_encoding in proptest::option::of(".*"),
            content_length in any::<u64>(),
            last_access_unix_sec in any::<u64>(),
        ) {
            let meta = CacheMeta {
                etag,
                last_modified,
                content_type,
                content_encoding,
                content_length,
                last_access_unix_sec,
            };
            prop_assert_eq!(CacheMeta::from_json(&meta.to_json()), meta);
        }
    }
}
