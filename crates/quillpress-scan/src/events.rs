//! S3 upload-event parsing
//!
//! The notification transport delivers S3 event JSON. Object keys arrive
//! URL-encoded with `+` standing in for spaces, so decoding replaces `+`
//! first and then percent-decodes.

use percent_encoding::percent_decode_str;
use quillpress_core::models::UploadNotification;
use quillpress_core::AppError;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct S3Event {
    #[serde(rename = "Records", default)]
    pub records: Vec<S3EventRecord>,
}

#[derive(Debug, Deserialize)]
pub struct S3EventRecord {
    pub s3: S3Entity,
}

#[derive(Debug, Deserialize)]
pub struct S3Entity {
    pub bucket: S3BucketEntity,
    pub object: S3ObjectEntity,
}

#[derive(Debug, Deserialize)]
pub struct S3BucketEntity {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct S3ObjectEntity {
    pub key: String,
}

/// Decode an S3 event object key: `+` means space, then percent-decoding.
pub fn decode_object_key(raw: &str) -> String {
    let plus_decoded = raw.replace('+', " ");
    percent_decode_str(&plus_decoded)
        .decode_utf8_lossy()
        .into_owned()
}

/// Parse an S3 event body into upload notifications, decoding keys.
pub fn parse_s3_event(body: &str) -> Result<Vec<UploadNotification>, AppError> {
    let event: S3Event = serde_json::from_str(body)?;
    Ok(event
        .records
        .into_iter()
        .map(|record| UploadNotification {
            bucket: record.s3.bucket.name,
            key: decode_object_key(&record.s3.object.key),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_plus_and_percent_sequences() {
        assert_eq!(
            decode_object_key("media/user-1/my+photo+%281%29.png"),
            "media/user-1/my photo (1).png"
        );
        assert_eq!(decode_object_key("media/user-1/plain.png"), "media/user-1/plain.png");
    }

    #[test]
    fn parses_s3_event_records() {
        let body = r#"{
            "Records": [
                {
                    "eventName": "ObjectCreated:Put",
                    "s3": {
                        "bucket": { "name": "quillpress-media" },
                        "object": { "key": "media/user-42/evil.exe", "size": 4096 }
                    }
                },
                {
                    "s3": {
                        "bucket": { "name": "quillpress-media" },
                        "object": { "key": "media/user-7/summer+trip.jpg" }
                    }
                }
            ]
        }"#;

        let notifications = parse_s3_event(body).unwrap();
        assert_eq!(notifications.len(), 2);
        assert_eq!(notifications[0].bucket, "quillpress-media");
        assert_eq!(notifications[0].key, "media/user-42/evil.exe");
        assert_eq!(notifications[1].key, "media/user-7/summer trip.jpg");
    }

    #[test]
    fn empty_or_missing_records_is_empty_batch() {
        assert!(parse_s3_event(r#"{"Records": []}"#).unwrap().is_empty());
        assert!(parse_s3_event(r#"{}"#).unwrap().is_empty());
    }

    #[test]
    fn malformed_body_is_invalid_input() {
        let err = parse_s3_event("not json").unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }
}
