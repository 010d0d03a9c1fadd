use aws_sdk_s3::{operation::get_object::GetObjectOutput, primitives::DateTime};
use bytes::Bytes;
use serde::{de::DeserializeOwned, Serialize};
use time::OffsetDateTime;

use crate::error::{Error, Result};

use super::mime::MimeType;

/// A fetched object with its full content.
#[derive(Clone, Debug, PartialEq)]
pub struct Object {
    pub key: String,
    pub url: String,
    pub mime_type: Option<String>,
    pub content: Bytes,
    pub size: u64,
    pub version_id: Option<String>,
    pub last_modified: Option<OffsetDateTime>,
}

/// A listing entry. Carries no content.
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectSummary {
    pub key: String,
    pub url: String,
    pub size: u64,
    pub last_modified: Option<OffsetDateTime>,
}

/// Payload of an upload, converted to bytes right before it is sent.
#[derive(Clone, Debug, PartialEq)]
pub enum Content {
    Bytes(Bytes),
    Text(String),
    Json(serde_json::Value),
}

impl Content {
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        serde_json::to_value(value)
            .map(Content::Json)
            .map_err(|err| Error::Encode(err.to_string()))
    }

    pub fn to_bytes(&self) -> Result<Bytes> {
        match self {
            Content::Bytes(bytes) => Ok(bytes.clone()),
            Content::Text(text) => Ok(Bytes::from(text.clone())),
            Content::Json(value) => serde_json::to_vec(value)
                .map(Bytes::from)
                .map_err(|err| Error::Encode(err.to_string())),
        }
    }
}

impl From<Bytes> for Content {
    fn from(bytes: Bytes) -> Self {
        Content::Bytes(bytes)
    }
}

impl From<Vec<u8>> for Content {
    fn from(bytes: Vec<u8>) -> Self {
        Content::Bytes(Bytes::from(bytes))
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Content::Text(text)
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Content::Text(text.to_string())
    }
}

impl From<serde_json::Value> for Content {
    fn from(value: serde_json::Value) -> Self {
        Content::Json(value)
    }
}

impl Object {
    /// Decodes the content into `T`.
    ///
    /// Content is read as JSON. For textual mime types that are not valid
    /// JSON the raw text is offered to `T` as a JSON string, so a `String`
    /// destination receives the text unchanged.
    pub fn parse_content<T: DeserializeOwned>(&self) -> Result<T> {
        if self.content.is_empty() {
            return Err(Error::EmptyContent(self.key.clone()));
        }

        let err = match serde_json::from_slice(&self.content) {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        let is_text = self.mime().map(|mime| mime.is_text()).unwrap_or(false);
        match std::str::from_utf8(&self.content) {
            Ok(text) if is_text => {
                serde_json::from_value(serde_json::Value::String(text.to_string())).map_err(
                    |source| Error::Decode {
                        key: self.key.clone(),
                        source,
                    },
                )
            }
            _ => Err(Error::Decode {
                key: self.key.clone(),
                source: err,
            }),
        }
    }

    pub fn text(&self) -> Result<&str> {
        std::str::from_utf8(&self.content)
            .map_err(|err| Error::Encode(format!("content of {} is not utf-8: {}", self.key, err)))
    }

    pub fn mime(&self) -> Option<MimeType> {
        self.mime_type.as_deref().and_then(|mime| mime.parse().ok())
    }

    pub fn from_s3(output: &GetObjectOutput, key: &str, url: String, content: Bytes) -> Self {
        let size = output
            .content_length()
            .map(non_negative)
            .unwrap_or(content.len() as u64);

        Object {
            key: key.to_string(),
            url,
            mime_type: output.content_type().map(str::to_string),
            content,
            size,
            version_id: output.version_id().map(str::to_string),
            last_modified: output.last_modified().and_then(s3_datetime),
        }
    }

    pub fn from_gcs(
        object: &google_cloud_storage::http::objects::Object,
        url: String,
        content: Bytes,
    ) -> Self {
        Object {
            key: object.name.clone(),
            url,
            mime_type: object.content_type.clone(),
            content,
            size: non_negative(object.size),
            version_id: (object.generation != 0).then(|| object.generation.to_string()),
            last_modified: resolve_last_modified(
                object.time_created,
                object.updated,
                object.time_deleted,
            ),
        }
    }
}

impl ObjectSummary {
    pub fn from_s3(object: &aws_sdk_s3::types::Object, url: String) -> Self {
        ObjectSummary {
            key: object.key().unwrap_or("").to_string(),
            url,
            size: object.size().map(non_negative).unwrap_or(0),
            last_modified: object.last_modified().and_then(s3_datetime),
        }
    }

    pub fn from_gcs(object: &google_cloud_storage::http::objects::Object, url: String) -> Self {
        ObjectSummary {
            key: object.name.clone(),
            url,
            size: non_negative(object.size),
            last_modified: resolve_last_modified(
                object.time_created,
                object.updated,
                object.time_deleted,
            ),
        }
    }
}

/// Last-modified time of a GCS object: the latest of its creation, update
/// and soft-delete times. Absent values and the Unix epoch count as unset,
/// since attribute reads do not always populate `updated`.
pub fn resolve_last_modified(
    created: Option<OffsetDateTime>,
    updated: Option<OffsetDateTime>,
    deleted: Option<OffsetDateTime>,
) -> Option<OffsetDateTime> {
    [created, updated, deleted]
        .into_iter()
        .flatten()
        .filter(|ts| *ts != OffsetDateTime::UNIX_EPOCH)
        .max()
}

fn s3_datetime(dt: &DateTime) -> Option<OffsetDateTime> {
    let secs = OffsetDateTime::from_unix_timestamp(dt.secs()).ok()?;
    Some(secs + time::Duration::nanoseconds(dt.subsec_nanos() as i64))
}

fn non_negative(size: i64) -> u64 {
    size.max(0) as u64
}
