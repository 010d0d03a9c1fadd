use std::fmt;

use crate::error::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageBackend {
    S3,
    Gcs,
}

impl StorageBackend {
    pub fn scheme(&self) -> &'static str {
        match self {
            StorageBackend::S3 => "s3",
            StorageBackend::Gcs => "gs",
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::S3 => f.write_str("s3"),
            StorageBackend::Gcs => f.write_str("gcs"),
        }
    }
}

pub fn parse_backend_from_uri(bucket_uri: &str) -> Result<StorageBackend, Error> {
    if bucket_uri.starts_with("s3://") {
        Ok(StorageBackend::S3)
    } else if bucket_uri.starts_with("gs://") {
        Ok(StorageBackend::Gcs)
    } else {
        Err(Error::InvalidUri(bucket_uri.to_string()))
    }
}

pub fn parse_bucket_from_uri(bucket_uri: &str) -> &str {
    bucket_uri
        .split_once("://")
        .map(|(_, rest)| rest.trim_end_matches('/'))
        .unwrap_or("")
}
