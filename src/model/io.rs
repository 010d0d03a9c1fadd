use crate::error::{Error, Result};

use super::{mime::MimeType, object::Content};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CreateBucketInput {
    pub bucket: String,
    /// Required by GCS only.
    pub project_id: String,
    /// Empty means the adapter's default location.
    pub location: String,
}

impl CreateBucketInput {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            ..Default::default()
        }
    }

    pub fn project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = project_id.into();
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PutObjectInput {
    pub bucket: String,
    pub key: String,
    pub mime_type: MimeType,
    pub content: Content,
}

impl PutObjectInput {
    pub fn new(
        bucket: impl Into<String>,
        key: impl Into<String>,
        mime_type: MimeType,
        content: impl Into<Content>,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            mime_type,
            content: content.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeleteObjectInput {
    pub bucket: String,
    pub key: String,
}

impl DeleteObjectInput {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeletePrefixInput {
    pub bucket: String,
    pub prefix: String,
}

impl DeletePrefixInput {
    pub fn new(bucket: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            prefix: prefix.into(),
        }
    }
}

/// Outcome of one item of [`crate::Storage::put_objects`].
#[derive(Debug)]
pub struct PutObjectOutput {
    pub bucket: String,
    pub key: String,
    pub result: Result<()>,
}

/// Outcome of one item of [`crate::Storage::delete_objects`].
#[derive(Debug)]
pub struct DeleteObjectOutput {
    pub bucket: String,
    pub key: String,
    pub result: Result<()>,
}

/// Outcome of one item of [`crate::Storage::delete_objects_by_prefixes`].
#[derive(Debug)]
pub struct DeletePrefixOutput {
    pub bucket: String,
    pub prefix: String,
    pub result: Result<()>,
}

/// Outcome of one item of [`crate::Storage::delete_buckets`].
#[derive(Debug)]
pub struct DeleteBucketOutput {
    pub bucket: String,
    pub result: Result<()>,
}

macro_rules! impl_outcome {
    ($($ty:ty),+) => {
        $(
            impl $ty {
                pub fn is_ok(&self) -> bool {
                    self.result.is_ok()
                }

                pub fn error(&self) -> Option<&Error> {
                    self.result.as_ref().err()
                }
            }
        )+
    };
}

impl_outcome!(
    PutObjectOutput,
    DeleteObjectOutput,
    DeletePrefixOutput,
    DeleteBucketOutput
);
