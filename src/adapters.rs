use async_trait::async_trait;
use tracing::debug;

use crate::{
    error::{Error, Result},
    model::{
        io::{CreateBucketInput, DeleteObjectInput, DeletePrefixInput, PutObjectInput},
        object::{Object, ObjectSummary},
        options::ListOptions,
    },
    util::backend::StorageBackend,
};

pub mod gcs;
#[cfg(test)]
pub mod mock;
pub mod s3;

pub use gcs::GcsAdapter;
pub use s3::S3Adapter;

/// Capability set every storage backend provides.
#[async_trait]
pub trait Adapter: Send + Sync {
    fn backend(&self) -> StorageBackend;

    async fn create_bucket(&self, input: &CreateBucketInput) -> Result<()>;

    /// Uploads the object, replacing any existing one with the same key.
    async fn put_object(&self, input: &PutObjectInput) -> Result<()>;

    async fn get_object_by_key(&self, bucket: &str, key: &str) -> Result<Object>;

    /// Public URL of an object. Pure formatting, no request is made.
    fn object_url(&self, bucket: &str, key: &str) -> String;

    /// Lists every object matching `options`, draining all pages.
    async fn list_objects(&self, bucket: &str, options: &ListOptions) -> Result<Vec<ObjectSummary>>;

    /// Fails with [`Error::NotFound`] when the object does not exist.
    async fn delete_object(&self, input: &DeleteObjectInput) -> Result<()>;

    /// Deletes every object under the prefix, one at a time, stopping at the
    /// first failure. Objects deleted before the failure stay deleted.
    async fn delete_objects_by_prefix(&self, input: &DeletePrefixInput) -> Result<()> {
        let options = ListOptions::new().prefix(input.prefix.as_str());
        let objects = self.list_objects(&input.bucket, &options).await?;

        if objects.is_empty() {
            return Err(Error::PrefixNotFound {
                bucket: input.bucket.clone(),
                prefix: input.prefix.clone(),
            });
        }

        debug!(
            bucket = %input.bucket,
            prefix = %input.prefix,
            count = objects.len(),
            "delete_objects_by_prefix"
        );

        for obj in objects {
            self.delete_object(&DeleteObjectInput::new(input.bucket.as_str(), obj.key))
                .await?;
        }

        Ok(())
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<()>;

    async fn disconnect(&self) -> Result<()>;
}
