use async_trait::async_trait;
use aws_sdk_s3::{
    error::{ProvideErrorMetadata, SdkError},
    operation::{get_object::GetObjectOutput, list_objects_v2::ListObjectsV2Output},
    primitives::ByteStream,
    types::{BucketLocationConstraint, CreateBucketConfiguration},
};
use bytes::Bytes;

use crate::error::{Error, Result};

/// Region S3 treats as the default; it must not be sent as a location
/// constraint.
pub const DEFAULT_REGION: &str = "us-east-1";

/// The slice of the S3 API the adapter needs. Implementations classify
/// missing buckets and keys as [`Error::NotFound`].
#[async_trait]
pub trait S3Api: Send + Sync {
    async fn create_bucket(&self, bucket: &str, region: &str) -> Result<()>;

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        content_type: &str,
        body: Bytes,
    ) -> Result<()>;

    async fn get_object(&self, bucket: &str, key: &str) -> Result<GetObjectOutput>;

    async fn head_object(&self, bucket: &str, key: &str) -> Result<()>;

    async fn list_objects_v2(
        &self,
        bucket: &str,
        prefix: Option<&str>,
        delimiter: Option<&str>,
        continuation_token: Option<String>,
    ) -> Result<ListObjectsV2Output>;

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<()>;

    async fn delete_bucket(&self, bucket: &str) -> Result<()>;
}

#[async_trait]
impl S3Api for aws_sdk_s3::Client {
    async fn create_bucket(&self, bucket: &str, region: &str) -> Result<()> {
        let mut req = self.create_bucket().bucket(bucket);

        if region != DEFAULT_REGION {
            req = req.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(region))
                    .build(),
            );
        }

        req.send()
            .await
            .map_err(|err| sdk_error("create_bucket", bucket, err))?;

        Ok(())
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        content_type: &str,
        body: Bytes,
    ) -> Result<()> {
        self.put_object()
            .bucket(bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|err| sdk_error("put_object", target(bucket, key), err))?;

        Ok(())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<GetObjectOutput> {
        self.get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| sdk_error("get_object", target(bucket, key), err))
    }

    async fn head_object(&self, bucket: &str, key: &str) -> Result<()> {
        match self.head_object().bucket(bucket).key(key).send().await {
            Ok(_) => Ok(()),
            Err(err) => {
                if let Some(svc_err) = err.as_service_error() {
                    if svc_err.is_not_found() {
                        return Err(Error::NotFound(target(bucket, key)));
                    }
                }

                Err(sdk_error("head_object", target(bucket, key), err))
            }
        }
    }

    async fn list_objects_v2(
        &self,
        bucket: &str,
        prefix: Option<&str>,
        delimiter: Option<&str>,
        continuation_token: Option<String>,
    ) -> Result<ListObjectsV2Output> {
        self.list_objects_v2()
            .bucket(bucket)
            .set_prefix(prefix.map(str::to_string))
            .set_delimiter(delimiter.map(str::to_string))
            .set_continuation_token(continuation_token)
            .send()
            .await
            .map_err(|err| sdk_error("list_objects", bucket, err))
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<()> {
        self.delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| sdk_error("delete_object", target(bucket, key), err))?;

        Ok(())
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<()> {
        self.delete_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(|err| sdk_error("delete_bucket", bucket, err))?;

        Ok(())
    }
}

fn target(bucket: &str, key: &str) -> String {
    format!("{}/{}", bucket, key)
}

fn sdk_error<E, R>(operation: &'static str, target: impl Into<String>, err: SdkError<E, R>) -> Error
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let target = target.into();
    match err.code() {
        Some("NoSuchKey") | Some("NoSuchBucket") | Some("NotFound") => Error::NotFound(target),
        _ => {
            let message = match err.message() {
                Some(message) => format!("{}: {}", err, message),
                None => err.to_string(),
            };
            Error::Backend {
                operation,
                target,
                message,
            }
        }
    }
}
