use async_trait::async_trait;
use tracing::debug;

use crate::{
    adapters::Adapter,
    client::s3::S3Api,
    error::{Error, Result},
    model::{
        io::{CreateBucketInput, DeleteObjectInput, PutObjectInput},
        object::{Object, ObjectSummary},
        options::ListOptions,
    },
    util::backend::StorageBackend,
};

pub struct S3Adapter {
    client: Box<dyn S3Api>,
    region: String,
}

impl S3Adapter {
    pub fn new(client: impl S3Api + 'static, region: impl Into<String>) -> Self {
        Self {
            client: Box::new(client),
            region: region.into(),
        }
    }
}

#[async_trait]
impl Adapter for S3Adapter {
    fn backend(&self) -> StorageBackend {
        StorageBackend::S3
    }

    async fn create_bucket(&self, input: &CreateBucketInput) -> Result<()> {
        let region = if input.location.is_empty() {
            self.region.as_str()
        } else {
            input.location.as_str()
        };

        debug!(bucket = %input.bucket, region, "create_bucket");
        self.client.create_bucket(&input.bucket, region).await
    }

    async fn put_object(&self, input: &PutObjectInput) -> Result<()> {
        let body = input.content.to_bytes()?;

        debug!(
            bucket = %input.bucket,
            key = %input.key,
            size = body.len(),
            "put_object"
        );
        self.client
            .put_object(&input.bucket, &input.key, input.mime_type.as_str(), body)
            .await
    }

    async fn get_object_by_key(&self, bucket: &str, key: &str) -> Result<Object> {
        debug!(bucket, key, "get_object_by_key");

        let mut output = self.client.get_object(bucket, key).await?;
        let body = std::mem::take(&mut output.body);
        let content = body
            .collect()
            .await
            .map_err(|err| Error::backend("collect body", format!("{}/{}", bucket, key), err))?
            .into_bytes();

        Ok(Object::from_s3(
            &output,
            key,
            self.object_url(bucket, key),
            content,
        ))
    }

    fn object_url(&self, bucket: &str, key: &str) -> String {
        format!("https://{}.amazonaws.com/{}/{}", self.region, bucket, key)
    }

    async fn list_objects(&self, bucket: &str, options: &ListOptions) -> Result<Vec<ObjectSummary>> {
        let mut objects = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let lo = self
                .client
                .list_objects_v2(
                    bucket,
                    options.prefix_str(),
                    options.delimiter_str(),
                    continuation_token,
                )
                .await?;

            for o in lo.contents() {
                let key = o.key().unwrap_or("");
                objects.push(ObjectSummary::from_s3(o, self.object_url(bucket, key)));
            }

            continuation_token = lo.next_continuation_token().map(|tok| tok.to_string());
            if continuation_token.is_none() {
                break;
            }
        }

        debug!(bucket, count = objects.len(), "list_objects");
        Ok(objects)
    }

    async fn delete_object(&self, input: &DeleteObjectInput) -> Result<()> {
        debug!(bucket = %input.bucket, key = %input.key, "delete_object");

        // S3 reports success for missing keys.
        self.client.head_object(&input.bucket, &input.key).await?;
        self.client.delete_object(&input.bucket, &input.key).await
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<()> {
        debug!(bucket, "delete_bucket");
        self.client.delete_bucket(bucket).await
    }

    async fn disconnect(&self) -> Result<()> {
        Ok(())
    }
}
