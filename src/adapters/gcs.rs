use async_trait::async_trait;
use bytes::Bytes;
use tracing::{debug, info};

use crate::{
    adapters::Adapter,
    client::gcs::GcsApi,
    config::DEFAULT_GCS_LOCATION,
    error::Result,
    model::{
        io::{CreateBucketInput, DeleteObjectInput, PutObjectInput},
        object::{Object, ObjectSummary},
        options::ListOptions,
    },
    util::backend::StorageBackend,
};

pub struct GcsAdapter {
    client: Box<dyn GcsApi>,
    default_location: String,
}

impl GcsAdapter {
    pub fn new(client: impl GcsApi + 'static, default_location: impl Into<String>) -> Self {
        let default_location = default_location.into();
        Self {
            client: Box::new(client),
            default_location: if default_location.is_empty() {
                DEFAULT_GCS_LOCATION.to_string()
            } else {
                default_location
            },
        }
    }
}

#[async_trait]
impl Adapter for GcsAdapter {
    fn backend(&self) -> StorageBackend {
        StorageBackend::Gcs
    }

    async fn create_bucket(&self, input: &CreateBucketInput) -> Result<()> {
        let location = if input.location.is_empty() {
            self.default_location.as_str()
        } else {
            input.location.as_str()
        };

        debug!(
            bucket = %input.bucket,
            project_id = %input.project_id,
            location,
            "create_bucket"
        );
        self.client
            .insert_bucket(&input.project_id, &input.bucket, location)
            .await
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
            .upload_object(&input.bucket, &input.key, input.mime_type.as_str(), body)
            .await
    }

    async fn get_object_by_key(&self, bucket: &str, key: &str) -> Result<Object> {
        debug!(bucket, key, "get_object_by_key");

        let attrs = self.client.get_object(bucket, key).await?;
        let content = self.client.download_object(bucket, key).await?;

        let mut obj = Object::from_gcs(&attrs, self.object_url(bucket, key), Bytes::from(content));
        if obj.key.is_empty() {
            obj.key = key.to_string();
        }
        Ok(obj)
    }

    fn object_url(&self, bucket: &str, key: &str) -> String {
        format!("https://storage.googleapis.com/{}/{}", bucket, key)
    }

    async fn list_objects(&self, bucket: &str, options: &ListOptions) -> Result<Vec<ObjectSummary>> {
        let mut objects = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let lo = self
                .client
                .list_objects(
                    bucket,
                    options.prefix_str(),
                    options.delimiter_str(),
                    page_token,
                )
                .await?;

            if let Some(items) = lo.items {
                for obj in items {
                    let url = self.object_url(bucket, &obj.name);
                    objects.push(ObjectSummary::from_gcs(&obj, url));
                }
            }

            page_token = lo.next_page_token;
            if page_token.is_none() {
                break;
            }
        }

        debug!(bucket, count = objects.len(), "list_objects");
        Ok(objects)
    }

    async fn delete_object(&self, input: &DeleteObjectInput) -> Result<()> {
        debug!(bucket = %input.bucket, key = %input.key, "delete_object");
        self.client.delete_object(&input.bucket, &input.key).await
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<()> {
        debug!(bucket, "delete_bucket");
        self.client.delete_bucket(bucket).await
    }

    async fn disconnect(&self) -> Result<()> {
        self.client.close().await?;
        info!("connection to google cloud storage closed");
        Ok(())
    }
}
