use async_trait::async_trait;
use bytes::Bytes;
use google_cloud_storage::{
    client::{google_cloud_auth::credentials::CredentialsFile, Client, ClientConfig},
    http::{
        buckets::{
            delete::DeleteBucketRequest,
            insert::{BucketCreationConfig, InsertBucketParam, InsertBucketRequest},
        },
        objects::{
            delete::DeleteObjectRequest,
            download::Range,
            get::GetObjectRequest,
            list::{ListObjectsRequest, ListObjectsResponse},
            upload::{Media, UploadObjectRequest, UploadType},
            Object,
        },
    },
};
use tracing::info;

use crate::{
    config::GcsOptions,
    error::{Error, Result},
    util::backend::StorageBackend,
};

/// The slice of the Cloud Storage JSON API the adapter needs.
/// Implementations classify HTTP 404 responses as [`Error::NotFound`].
#[async_trait]
pub trait GcsApi: Send + Sync {
    async fn insert_bucket(&self, project: &str, bucket: &str, location: &str) -> Result<()>;

    async fn upload_object(
        &self,
        bucket: &str,
        key: &str,
        content_type: &str,
        body: Bytes,
    ) -> Result<()>;

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Object>;

    async fn download_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>>;

    async fn list_objects(
        &self,
        bucket: &str,
        prefix: Option<&str>,
        delimiter: Option<&str>,
        page_token: Option<String>,
    ) -> Result<ListObjectsResponse>;

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<()>;

    async fn delete_bucket(&self, bucket: &str) -> Result<()>;

    /// Releases the client. The HTTP client holds no resources that need
    /// explicit release, so this is a no-op by default.
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// Builds an authenticated client, from the credentials file in `options`
/// when set and from application default credentials otherwise.
pub async fn connect(options: &GcsOptions) -> Result<Client> {
    let config = match &options.credentials_file {
        Some(path) => {
            let path = path.to_string_lossy();
            let credentials = CredentialsFile::new_from_file(path.to_string())
                .await
                .map_err(connection_error)?;
            ClientConfig::default()
                .with_credentials(credentials)
                .await
                .map_err(connection_error)?
        }
        None => ClientConfig::default()
            .with_auth()
            .await
            .map_err(connection_error)?,
    };

    info!(
        credentials_file = ?options.credentials_file,
        "connected to google cloud storage"
    );

    Ok(Client::new(config))
}

// `Client` reaches the SDK calls through `Deref<Target = StorageClient>`, and
// the trait methods share their names, so every call goes through `**self`.
#[async_trait]
impl GcsApi for Client {
    async fn insert_bucket(&self, project: &str, bucket: &str, location: &str) -> Result<()> {
        let req = InsertBucketRequest {
            name: bucket.to_string(),
            param: InsertBucketParam {
                project: project.to_string(),
                ..Default::default()
            },
            bucket: BucketCreationConfig {
                location: location.to_string(),
                ..Default::default()
            },
        };

        (**self).insert_bucket(&req)
            .await
            .map_err(|err| gcs_error("create_bucket", bucket.to_string(), err))?;

        Ok(())
    }

    async fn upload_object(
        &self,
        bucket: &str,
        key: &str,
        content_type: &str,
        body: Bytes,
    ) -> Result<()> {
        let req = UploadObjectRequest {
            bucket: bucket.to_string(),
            ..Default::default()
        };

        let mut media = Media::new(key.to_string());
        media.content_type = content_type.to_string().into();
        media.content_length = Some(body.len() as u64);

        (**self).upload_object(&req, body, &UploadType::Simple(media))
            .await
            .map_err(|err| gcs_error("put_object", target(bucket, key), err))?;

        Ok(())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Object> {
        (**self).get_object(&object_request(bucket, key))
            .await
            .map_err(|err| gcs_error("get_object", target(bucket, key), err))
    }

    async fn download_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        (**self).download_object(&object_request(bucket, key), &Range::default())
            .await
            .map_err(|err| gcs_error("download_object", target(bucket, key), err))
    }

    async fn list_objects(
        &self,
        bucket: &str,
        prefix: Option<&str>,
        delimiter: Option<&str>,
        page_token: Option<String>,
    ) -> Result<ListObjectsResponse> {
        let req = ListObjectsRequest {
            bucket: bucket.to_string(),
            prefix: prefix.map(str::to_string),
            delimiter: delimiter.map(str::to_string),
            page_token,
            ..Default::default()
        };

        (**self).list_objects(&req)
            .await
            .map_err(|err| gcs_error("list_objects", bucket.to_string(), err))
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<()> {
        let req = DeleteObjectRequest {
            bucket: bucket.to_string(),
            object: key.to_string(),
            ..Default::default()
        };

        (**self).delete_object(&req)
            .await
            .map_err(|err| gcs_error("delete_object", target(bucket, key), err))
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<()> {
        let req = DeleteBucketRequest {
            bucket: bucket.to_string(),
            ..Default::default()
        };

        (**self).delete_bucket(&req)
            .await
            .map_err(|err| gcs_error("delete_bucket", bucket.to_string(), err))
    }
}

fn object_request(bucket: &str, key: &str) -> GetObjectRequest {
    GetObjectRequest {
        bucket: bucket.to_string(),
        object: key.to_string(),
        ..Default::default()
    }
}

fn target(bucket: &str, key: &str) -> String {
    format!("{}/{}", bucket, key)
}

fn gcs_error(
    operation: &'static str,
    target: String,
    err: google_cloud_storage::http::Error,
) -> Error {
    match err {
        google_cloud_storage::http::Error::Response(err) if err.code == 404 => {
            Error::NotFound(target)
        }
        err => Error::backend(operation, target, err),
    }
}

fn connection_error(err: impl ToString) -> Error {
    Error::Connection {
        backend: StorageBackend::Gcs,
        message: err.to_string(),
    }
}
