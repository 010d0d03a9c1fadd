use tracing::{error, info, warn};

use crate::{
    adapters::{Adapter, GcsAdapter, S3Adapter},
    client::{gcs, GcsApi, S3Api},
    config::{self, GcsOptions},
    context::Context,
    error::{Error, Result},
    model::{
        io::{
            CreateBucketInput, DeleteBucketOutput, DeleteObjectInput, DeleteObjectOutput,
            DeletePrefixInput, DeletePrefixOutput, PutObjectInput, PutObjectOutput,
        },
        object::{Object, ObjectSummary},
        options::ListOptions,
    },
    util::backend::StorageBackend,
};

enum Binding {
    S3(S3Adapter),
    Gcs(GcsAdapter),
}

impl Binding {
    fn adapter(&self) -> &dyn Adapter {
        match self {
            Binding::S3(adapter) => adapter,
            Binding::Gcs(adapter) => adapter,
        }
    }
}

#[derive(Default)]
enum State {
    #[default]
    Unbound,
    Bound(Binding),
    Disconnected(StorageBackend),
}

/// Single entry point over S3 and Google Cloud Storage.
///
/// A `Storage` is bound to one backend when it is built and stays bound to
/// it. `Storage::default()` is bound to nothing and fails every call with
/// [`Error::NoBackendSelected`]. After [`Storage::disconnect`] every call
/// fails with [`Error::Disconnected`].
///
/// Batch methods (`put_objects`, `delete_objects`, ...) attempt every item
/// in order and report one outcome per item; they never fail as a whole.
#[derive(Default)]
pub struct Storage {
    state: State,
}

impl Storage {
    /// Binds to S3 using an already resolved AWS configuration. No request is
    /// made.
    pub fn from_s3_config(config: &aws_config::SdkConfig) -> Self {
        let client = aws_sdk_s3::Client::new(config);
        Self::with_s3_client(client, config::s3_region(config))
    }

    /// Connects to Google Cloud Storage, resolving credentials up front.
    pub async fn connect_gcs(options: &GcsOptions) -> Result<Self> {
        let client = gcs::connect(options).await?;
        Ok(Self::with_gcs_client(client, options.default_location.as_str()))
    }

    pub fn with_s3_client(client: impl S3Api + 'static, region: impl Into<String>) -> Self {
        Self {
            state: State::Bound(Binding::S3(S3Adapter::new(client, region))),
        }
    }

    pub fn with_gcs_client(
        client: impl GcsApi + 'static,
        default_location: impl Into<String>,
    ) -> Self {
        Self {
            state: State::Bound(Binding::Gcs(GcsAdapter::new(client, default_location))),
        }
    }

    pub fn backend(&self) -> Option<StorageBackend> {
        match &self.state {
            State::Unbound => None,
            State::Bound(binding) => Some(binding.adapter().backend()),
            State::Disconnected(backend) => Some(*backend),
        }
    }

    fn adapter(&self) -> Result<&dyn Adapter> {
        match &self.state {
            State::Bound(binding) => Ok(binding.adapter()),
            State::Unbound => Err(Error::NoBackendSelected),
            State::Disconnected(_) => Err(Error::Disconnected),
        }
    }

    pub async fn create_bucket(&self, ctx: &Context, input: &CreateBucketInput) -> Result<()> {
        let adapter = self.adapter()?;
        ctx.run(adapter.create_bucket(input))
            .await
            .inspect_err(|err| log_error(err, "create_bucket"))
    }

    pub async fn put_object(&self, ctx: &Context, input: &PutObjectInput) -> Result<()> {
        let adapter = self.adapter()?;
        ctx.run(adapter.put_object(input))
            .await
            .inspect_err(|err| log_error(err, "put_object"))
    }

    /// Puts every input in order. Items left when `ctx` fires are not
    /// attempted and carry the cancellation error.
    pub async fn put_objects(
        &self,
        ctx: &Context,
        inputs: impl IntoIterator<Item = PutObjectInput>,
    ) -> Vec<PutObjectOutput> {
        let mut outputs = Vec::new();
        for input in inputs {
            let result = match ctx.err() {
                Some(err) => Err(err),
                None => self.put_object(ctx, &input).await,
            };
            outputs.push(PutObjectOutput {
                bucket: input.bucket,
                key: input.key,
                result,
            });
        }
        outputs
    }

    pub async fn get_object_by_key(&self, ctx: &Context, bucket: &str, key: &str) -> Result<Object> {
        let adapter = self.adapter()?;
        ctx.run(adapter.get_object_by_key(bucket, key))
            .await
            .inspect_err(|err| log_error(err, "get_object_by_key"))
    }

    /// Public URL of an object on the bound backend. Makes no request.
    pub fn get_object_url(&self, bucket: &str, key: &str) -> Result<String> {
        Ok(self.adapter()?.object_url(bucket, key))
    }

    /// Lists every object in `bucket` matching the merged `opts`.
    pub async fn list_objects(
        &self,
        ctx: &Context,
        bucket: &str,
        opts: &[ListOptions],
    ) -> Result<Vec<ObjectSummary>> {
        let adapter = self.adapter()?;
        let options = ListOptions::merge(opts);
        ctx.run(adapter.list_objects(bucket, &options))
            .await
            .inspect_err(|err| log_error(err, "list_objects"))
    }

    pub async fn delete_object(&self, ctx: &Context, input: &DeleteObjectInput) -> Result<()> {
        let adapter = self.adapter()?;
        ctx.run(adapter.delete_object(input))
            .await
            .inspect_err(|err| log_error(err, "delete_object"))
    }

    pub async fn delete_objects(
        &self,
        ctx: &Context,
        inputs: impl IntoIterator<Item = DeleteObjectInput>,
    ) -> Vec<DeleteObjectOutput> {
        let mut outputs = Vec::new();
        for input in inputs {
            let result = match ctx.err() {
                Some(err) => Err(err),
                None => self.delete_object(ctx, &input).await,
            };
            outputs.push(DeleteObjectOutput {
                bucket: input.bucket,
                key: input.key,
                result,
            });
        }
        outputs
    }

    /// Deletes all objects under a prefix, stopping at the first failed
    /// delete. A prefix with no objects is [`Error::PrefixNotFound`].
    pub async fn delete_objects_by_prefix(
        &self,
        ctx: &Context,
        input: &DeletePrefixInput,
    ) -> Result<()> {
        let adapter = self.adapter()?;
        ctx.run(adapter.delete_objects_by_prefix(input))
            .await
            .inspect_err(|err| log_error(err, "delete_objects_by_prefix"))
    }

    /// Runs [`Storage::delete_objects_by_prefix`] for every prefix. A failed
    /// prefix does not stop the ones after it.
    pub async fn delete_objects_by_prefixes(
        &self,
        ctx: &Context,
        inputs: impl IntoIterator<Item = DeletePrefixInput>,
    ) -> Vec<DeletePrefixOutput> {
        let mut outputs = Vec::new();
        for input in inputs {
            let result = match ctx.err() {
                Some(err) => Err(err),
                None => self.delete_objects_by_prefix(ctx, &input).await,
            };
            outputs.push(DeletePrefixOutput {
                bucket: input.bucket,
                prefix: input.prefix,
                result,
            });
        }
        outputs
    }

    pub async fn delete_bucket(&self, ctx: &Context, bucket: &str) -> Result<()> {
        let adapter = self.adapter()?;
        ctx.run(adapter.delete_bucket(bucket))
            .await
            .inspect_err(|err| log_error(err, "delete_bucket"))
    }

    pub async fn delete_buckets<I, S>(&self, ctx: &Context, buckets: I) -> Vec<DeleteBucketOutput>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut outputs = Vec::new();
        for bucket in buckets {
            let bucket = bucket.into();
            let result = match ctx.err() {
                Some(err) => Err(err),
                None => self.delete_bucket(ctx, &bucket).await,
            };
            outputs.push(DeleteBucketOutput { bucket, result });
        }
        outputs
    }

    /// Releases the backend client. The storage is unusable afterwards, even
    /// if releasing failed. Disconnecting twice is a no-op.
    pub async fn disconnect(&mut self) -> Result<()> {
        let adapter = match &self.state {
            State::Unbound => return Err(Error::NoBackendSelected),
            State::Disconnected(_) => return Ok(()),
            State::Bound(binding) => binding.adapter(),
        };

        let backend = adapter.backend();
        let res = adapter.disconnect().await;
        self.state = State::Disconnected(backend);
        res
    }

    /// [`Storage::disconnect`] for cleanup paths that cannot handle an error:
    /// failures are logged and dropped.
    pub async fn simple_disconnect(&mut self) {
        let backend = self.backend();
        match self.disconnect().await {
            Ok(()) => info!(backend = ?backend, "storage disconnected"),
            Err(err) => warn!(
                backend = ?backend,
                error_message = %err,
                error_group = "disconnect",
                "failed to disconnect storage"
            ),
        }
    }
}

fn log_error(err: &Error, group: &'static str) {
    error!(error_message = %err, error_group = group);
}
