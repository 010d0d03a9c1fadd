//! In-memory stand-ins for both SDK clients, with pagination, call counting
//! and failure injection.

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    sync::{Arc, Mutex, MutexGuard},
};

use async_trait::async_trait;
use aws_sdk_s3::{
    operation::{get_object::GetObjectOutput, list_objects_v2::ListObjectsV2Output},
    primitives::{ByteStream, DateTime},
};
use bytes::Bytes;
use google_cloud_storage::http::objects::{list::ListObjectsResponse, Object as GcsObject};
use time::OffsetDateTime;

use crate::{
    client::{gcs::GcsApi, s3::S3Api},
    error::{Error, Result},
};

const DEFAULT_PAGE_SIZE: usize = 1000;
const BASE_TIMESTAMP: i64 = 1_700_000_000;

#[derive(Clone, Debug)]
struct Stored {
    content_type: String,
    body: Bytes,
    created: i64,
    generation: i64,
}

#[derive(Debug, Default)]
struct Bucket {
    location: String,
    objects: BTreeMap<String, Stored>,
}

#[derive(Debug, Default)]
struct State {
    buckets: BTreeMap<String, Bucket>,
    calls: HashMap<&'static str, usize>,
    failing_keys: HashSet<String>,
    fail_close: bool,
    clock: i64,
}

/// Backing store shared by the S3 and GCS mocks.
#[derive(Clone, Debug)]
struct Memory {
    state: Arc<Mutex<State>>,
    page_size: usize,
}

impl Memory {
    fn new(page_size: usize) -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
            page_size,
        }
    }

    fn lock(&self, call: &'static str) -> MutexGuard<'_, State> {
        let mut state = self
            .state
            .lock()
            .expect("failed to acquire mock state guard");
        *state.calls.entry(call).or_insert(0) += 1;
        state
    }

    fn calls(&self, call: &str) -> usize {
        let state = self.state.lock().expect("failed to acquire mock state guard");
        state.calls.get(call).copied().unwrap_or(0)
    }

    fn total_calls(&self) -> usize {
        let state = self.state.lock().expect("failed to acquire mock state guard");
        state.calls.values().sum()
    }

    fn fail_on(&self, key: &str) {
        let mut state = self.state.lock().expect("failed to acquire mock state guard");
        state.failing_keys.insert(key.to_string());
    }

    fn bucket_location(&self, bucket: &str) -> Option<String> {
        let state = self.state.lock().expect("failed to acquire mock state guard");
        state.buckets.get(bucket).map(|b| b.location.clone())
    }

    fn create_bucket(&self, call: &'static str, bucket: &str, location: &str) -> Result<()> {
        let mut state = self.lock(call);
        if state.buckets.contains_key(bucket) {
            return Err(Error::backend(call, bucket, "BucketAlreadyOwnedByYou"));
        }
        state.buckets.insert(
            bucket.to_string(),
            Bucket {
                location: location.to_string(),
                ..Default::default()
            },
        );
        Ok(())
    }

    fn put(
        &self,
        call: &'static str,
        bucket: &str,
        key: &str,
        content_type: &str,
        body: Bytes,
    ) -> Result<()> {
        let mut state = self.lock(call);
        if state.failing_keys.contains(key) {
            return Err(Error::backend(call, target(bucket, key), "injected failure"));
        }

        state.clock += 1;
        let created = BASE_TIMESTAMP + state.clock;
        let bucket = state
            .buckets
            .get_mut(bucket)
            .ok_or_else(|| Error::NotFound(bucket.to_string()))?;
        let generation = bucket
            .objects
            .get(key)
            .map(|stored| stored.generation + 1)
            .unwrap_or(1);
        bucket.objects.insert(
            key.to_string(),
            Stored {
                content_type: content_type.to_string(),
                body,
                created,
                generation,
            },
        );
        Ok(())
    }

    fn get(&self, call: &'static str, bucket: &str, key: &str) -> Result<Stored> {
        let state = self.lock(call);
        state
            .buckets
            .get(bucket)
            .ok_or_else(|| Error::NotFound(bucket.to_string()))?
            .objects
            .get(key)
            .cloned()
            .ok_or_else(|| Error::NotFound(target(bucket, key)))
    }

    /// One page of keys after `token`, and the token of the next page.
    fn list(
        &self,
        call: &'static str,
        bucket: &str,
        prefix: Option<&str>,
        delimiter: Option<&str>,
        token: Option<String>,
    ) -> Result<(Vec<(String, Stored)>, Option<String>)> {
        let state = self.lock(call);
        let bucket = state
            .buckets
            .get(bucket)
            .ok_or_else(|| Error::NotFound(bucket.to_string()))?;
        let prefix = prefix.unwrap_or("");

        let mut matching = bucket
            .objects
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .filter(|(key, _)| match delimiter {
                Some(delimiter) => !key[prefix.len()..].contains(delimiter),
                None => true,
            })
            .filter(|(key, _)| token.as_ref().map_or(true, |token| key.as_str() > token.as_str()));

        let page: Vec<_> = matching
            .by_ref()
            .take(self.page_size)
            .map(|(key, stored)| (key.clone(), stored.clone()))
            .collect();
        let next = match matching.next() {
            Some(_) => page.last().map(|(key, _)| key.clone()),
            None => None,
        };
        Ok((page, next))
    }

    fn delete(&self, call: &'static str, bucket: &str, key: &str) -> Result<bool> {
        let mut state = self.lock(call);
        if state.failing_keys.contains(key) {
            return Err(Error::backend(call, target(bucket, key), "injected failure"));
        }
        let bucket = state
            .buckets
            .get_mut(bucket)
            .ok_or_else(|| Error::NotFound(bucket.to_string()))?;
        Ok(bucket.objects.remove(key).is_some())
    }

    fn delete_bucket(&self, call: &'static str, bucket: &str) -> Result<()> {
        let mut state = self.lock(call);
        let is_empty = match state.buckets.get(bucket) {
            None => return Err(Error::NotFound(bucket.to_string())),
            Some(b) => b.objects.is_empty(),
        };
        if !is_empty {
            return Err(Error::backend(call, bucket, "BucketNotEmpty"));
        }

        state.buckets.remove(bucket);
        Ok(())
    }
}

fn target(bucket: &str, key: &str) -> String {
    format!("{}/{}", bucket, key)
}

#[derive(Clone, Debug)]
pub struct MockS3Client {
    memory: Memory,
}

impl Default for MockS3Client {
    fn default() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }
}

impl MockS3Client {
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            memory: Memory::new(page_size),
        }
    }

    pub fn calls(&self, call: &str) -> usize {
        self.memory.calls(call)
    }

    pub fn total_calls(&self) -> usize {
        self.memory.total_calls()
    }

    pub fn fail_on(&self, key: &str) {
        self.memory.fail_on(key)
    }

    pub fn bucket_region(&self, bucket: &str) -> Option<String> {
        self.memory.bucket_location(bucket)
    }
}

#[async_trait]
impl S3Api for MockS3Client {
    async fn create_bucket(&self, bucket: &str, region: &str) -> Result<()> {
        self.memory.create_bucket("create_bucket", bucket, region)
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        content_type: &str,
        body: Bytes,
    ) -> Result<()> {
        self.memory.put("put_object", bucket, key, content_type, body)
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<GetObjectOutput> {
        let stored = self.memory.get("get_object", bucket, key)?;
        Ok(GetObjectOutput::builder()
            .content_type(stored.content_type)
            .content_length(stored.body.len() as i64)
            .version_id(stored.generation.to_string())
            .last_modified(DateTime::from_secs(stored.created))
            .body(ByteStream::from(stored.body))
            .build())
    }

    async fn head_object(&self, bucket: &str, key: &str) -> Result<()> {
        self.memory.get("head_object", bucket, key).map(|_| ())
    }

    async fn list_objects_v2(
        &self,
        bucket: &str,
        prefix: Option<&str>,
        delimiter: Option<&str>,
        continuation_token: Option<String>,
    ) -> Result<ListObjectsV2Output> {
        let (page, next) =
            self.memory
                .list("list_objects_v2", bucket, prefix, delimiter, continuation_token)?;

        let contents = page
            .into_iter()
            .map(|(key, stored)| {
                aws_sdk_s3::types::Object::builder()
                    .key(key)
                    .size(stored.body.len() as i64)
                    .last_modified(DateTime::from_secs(stored.created))
                    .build()
            })
            .collect();

        Ok(ListObjectsV2Output::builder()
            .set_contents(Some(contents))
            .set_next_continuation_token(next)
            .build())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<()> {
        // Like S3, removing a missing key succeeds.
        self.memory.delete("delete_object", bucket, key).map(|_| ())
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<()> {
        self.memory.delete_bucket("delete_bucket", bucket)
    }
}

#[derive(Clone, Debug)]
pub struct MockGcsClient {
    memory: Memory,
}

impl Default for MockGcsClient {
    fn default() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }
}

impl MockGcsClient {
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            memory: Memory::new(page_size),
        }
    }

    pub fn calls(&self, call: &str) -> usize {
        self.memory.calls(call)
    }

    pub fn total_calls(&self) -> usize {
        self.memory.total_calls()
    }

    pub fn fail_on(&self, key: &str) {
        self.memory.fail_on(key)
    }

    pub fn fail_close(&self) {
        let mut state = self
            .memory
            .state
            .lock()
            .expect("failed to acquire mock state guard");
        state.fail_close = true;
    }

    pub fn bucket_location(&self, bucket: &str) -> Option<String> {
        self.memory.bucket_location(bucket)
    }

    fn object(bucket: &str, key: &str, stored: &Stored) -> GcsObject {
        GcsObject {
            name: key.to_string(),
            bucket: bucket.to_string(),
            size: stored.body.len() as i64,
            content_type: Some(stored.content_type.clone()),
            generation: stored.generation,
            time_created: OffsetDateTime::from_unix_timestamp(stored.created).ok(),
            // Attribute reads do not always carry `updated`.
            updated: None,
            ..Default::default()
        }
    }
}

#[async_trait]
impl GcsApi for MockGcsClient {
    async fn insert_bucket(&self, _project: &str, bucket: &str, location: &str) -> Result<()> {
        self.memory.create_bucket("insert_bucket", bucket, location)
    }

    async fn upload_object(
        &self,
        bucket: &str,
        key: &str,
        content_type: &str,
        body: Bytes,
    ) -> Result<()> {
        self.memory
            .put("upload_object", bucket, key, content_type, body)
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<GcsObject> {
        let stored = self.memory.get("get_object", bucket, key)?;
        Ok(Self::object(bucket, key, &stored))
    }

    async fn download_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        let stored = self.memory.get("download_object", bucket, key)?;
        Ok(stored.body.to_vec())
    }

    async fn list_objects(
        &self,
        bucket: &str,
        prefix: Option<&str>,
        delimiter: Option<&str>,
        page_token: Option<String>,
    ) -> Result<ListObjectsResponse> {
        let (page, next) = self
            .memory
            .list("list_objects", bucket, prefix, delimiter, page_token)?;

        let items: Vec<_> = page
            .iter()
            .map(|(key, stored)| Self::object(bucket, key, stored))
            .collect();

        Ok(ListObjectsResponse {
            prefixes: None,
            items: (!items.is_empty()).then_some(items),
            next_page_token: next,
        })
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<()> {
        if self.memory.delete("delete_object", bucket, key)? {
            Ok(())
        } else {
            Err(Error::NotFound(target(bucket, key)))
        }
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<()> {
        self.memory.delete_bucket("delete_bucket", bucket)
    }

    async fn close(&self) -> Result<()> {
        let state = self.memory.lock("close");
        if state.fail_close {
            return Err(Error::backend("close", "client", "injected failure"));
        }
        Ok(())
    }
}
