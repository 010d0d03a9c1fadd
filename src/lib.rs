//! One storage API over Amazon S3 and Google Cloud Storage.
//!
//! Build a [`Storage`] bound to a backend, then drive it with a [`Context`]
//! per call:
//!
//! ```no_run
//! # async fn run() -> cstorage::Result<()> {
//! use cstorage::{Context, ListOptions, Storage};
//!
//! let config = aws_config::load_from_env().await;
//! let mut storage = Storage::from_s3_config(&config);
//!
//! let ctx = Context::background();
//! for obj in storage.list_objects(&ctx, "bucket", &[ListOptions::new().prefix("dir/")]).await? {
//!     println!("{} {}", obj.key, obj.url);
//! }
//!
//! storage.simple_disconnect().await;
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod model;
pub mod storage;
pub mod util;

pub use config::GcsOptions;
pub use context::Context;
pub use error::{Error, Result};
pub use model::{
    io::{
        CreateBucketInput, DeleteBucketOutput, DeleteObjectInput, DeleteObjectOutput,
        DeletePrefixInput, DeletePrefixOutput, PutObjectInput, PutObjectOutput,
    },
    mime::MimeType,
    object::{Content, Object, ObjectSummary},
    options::ListOptions,
};
pub use storage::Storage;
pub use util::backend::StorageBackend;
