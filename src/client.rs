//! Seams over the two SDK clients. The adapters only talk to these traits,
//! so they can run against in-memory clients in tests.

pub mod gcs;
pub mod s3;

pub use gcs::GcsApi;
pub use s3::S3Api;
