use std::path::PathBuf;

use crate::client::s3::DEFAULT_REGION;

/// Location GCS uses when a bucket is created without one.
pub const DEFAULT_GCS_LOCATION: &str = "US";

/// Connection options for Google Cloud Storage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GcsOptions {
    /// Service account key file. `None` means application default credentials.
    pub credentials_file: Option<PathBuf>,
    /// Used by `create_bucket` when the input has no location.
    pub default_location: String,
}

impl Default for GcsOptions {
    fn default() -> Self {
        Self {
            credentials_file: None,
            default_location: DEFAULT_GCS_LOCATION.to_string(),
        }
    }
}

impl GcsOptions {
    pub fn with_credentials_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.credentials_file = Some(path.into());
        self
    }

    pub fn with_default_location(mut self, location: impl Into<String>) -> Self {
        self.default_location = location.into();
        self
    }
}

/// Region of a resolved AWS configuration, falling back to `us-east-1`.
pub fn s3_region(config: &aws_config::SdkConfig) -> String {
    config
        .region()
        .map(|region| region.as_ref().to_string())
        .unwrap_or_else(|| DEFAULT_REGION.to_string())
}
