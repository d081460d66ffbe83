//! ObjectStore port - the bucket service (S3-like)

use thiserror::Error;

/// Result type for object store calls
pub type StoreResult<T> = Result<T, StoreError>;

/// Object store errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("bucket '{0}' does not exist")]
    NoSuchBucket(String),
    #[error("bucket '{0}' is not empty")]
    BucketNotEmpty(String),
    #[error("service error: {0}")]
    Service(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// One page of current object keys
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectPage {
    pub keys: Vec<String>,
    pub next_token: Option<String>,
}

/// A stored version of a key (or a delete marker)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectVersion {
    pub key: String,
    pub version_id: String,
}

/// Position in a version listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionCursor {
    pub key_marker: String,
    pub version_id_marker: Option<String>,
}

/// One page of object versions, delete markers included
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionPage {
    pub versions: Vec<ObjectVersion>,
    pub next: Option<VersionCursor>,
}

/// Abstract object store
///
/// Implementations:
/// - `LocalObjectStore` - versioned buckets on disk
/// - `AwsObjectStore` - S3 (feature `aws`)
pub trait ObjectStore: Send + Sync {
    fn put_object(&self, bucket: &str, key: &str, body: &[u8]) -> StoreResult<()>;

    /// Current content of `key`, `None` when the key does not exist
    fn get_object(&self, bucket: &str, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// URL the stack provider can fetch `key` from
    fn object_url(&self, bucket: &str, key: &str) -> StoreResult<String>;

    fn list_objects(&self, bucket: &str, next_token: Option<&str>) -> StoreResult<ObjectPage>;

    fn delete_object(&self, bucket: &str, key: &str) -> StoreResult<()>;

    fn list_object_versions(
        &self,
        bucket: &str,
        cursor: Option<&VersionCursor>,
    ) -> StoreResult<VersionPage>;

    fn delete_object_version(&self, bucket: &str, key: &str, version_id: &str) -> StoreResult<()>;

    /// Remove an empty bucket
    fn delete_bucket(&self, bucket: &str) -> StoreResult<()>;
}
