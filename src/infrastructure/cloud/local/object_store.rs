//! Versioned object store on the local filesystem
//!
//! Layout: `{root}/buckets/{bucket}/index.json` tracks keys and versions,
//! `{root}/buckets/{bucket}/blobs/{version}` holds the bytes.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use crate::domain::ports::{
    ObjectPage, ObjectStore, ObjectVersion, StoreError, StoreResult, VersionCursor, VersionPage,
};
use crate::infrastructure::fs::atomic_write;

/// URL scheme returned by `object_url`
pub const LOCAL_URL_SCHEME: &str = "local://";

const DEFAULT_PAGE_SIZE: usize = 1000;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredVersion {
    id: String,
    #[serde(default)]
    delete_marker: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct BucketIndex {
    #[serde(default)]
    versioned: bool,
    #[serde(default)]
    next_version: u64,
    /// Versions per key, oldest first
    #[serde(default)]
    objects: BTreeMap<String, Vec<StoredVersion>>,
}

impl BucketIndex {
    fn current(&self, key: &str) -> Option<&StoredVersion> {
        self.objects
            .get(key)
            .and_then(|versions| versions.last())
            .filter(|v| !v.delete_marker)
    }

    fn mint_version(&mut self) -> String {
        self.next_version += 1;
        format!("v{:012}", self.next_version)
    }
}

#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
    page_size: usize,
    lock: Arc<Mutex<()>>,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            page_size: DEFAULT_PAGE_SIZE,
            lock: Arc::new(Mutex::new(())),
        }
    }

    /// Listing page size; small values exercise paging in tests
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Create `bucket` if it does not exist yet
    pub fn create_bucket(&self, bucket: &str) -> StoreResult<()> {
        let _guard = self.guard();
        let dir = self.bucket_dir(bucket)?;
        if !dir.exists() {
            std::fs::create_dir_all(dir.join("blobs"))?;
            self.write_index(bucket, &BucketIndex::default())?;
        }
        Ok(())
    }

    pub fn enable_versioning(&self, bucket: &str) -> StoreResult<()> {
        let _guard = self.guard();
        let mut index = self.read_index(bucket)?;
        index.versioned = true;
        self.write_index(bucket, &index)
    }

    pub fn bucket_exists(&self, bucket: &str) -> bool {
        self.bucket_dir(bucket).map(|dir| dir.exists()).unwrap_or(false)
    }

    /// Fetch the object behind a URL produced by `object_url`
    pub fn read_url(&self, url: &str) -> StoreResult<Option<Vec<u8>>> {
        let rest = url
            .strip_prefix(LOCAL_URL_SCHEME)
            .ok_or_else(|| StoreError::Service(format!("not a local object url: {}", url)))?;
        let (bucket, key) = rest
            .split_once('/')
            .ok_or_else(|| StoreError::Service(format!("malformed object url: {}", url)))?;
        self.get_object(bucket, key)
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn bucket_dir(&self, bucket: &str) -> StoreResult<PathBuf> {
        let valid = !bucket.is_empty()
            && bucket != "."
            && bucket != ".."
            && !bucket.contains(['/', '\\']);
        if !valid {
            return Err(StoreError::Service(format!("invalid bucket name '{}'", bucket)));
        }
        Ok(self.root.join("buckets").join(bucket))
    }

    fn blob_path(&self, bucket: &str, version: &str) -> StoreResult<PathBuf> {
        Ok(self.bucket_dir(bucket)?.join("blobs").join(version))
    }

    fn read_index(&self, bucket: &str) -> StoreResult<BucketIndex> {
        let path = self.bucket_dir(bucket)?.join("index.json");
        if !path.exists() {
            return Err(StoreError::NoSuchBucket(bucket.to_string()));
        }
        let content = std::fs::read_to_string(&path)?;
        serde_json::from_str(&content)
            .map_err(|e| StoreError::Service(format!("corrupt bucket index {}: {}", bucket, e)))
    }

    fn write_index(&self, bucket: &str, index: &BucketIndex) -> StoreResult<()> {
        let path = self.bucket_dir(bucket)?.join("index.json");
        let content = serde_json::to_vec_pretty(index)
            .map_err(|e| StoreError::Service(e.to_string()))?;
        atomic_write(&path, &content)?;
        Ok(())
    }

    fn remove_blob(&self, bucket: &str, version: &str) -> StoreResult<()> {
        let path = self.blob_path(bucket, version)?;
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

impl ObjectStore for LocalObjectStore {
    fn put_object(&self, bucket: &str, key: &str, body: &[u8]) -> StoreResult<()> {
        let _guard = self.guard();
        let mut index = self.read_index(bucket)?;
        let id = index.mint_version();
        atomic_write(&self.blob_path(bucket, &id)?, body)?;

        let versions = index.objects.entry(key.to_string()).or_default();
        let replaced = if index.versioned {
            Vec::new()
        } else {
            std::mem::take(versions)
        };
        versions.push(StoredVersion {
            id,
            delete_marker: false,
        });
        self.write_index(bucket, &index)?;

        for old in replaced {
            self.remove_blob(bucket, &old.id)?;
        }
        Ok(())
    }

    fn get_object(&self, bucket: &str, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let _guard = self.guard();
        let index = self.read_index(bucket)?;
        match index.current(key) {
            Some(version) => Ok(Some(std::fs::read(self.blob_path(bucket, &version.id)?)?)),
            None => Ok(None),
        }
    }

    fn object_url(&self, bucket: &str, key: &str) -> StoreResult<String> {
        Ok(format!("{}{}/{}", LOCAL_URL_SCHEME, bucket, key))
    }

    fn list_objects(&self, bucket: &str, next_token: Option<&str>) -> StoreResult<ObjectPage> {
        let _guard = self.guard();
        let index = self.read_index(bucket)?;
        let mut keys: Vec<String> = index
            .objects
            .keys()
            .filter(|key| next_token.is_none_or(|after| key.as_str() > after))
            .filter(|key| index.current(key).is_some())
            .take(self.page_size + 1)
            .cloned()
            .collect();

        let next_token = if keys.len() > self.page_size {
            keys.truncate(self.page_size);
            keys.last().cloned()
        } else {
            None
        };
        Ok(ObjectPage { keys, next_token })
    }

    fn delete_object(&self, bucket: &str, key: &str) -> StoreResult<()> {
        let _guard = self.guard();
        let mut index = self.read_index(bucket)?;
        if index.versioned {
            let id = index.mint_version();
            index
                .objects
                .entry(key.to_string())
                .or_default()
                .push(StoredVersion {
                    id,
                    delete_marker: true,
                });
            return self.write_index(bucket, &index);
        }

        let removed = index.objects.remove(key).unwrap_or_default();
        self.write_index(bucket, &index)?;
        for version in removed {
            self.remove_blob(bucket, &version.id)?;
        }
        Ok(())
    }

    fn list_object_versions(
        &self,
        bucket: &str,
        cursor: Option<&VersionCursor>,
    ) -> StoreResult<VersionPage> {
        let _guard = self.guard();
        let index = self.read_index(bucket)?;
        let after = cursor.map(|c| {
            (
                c.key_marker.as_str(),
                c.version_id_marker.as_deref().unwrap_or_default(),
            )
        });

        let mut versions: Vec<ObjectVersion> = index
            .objects
            .iter()
            .flat_map(|(key, versions)| versions.iter().map(move |v| (key.as_str(), v.id.as_str())))
            .filter(|position| after.is_none_or(|after| *position > after))
            .take(self.page_size + 1)
            .map(|(key, id)| ObjectVersion {
                key: key.to_string(),
                version_id: id.to_string(),
            })
            .collect();

        let next = if versions.len() > self.page_size {
            versions.truncate(self.page_size);
            versions.last().map(|v| VersionCursor {
                key_marker: v.key.clone(),
                version_id_marker: Some(v.version_id.clone()),
            })
        } else {
            None
        };
        Ok(VersionPage { versions, next })
    }

    fn delete_object_version(&self, bucket: &str, key: &str, version_id: &str) -> StoreResult<()> {
        let _guard = self.guard();
        let mut index = self.read_index(bucket)?;
        if let Some(versions) = index.objects.get_mut(key) {
            versions.retain(|v| v.id != version_id);
            if versions.is_empty() {
                index.objects.remove(key);
            }
        }
        self.write_index(bucket, &index)?;
        self.remove_blob(bucket, version_id)
    }

    fn delete_bucket(&self, bucket: &str) -> StoreResult<()> {
        let _guard = self.guard();
        let index = self.read_index(bucket)?;
        if !index.objects.is_empty() {
            return Err(StoreError::BucketNotEmpty(bucket.to_string()));
        }
        std::fs::remove_dir_all(self.bucket_dir(bucket)?)?;
        Ok(())
    }
}

impl LocalObjectStore {
    /// True when `bucket` holds no keys, versions or delete markers
    pub fn is_empty(&self, bucket: &str) -> StoreResult<bool> {
        let _guard = self.guard();
        Ok(self.read_index(bucket)?.objects.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn unversioned_put_replaces() {
        let dir = tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path());
        store.create_bucket("b").unwrap();

        store.put_object("b", "k", b"one").unwrap();
        store.put_object("b", "k", b"two").unwrap();

        assert_eq!(store.get_object("b", "k").unwrap(), Some(b"two".to_vec()));
        assert_eq!(store.list_object_versions("b", None).unwrap().versions.len(), 1);
    }

    #[test]
    fn versioned_delete_leaves_marker() {
        let dir = tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path());
        store.create_bucket("b").unwrap();
        store.enable_versioning("b").unwrap();

        store.put_object("b", "k", b"one").unwrap();
        store.delete_object("b", "k").unwrap();

        assert_eq!(store.get_object("b", "k").unwrap(), None);
        assert!(store.list_objects("b", None).unwrap().keys.is_empty());
        assert_eq!(store.list_object_versions("b", None).unwrap().versions.len(), 2);
        assert!(matches!(
            store.delete_bucket("b"),
            Err(StoreError::BucketNotEmpty(_))
        ));
    }

    #[test]
    fn listing_pages_through_keys() {
        let dir = tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path()).with_page_size(2);
        store.create_bucket("b").unwrap();
        for key in ["a", "b", "c", "d", "e"] {
            store.put_object("b", key, b"x").unwrap();
        }

        let mut seen = Vec::new();
        let mut token = None;
        loop {
            let page = store.list_objects("b", token.as_deref()).unwrap();
            seen.extend(page.keys);
            match page.next_token {
                Some(next) => token = Some(next),
                None => break,
            }
        }

        assert_eq!(seen, vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn urls_resolve_back_to_objects() {
        let dir = tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path());
        store.create_bucket("b").unwrap();
        store.put_object("b", "nested/key.json", b"{}").unwrap();

        let url = store.object_url("b", "nested/key.json").unwrap();

        assert_eq!(url, "local://b/nested/key.json");
        assert_eq!(store.read_url(&url).unwrap(), Some(b"{}".to_vec()));
    }

    #[test]
    fn missing_bucket_is_reported() {
        let dir = tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path());

        assert!(matches!(
            store.put_object("nope", "k", b"x"),
            Err(StoreError::NoSuchBucket(_))
        ));
        assert!(matches!(
            store.put_object("../escape", "k", b"x"),
            Err(StoreError::Service(_))
        ));
    }
}
