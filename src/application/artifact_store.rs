//! Artifact store client
//!
//! Everything the deploy and destroy flows do against the deployment bucket:
//! artifact uploads, the rendered template, the remote marker, auxiliary
//! file uploads, and tearing the bucket down.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use ignore::WalkBuilder;
use tracing::{debug, info};

use crate::domain::ports::{ObjectStore, StoreError};
use crate::domain::services::Substitutions;
use crate::error::{LiftoffError, LiftoffResult, UploadFailure};

/// Key of the marker holding the last committed compilation timestamp
pub const MARKER_KEY: &str = "most-recent-deployment";

/// Key the rendered update template is stored under
pub const TEMPLATE_KEY: &str = "update-template";

/// A local file to upload under `key`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUpload<'p> {
    pub path: &'p Path,
    pub key: &'p str,
}

pub struct ArtifactStore<'a> {
    store: &'a dyn ObjectStore,
    concurrency: usize,
}

impl<'a> ArtifactStore<'a> {
    pub fn new(store: &'a dyn ObjectStore, concurrency: usize) -> Self {
        Self {
            store,
            concurrency: concurrency.max(1),
        }
    }

    /// Upload one local file
    pub fn upload_artifact(&self, bucket: &str, path: &Path, key: &str) -> LiftoffResult<()> {
        let body = std::fs::read(path).map_err(|err| LiftoffError::Upload {
            key: key.to_string(),
            source: StoreError::Io(err),
        })?;
        self.upload_bytes(bucket, key, &body)
    }

    pub fn upload_bytes(&self, bucket: &str, key: &str, body: &[u8]) -> LiftoffResult<()> {
        self.store
            .put_object(bucket, key, body)
            .map_err(|source| LiftoffError::Upload {
                key: key.to_string(),
                source,
            })?;
        debug!(bucket, key, bytes = body.len(), "uploaded object");
        Ok(())
    }

    /// Upload a batch with bounded parallelism.
    ///
    /// Every upload is attempted; failures are collected and reported
    /// together. `on_uploaded` receives the 1-based completion count.
    pub fn upload_all<F>(
        &self,
        bucket: &str,
        uploads: &[PendingUpload<'_>],
        on_uploaded: F,
    ) -> LiftoffResult<()>
    where
        F: Fn(usize, &str) + Sync,
    {
        if uploads.is_empty() {
            return Ok(());
        }

        let next = AtomicUsize::new(0);
        let done = AtomicUsize::new(0);
        let failures = Mutex::new(Vec::new());
        let workers = self.concurrency.min(uploads.len());

        std::thread::scope(|scope| {
            for _ in 0..workers {
                scope.spawn(|| loop {
                    let index = next.fetch_add(1, Ordering::SeqCst);
                    let Some(upload) = uploads.get(index) else {
                        break;
                    };
                    match self.upload_artifact(bucket, upload.path, upload.key) {
                        Ok(()) => {
                            let count = done.fetch_add(1, Ordering::SeqCst) + 1;
                            on_uploaded(count, upload.key);
                        }
                        Err(err) => {
                            let mut failures =
                                failures.lock().unwrap_or_else(|p| p.into_inner());
                            failures.push(UploadFailure {
                                key: upload.key.to_string(),
                                message: err.to_string(),
                            });
                        }
                    }
                });
            }
        });

        let mut failures = failures.into_inner().unwrap_or_else(|p| p.into_inner());
        if failures.is_empty() {
            return Ok(());
        }
        failures.sort_by(|a, b| a.key.cmp(&b.key));
        Err(LiftoffError::UploadsFailed { failures })
    }

    /// Read a small text object; absence is `None`, not an error
    pub fn read_text(&self, bucket: &str, key: &str) -> LiftoffResult<Option<String>> {
        let body = self
            .store
            .get_object(bucket, key)
            .map_err(|source| LiftoffError::Download {
                bucket: bucket.to_string(),
                key: key.to_string(),
                source,
            })?;
        Ok(body.map(|bytes| String::from_utf8_lossy(&bytes).trim().to_string()))
    }

    /// Last committed compilation timestamp published for the stage
    pub fn read_marker(&self, bucket: &str) -> LiftoffResult<Option<String>> {
        Ok(self
            .read_text(bucket, MARKER_KEY)?
            .filter(|marker| !marker.is_empty()))
    }

    pub fn publish_marker(&self, bucket: &str, timestamp: &str) -> LiftoffResult<()> {
        self.upload_bytes(bucket, MARKER_KEY, timestamp.as_bytes())
    }

    /// Upload a rendered template and return the URL the provider reads it from
    pub fn upload_template(&self, bucket: &str, body: &[u8]) -> LiftoffResult<String> {
        self.upload_bytes(bucket, TEMPLATE_KEY, body)?;
        self.resolve_url(bucket, TEMPLATE_KEY)
    }

    pub fn resolve_url(&self, bucket: &str, key: &str) -> LiftoffResult<String> {
        self.store
            .object_url(bucket, key)
            .map_err(|source| LiftoffError::Upload {
                key: key.to_string(),
                source,
            })
    }

    /// Upload a file, or every file below a directory, under `target`.
    ///
    /// Directory entries land at `{target}/{relative path}`. With
    /// `substitutions`, each file is rendered as text before upload.
    /// Returns the uploaded keys in path order.
    pub fn upload_path(
        &self,
        bucket: &str,
        source: &Path,
        target: &str,
        substitutions: Option<&Substitutions>,
    ) -> LiftoffResult<Vec<String>> {
        let target = target.trim_end_matches('/');
        let io_error = |err: std::io::Error| LiftoffError::Upload {
            key: target.to_string(),
            source: StoreError::Io(err),
        };

        let mut files = Vec::new();
        if source.is_dir() {
            for entry in WalkBuilder::new(source)
                .standard_filters(false)
                .hidden(false)
                .sort_by_file_path(|a, b| a.cmp(b))
                .build()
            {
                let entry = entry.map_err(|err| io_error(std::io::Error::other(err)))?;
                if !entry.file_type().is_some_and(|t| t.is_file()) {
                    continue;
                }
                let relative = entry
                    .path()
                    .strip_prefix(source)
                    .unwrap_or(entry.path())
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                let key = if target.is_empty() {
                    relative
                } else {
                    format!("{}/{}", target, relative)
                };
                files.push((entry.into_path(), key));
            }
        } else if source.is_file() {
            files.push((source.to_path_buf(), target.to_string()));
        } else {
            return Err(io_error(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} does not exist", source.display()),
            )));
        }

        let mut keys = Vec::with_capacity(files.len());
        for (path, key) in files {
            match substitutions {
                Some(subs) => {
                    let text = std::fs::read_to_string(&path).map_err(|err| {
                        LiftoffError::Upload {
                            key: key.clone(),
                            source: StoreError::Io(err),
                        }
                    })?;
                    self.upload_bytes(bucket, &key, subs.render(&text).as_bytes())?;
                }
                None => self.upload_artifact(bucket, &path, &key)?,
            }
            keys.push(key);
        }
        Ok(keys)
    }

    /// Remove every object and every version from `bucket`, then the bucket.
    ///
    /// Returns how many objects and versions were deleted. A bucket that is
    /// already gone counts as torn down.
    pub fn delete_bucket_recursively(&self, bucket: &str) -> LiftoffResult<usize> {
        match self.empty_and_delete(bucket) {
            Ok(removed) => {
                info!(bucket, removed, "deleted deployment bucket");
                Ok(removed)
            }
            Err(StoreError::NoSuchBucket(_)) => {
                info!(bucket, "deployment bucket already gone");
                Ok(0)
            }
            Err(source) => Err(LiftoffError::BucketTeardown {
                bucket: bucket.to_string(),
                source,
            }),
        }
    }

    fn empty_and_delete(&self, bucket: &str) -> Result<usize, StoreError> {
        let mut removed = 0;

        let mut token: Option<String> = None;
        loop {
            let page = self.store.list_objects(bucket, token.as_deref())?;
            for key in &page.keys {
                self.store.delete_object(bucket, key)?;
                removed += 1;
            }
            match page.next_token {
                Some(next) => token = Some(next),
                None => break,
            }
        }

        let mut cursor = None;
        loop {
            let page = self.store.list_object_versions(bucket, cursor.as_ref())?;
            for version in &page.versions {
                self.store
                    .delete_object_version(bucket, &version.key, &version.version_id)?;
                removed += 1;
            }
            match page.next {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        self.store.delete_bucket(bucket)?;
        Ok(removed)
    }
}
